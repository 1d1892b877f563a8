//! Session lifecycle: load a saved session or log in and persist a new one.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::output::{print_info, print_warning};
use crate::session::store::{load_session, save_session};
use crate::session::{Authenticator, CredentialPrompt, Session};

/// Rejected password or code submissions allowed in the interactive flow.
pub const MAX_REJECTED_ATTEMPTS: u32 = 3;

/// Loads, creates, and persists the session for a single run.
pub struct SessionManager<'a> {
    authenticator: &'a dyn Authenticator,
    prompt: &'a dyn CredentialPrompt,
    session_file: PathBuf,
    max_rejected_attempts: u32,
}

impl<'a> SessionManager<'a> {
    pub fn new(
        authenticator: &'a dyn Authenticator,
        prompt: &'a dyn CredentialPrompt,
        session_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            authenticator,
            prompt,
            session_file: session_file.into(),
            max_rejected_attempts: MAX_REJECTED_ATTEMPTS,
        }
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    /// Produce an authenticated session for `username`.
    ///
    /// A saved session is used as-is without contacting Instagram. Otherwise
    /// the password (if any) is tried first and the interactive flow takes
    /// over when the platform rejects it or asks for a two-factor code.
    pub async fn authenticate(
        &self,
        username: &str,
        password: Option<&str>,
        two_factor_code: Option<&str>,
    ) -> Result<Session> {
        if self.session_file.exists() {
            return self.restore(username).await;
        }

        let session = self
            .login(username, password, two_factor_code)
            .await
            .map_err(|e| self.login_failure(username, e))?;

        save_session(&session, &self.session_file)?;
        print_info(&format!(
            "Logged in as {}; session saved to {}",
            session.username,
            self.session_file.display()
        ));
        Ok(session)
    }

    async fn restore(&self, username: &str) -> Result<Session> {
        let mut session = load_session(&self.session_file)?;
        if !session.username.eq_ignore_ascii_case(username) {
            tracing::warn!(
                "Session file {} belongs to '{}', not '{}'; using it anyway",
                self.session_file.display(),
                session.username,
                username
            );
            session.username = username.to_string();
        }

        self.authenticator.restore(&session).await?;
        print_info(&format!(
            "Loaded session for {} from {}",
            session.username,
            self.session_file.display()
        ));
        Ok(session)
    }

    async fn login(
        &self,
        username: &str,
        password: Option<&str>,
        two_factor_code: Option<&str>,
    ) -> Result<Session> {
        let mut rejected = 0;

        let Some(password) = password else {
            return self
                .interactive_login(username, two_factor_code, &mut rejected)
                .await;
        };

        match self.authenticator.login(username, password).await {
            Ok(session) => Ok(session),
            Err(Error::TwoFactorRequired { identifier }) => {
                self.complete_two_factor(username, &identifier, two_factor_code, &mut rejected)
                    .await
            }
            Err(e) if e.allows_interactive_login() => {
                print_warning(&format!("Direct login failed: {}", e));
                if matches!(e, Error::BadCredentials(_)) {
                    rejected += 1;
                }
                self.interactive_login(username, two_factor_code, &mut rejected)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn interactive_login(
        &self,
        username: &str,
        two_factor_code: Option<&str>,
        rejected: &mut u32,
    ) -> Result<Session> {
        loop {
            let password = self.prompt.password(username)?;
            match self.authenticator.login(username, &password).await {
                Ok(session) => return Ok(session),
                Err(Error::TwoFactorRequired { identifier }) => {
                    return self
                        .complete_two_factor(username, &identifier, two_factor_code, rejected)
                        .await;
                }
                Err(Error::BadCredentials(message)) => {
                    *rejected += 1;
                    if *rejected >= self.max_rejected_attempts {
                        return Err(Error::BadCredentials(message));
                    }
                    print_warning(&format!("{}. Try again.", message));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn complete_two_factor(
        &self,
        username: &str,
        identifier: &str,
        scripted_code: Option<&str>,
        rejected: &mut u32,
    ) -> Result<Session> {
        let mut scripted_code = scripted_code.map(str::to_string);
        loop {
            let code = match scripted_code.take() {
                Some(code) => code,
                None => self.prompt.two_factor_code(username)?,
            };

            match self
                .authenticator
                .two_factor_login(username, identifier, &code)
                .await
            {
                Ok(session) => return Ok(session),
                Err(Error::BadCredentials(message)) => {
                    *rejected += 1;
                    if *rejected >= self.max_rejected_attempts {
                        return Err(Error::BadCredentials(message));
                    }
                    print_warning(&format!("{}. Try again.", message));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Attach remediation to a fatal login error.
    fn login_failure(&self, username: &str, error: Error) -> Error {
        match error {
            Error::BadCredentials(message) => {
                let mut hint = format!(
                    "{}. Use your Instagram USERNAME, not your email address",
                    message
                );
                if username.contains('@') {
                    hint.push_str(&format!(" ('{}' contains '@')", username));
                }
                Error::BadCredentials(hint)
            }
            Error::Connection(message) => {
                Error::Connection(format!("network error during login: {}", message))
            }
            Error::Http(e) => Error::Connection(format!("network error during login: {}", e)),
            Error::Login(message) => Error::Login(format!(
                "{}. Log in with a browser, export its cookies, then run: \
                 ig-saved-export --load-cookies cookies.txt --session-file {}",
                message,
                self.session_file.display()
            )),
            other => other,
        }
    }
}
