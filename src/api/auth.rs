//! Password and two-factor login against the Instagram web endpoints.

use async_trait::async_trait;
use chrono::Utc;

use crate::api::client::InstagramApi;
use crate::api::types::LoginResponse;
use crate::error::{is_rate_limit_message, Error, Result};
use crate::session::{Authenticator, Session};

const LOGIN_PATH: &str = "api/v1/web/accounts/login/ajax/";
const TWO_FACTOR_PATH: &str = "accounts/login/ajax/two_factor/";

/// Password wrapper accepted by the web login endpoint (version 0 is plain text).
pub fn encode_password(password: &str, timestamp: i64) -> String {
    format!("#PWD_INSTAGRAM_BROWSER:0:{}:{}", timestamp, password)
}

/// Parse a login endpoint body, whatever its HTTP status.
fn parse_login_response(text: &str) -> Result<LoginResponse> {
    serde_json::from_str(text).map_err(|e| {
        Error::Login(format!(
            "Unexpected login response ({}): {}",
            e,
            text.chars().take(200).collect::<String>()
        ))
    })
}

fn protocol_failure(response: &LoginResponse) -> Error {
    let message = response
        .message
        .clone()
        .or_else(|| response.status.clone())
        .unwrap_or_else(|| "unknown error".to_string());
    if is_rate_limit_message(&message) {
        Error::Connection(message)
    } else {
        Error::Login(message)
    }
}

impl InstagramApi {
    async fn finish_login(&self, username: &str, response: LoginResponse) -> Result<Session> {
        if response.two_factor_required {
            let identifier = response
                .two_factor_info
                .map(|info| info.two_factor_identifier)
                .ok_or_else(|| Error::Login("two-factor identifier missing".to_string()))?;
            return Err(Error::TwoFactorRequired { identifier });
        }

        if let Some(url) = response.checkpoint_url {
            return Err(Error::Login(format!(
                "Checkpoint required. Point your browser to {} and follow the instructions",
                url
            )));
        }

        if response.status.as_deref() != Some("ok") {
            return Err(protocol_failure(&response));
        }

        if !response.authenticated {
            return Err(match response.user {
                Some(false) => {
                    Error::BadCredentials(format!("User {} does not exist", username))
                }
                _ => Error::BadCredentials("Wrong password".to_string()),
            });
        }

        self.set_logged_in_as(username).await;
        tracing::debug!("Authenticated as {}", username);
        Ok(Session::new(username, self.cookies()))
    }
}

#[async_trait]
impl Authenticator for InstagramApi {
    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        self.prime_csrf_token().await?;

        let form = [
            ("username", username.to_string()),
            (
                "enc_password",
                encode_password(password, Utc::now().timestamp()),
            ),
            ("queryParams", "{}".to_string()),
            ("optIntoOneTap", "false".to_string()),
        ];
        let (status, text) = self.post_form(LOGIN_PATH, &form).await?;
        if status.is_server_error() {
            return Err(Error::Connection(format!("HTTP {} during login", status)));
        }

        let response = parse_login_response(&text)?;
        self.finish_login(username, response).await
    }

    async fn two_factor_login(
        &self,
        username: &str,
        identifier: &str,
        code: &str,
    ) -> Result<Session> {
        let form = [
            ("username", username.to_string()),
            ("verificationCode", code.to_string()),
            ("identifier", identifier.to_string()),
        ];
        let (status, text) = self.post_form(TWO_FACTOR_PATH, &form).await?;
        if status.is_server_error() {
            return Err(Error::Connection(format!("HTTP {} during login", status)));
        }

        let response = parse_login_response(&text)?;
        if response.status.as_deref() != Some("ok") {
            return Err(match response.message {
                Some(message) if !is_rate_limit_message(&message) => {
                    Error::BadCredentials(message)
                }
                _ => protocol_failure(&response),
            });
        }
        self.finish_login(username, response).await
    }

    async fn restore(&self, session: &Session) -> Result<()> {
        for (name, value) in &session.cookies {
            self.add_cookie(name, value);
        }
        self.set_logged_in_as(&session.username).await;
        Ok(())
    }
}
