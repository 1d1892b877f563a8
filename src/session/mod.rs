//! Session module.
//!
//! This module provides:
//! - The persisted session and its file storage
//! - The authenticator capability implemented by the platform client
//! - Credential prompts (terminal and scripted)
//! - The session manager that ties them together

pub mod manager;
pub mod prompt;
pub mod store;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use manager::SessionManager;
pub use prompt::{CredentialPrompt, ScriptedPrompt, TerminalPrompt};
pub use store::{import_cookies_txt, load_session, save_session};

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    /// Cookies set by the platform during login.
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
}

impl Session {
    pub fn new(username: impl Into<String>, cookies: BTreeMap<String, String>) -> Self {
        Self {
            username: username.into(),
            cookies,
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Login capability of the platform client.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Log in with a password.
    ///
    /// Fails with `TwoFactorRequired` when a code is needed to finish.
    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// Finish a login that required a two-factor code.
    async fn two_factor_login(
        &self,
        username: &str,
        identifier: &str,
        code: &str,
    ) -> Result<Session>;

    /// Install a previously saved session without contacting the platform.
    async fn restore(&self, session: &Session) -> Result<()>;
}
