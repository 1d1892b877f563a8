//! Credential prompts for the interactive login flow.

use std::collections::VecDeque;
use std::sync::Mutex;

use console::Term;

use crate::error::{Error, Result};

/// Source of credentials the login flow asks for mid-run.
pub trait CredentialPrompt: Send + Sync {
    fn username(&self) -> Result<String>;

    fn password(&self, username: &str) -> Result<String>;

    fn two_factor_code(&self, username: &str) -> Result<String>;
}

/// Prompts on the terminal; passwords are read without echo.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }

    fn ask(&self, question: &str, secure: bool) -> Result<String> {
        let term = Term::stderr();
        term.write_str(question)
            .map_err(|e| Error::Prompt(e.to_string()))?;
        let answer = if secure {
            term.read_secure_line()
        } else {
            term.read_line()
        }
        .map_err(|e| Error::Prompt(e.to_string()))?;

        let answer = answer.trim().to_string();
        if answer.is_empty() {
            return Err(Error::Prompt("no input given".to_string()));
        }
        Ok(answer)
    }
}

impl CredentialPrompt for TerminalPrompt {
    fn username(&self) -> Result<String> {
        self.ask("Instagram username: ", false)
    }

    fn password(&self, username: &str) -> Result<String> {
        self.ask(&format!("Password for {} (only needed to create the session): ", username), true)
    }

    fn two_factor_code(&self, username: &str) -> Result<String> {
        self.ask(&format!("Two-factor code for {}: ", username), false)
    }
}

/// Answers prompts from pre-supplied values, for headless runs and tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    usernames: Mutex<VecDeque<String>>,
    passwords: Mutex<VecDeque<String>>,
    codes: Mutex<VecDeque<String>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_username(self, username: impl Into<String>) -> Self {
        push(&self.usernames, username.into());
        self
    }

    pub fn with_password(self, password: impl Into<String>) -> Self {
        push(&self.passwords, password.into());
        self
    }

    pub fn with_code(self, code: impl Into<String>) -> Self {
        push(&self.codes, code.into());
        self
    }
}

fn push(queue: &Mutex<VecDeque<String>>, value: String) {
    if let Ok(mut queue) = queue.lock() {
        queue.push_back(value);
    }
}

fn pop(queue: &Mutex<VecDeque<String>>, what: &str) -> Result<String> {
    queue
        .lock()
        .map_err(|_| Error::Prompt(format!("{} prompt poisoned", what)))?
        .pop_front()
        .ok_or_else(|| Error::Prompt(format!("no scripted {} available", what)))
}

impl CredentialPrompt for ScriptedPrompt {
    fn username(&self) -> Result<String> {
        pop(&self.usernames, "username")
    }

    fn password(&self, _username: &str) -> Result<String> {
        pop(&self.passwords, "password")
    }

    fn two_factor_code(&self, _username: &str) -> Result<String> {
        pop(&self.codes, "two-factor code")
    }
}
