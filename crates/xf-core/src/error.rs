use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ItextError {
    pub code: String,
    pub message: String,
    pub subject: Option<String>,
}

impl ItextError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            subject: None,
        }
    }

    pub fn with_subject(
        code: impl Into<String>,
        message: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            subject: Some(subject.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub subject: String,
}

impl Diagnostic {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            subject: subject.into(),
        }
    }
}
