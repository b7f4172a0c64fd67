use thiserror::Error;

/// An exception raised by a platform entry point.
///
/// `name` follows the DOM exception names (`SecurityError`, `NotAllowedError`,
/// `InvalidStateError`, `SyntaxError`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct DomException {
    pub name: String,
    pub message: String,
}

impl DomException {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn security(message: impl Into<String>) -> Self {
        Self::new("SecurityError", message)
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new("NotAllowedError", message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new("InvalidStateError", message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new("SyntaxError", message)
    }

    pub fn is_security_error(&self) -> bool {
        self.name == "SecurityError"
    }
}

pub type ApiResult<T> = Result<T, DomException>;
