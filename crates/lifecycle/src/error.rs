use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Permission,
    State,
}

/// Local rejection of an action. Raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not permitted: {0}")]
    Permission(String),
    #[error("not allowed in current state: {0}")]
    State(String),
}

impl LifecycleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Permission(_) => ErrorKind::Permission,
            Self::State(_) => ErrorKind::State,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) | Self::Permission(message) | Self::State(message) => {
                message
            }
        }
    }
}
