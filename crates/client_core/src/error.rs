use lifecycle::LifecycleError;
use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent.
    #[error(transparent)]
    Rejected(#[from] LifecycleError),
    #[error("server rejected request ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(String),
}

impl ClientError {
    /// Builds a remote error, preferring the backend's own message when the body carries one.
    pub(crate) fn remote(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ApiError>(body)
            .ok()
            .map(|err| err.message.trim().to_string())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Self::Remote { status, message }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Transport(_))
    }

    /// Text suitable for a dismissable message in the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(err) => err.message().to_string(),
            Self::Remote { message, .. } => message.clone(),
            Self::Transport(_) => "could not reach the server, please try again".to_string(),
        }
    }
}
