//! Error types for the intake agent

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type shared across collaborator boundaries
#[derive(Error, Debug)]
pub enum Error {
    /// Synthesis or transcription provider returned an error or non-2xx
    #[error("Provider error ({provider}): {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// Provider call exceeded its deadline
    #[error("Provider timed out: {0}")]
    Timeout(&'static str),

    /// Outcome sink write failed
    #[error("Outcome sink error: {0}")]
    Sink(String),

    /// Carrier rejected a call-control or egress operation
    #[error("Telephony error: {0}")]
    Telephony(String),

    /// The other end of an internal channel went away (usually a disconnect)
    #[error("Channel closed")]
    ChannelClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Error::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Transient failures are retried locally a bounded number of times
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Provider { .. } | Error::Timeout(_))
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Error::ChannelClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::provider("tts", "503").is_transient());
        assert!(Error::Timeout("tts").is_transient());
        assert!(!Error::Sink("down".into()).is_transient());
        assert!(!Error::ChannelClosed.is_transient());
    }
}
