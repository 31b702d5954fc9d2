use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Transport error: {0}")]
    #[diagnostic(code(voicecal::transport))]
    Transport(String),

    #[error("Decode error: {0}")]
    #[diagnostic(code(voicecal::decode))]
    Decode(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(voicecal::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(voicecal::config))]
    Config(String),

    #[error("Prompt error: {0}")]
    #[diagnostic(code(voicecal::prompt))]
    Prompt(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(voicecal::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(voicecal::io))]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    #[diagnostic(code(voicecal::other))]
    Other(String),
}

impl Error {
    /// Whether the error came from talking to the scheduling backend
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Decode(_))
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<inquire::InquireError> for Error {
    fn from(err: inquire::InquireError) -> Self {
        Error::Prompt(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create transport errors
pub fn transport_error(message: &str) -> Error {
    Error::Transport(message.to_string())
}

/// Helper to create decode errors
pub fn decode_error(message: &str) -> Error {
    Error::Decode(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_are_classified() {
        assert!(transport_error("connection refused").is_remote());
        assert!(decode_error("expected object").is_remote());
        assert!(!config_error("bad url").is_remote());
        assert!(!env_error("VOICECAL_BACKEND_URL").is_remote());
    }

    #[test]
    fn env_error_names_the_variable() {
        let err = env_error("VOICECAL_BACKEND_URL");
        assert_eq!(
            err.to_string(),
            "Environment error: Missing environment variable: VOICECAL_BACKEND_URL"
        );
    }
}
