use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, BrowserError>;

/// Browser error types.
///
/// The first four variants come out of the listing service and are stored in
/// node or pane state to be rendered inline, which is why the type is `Clone`.
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    /// The service could not be reached (connect failure, timeout, broken body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered but reported a failure.
    #[error("Service error: {message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// The service answered with a payload of unexpected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Input rejected on the client before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// I/O errors from the terminal or log file.
    #[error("I/O error: {0}")]
    Io(String),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

impl BrowserError {
    /// Service failure without an HTTP status (e.g. `success: false` in a 200 body).
    pub fn service(message: impl Into<String>) -> Self {
        BrowserError::Service {
            status: None,
            message: message.into(),
        }
    }

    /// Whether the service rejected the request because the name is taken.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BrowserError::Service { status: Some(409), .. })
    }

    /// Short message suitable for an inline error line.
    pub fn inline_message(&self) -> String {
        match self {
            BrowserError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for BrowserError {
    fn from(err: std::io::Error) -> Self {
        BrowserError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BrowserError {
    fn from(err: serde_json::Error) -> Self {
        BrowserError::MalformedResponse(err.to_string())
    }
}
