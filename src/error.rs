use thiserror::Error;

/// Failures of the remote training API.
///
/// Status-derived variants keep the server-supplied message (if the error
/// body carried one) so it can be shown to the user verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {}", .0.as_deref().unwrap_or("no details"))]
    NotFound(Option<String>),

    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("no details"))]
    Unauthorized(Option<String>),

    #[error("Validation failed: {}", .0.as_deref().unwrap_or("no details"))]
    Validation(Option<String>),

    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound(m)
            | ApiError::Unauthorized(m)
            | ApiError::Validation(m)
            | ApiError::Server { message: m, .. } => m.as_deref(),
            ApiError::Network(_) | ApiError::Decode(_) | ApiError::InvalidUrl(_) => None,
        }
    }

    /// Build the error for a non-success HTTP status.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            404 => ApiError::NotFound(message),
            401 | 403 => ApiError::Unauthorized(message),
            400 | 422 => ApiError::Validation(message),
            _ => ApiError::Server { status, message },
        }
    }
}

/// Local failures of the active-session core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Add at least one exercise")]
    EmptyExerciseList,

    #[error("Exercise {0} is not part of this session")]
    UnknownExercise(i64),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),
}

#[derive(Debug, Error)]
pub enum TrainlogError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Not signed in: {0}")]
    Auth(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<TrainlogError> for String {
    fn from(err: TrainlogError) -> Self {
        err.to_string()
    }
}
