use serde::Deserialize;

/// Error reported by the hosted backend
#[derive(Debug, Clone, PartialEq, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    /// Parses a PostgREST error body, falling back to the HTTP status
    pub fn from_response(status: u16, body: &str) -> Self {
        serde_json::from_str::<BackendError>(body)
            .unwrap_or_else(|_| Self::new(format!("Request failed with status {}", status)))
    }
}

/// Cloud adapter error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CloudError {
    #[error("Supabase client not initialized")]
    NotInitialized,

    #[error("User not logged in")]
    NotLoggedIn,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Project not found")]
    NotFound,

    #[error("Could not read project data: {0}")]
    Decode(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type CloudResult<T> = Result<T, CloudError>;
