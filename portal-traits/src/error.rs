use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Failed to fetch {resource}: {message}")]
    Fetch { resource: String, message: String },

    #[error("Failed to parse portal page: {0}")]
    Parse(String),

    #[error("Transfer of {file} failed: {message}")]
    Transfer { file: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortalError {
    /// True for credential rejection, the only failure worth re-prompting for.
    pub fn is_auth(&self) -> bool {
        matches!(self, PortalError::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
