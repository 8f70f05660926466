use tincan_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum LrsError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),
    #[error("unrecognized query parameter `{parameter}` for version {version}")]
    UnsupportedQueryParameter { parameter: String, version: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cannot render for the store version: {0}")]
    Serialization(#[from] ModelError),
    #[error("http request failed with status {status} {reason}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unparseable response: {0}")]
    Parse(String),
}

impl LrsError {
    /// Raised while building a store or a request; retrying cannot help.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidEndpoint(_)
                | Self::UnsupportedVersion(_)
                | Self::UnsupportedQueryParameter { .. }
                | Self::InvalidInput(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type LrsResult<T> = Result<T, LrsError>;
