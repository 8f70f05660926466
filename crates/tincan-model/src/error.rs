#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("version not supported: {0}")]
    UnsupportedVersion(String),

    #[error("{entity} cannot be represented in version {version}")]
    NotRepresentable { entity: &'static str, version: String },

    #[error("unknown objectType: {0}")]
    UnknownObjectType(String),

    #[error("invalid {entity}: {reason}")]
    InvalidShape { entity: &'static str, reason: String },

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn invalid(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            entity,
            reason: reason.into(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
