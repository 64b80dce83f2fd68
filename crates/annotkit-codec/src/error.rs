use annotkit_model::ModelError;
use thiserror::Error;

/// Rejected persisted document. Decoding fails fast and never yields a partial item.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("missing required field \"{path}\"")]
    MissingField { path: String },

    #[error("invalid field \"{path}\": {reason}")]
    InvalidField { path: String, reason: String },

    #[error("unsupported geometry type \"{kind}\" (subtype {subtype:?})")]
    UnsupportedGeometry {
        kind: String,
        subtype: Option<String>,
    },

    #[error("transform at \"{path}\" is not invertible")]
    NonInvertibleTransform { path: String },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormatError {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        FormatError::MissingField { path: path.into() }
    }

    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FormatError::InvalidField {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failure while loading a document into a scene.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
