use thiserror::Error;

/// Errors raised by path normalization, the asset lifecycle and the database backends.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("required argument is missing: {0}")]
    ArgumentNull(&'static str),

    #[error("invalid argument `{name}`: {reason}")]
    ArgumentInvalid { name: &'static str, reason: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("{0} does not exist")]
    NotFound(String),

    #[error("{0} exists but is not imported")]
    NotImported(String),

    #[error("object is not an asset: {0}")]
    NotAnAsset(String),

    #[error("object is already an asset at {0}")]
    AlreadyAnAsset(String),

    #[error("type mismatch at {path}: requested {requested}, stored {stored}")]
    TypeMismatch {
        path: String,
        requested: &'static str,
        stored: &'static str,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl AssetError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        AssetError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        AssetError::ArgumentInvalid {
            name,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Backend(err.into())
    }
}
