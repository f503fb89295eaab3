use thiserror::Error;

/// Problems found in a token document while building the variables payload.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("token {token:?} has malformed hex color {value:?} (expected #RRGGBB)")]
    MalformedHex { token: String, value: String },

    #[error("semantic alias {path:?} has a light value but no dark value")]
    MissingDarkAlias { path: String },

    #[error("semantic alias {path:?} has a dark value but no light value")]
    MissingLightAlias { path: String },

    #[error("semantic alias {path:?} points at {target:?}, which is not a primitive color")]
    DanglingAlias { path: String, target: String },

    #[error("identifier {id:?} is allocated twice (second time for {name:?})")]
    DuplicateIdentifier { id: String, name: String },

    #[error("cannot derive a valid identifier from {source_key:?}")]
    InvalidIdentifier { source_key: String },

    #[error("{token:?} must be a finite, non-negative number of pixels, got {value}")]
    InvalidDimension { token: String, value: f64 },
}
