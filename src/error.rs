use figma_tokens_core::ValidationError;
use itertools::Itertools;
use thiserror::Error;

/// Errors from the Figma variables endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any non-2xx answer, usually a bad token or a token without the variables scope.
    #[error("Figma API {status}: {body}")]
    Status { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variables: {}", .names.iter().join(", "))]
    Missing { names: Vec<&'static str> },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot load token document {path}: {message}")]
    Tokens { path: String, message: String },

    #[error("invalid tokens: {0}")]
    Validation(#[from] ValidationError),

    #[error("reading existing variables failed: {0}")]
    ScopeCheck(#[source] ApiError),

    #[error("pushing to Figma failed: {0}")]
    Publish(#[source] ApiError),

    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Every failure ends the run.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Remediation lines printed under the error.
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            ImportError::Config(_) => &[
                "Usage:",
                "  FIGMA_TOKEN=figd_xxx FIGMA_FILE_KEY=xxx figma-tokens",
                "Get your token: Figma → Settings → Account → Personal access tokens",
                "Get file key from URL: figma.com/design/{FILE_KEY}/...",
            ],
            ImportError::ScopeCheck(_) => &["Make sure your token has Variables read/write scope."],
            ImportError::Publish(_) => &[
                "Common fixes:",
                "  - Ensure your token has \"File content\" write scope",
                "  - Ensure you have Editor access to the file",
                "  - If variables already exist, delete them first or change the token document",
            ],
            ImportError::Tokens { .. } | ImportError::Validation(_) => {
                &["Fix the token document and run again; nothing was sent to Figma."]
            }
            ImportError::Io(_) => &[],
        }
    }
}
