use std::{fmt, path::PathBuf};

use clap::Parser;
use figma_tokens_core::TokenDocument;

use crate::error::{ConfigError, ImportError};

pub const DEFAULT_API_BASE: &str = "https://api.figma.com/v1";

/// Push the design tokens into a Figma file as variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "figma-tokens", version)]
pub struct Cli {
    /// Personal access token with the variables read/write scope.
    #[arg(long, env = "FIGMA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Key of the target file, from `figma.com/design/{FILE_KEY}/...`.
    #[arg(long, env = "FIGMA_FILE_KEY")]
    pub file_key: Option<String>,

    #[arg(long, env = "FIGMA_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Token document to use instead of the bundled CarbonS palette.
    #[arg(long, value_name = "PATH")]
    pub tokens: Option<PathBuf>,

    /// Print the request body instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything needed to talk to one file.
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
    pub file_key: String,
    pub api_base: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("file_key", &self.file_key)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Cli {
    /// Empty values count as missing.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let present = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_string);
        match (present(&self.token), present(&self.file_key)) {
            (Some(token), Some(file_key)) => Ok(Credentials {
                token,
                file_key,
                api_base: self.api_base.clone(),
            }),
            (token, file_key) => {
                let mut names = Vec::new();
                if token.is_none() {
                    names.push("FIGMA_TOKEN");
                }
                if file_key.is_none() {
                    names.push("FIGMA_FILE_KEY");
                }
                Err(ConfigError::Missing { names })
            }
        }
    }

    pub fn load_tokens(&self) -> Result<TokenDocument, ImportError> {
        match &self.tokens {
            None => TokenDocument::builtin().map_err(|e| ImportError::Tokens {
                path: "<builtin>".to_string(),
                message: e.to_string(),
            }),
            Some(path) => {
                let failed = |message: String| ImportError::Tokens {
                    path: path.display().to_string(),
                    message,
                };
                let data = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
                TokenDocument::from_json(&data).map_err(|e| failed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_cli(token: Option<&str>, file_key: Option<&str>) -> Cli {
    Cli {
        token: token.map(str::to_string),
        file_key: file_key.map(str::to_string),
        api_base: DEFAULT_API_BASE.to_string(),
        tokens: None,
        dry_run: false,
    }
}
