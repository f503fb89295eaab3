pub mod api;
pub mod config;
pub mod error;
pub mod import;

pub use api::{FigmaClient, VariablesApi};
pub use config::{Cli, Credentials};
pub use error::{ApiError, ConfigError, ImportError};
pub use import::{dry_run, import, run, ImportSummary};
