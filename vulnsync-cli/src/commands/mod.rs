//! Command handlers -- one module per subcommand

use std::fmt;
use std::path::{Path, PathBuf};

use vulnsync_core::config::VulnsyncConfig;
use vulnsync_core::error::VulnsyncError;

pub mod config;
pub mod scan;
pub mod status;
pub mod sync;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "vulnsync.toml";

/// Where the effective configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A TOML file, then environment overrides.
    File(PathBuf),
    /// Defaults, then environment overrides.
    Environment,
}

impl ConfigSource {
    /// An explicit path always wins; a missing explicit file is an error at load time.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(path) => Self::File(path.to_path_buf()),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::File(PathBuf::from(DEFAULT_CONFIG_FILE))
            }
            None => Self::Environment,
        }
    }

    /// Build and validate the configuration.
    pub async fn load(&self) -> Result<VulnsyncConfig, VulnsyncError> {
        match self {
            Self::File(path) => VulnsyncConfig::load(path).await,
            Self::Environment => VulnsyncConfig::from_env(),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Environment => f.write_str("<defaults + environment>"),
        }
    }
}
