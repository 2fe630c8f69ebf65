//! Startup settings for the table server.
//!
//! A settings file describes the table itself: how reads without an
//! `order` parameter are sorted and which rows exist when the server starts.
//! Listener settings may also live there, but flags and
//! `TASKBOARD_SERVER_*` variables win over the file.
//!
//! ```toml
//! bind = "127.0.0.1:8787"
//! default_order = "created_at.asc"
//!
//! [[seed]]
//! title = "Water the plants"
//! deadline = "2026-11-01T09:00:00Z"
//!
//! [[seed]]
//! title = "File taxes"
//! status = "completed"
//! ```

use std::path::{Path, PathBuf};

use taskboard_proto::table::{LIST_ORDER, Order, OrderParseError, parse_order};
use taskboard_proto::task::NewTask;

const DEFAULT_BIND: &str = "0.0.0.0:8787";
const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Errors raised while assembling the server settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for this server.
    #[error("cannot parse {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// The default order names an unknown column or direction.
    #[error("invalid default_order: {0}")]
    Order(#[from] OrderParseError),

    /// A seed row would violate the title check constraint.
    #[error("seed row {index} has an empty title")]
    UntitledSeed {
        /// Zero-based position in the `[[seed]]` list.
        index: usize,
    },
}

/// Contents of the settings file. Every key is optional.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SettingsFile {
    bind: Option<String>,
    max_body_size: Option<usize>,
    default_order: Option<String>,
    seed: Vec<NewTask>,
}

/// CLI arguments for the table server.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Taskboard task table server")]
pub struct ServerCliArgs {
    /// Address to bind the server to.
    #[arg(short, long, env = "TASKBOARD_SERVER_ADDR")]
    pub bind: Option<String>,

    /// Settings file (default: `~/.config/taskboard-server/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum accepted request body size in bytes.
    #[arg(long)]
    pub max_body_size: Option<usize>,

    /// Sort applied to reads without an `order` parameter,
    /// e.g. `status.desc,created_at.desc`.
    #[arg(long, env = "TASKBOARD_SERVER_ORDER")]
    pub default_order: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_SERVER_LOG")]
    pub log_level: String,
}

/// Settings the server starts with.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: String,
    /// Maximum accepted request body size in bytes.
    pub max_body_size: usize,
    /// Sort for reads that name none.
    pub default_order: Vec<Order>,
    /// Rows inserted before the first request.
    pub seed: Vec<NewTask>,
    /// Log level filter string.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            default_order: LIST_ORDER.to_vec(),
            seed: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads the settings file and applies CLI overrides.
    ///
    /// An explicit `--config` must exist. The default path is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, the
    /// default order is invalid, or a seed row has an empty title.
    pub fn load(cli: &ServerCliArgs) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => read_settings(path)?,
            None => match default_settings_path().filter(|p| p.exists()) {
                Some(path) => read_settings(&path)?,
                None => SettingsFile::default(),
            },
        };
        Self::from_layers(cli, file)
    }

    fn from_layers(cli: &ServerCliArgs, file: SettingsFile) -> Result<Self, ConfigError> {
        let default_order = match cli.default_order.as_deref().or(file.default_order.as_deref()) {
            Some(text) => parse_order(text)?,
            None => LIST_ORDER.to_vec(),
        };
        if let Some(index) = file.seed.iter().position(|row| row.title.is_empty()) {
            return Err(ConfigError::UntitledSeed { index });
        }

        Ok(Self {
            bind_addr: cli
                .bind
                .clone()
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            max_body_size: cli
                .max_body_size
                .or(file.max_body_size)
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),
            default_order,
            seed: file.seed,
            log_level: cli.log_level.clone(),
        })
    }
}

fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskboard-server").join("config.toml"))
}

fn read_settings(path: &Path) -> Result<SettingsFile, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
