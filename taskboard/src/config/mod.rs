//! Configuration for the `taskboard` CLI.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

use crate::board::DEFAULT_TIMESTAMP_FORMAT;

/// Default base URL of the table server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8787";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    ui: UiFileConfig,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    timestamp_format: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the table server.
    pub server_url: String,
    /// Deadline for each table call.
    pub request_timeout: Duration,
    /// Timestamp display format on task cards (chrono).
    pub timestamp_format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read,
    /// or if any config file that exists cannot be parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            server_url: cli
                .server_url
                .clone()
                .or_else(|| file.server.url.clone())
                .unwrap_or(defaults.server_url),
            request_timeout: cli
                .request_timeout_secs
                .or(file.server.request_timeout_secs)
                .map_or(defaults.request_timeout, Duration::from_secs),
            timestamp_format: cli
                .timestamp_format
                .clone()
                .or_else(|| file.ui.timestamp_format.clone())
                .unwrap_or(defaults.timestamp_format),
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Personal task tracker")]
pub struct CliArgs {
    /// Action to run (default: list).
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the table server.
    #[arg(long, env = "TASKBOARD_URL")]
    pub server_url: Option<String>,

    /// Seconds before a table call is abandoned.
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Run against an empty in-process table that is discarded when the
    /// command exits. Nothing persists between invocations, so only `add`
    /// and `list` are meaningful.
    #[arg(long)]
    pub memory: bool,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Timestamp display format (chrono format string).
    #[arg(long)]
    pub timestamp_format: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the task board.
    List,

    /// Create a task.
    Add {
        /// Task title.
        #[arg(short, long)]
        title: String,

        /// Task description.
        #[arg(short, long)]
        description: Option<String>,

        /// Deadline as an RFC 3339 timestamp.
        #[arg(long)]
        deadline: Option<String>,
    },

    /// Edit a task. Omitted fields keep their current value.
    Edit {
        /// Task ID.
        id: String,

        /// New title.
        #[arg(short, long)]
        title: Option<String>,

        /// New description.
        #[arg(short, long)]
        description: Option<String>,

        /// New deadline as an RFC 3339 timestamp.
        #[arg(long, value_parser = parse_datetime)]
        datetime: Option<DateTime<FixedOffset>>,
    },

    /// Mark a task completed.
    Complete {
        /// Task ID.
        id: String,
    },

    /// Delete a task. Pending tasks ask for confirmation.
    Delete {
        /// Task ID.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Parses an RFC 3339 timestamp, keeping its offset.
///
/// # Errors
///
/// Returns a message suitable for clap when the text does not parse.
pub fn parse_datetime(text: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(text).map_err(|e| format!("invalid RFC 3339 timestamp: {e}"))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:8787");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.timestamp_format, "%B %-d, %Y at %-I:%M %p");
    }

    #[test]
    fn toml_parsing_full() {
        let toml_str = r#"
[server]
url = "https://tasks.example.com"
request_timeout_secs = 5

[ui]
timestamp_format = "%Y-%m-%d %H:%M"
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let config = ClientConfig::resolve(&CliArgs::default(), &file);

        assert_eq!(config.server_url, "https://tasks.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.timestamp_format, "%Y-%m-%d %H:%M");
    }

    #[test]
    fn toml_parsing_empty() {
        let file: ConfigFile = toml::from_str("").unwrap();
        let config = ClientConfig::resolve(&CliArgs::default(), &file);
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn cli_overrides_file() {
        let toml_str = r#"
[server]
url = "http://file:8787"
request_timeout_secs = 9
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let cli = CliArgs {
            server_url: Some("http://cli:8787".to_string()),
            ..Default::default()
        };
        let config = ClientConfig::resolve(&cli, &file);

        assert_eq!(config.server_url, "http://cli:8787");
        assert_eq!(config.request_timeout, Duration::from_secs(9));
    }

    #[test]
    fn unknown_toml_type_is_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("[server]\nrequest_timeout_secs = \"soon\"");
        assert!(result.is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = load_config_file(None);
        assert!(result.is_ok());
    }

    #[test]
    fn explicit_missing_config_file_returns_error() {
        let result = load_config_file(Some(Path::new("/nonexistent/taskboard.toml")));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = CliArgs::try_parse_from(["taskboard", "--memory"]).unwrap();
        assert!(cli.memory);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn memory_help_says_table_is_discarded() {
        use clap::CommandFactory;

        let command = CliArgs::command();
        let memory = command
            .get_arguments()
            .find(|arg| arg.get_id() == "memory")
            .unwrap();
        let help = memory.get_help().unwrap().to_string();
        assert!(help.contains("discarded when the command exits"), "{help}");
    }

    #[test]
    fn edit_parses_datetime() {
        let cli = CliArgs::try_parse_from([
            "taskboard",
            "edit",
            "0190f5a4-7c1e-7000-8000-000000000000",
            "--datetime",
            "2026-05-01T08:00:00-04:00",
        ])
        .unwrap();
        let Some(Command::Edit { datetime, title, .. }) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(title, None);
        assert_eq!(datetime.unwrap().offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn bad_datetime_is_rejected() {
        let result = CliArgs::try_parse_from(["taskboard", "edit", "x", "--datetime", "tomorrow"]);
        assert!(result.is_err());
    }

    #[test]
    fn delete_yes_flag() {
        let cli = CliArgs::try_parse_from(["taskboard", "delete", "abc", "--yes"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Delete {
                id: "abc".into(),
                yes: true
            })
        );
    }
}
