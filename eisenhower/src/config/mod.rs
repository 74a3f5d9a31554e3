//! Configuration system for the `eisenhower` CLI.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/eisenhower/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};

use eisenhower_core::codec::STORAGE_KEY;
use eisenhower_core::query::{Filter, SortBy};
use eisenhower_core::task::Priority;

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
    storage: StorageFileConfig,
    view: ViewFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
    key: Option<String>,
}

/// `[view]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ViewFileConfig {
    filter: Option<Filter>,
    sort_by: Option<SortBy>,
    default_priority: Option<Priority>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the task document.
    pub data_dir: PathBuf,
    /// Storage key of the task document.
    pub storage_key: String,
    /// Filter applied when `list` is run without `--filter`.
    pub filter: Filter,
    /// Ordering applied when `list` is run without `--sort`.
    pub sort_by: SortBy,
    /// Priority given to `add` when `--priority` is omitted.
    pub default_priority: Priority,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: STORAGE_KEY.to_string(),
            filter: Filter::default(),
            sort_by: SortBy::default(),
            default_priority: Priority::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// Otherwise the default path (`~/.config/eisenhower/config.toml`) is
    /// tried and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve an `AppConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone())
                .unwrap_or(defaults.data_dir),
            storage_key: file
                .storage
                .key
                .clone()
                .unwrap_or(defaults.storage_key),
            filter: file.view.filter.unwrap_or(defaults.filter),
            sort_by: file.view.sort_by.unwrap_or(defaults.sort_by),
            default_priority: file
                .view
                .default_priority
                .unwrap_or(defaults.default_priority),
        }
    }
}

/// Default data directory: `$XDG_DATA_HOME/eisenhower` or the platform
/// equivalent, falling back to the temp dir.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("eisenhower")
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Eisenhower-matrix personal task manager")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/eisenhower/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the task document.
    #[arg(long, env = "EISENHOWER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", env = "EISENHOWER_LOG", global = true)]
    pub log_level: String,

    /// Path to log file (default: stderr).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Command to run (default: `list`).
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, one per task action.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new task.
    Add {
        /// Task title.
        title: String,
        /// Priority level, 1 (backlog) to 4 (do first).
        #[arg(short, long, allow_negative_numbers = true)]
        priority: Option<i64>,
    },
    /// List tasks.
    List {
        /// Which tasks to show: all, active, completed.
        #[arg(short, long)]
        filter: Option<Filter>,
        /// Ordering: priority, created, updated.
        #[arg(short, long)]
        sort: Option<SortBy>,
    },
    /// Flip a task between active and completed.
    Toggle {
        /// Task id or unique id prefix.
        id: String,
    },
    /// Change one or more fields of a task.
    Edit {
        /// Task id or unique id prefix.
        id: String,
        /// New title.
        #[arg(long)]
        title: Option<String>,
        /// New priority level.
        #[arg(long, allow_negative_numbers = true)]
        priority: Option<i64>,
        /// New completion state (true or false).
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Set a task's priority level.
    Priority {
        /// Task id or unique id prefix.
        id: String,
        /// Priority level, 1 (backlog) to 4 (do first).
        #[arg(allow_negative_numbers = true)]
        level: i64,
    },
    /// Move a task one priority level up or down.
    Bump {
        /// Task id or unique id prefix.
        id: String,
        /// Direction to move.
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Delete a task.
    Delete {
        /// Task id or unique id prefix.
        id: String,
    },
    /// Delete every completed task.
    ClearCompleted,
    /// Write all tasks as pretty-printed JSON.
    Export {
        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all tasks with the contents of a JSON export.
    Import {
        /// Input file, or `-` for stdin.
        input: PathBuf,
    },
    /// Delete the stored task document.
    Reset,
}

impl Default for Command {
    fn default() -> Self {
        Self::List {
            filter: None,
            sort: None,
        }
    }
}

/// Direction for [`Command::Bump`].
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Raise priority.
    Up,
    /// Lower priority.
    Down,
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
        config_dir.join("eisenhower").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
