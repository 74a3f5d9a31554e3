//! `eisenhower`: Eisenhower-matrix task manager CLI.
//!
//! Tasks are kept in a JSON document under the data directory. Configuration
//! via CLI flags, environment variables, or config file
//! (`~/.config/eisenhower/config.toml`).
//!
//! ```bash
//! eisenhower add "Write report" --priority 4
//! eisenhower list --filter active --sort created
//! eisenhower toggle 0192
//! EISENHOWER_DATA_DIR=/tmp/tasks eisenhower export -o tasks.json
//! ```

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use eisenhower::commands;
use eisenhower::config::{AppConfig, CliArgs};
use eisenhower::session::Session;
use eisenhower::storage::{FileStore, TaskStorage};

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::debug!(
        data_dir = %config.data_dir.display(),
        key = %config.storage_key,
        "eisenhower starting"
    );

    let store = FileStore::new(&config.data_dir);
    let storage = TaskStorage::with_key(store, config.storage_key.clone());
    let mut session = Session::new(storage).with_view(config.filter, config.sort_by);
    session.hydrate();

    let command = cli.command.unwrap_or_default();
    let mut stdout = io::stdout().lock();
    match commands::run(&mut session, command, &config, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging.
///
/// Logs go to stderr unless `file_path` is given, so command output on stdout
/// stays clean. Returns a [`WorkerGuard`] when logging to a file; it must be
/// held until exit so buffered entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let file_target = file_path.and_then(|path| {
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Some((dir, path.file_name()?.to_str()?))
    });

    let Some((log_dir, file_name)) = file_target else {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
