use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;

/// Environment variable overriding the log directory.
pub const LOG_DIR_ENV: &str = "PASST_BINDING_LOG_DIR";

const DEFAULT_LOG_DIR: &str = "/var/log";

/// Installs the global subscriber writing to `file_name`.
///
/// Stdout belongs to the CNI and hook protocols, so nothing is ever
/// logged there. Keep the returned guard alive until exit, pending
/// records are lost otherwise.
pub fn setup(file_name: &str) -> WorkerGuard {
    let directory = log_dir(std::env::var(LOG_DIR_ENV).ok());
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    guard
}

fn log_dir(configured: Option<String>) -> PathBuf {
    configured
        .filter(|directory| !directory.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_DIR.into())
        .into()
}
