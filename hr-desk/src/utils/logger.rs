//! Logging Infrastructure
//!
//! tracing-subscriber fmt 输出到 stderr，可选按天滚动的日志文件。

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Log file prefix inside `LOG_DIR`
const LOG_FILE_PREFIX: &str = "hr-desk";

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level` when set. Calling this twice is a no-op,
/// so tests and the binary can both call it.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, LOG_FILE_PREFIX);
            let _ = builder
                .with_ansi(false)
                .with_writer(file_appender)
                .try_init();
            return;
        }
        eprintln!("Log directory {dir} is not writable, logging to stderr");
    }

    let _ = builder.with_writer(std::io::stderr).try_init();
}
