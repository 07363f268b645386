//! Logging Infrastructure
//!
//! Console logging for interactive use, daily rolling files when a log
//! directory is configured.

use std::path::Path;

const LOG_FILE_PREFIX: &str = "zone-editor";

/// Initialize the logger with optional JSON formatting and file output
///
/// A `log_dir` that does not exist falls back to stderr.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level
        .unwrap_or("info")
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, LOG_FILE_PREFIX);
            let subscriber = subscriber.with_ansi(false).with_writer(file_appender);
            if json {
                subscriber.json().init();
            } else {
                subscriber.init();
            }
            return;
        }
    }

    let subscriber = subscriber.with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
