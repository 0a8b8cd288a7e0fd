//! Logging setup
//!
//! `tracing-subscriber` with an `EnvFilter`. `RUST_LOG` wins over the
//! configured level; JSON and a daily rolling file are opt-in.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "coffee_server=info,tower_http=info";

/// Initialize the logger with defaults
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger
///
/// - `log_level`: filter directive, e.g. `debug` or `coffee_server=debug,tower_http=warn`
/// - `json`: emit JSON lines
/// - `log_dir`: write to `<dir>/coffee-server.<date>` instead of stdout when the directory exists
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    let file_appender = log_dir.and_then(|dir| {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            Some(tracing_appender::rolling::daily(log_path, "coffee-server"))
        } else {
            None
        }
    });

    // try_init: tests may call this more than once
    let result = match (file_appender, json) {
        (Some(appender), true) => subscriber
            .json()
            .with_writer(appender)
            .with_ansi(false)
            .try_init(),
        (Some(appender), false) => subscriber.with_writer(appender).with_ansi(false).try_init(),
        (None, true) => subscriber.json().try_init(),
        (None, false) => subscriber.try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logger already initialized: {e}");
    }
}
