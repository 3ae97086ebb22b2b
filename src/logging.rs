use env_logger::{Env, Target};
use std::{fs::OpenOptions, io::Write, path::Path};

use crate::error::Error;

pub const LOG_PATH_VAR: &str = "HOMEWORK_BOT_LOG";
pub const DEFAULT_LOG_FILE: &str = "main.log";

/// Initializes logging into the file named by `HOMEWORK_BOT_LOG`, or
/// `main.log` in the working directory.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a logger is already installed.
pub fn init() -> Result<(), Error> {
    let path = dotenvy::var(LOG_PATH_VAR).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    init_with_file(path)
}

/// Appends `timestamp, LEVEL, message, target` lines to `path`. The filter
/// defaults to `debug` and can be overridden with `RUST_LOG`.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a logger is already installed.
pub fn init_with_file<P: AsRef<Path>>(path: P) -> Result<(), Error> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "{timestamp}, {}, {}, {}",
                record.level(),
                record.args(),
                record.target()
            )
        })
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::error;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_file_is_appended_in_line_format() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "previous run").expect("Failed to write to temp file");

        init_with_file(temp_file.path()).expect("Failed to init logging");
        error!("poller started");
        log::logger().flush();

        let content = fs::read_to_string(temp_file.path()).expect("Failed to read log");
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("previous run"));

        // Other tests running in parallel may log into the same file
        assert!(
            lines.any(|line| line.ends_with(", ERROR, poller started, homework_bot::logging::tests")),
            "log line missing from: {content}"
        );

        // Only one logger may be installed per process
        assert!(matches!(
            init_with_file(temp_file.path()),
            Err(Error::Logger(_))
        ));
    }
}
