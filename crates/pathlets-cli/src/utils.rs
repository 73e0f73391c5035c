//! Small helpers for the binary.

use std::path::{Path, PathBuf};

use ftlog::{
    appender::{FileAppender, Period},
    LevelFilter, LoggerGuard,
};

/// Configures the logger, writing to `logs_dir/pathlets.log` (and warnings
/// and above to a sibling `.err.log`).
///
/// # Errors
///
/// If a logs directory could not be created, or the logger could not be
/// initialized.
pub fn configure_logger<P: AsRef<Path>>(logs_dir: &P) -> Result<(LoggerGuard, PathBuf), String> {
    let logs_dir = logs_dir.as_ref();
    std::fs::create_dir_all(logs_dir).map_err(|e| format!("failed to create log directory '{}': {e}", logs_dir.display()))?;

    let log_path = logs_dir.join("pathlets.log");
    let writer = FileAppender::builder().path(&log_path).rotate(Period::Day).build();
    let err_path = log_path.with_extension("err.log");

    let guard = ftlog::Builder::new()
        .max_log_level(LevelFilter::Trace)
        .root(writer)
        .filter("ftlog::appender", "ftlog-appender", LevelFilter::Warn)
        .appender("ftlog-appender", FileAppender::new(err_path))
        .try_init()
        .map_err(|e| e.to_string())?;

    Ok((guard, log_path))
}

/// The substring of `path` after its last `/`, or an empty string if `path`
/// contains none.
#[must_use]
pub fn strip_directories(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::strip_directories;

    #[test]
    fn keeps_only_the_final_path_component() {
        assert_eq!(strip_directories("/data/sets/taxis.txt"), "taxis.txt");
    }

    #[test]
    fn returns_empty_when_there_is_no_slash() {
        assert_eq!(strip_directories("taxis.txt"), "");
    }
}
