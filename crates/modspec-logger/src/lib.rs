//! Leveled logging for modspec
//!
//! Library code calls the free functions ([`info`], [`debug`], [`warn`],
//! [`error`], [`success`]). They forward to the installed [`LogSink`], or to
//! [`ConsoleSink`] when the host has not installed one. Formatting is owned
//! by the sink.

use colored::Colorize;
use indicatif::ProgressBar;
use parking_lot::{const_mutex, const_rwlock, Mutex, RwLock};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where leveled messages go
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// User facing confirmation, treated as info unless the sink says otherwise
    fn success(&self, message: &str) {
        self.info(message);
    }
}

static SINK: RwLock<Option<Arc<dyn LogSink>>> = const_rwlock(None);
static LOG_FILE: Mutex<Option<PathBuf>> = const_mutex(None);
static VERBOSITY: Mutex<u8> = const_mutex(0);
static SPINNER: Mutex<Option<ProgressBar>> = const_mutex(None);

/// Install `sink` as the destination of every log call, replacing the previous one.
pub fn set_sink(sink: Arc<dyn LogSink>) {
    *SINK.write() = Some(sink);
}

/// Go back to the console sink.
pub fn reset_sink() {
    *SINK.write() = None;
}

fn with_sink(log: impl FnOnce(&dyn LogSink)) {
    let sink = SINK.read().clone();
    match sink {
        Some(sink) => log(sink.as_ref()),
        None => log(&ConsoleSink),
    }
}

/// Get the current verbosity level
pub fn get_verbosity() -> u8 {
    *VERBOSITY.lock()
}

/// 0 = warnings and errors, 1 = debug (-v), 2 = trace (-vv)
pub fn set_verbosity(verbosity: u8) {
    *VERBOSITY.lock() = verbosity;
}

/// Initialize the console sink: verbosity plus an optional log file.
///
/// The log file is truncated on each run.
pub fn init_with_verbosity(verbosity: u8, log_file: Option<&Path>) -> Result<(), String> {
    set_verbosity(verbosity);

    let Some(log_file) = log_file else {
        *LOG_FILE.lock() = None;
        return Ok(());
    };

    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;
    }
    if log_file.exists() {
        let _ = fs::remove_file(log_file);
    }
    *LOG_FILE.lock() = Some(log_file.to_path_buf());
    Ok(())
}

/// Get the log file path for display
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().clone()
}

fn write_to_log(message: &str) {
    let guard = LOG_FILE.lock();
    if let Some(ref log_path) = *guard {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(file, "[{}] {}", timestamp, message);
        }
    }
}

/// Colored stderr output, mirrored to the log file when one is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn info(&self, message: &str) {
        write_to_log(&format!("INFO {}", message));
        if get_verbosity() >= 1 {
            eprintln!("{}", message);
        }
    }

    fn debug(&self, message: &str) {
        write_to_log(&format!("DEBUG {}", message));
        if get_verbosity() >= 1 {
            eprintln!("{} {}", "DEBUG:".blue().bold(), message);
        }
    }

    fn warn(&self, message: &str) {
        write_to_log(&format!("WARN {}", message));
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }

    fn error(&self, message: &str) {
        write_to_log(&format!("ERROR {}", message));
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    fn success(&self, message: &str) {
        write_to_log(&format!("SUCCESS {}", message));
        eprintln!("{} {}", "\u{2714}".green().bold(), message);
    }
}

/// Log an informational message
pub fn info(message: &str) {
    with_sink(|sink| sink.info(message));
}

/// Log a debug message
pub fn debug(message: &str) {
    with_sink(|sink| sink.debug(message));
}

/// Log a warning message
pub fn warn(message: &str) {
    with_sink(|sink| sink.warn(message));
}

/// Log an error message
pub fn error(message: &str) {
    with_sink(|sink| sink.error(message));
}

/// Log a success message
pub fn success(message: &str) {
    with_sink(|sink| sink.success(message));
}

/// Start a spinner with the given message (only if not verbose)
pub fn spinner_start(message: &str) {
    if get_verbosity() > 0 {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());

    *SPINNER.lock() = Some(spinner);
}

/// Stop the spinner without any message
pub fn spinner_stop() {
    if let Some(spinner) = SPINNER.lock().take() {
        spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recording {
        lines: Mutex<Vec<String>>,
    }

    impl LogSink for Recording {
        fn info(&self, message: &str) {
            self.lines.lock().push(format!("info {message}"));
        }
        fn debug(&self, message: &str) {
            self.lines.lock().push(format!("debug {message}"));
        }
        fn warn(&self, message: &str) {
            self.lines.lock().push(format!("warn {message}"));
        }
        fn error(&self, message: &str) {
            self.lines.lock().push(format!("error {message}"));
        }
    }

    #[test]
    fn test_installed_sink_receives_messages() {
        let sink = Arc::new(Recording::default());
        set_sink(sink.clone());

        debug("logger-test-debug");
        success("logger-test-success");
        reset_sink();
        debug("logger-test-after-reset");

        let lines = sink.lines.lock();
        assert!(lines.contains(&"debug logger-test-debug".to_string()));
        assert!(lines.contains(&"info logger-test-success".to_string()));
        assert!(!lines.iter().any(|line| line.contains("after-reset")));
    }

    #[test]
    fn test_console_sink_writes_log_file() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("logs").join("modspec.log");
        assert!(init_with_verbosity(0, Some(&path)).is_ok());
        assert_eq!(get_log_path().as_deref(), Some(path.as_path()));

        ConsoleSink.warn("written to file");
        let content = fs::read_to_string(&path).unwrap_or_default();
        assert!(content.contains("WARN written to file"));
    }
}
