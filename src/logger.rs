use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use time::macros::format_description;
use time::OffsetDateTime;

pub enum LogOutput {
    Stdout,
    Stderr,
}

pub struct Logger {
    pub write_to_std: Option<LogOutput>,
    pub severity: Level,
    pub file: Option<Arc<Mutex<File>>>,
    pub enable_colors: bool,
}

impl Logger {
    /// Create a new logger; `file_path` enables appending to that file.
    pub fn new(
        file_path: Option<PathBuf>,
        severity: Option<Level>,
        write_to_std: Option<LogOutput>,
        enable_colors: bool,
    ) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| eprintln!("Cannot open log file {:?}: {}", path, e))
                .ok()
                .map(|f| Arc::new(Mutex::new(f)))
        });

        Logger {
            write_to_std,
            severity: severity.unwrap_or(Level::Info),
            file,
            enable_colors,
        }
    }

    /// Current UTC time as `YYYY-MM-DD HH:MM:SS`
    fn get_timestamp() -> String {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        OffsetDateTime::now_utc()
            .format(&format)
            .unwrap_or_default()
    }

    /// Get color code for log level
    fn get_color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m", // Red
            Level::Warn => "\x1b[33m",  // Yellow
            Level::Info => "\x1b[36m",  // Cyan
            Level::Debug => "\x1b[35m", // Magenta
            Level::Trace => "\x1b[37m", // White
        }
    }

    /// Initialize logger with environment variables
    ///
    /// `TINYWIKI_LOG` (or `RUST_LOG`) sets the level, `TINYWIKI_LOG_FILE` names
    /// a file to append to, and `NO_COLOR` disables ANSI colours.
    pub fn init() -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("TINYWIKI_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string())
            .parse::<Level>()
            .unwrap_or(Level::Info);

        let file_path = std::env::var("TINYWIKI_LOG_FILE").ok().map(PathBuf::from);
        let enable_colors = std::env::var("NO_COLOR").is_err();

        let logger = Logger::new(file_path, Some(severity), Some(LogOutput::Stderr), enable_colors);
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))?;
        Ok(())
    }

    fn format_line(&self, record: &Record, colored: bool) -> String {
        let timestamp = Self::get_timestamp();
        let level_str = record.level().as_str();
        if colored {
            let color = Self::get_color(record.level());
            format!("{color}[{timestamp}] {level_str}\x1b[0m {}: {}", record.target(), record.args())
        } else {
            format!("[{timestamp}] {level_str} {}: {}", record.target(), record.args())
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Some(write_to_std) = &self.write_to_std {
            let line = self.format_line(record, self.enable_colors);
            let _ = match write_to_std {
                LogOutput::Stdout => writeln!(std::io::stdout(), "{line}"),
                LogOutput::Stderr => writeln!(std::io::stderr(), "{line}"),
            };
        }

        // Files never get colour codes
        if let Some(file) = &self.file {
            if let Ok(mut file_guard) = file.lock() {
                let _ = writeln!(file_guard, "{}", self.format_line(record, false));
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file_guard) = file.lock() {
                let _ = file_guard.flush();
            }
        }
    }
}
