//! Leveled logging for table loading, normalisation and the record store.
//!
//! Messages are tagged with the component that produced them. Output goes
//! to the console and, when configured, is appended to a log file. Nothing
//! is written until `init_logger` has been called.
use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::error::InflammationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = InflammationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(InflammationError::Config(format!(
                "unknown log level `{}`",
                other
            ))),
        }
    }
}

/// The part of the crate a message comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Table,
    Statistics,
    Store,
    Config,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Table => write!(f, "TABLE"),
            Component::Statistics => write!(f, "STATS"),
            Component::Store => write!(f, "STORE"),
            Component::Config => write!(f, "CONFIG"),
        }
    }
}

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    min_level: LogLevel,
    log_file: Option<String>,
    console_timestamps: bool,
}

impl Logger {
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, component: Component, message: &str) -> String {
        format!(
            "{} {} {}: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            level,
            component,
            message
        )
    }

    fn log(&self, level: LogLevel, component: Component, message: &str) {
        if level < self.min_level {
            return;
        }

        let entry = Self::format_entry(level, component, message);

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("✗ {}: {}", component, message),
                LogLevel::Warning => eprintln!("⚠ {}: {}", component, message),
                LogLevel::Info => println!("{}", message),
                LogLevel::Debug => println!("[DEBUG] {}", message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Initialize the global logger, replacing any previous one.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, component: Component, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, message);
        }
    }
}

pub fn debug(component: Component, message: &str) {
    dispatch(LogLevel::Debug, component, message);
}

pub fn info(component: Component, message: &str) {
    dispatch(LogLevel::Info, component, message);
}

pub fn warn(component: Component, message: &str) {
    dispatch(LogLevel::Warning, component, message);
}

pub fn error(component: Component, message: &str) {
    dispatch(LogLevel::Error, component, message);
}
