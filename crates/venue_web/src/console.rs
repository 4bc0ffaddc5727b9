//! Browser console logging backend.
//!
//! # Invariants
//! - Installed at most once per page; the first level wins and later
//!   requests for another level are rejected.
//! - Records are sanitized to one bounded line before reaching the console.

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use venue_core::logging::{level_filter, normalize_level, sanitize_message, LoggingError};
use wasm_bindgen::JsValue;

const MAX_RECORD_CHARS: usize = 512;

static CONSOLE_LOGGER: OnceCell<ConsoleLogger> = OnceCell::new();

struct ConsoleLogger {
    level: &'static str,
    filter: LevelFilter,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!(
            "[{}] {}: {}",
            record.level(),
            record.target(),
            sanitize_message(&record.args().to_string(), MAX_RECORD_CHARS)
        ));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Routes `log` records to the browser console at `level`.
pub fn init_console_logging(level: &str) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;
    let logger = CONSOLE_LOGGER.get_or_try_init(|| -> Result<ConsoleLogger, LoggingError> {
        let logger = ConsoleLogger {
            level,
            filter: level_filter(level),
        };
        Ok(logger)
    })?;
    if logger.level != level {
        return Err(LoggingError::Conflict {
            active: logger.level.to_string(),
            requested: level.to_string(),
        });
    }

    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.filter);
        log::info!(
            "event=host_start module=logging status=ok platform=browser version={} level={}",
            env!("CARGO_PKG_VERSION"),
            level
        );
    }
    Ok(())
}

pub fn console_logging_level() -> Option<&'static str> {
    CONSOLE_LOGGER.get().map(|logger| logger.level)
}
