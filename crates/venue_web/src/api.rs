//! JavaScript-facing API.
//!
//! # Responsibility
//! - Expose stable, host-level functions to page scripts.
//! - Keep error semantics simple: strings, never exceptions.
//!
//! # Invariants
//! - Exported functions must not panic across the wasm boundary.
//! - Return values are UTF-8 strings with stable meaning.

use crate::console::init_console_logging;
use venue_core::{core_version as core_version_inner, ping as ping_inner};
use wasm_bindgen::prelude::*;

/// Minimal health-check API for page smoke checks.
#[wasm_bindgen]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[wasm_bindgen]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Routes logs to the browser console at `level`.
///
/// Safe to call repeatedly with the same level. Returns an empty string on
/// success and an error message on failure.
#[wasm_bindgen]
pub fn init_logging(level: String) -> String {
    match init_console_logging(level.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn core_version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
