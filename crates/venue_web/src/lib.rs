//! Browser bridge for the venue site.
//!
//! # Responsibility
//! - Boot core site behavior on page load.
//! - Provide the `web-sys` DOM host, `localStorage` persistence and console
//!   logging used by the browser build.

mod api;
mod boot;
mod console;
mod dom;
mod storage;

pub use api::*;
pub use console::{console_logging_level, init_console_logging};
pub use dom::{WebDom, WebNode};
pub use storage::LocalStorageDismissalStore;

use log::warn;
use venue_core::{default_log_level, SiteConfig};
use wasm_bindgen::prelude::*;

/// Global the page may set to a JSON `SiteConfig` before the module loads.
const CONFIG_GLOBAL: &str = "VENUE_CONFIG";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if let Err(err) = init_console_logging(default_log_level()) {
        web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
    }
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))?;
    let config = page_config(&window);
    boot::boot_when_ready(window, config)
}

fn page_config(window: &web_sys::Window) -> SiteConfig {
    let raw = js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL))
        .ok()
        .and_then(|value| value.as_string());
    let Some(raw) = raw else {
        return SiteConfig::default();
    };
    match SiteConfig::from_json_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            warn!("event=config_load module=web status=error error={err}");
            SiteConfig::default()
        }
    }
}
