//! `localStorage` backed dismissal store.

use venue_core::install::store::{format_timestamp, parse_timestamp, StoreError, StoreResult};
use venue_core::DismissalStore;
use wasm_bindgen::JsValue;
use web_sys::{Storage, Window};

pub struct LocalStorageDismissalStore {
    storage: Option<Storage>,
    key: String,
}

impl LocalStorageDismissalStore {
    /// Storage may be unavailable (private mode, disabled cookies); every
    /// access then reports a backend error.
    pub fn new(window: &Window, key: impl Into<String>) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
            key: key.into(),
        }
    }

    fn storage(&self) -> StoreResult<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Backend("localStorage unavailable".to_string()))
    }
}

fn backend(err: JsValue) -> StoreError {
    StoreError::Backend(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl DismissalStore for LocalStorageDismissalStore {
    fn load_dismissed_at(&self) -> StoreResult<Option<i64>> {
        self.storage()?
            .get_item(&self.key)
            .map_err(backend)?
            .as_deref()
            .map(parse_timestamp)
            .transpose()
    }

    fn save_dismissed_at(&mut self, epoch_ms: i64) -> StoreResult<()> {
        self.storage()?
            .set_item(&self.key, &format_timestamp(epoch_ms))
            .map_err(backend)
    }
}
