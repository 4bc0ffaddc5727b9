//! Core behavior for the venue site.
//! Every host (browser bridge, native CLI) drives the same components here.

pub mod config;
pub mod contact;
pub mod context;
#[cfg(not(target_arch = "wasm32"))]
pub mod db;
pub mod dom;
pub mod install;
pub mod lightbox;
pub mod logging;
pub mod menu;
pub mod model;
pub mod navbar;
#[cfg(not(target_arch = "wasm32"))]
pub mod repo;
pub mod reveal;
pub mod site;
pub mod specials;
pub mod tasks;

pub use config::{ConfigError, SiteConfig};
pub use dom::{Dom, DomError, DomResult, MemoryDom, NodeId};
pub use install::store::{DismissalStore, MemoryDismissalStore, StoreError, StoreResult};
pub use install::{InstallAction, InstallPromptController, InstallState, UserChoice};
pub use logging::{default_log_level, LoggingError};
#[cfg(not(target_arch = "wasm32"))]
pub use logging::{init_logging, logging_status};
pub use model::platform::{Platform, PlatformProbe};
pub use model::special::SpecialOffer;
pub use navbar::HeaderVisibility;
pub use reveal::{IntersectionSample, RevealEngine, RevealKind, RevealProfile};
#[cfg(not(target_arch = "wasm32"))]
pub use repo::preference_repo::SqliteDismissalStore;
pub use site::Site;
pub use specials::{parse_specials, SpecialsError};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
