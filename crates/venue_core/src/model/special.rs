//! Special offer record.
//!
//! # Invariants
//! - Records are ephemeral: rebuilt from the catalog on every load.
//! - All three fields are required; a record missing one is a malformed
//!   catalog, not a partial card.

use serde::{Deserialize, Serialize};

/// One "special offer" entry of the specials catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialOffer {
    /// Image URI, absolute or site-relative.
    pub image: String,
    pub title: String,
    pub subtitle: String,
}

impl SpecialOffer {
    pub fn new(
        image: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
    ) -> Self {
        Self {
            image: image.into(),
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}
