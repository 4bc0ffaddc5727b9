//! Plain data shared by the site components.
//!
//! # Responsibility
//! - Define records loaded from outside the page (specials catalog).
//! - Define client platform facts read by the install banner.

pub mod platform;
pub mod special;
