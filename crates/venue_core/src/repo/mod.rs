//! Host-side persistence.
//!
//! # Responsibility
//! - Define key/value preference access for native hosts.
//! - Keep SQL details out of the install controller.
//!
//! # Invariants
//! - Repository APIs surface storage failures as `StoreError`.

pub mod preference_repo;
