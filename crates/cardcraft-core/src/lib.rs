//! Cardcraft Core — shared error type, settings, and utilities.
//!
//! This crate provides the foundational types used across all Cardcraft
//! crates. It has no internal Cardcraft dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`settings`]: Environment-sourced server settings
//! - [`util`]: ID, timestamp, and filename utilities

pub mod error;
pub mod settings;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use settings::Settings;

// Convenience re-exports from util
pub use util::ids::{new_id, short_suffix};
pub use util::names::file_basename;
pub use util::time::ist_timestamp;
