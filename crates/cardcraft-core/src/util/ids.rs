//! Identifier generation.

use uuid::Uuid;

/// Generate a new hyphenated UUID for courses and cards.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate an 8-hex-character random suffix for blob names.
///
/// Short enough to keep filenames readable; collisions are practically
/// unreachable but not guaranteed absent, and uploads overwrite on
/// collision.
pub fn short_suffix() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(8);
    hex
}
