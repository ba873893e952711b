//! Provenance timestamps.
//!
//! All "generated at" values are ISO-8601 strings in India Standard Time
//! regardless of server locale. This is a platform convention carried by
//! every provenance field, not a derived value.

use chrono::Utc;
use chrono_tz::Asia::Kolkata;

/// Current time as an ISO-8601 string in India Standard Time.
pub fn ist_timestamp() -> String {
    Utc::now().with_timezone(&Kolkata).to_rfc3339()
}
