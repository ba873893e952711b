//! ID, timestamp, and filename utilities.

pub mod ids;
pub mod names;
pub mod time;
