//! Date and time rendering for node and status timestamps.
//!
//! Output is always UTC so a timestamp renders the same on every host.

use time::macros::format_description;

use crate::types::Timestamp;

/// `Aug 30, 2023`
pub fn format_date(ts: Timestamp) -> String {
    ts.as_datetime()
        .format(format_description!("[month repr:short] [day], [year]"))
        .unwrap_or_else(|_| ts.unix().to_string())
}

/// `12:53:20`
pub fn format_time(ts: Timestamp) -> String {
    ts.as_datetime()
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| ts.unix().to_string())
}

pub fn format_date_time(ts: Timestamp) -> String {
    format!("{} {}", format_date(ts), format_time(ts))
}
