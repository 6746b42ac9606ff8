//! Date/time display helpers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Default display format on admin pages.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format a UTC timestamp in the given IANA timezone.
///
/// Unknown timezone names fall back to UTC.
pub fn format_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    match timezone.parse::<Tz>() {
        Ok(tz) => dt.with_timezone(&tz).format(format).to_string(),
        Err(_) => dt.format(format).to_string(),
    }
}

/// Format a UTC timestamp with [`DISPLAY_FORMAT`].
pub fn format_datetime_default(dt: &DateTime<Utc>, timezone: &str) -> String {
    format_datetime(dt, timezone, DISPLAY_FORMAT)
}
