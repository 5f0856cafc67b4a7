use chrono::{DateTime, Local};
use std::fmt;
use tracing_subscriber::fmt::time::FormatTime;

/// Log timer printing local wall-clock time only (HH:MM:SS.ffffff+zz:zz)
pub struct LocalTimeOnly;

impl FormatTime for LocalTimeOnly {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%H:%M:%S%.6f%:z"))
    }
}

/// Format a unix timestamp as a UTC calendar date (YYYY-MM-DD).
pub fn format_date(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

/// Current local time for report headers.
pub fn get_sysdate() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_utc_dates() {
        assert_eq!(format_date(0), "1970-01-01");
        // 2022-02-28 23:59:59 UTC
        assert_eq!(format_date(1_646_092_799), "2022-02-28");
        assert_eq!(format_date(i64::MAX), "");
    }
}
