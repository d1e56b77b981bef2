//! Time conversion and formatting utilities

use chrono::{DateTime, Local};

/// Timestamp layout used in output file names
pub const TIMESTAMP_FORMAT: &str = "%y%m%d-%H%M%S";

/// Convert an `HH:MM:SS.cc` clock reading to seconds
pub fn clock_to_seconds(hours: u32, minutes: u32, seconds: u32, centis: u32) -> f64 {
    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + centis as f64 / 100.0
}

/// Format seconds as `Xm Ys`, truncating fractions
pub fn format_minutes_seconds(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}m {}s", total / 60, total % 60)
}

/// Format seconds to `HH:MM:SS.cc`
pub fn format_clock(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let total_centis = (seconds * 100.0).round() as u64;
    let hours = total_centis / 360_000;
    let minutes = (total_centis % 360_000) / 6_000;
    let secs = (total_centis % 6_000) / 100;
    let centis = total_centis % 100;

    format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

/// Render the file name timestamp for a point in time
pub fn timestamp_token(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clock_to_seconds() {
        assert_eq!(clock_to_seconds(0, 1, 30, 50), 90.5);
        assert_eq!(clock_to_seconds(1, 0, 0, 0), 3600.0);
    }

    #[test]
    fn test_format_minutes_seconds() {
        assert_eq!(format_minutes_seconds(90.5), "1m 30s");
        assert_eq!(format_minutes_seconds(3725.0), "62m 5s");
        assert_eq!(format_minutes_seconds(0.0), "0m 0s");
        assert_eq!(format_minutes_seconds(f64::NAN), "0m 0s");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(90.5), "00:01:30.50");
        assert_eq!(format_clock(3723.25), "01:02:03.25");
    }

    #[test]
    fn test_timestamp_token() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(timestamp_token(&at), "240309-140507");
    }
}
