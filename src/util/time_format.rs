//! Sample timestamps: `YYYY/MM/DD-HH:MM:SS.mmm`, local time.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// `strftime` pattern of the `date` field in every sample.
pub const SAMPLE_DATE_FORMAT: &str = "%Y/%m/%d-%H:%M:%S%.3f";

/// Error type for timestamp parsing failures.
#[derive(Debug, Clone)]
pub struct TimeParseError {
    pub input: String,
    pub message: String,
}

impl std::fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse time '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for TimeParseError {}

/// Formats a wall-clock instant like `2016/09/22-09:59:30.005`.
///
/// Sub-millisecond digits are truncated, not rounded.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use proctrack::util::format_timestamp;
///
/// let t = Local.with_ymd_and_hms(2016, 9, 22, 9, 59, 30).unwrap();
/// assert_eq!(format_timestamp(&t), "2016/09/22-09:59:30.000");
/// ```
pub fn format_timestamp<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.format(SAMPLE_DATE_FORMAT).to_string()
}

/// Parses a sample `date` field back into a local timestamp.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Local>, TimeParseError> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), SAMPLE_DATE_FORMAT).map_err(|e| {
        TimeParseError {
            input: input.to_string(),
            message: e.to_string(),
        }
    })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| TimeParseError {
            input: input.to_string(),
            message: "time does not exist in the local timezone".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_format_zero_pads_milliseconds() {
        let t = NaiveDate::from_ymd_opt(2016, 9, 22)
            .unwrap()
            .and_hms_milli_opt(9, 59, 30, 5)
            .unwrap()
            .and_utc();
        assert_eq!(format_timestamp(&t), "2016/09/22-09:59:30.005");
    }

    #[test]
    fn test_format_truncates_sub_millisecond() {
        let t = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 999_999)
            .unwrap()
            .and_utc();
        assert_eq!(format_timestamp(&t), "2024/01/02-03:04:05.999");
    }

    #[test]
    fn test_format_has_fixed_width() {
        let s = format_timestamp(&Utc::now());
        assert_eq!(s.len(), "YYYY/MM/DD-HH:MM:SS.mmm".len());
        assert_eq!(&s[4..5], "/");
        assert_eq!(&s[10..11], "-");
        assert_eq!(&s[19..20], ".");
    }

    #[test]
    fn test_parse_round_trip() {
        let now = Local::now();
        let formatted = format_timestamp(&now);
        let parsed = parse_timestamp(&formatted).unwrap();
        assert_eq!(format_timestamp(&parsed), formatted);
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(parse_timestamp("2016-09-22T09:59:30").is_err());
        assert!(parse_timestamp("").is_err());
        let err = parse_timestamp("yesterday").unwrap_err();
        assert_eq!(err.input, "yesterday");
    }
}
