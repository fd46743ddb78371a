//! Utility modules for proctrack.

mod time_format;

pub use time_format::{SAMPLE_DATE_FORMAT, TimeParseError, format_timestamp, parse_timestamp};
