//! IMD header line parsing and rendering
//!
//! The header is a single ASCII line of the form
//! `IMD 1.18: 05/03/2024  9:15:32\r\n`. The hour is padded with a space
//! rather than a zero, which is what ImageDisk itself writes.

use crate::error::{ImdError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::bytes::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

/// Matches the header line, tolerating single-digit fields, two-digit years and
/// repeated separator spaces as written by older tools.
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^IMD (?P<major>[0-9])\.(?P<minor>[0-9]{1,2}): +(?P<day>[0-9]{1,2})/(?P<month>[0-9]{1,2})/(?P<year>[0-9]{2,4}) +(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{1,2}):(?P<second>[0-9]{1,2})\r\n",
    )
    .expect("IMD header pattern is valid")
});

/// ImageDisk version that produced the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImdVersion {
    /// Major version (single digit)
    pub major: u8,
    /// Minor version (two digits)
    pub minor: u8,
}

impl ImdVersion {
    /// Create a new version
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ImdVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

/// Date stamp from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImdDate {
    /// Day of month
    pub day: u8,
    /// Month
    pub month: u8,
    /// Year
    pub year: u16,
}

impl ImdDate {
    /// Create a new date
    pub fn new(day: u8, month: u8, year: u16) -> Self {
        Self { day, month, year }
    }
}

impl fmt::Display for ImdDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

/// Time stamp from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImdTime {
    /// Hour
    pub hour: u8,
    /// Minute
    pub minute: u8,
    /// Second
    pub second: u8,
}

impl ImdTime {
    /// Create a new time
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }
}

impl fmt::Display for ImdTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>2}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// The parsed header line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImdHeader {
    /// Format version
    pub version: ImdVersion,
    /// Creation date
    pub date: ImdDate,
    /// Creation time
    pub time: ImdTime,
}

impl ImdHeader {
    /// Create a header, checking every field fits its rendered width
    pub fn new(version: ImdVersion, date: ImdDate, time: ImdTime) -> Result<Self> {
        let header = Self {
            version,
            date,
            time,
        };
        header.validate()?;
        Ok(header)
    }

    /// Create a header stamped with the given date and time
    pub fn from_datetime(version: ImdVersion, stamp: NaiveDateTime) -> Result<Self> {
        let year = u16::try_from(stamp.year())
            .map_err(|_| ImdError::invalid_header_field(format!("year {}", stamp.year())))?;
        Self::new(
            version,
            ImdDate::new(stamp.day() as u8, stamp.month() as u8, year),
            ImdTime::new(
                stamp.hour() as u8,
                stamp.minute() as u8,
                stamp.second() as u8,
            ),
        )
    }

    /// Check that rendering and re-parsing this header is lossless
    pub fn validate(&self) -> Result<()> {
        check_range("major version", self.version.major as u16, 9)?;
        check_range("minor version", self.version.minor as u16, 99)?;
        check_range("day", self.date.day as u16, 99)?;
        check_range("month", self.date.month as u16, 99)?;
        check_range("year", self.date.year, 9999)?;
        check_range("hour", self.time.hour as u16, 99)?;
        check_range("minute", self.time.minute as u16, 99)?;
        check_range("second", self.time.second as u16, 99)?;
        Ok(())
    }

    /// Interpret the date and time as a calendar timestamp
    ///
    /// Returns `None` when the stored values are not a real date or time.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            self.date.year as i32,
            self.date.month as u32,
            self.date.day as u32,
        )?
        .and_hms_opt(
            self.time.hour as u32,
            self.time.minute as u32,
            self.time.second as u32,
        )
    }

    /// Render the header line, including the trailing CR LF
    pub fn render(&self) -> String {
        format!("IMD {}: {} {}\r\n", self.version, self.date, self.time)
    }
}

fn check_range(field: &str, value: u16, max: u16) -> Result<()> {
    if value > max {
        return Err(ImdError::invalid_header_field(format!(
            "{} {} exceeds {}",
            field, value, max
        )));
    }
    Ok(())
}

fn capture_number(caps: &Captures<'_>, name: &str) -> Result<u16> {
    let digits = caps
        .name(name)
        .map(|m| m.as_bytes())
        .ok_or_else(|| ImdError::malformed_header(format!("missing {} field", name)))?;

    // The pattern only admits ASCII digits, at most four of them
    Ok(digits
        .iter()
        .fold(0u16, |acc, &d| acc * 10 + (d - b'0') as u16))
}

/// Parse the header line at the start of the header region
///
/// Returns the header and the number of bytes the line occupied; anything
/// after that up to the sentinel is the comment.
pub fn parse_header(region: &[u8]) -> Result<(ImdHeader, usize)> {
    let caps = HEADER_REGEX.captures(region).ok_or_else(|| {
        let preview_len = region.len().min(32);
        ImdError::malformed_header(format!(
            "header line does not match IMD pattern: {:?}",
            String::from_utf8_lossy(&region[..preview_len])
        ))
    })?;

    let line_len = caps.get(0).map(|m| m.end()).unwrap_or(0);

    let header = ImdHeader {
        version: ImdVersion::new(
            capture_number(&caps, "major")? as u8,
            capture_number(&caps, "minor")? as u8,
        ),
        date: ImdDate::new(
            capture_number(&caps, "day")? as u8,
            capture_number(&caps, "month")? as u8,
            capture_number(&caps, "year")?,
        ),
        time: ImdTime::new(
            capture_number(&caps, "hour")? as u8,
            capture_number(&caps, "minute")? as u8,
            capture_number(&caps, "second")? as u8,
        ),
    };

    Ok((header, line_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ImdHeader {
        ImdHeader::new(
            ImdVersion::new(1, 18),
            ImdDate::new(5, 3, 2024),
            ImdTime::new(9, 15, 32),
        )
        .unwrap()
    }

    #[test]
    fn test_render_pads_hour_with_space() {
        assert_eq!(sample().render(), "IMD 1.18: 05/03/2024  9:15:32\r\n");
    }

    #[test]
    fn test_render_two_digit_hour() {
        let header = ImdHeader::new(
            ImdVersion::new(1, 19),
            ImdDate::new(31, 12, 1999),
            ImdTime::new(23, 5, 0),
        )
        .unwrap();
        assert_eq!(header.render(), "IMD 1.19: 31/12/1999 23:05:00\r\n");
    }

    #[test]
    fn test_parse_canonical() {
        let text = b"IMD 1.18: 05/03/2024  9:15:32\r\nhello";
        let (header, len) = parse_header(text).unwrap();
        assert_eq!(header, sample());
        assert_eq!(len, text.len() - 5);
        assert_eq!(&text[len..], b"hello");
    }

    #[test]
    fn test_parse_lenient_forms() {
        let (header, _) = parse_header(b"IMD 1.5: 1/2/84 12:3:4\r\n").unwrap();
        assert_eq!(header.version, ImdVersion::new(1, 5));
        assert_eq!(header.date, ImdDate::new(1, 2, 84));
        assert_eq!(header.time, ImdTime::new(12, 3, 4));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_header(b"MV - CPCEMU Disk-File\r\n"),
            Err(ImdError::MalformedHeader(_))
        ));
        // Missing CR LF
        assert!(parse_header(b"IMD 1.18: 05/03/2024  9:15:32").is_err());
    }

    #[test]
    fn test_render_parse_round_trip() {
        let header = sample();
        let rendered = header.render();
        let (parsed, len) = parse_header(rendered.as_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(len, rendered.len());
    }

    #[test]
    fn test_validate_rejects_wide_fields() {
        let result = ImdHeader::new(
            ImdVersion::new(10, 0),
            ImdDate::new(1, 1, 2000),
            ImdTime::new(0, 0, 0),
        );
        assert!(matches!(result, Err(ImdError::InvalidHeaderField(_))));

        let result = ImdHeader::new(
            ImdVersion::new(1, 18),
            ImdDate::new(1, 1, 10000),
            ImdTime::new(0, 0, 0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_timestamp() {
        let stamp = sample().timestamp().unwrap();
        assert_eq!(stamp.year(), 2024);
        assert_eq!(stamp.month(), 3);
        assert_eq!(stamp.day(), 5);
        assert_eq!(stamp.hour(), 9);

        let bogus = ImdHeader::new(
            ImdVersion::new(1, 18),
            ImdDate::new(31, 2, 2024),
            ImdTime::new(0, 0, 0),
        )
        .unwrap();
        assert!(bogus.timestamp().is_none());
    }

    #[test]
    fn test_from_datetime() {
        let stamp = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 15, 32)
            .unwrap();
        let header = ImdHeader::from_datetime(ImdVersion::new(1, 18), stamp).unwrap();
        assert_eq!(header, sample());
    }
}
