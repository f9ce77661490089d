//! Trace timestamp parsing
//!
//! Trace lines carry their time as text in the format configured for the
//! client (`TRACE_TIMESTAMP` masks in Oracle's `TO_CHAR` vocabulary). Only the
//! `DD-MON-YYYY HH:MI:SS:FFn` family is handled; every fractional width is
//! parsed by the same routine.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Mask shared by every supported format, before the fraction width
const MASK_PREFIX: &str = "DD-MON-YYYY HH:MI:SS:FF";

/// Default fractional width written by the Oracle client
const DEFAULT_FRACTION_DIGITS: u8 = 3;

const MONTHS: [&[u8; 3]; 12] = [
    b"jan", b"feb", b"mar", b"apr", b"may", b"jun", b"jul", b"aug", b"sep", b"oct", b"nov", b"dec",
];

/// A supported trace timestamp mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFormat {
    fraction_digits: u8,
}

impl TimestampFormat {
    /// Number of fractional-second digits declared by the mask
    pub fn fraction_digits(&self) -> u8 {
        self.fraction_digits
    }

    /// Parse a timestamp written with this mask
    ///
    /// Components after the year may be missing and default to zero, so
    /// `26-FEB-2019` is midnight. Fraction digits beyond nanosecond precision
    /// are ignored.
    pub fn parse(&self, text: &str) -> Result<NaiveDateTime> {
        let fail = |reason: &str| Error::TimestampParse {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let mut cursor = Cursor::new(text.trim().as_bytes());

        let day = cursor.digits().ok_or_else(|| fail("day is not a number"))?;
        cursor.separators();
        let month = cursor.month().ok_or_else(|| fail("unknown month"))?;
        cursor.separators();
        let year = cursor.digits().ok_or_else(|| fail("year is not a number"))?;

        let mut fields = [0u32; 3];
        for (field, name) in fields.iter_mut().zip(["hour", "minute", "second"]) {
            cursor.separators();
            if cursor.is_empty() {
                break;
            }
            *field = cursor
                .digits()
                .ok_or_else(|| fail(&format!("{} is not a number", name)))?;
        }

        cursor.separators();
        let nanos = if cursor.is_empty() {
            0
        } else {
            cursor
                .fraction()
                .ok_or_else(|| fail("fraction of second is not a number"))?
        };

        let [hour, minute, second] = fields;
        NaiveDate::from_ymd_opt(year as i32, month, day)
            .and_then(|date| date.and_hms_nano_opt(hour, minute, second, nanos))
            .ok_or_else(|| fail("date or time out of range"))
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self {
            fraction_digits: DEFAULT_FRACTION_DIGITS,
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = Error;

    fn from_str(mask: &str) -> Result<Self> {
        let width = mask
            .strip_prefix(MASK_PREFIX)
            .filter(|width| width.len() == 1)
            .and_then(|width| width.parse::<u8>().ok())
            .filter(|width| (1..=9).contains(width))
            .ok_or_else(|| Error::UnsupportedTimestampFormat(mask.to_string()))?;
        Ok(Self {
            fraction_digits: width,
        })
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MASK_PREFIX, self.fraction_digits)
    }
}

/// Forward cursor over timestamp text
struct Cursor<'a> {
    rest: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(rest: &'a [u8]) -> Self {
        Self { rest }
    }

    fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let n = self.rest.iter().take_while(|&&c| pred(c)).count();
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        head
    }

    fn separators(&mut self) {
        self.take_while(|c| matches!(c, b':' | b'-' | b'/' | b'.' | b' '));
    }

    fn digits(&mut self) -> Option<u32> {
        let run = self.take_while(|c| c.is_ascii_digit());
        if run.is_empty() || run.len() > 9 {
            return None;
        }
        Some(run.iter().fold(0, |n, &c| n * 10 + (c - b'0') as u32))
    }

    fn month(&mut self) -> Option<u32> {
        let letters = self.take_while(|c| c.is_ascii_alphabetic());
        let letters = letters.to_ascii_lowercase();
        MONTHS
            .iter()
            .position(|m| m.as_slice() == letters.as_slice())
            .map(|i| i as u32 + 1)
    }

    fn fraction(&mut self) -> Option<u32> {
        let run = self.take_while(|c| c.is_ascii_digit());
        if run.is_empty() {
            return None;
        }
        let mut nanos = 0u32;
        for i in 0..9 {
            let digit = run.get(i).map_or(0, |&c| (c - b'0') as u32);
            nanos = nanos * 10 + digit;
        }
        Some(nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    #[test]
    fn test_supported_masks() {
        for width in 1..=9 {
            let mask = format!("DD-MON-YYYY HH:MI:SS:FF{}", width);
            let format: TimestampFormat = mask.parse().unwrap();
            assert_eq!(format.fraction_digits(), width);
            assert_eq!(format.to_string(), mask);
        }
    }

    #[test]
    fn test_unsupported_masks() {
        for mask in [
            "YYYY-MM-DD",
            "DD-MON-YYYY HH:MI:SS:FF0",
            "DD-MON-YYYY HH:MI:SS:FF10",
            "DD-MON-YYYY HH:MI:SS",
            "",
        ] {
            match mask.parse::<TimestampFormat>() {
                Err(Error::UnsupportedTimestampFormat(m)) => assert_eq!(m, mask),
                other => panic!("mask {:?} gave {:?}", mask, other),
            }
        }
    }

    #[test]
    fn test_default_mask() {
        assert_eq!(
            TimestampFormat::default().to_string(),
            "DD-MON-YYYY HH:MI:SS:FF3"
        );
    }

    #[test]
    fn test_parse_full() {
        let format = TimestampFormat::default();
        assert_eq!(
            format.parse("26-FEB-2019 11:46:40:939").unwrap(),
            datetime(2019, 2, 26, 11, 46, 40, 939)
        );
    }

    #[test]
    fn test_parse_month_case_insensitive() {
        let format = TimestampFormat::default();
        assert_eq!(
            format.parse("26-Feb-2019 11:46:40:939").unwrap(),
            datetime(2019, 2, 26, 11, 46, 40, 939)
        );
    }

    #[test]
    fn test_parse_date_only() {
        let format = TimestampFormat::default();
        assert_eq!(
            format.parse("26-FEB-2019").unwrap(),
            datetime(2019, 2, 26, 0, 0, 0, 0)
        );
    }

    #[test]
    fn test_parse_fraction_width() {
        let format: TimestampFormat = "DD-MON-YYYY HH:MI:SS:FF6".parse().unwrap();
        let ts = format.parse("12-FEB-2019 17:25:10:000804").unwrap();
        assert_eq!(ts.nanosecond(), 804_000);
    }

    #[test]
    fn test_parse_errors() {
        let format = TimestampFormat::default();
        assert!(format.parse("26-AAA-2019 11:46:40:939").is_err());
        assert!(format.parse("AE-FEB-2019 11:46:40:939").is_err());
        assert!(format.parse("30-FEB-2019 11:46:40:939").is_err());
        match format.parse("26-FEB-2019 xx:46") {
            Err(Error::TimestampParse { text, reason }) => {
                assert_eq!(text, "26-FEB-2019 xx:46");
                assert_eq!(reason, "hour is not a number");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
