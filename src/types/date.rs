//! Oracle DATE and TIMESTAMP decoding
//!
//! Oracle DATE format (7 bytes):
//! - Byte 0: Century (value + 100)
//! - Byte 1: Year in century (value + 100)
//! - Byte 2: Month (1-12)
//! - Byte 3: Day (1-31)
//! - Byte 4: Hour + 1 (1-24)
//! - Byte 5: Minute + 1 (1-60)
//! - Byte 6: Second + 1 (1-60)
//!
//! Oracle TIMESTAMP adds (4 more bytes):
//! - Bytes 7-10: Fractional seconds (nanoseconds as big-endian u32)
//!
//! Oracle TIMESTAMP WITH TIME ZONE adds (2 more bytes):
//! - Byte 11: Time zone hour offset + 20
//! - Byte 12: Time zone minute offset + 60
//!
//! The date and time fields of a value with a time zone are stored in UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone};

use crate::error::{Error, Result};

/// Length of a DATE value
const DATE_LENGTH: usize = 7;
/// Length of a TIMESTAMP value
const TIMESTAMP_LENGTH: usize = 11;
/// Length of a TIMESTAMP WITH TIME ZONE value
const TIMESTAMP_TZ_LENGTH: usize = 13;

/// Timezone hour offset constant
const TZ_HOUR_OFFSET: i32 = 20;
/// Timezone minute offset constant
const TZ_MINUTE_OFFSET: i32 = 60;
/// Flag indicating named timezone (not supported)
const HAS_REGION_ID: u8 = 0x80;

/// Decode an Oracle DATE or TIMESTAMP from wire format bytes
///
/// Handles DATE (7 bytes), TIMESTAMP (11 bytes), and TIMESTAMP WITH TIME ZONE
/// (13 bytes). Values without a time zone are returned at offset zero.
pub fn decode_date(data: &[u8]) -> Result<DateTime<FixedOffset>> {
    if data.len() < DATE_LENGTH {
        return Err(Error::conversion(format!(
            "Oracle DATE requires {} bytes, got {}",
            DATE_LENGTH,
            data.len()
        )));
    }

    let century = data[0] as i32 - 100;
    let year_in_century = data[1] as i32 - 100;
    let year = century * 100 + year_in_century;

    let nanos = if data.len() >= TIMESTAMP_LENGTH {
        u32::from_be_bytes([data[7], data[8], data[9], data[10]])
    } else {
        0
    };

    let offset_seconds = if data.len() >= TIMESTAMP_TZ_LENGTH {
        if data[11] & HAS_REGION_ID != 0 {
            return Err(Error::conversion(
                "Named timezone regions are not supported",
            ));
        }
        let tz_hour = data[11] as i32 - TZ_HOUR_OFFSET;
        let tz_minute = data[12] as i32 - TZ_MINUTE_OFFSET;
        tz_hour * 3600 + tz_minute * 60
    } else {
        0
    };

    let utc = NaiveDate::from_ymd_opt(year, data[2] as u32, data[3] as u32)
        .and_then(|date| {
            date.and_hms_nano_opt(
                data[4].wrapping_sub(1) as u32,
                data[5].wrapping_sub(1) as u32,
                data[6].wrapping_sub(1) as u32,
                nanos,
            )
        })
        .ok_or_else(|| Error::conversion(format!("invalid Oracle date bytes: {:02x?}", data)))?;

    let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
        Error::conversion(format!("invalid time zone offset: {} seconds", offset_seconds))
    })?;

    Ok(offset.from_utc_datetime(&utc))
}

/// Render a decoded date as RFC 3339, using `Z` for UTC
pub fn format_date(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_decode_date() {
        // 2024-03-15 14:30:45
        let data = vec![
            120, // century: 20 + 100 = 120
            124, // year: 24 + 100 = 124
            3,   // month: 3
            15,  // day: 15
            15,  // hour: 14 + 1 = 15
            31,  // minute: 30 + 1 = 31
            46,  // second: 45 + 1 = 46
        ];

        let date = decode_date(&data).unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 14);
        assert_eq!(date.minute(), 30);
        assert_eq!(date.second(), 45);
    }

    #[test]
    fn test_decode_first_day_of_2020() {
        let date = decode_date(&[120, 120, 1, 1, 1, 1, 1]).unwrap();
        assert_eq!(format_date(&date), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_decode_short_input() {
        let err = decode_date(&[120, 120, 1, 1, 1, 1]).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_decode_invalid_month() {
        assert!(decode_date(&[120, 120, 13, 1, 1, 1, 1]).is_err());
    }

    #[test]
    fn test_decode_timestamp_with_fractional() {
        // 2024-03-15 14:30:45.123456
        let mut data = vec![120, 124, 3, 15, 15, 31, 46];
        let nanos: u32 = 123_456_000;
        data.extend_from_slice(&nanos.to_be_bytes());

        let ts = decode_date(&data).unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.nanosecond(), 123_456_000);
        assert_eq!(format_date(&ts), "2024-03-15T14:30:45.123456Z");
    }

    #[test]
    fn test_decode_timestamp_with_timezone() {
        // 2024-03-15 14:30:45 UTC, zone +05:30
        let mut data = vec![120, 124, 3, 15, 15, 31, 46];
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.push(25); // tz_hour: 5 + 20 = 25
        data.push(90); // tz_minute: 30 + 60 = 90

        let ts = decode_date(&data).unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(ts.hour(), 20);
        assert_eq!(ts.minute(), 0);
        assert_eq!(format_date(&ts), "2024-03-15T20:00:45+05:30");
    }

    #[test]
    fn test_region_id_rejected() {
        let mut data = vec![120, 124, 3, 15, 15, 31, 46, 0, 0, 0, 0];
        data.push(0x80 | 25);
        data.push(90);
        assert!(decode_date(&data).is_err());
    }

    #[test]
    fn test_negative_year() {
        // Year -100 (100 BC)
        let data = vec![
            99,  // century: -1 + 100 = 99
            100, // year: 0 + 100 = 100
            1, 1, 1, 1, 1,
        ];

        let date = decode_date(&data).unwrap();
        assert_eq!(date.year(), -100);
    }
}
