//! APRS timestamp tokens.
//!
//! | Token      | Format     | Fields                     | Zone  |
//! |------------|------------|----------------------------|-------|
//! | `DDHHMMz`  | `DHMZ`     | day, hour, minute          | UTC   |
//! | `DDHHMM/`  | `DHML`     | day, hour, minute          | local |
//! | `HHMMSSh`  | `HMS`      | hour, minute, second       | UTC   |
//! | `MMDDHHMM` | `MDHM`     | month, day, hour, minute   | UTC   |
//!
//! Decoding fills the missing fields (year, month, ...) from a reference
//! clock, normally the time of decoding.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{CodecError, Result};

/// Serialization variant for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeFormat {
    /// `HHMMSSh`, UTC.
    Hms,
    /// `MMDDHHMM`, UTC, no marker.
    Mdhm,
    /// `DDHHMM/`, local time.
    Dhml,
    /// `DDHHMMz`, UTC.
    #[default]
    Dhmz,
}

impl TimeFormat {
    /// Trailing marker character, if the format has one.
    pub fn marker(self) -> Option<char> {
        match self {
            TimeFormat::Hms => Some('h'),
            TimeFormat::Mdhm => None,
            TimeFormat::Dhml => Some('/'),
            TimeFormat::Dhmz => Some('z'),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeFormat::Hms => "HMS",
            TimeFormat::Mdhm => "MDHM",
            TimeFormat::Dhml => "DHML",
            TimeFormat::Dhmz => "DHMZ",
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HMS" => Ok(TimeFormat::Hms),
            "MDHM" => Ok(TimeFormat::Mdhm),
            "DHML" => Ok(TimeFormat::Dhml),
            "DHMZ" => Ok(TimeFormat::Dhmz),
            other => Err(format!("unknown time format '{other}'")),
        }
    }
}

/// Decode a timestamp token against the current wall clock.
///
/// `None` returns the current time unchanged.
pub fn decode(text: Option<&str>) -> Result<DateTime<Utc>> {
    decode_at(text, Utc::now())
}

/// Decode a timestamp token, taking unspecified fields from `now`.
pub fn decode_at(text: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let Some(text) = text else {
        return Ok(now);
    };
    let invalid = || CodecError::InvalidTimestamp {
        text: text.to_string(),
    };

    let decoded = match text.chars().last() {
        None => None,
        Some('z') => two_digit_fields::<3>(text)
            .and_then(|[day, hour, minute]| with_day_time(now, &Utc, day, hour, minute)),
        Some('/') => two_digit_fields::<3>(text)
            .and_then(|[day, hour, minute]| with_day_time(now, &Local, day, hour, minute)),
        Some('h') => two_digit_fields::<3>(text).and_then(|[hour, minute, second]| {
            let time = NaiveTime::from_hms_opt(hour, minute, second)?;
            Some(now.date_naive().and_time(time).and_utc())
        }),
        Some(_) => two_digit_fields::<4>(text).and_then(|[month, day, hour, minute]| {
            let date = NaiveDate::from_ymd_opt(now.year(), month, day)?;
            let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
            Some(date.and_time(time).and_utc())
        }),
    };

    decoded.ok_or_else(invalid)
}

/// Encode `time` as a timestamp token.
pub fn encode(time: &DateTime<Utc>, format: TimeFormat) -> String {
    match format {
        TimeFormat::Hms => time.format("%H%M%Sh").to_string(),
        TimeFormat::Mdhm => time.format("%m%d%H%M").to_string(),
        TimeFormat::Dhml => time.with_timezone(&Local).format("%d%H%M/").to_string(),
        TimeFormat::Dhmz => time.format("%d%H%Mz").to_string(),
    }
}

/// Replace day, hour and minute of `now` as seen in `zone`; seconds are zeroed.
fn with_day_time<Tz: TimeZone>(
    now: DateTime<Utc>,
    zone: &Tz,
    day: u32,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    let zoned = now.with_timezone(zone);
    let date = NaiveDate::from_ymd_opt(zoned.year(), zoned.month(), day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    zone.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse the leading `N` two-digit decimal fields of `text`.
fn two_digit_fields<const N: usize>(text: &str) -> Option<[u32; N]> {
    let bytes = text.as_bytes();
    if bytes.len() < N * 2 {
        return None;
    }
    let mut fields = [0u32; N];
    for (i, field) in fields.iter_mut().enumerate() {
        let (hi, lo) = (bytes[i * 2], bytes[i * 2 + 1]);
        if !hi.is_ascii_digit() || !lo.is_ascii_digit() {
            return None;
        }
        *field = u32::from(hi - b'0') * 10 + u32::from(lo - b'0');
    }
    Some(fields)
}
