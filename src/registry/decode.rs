//! Decoders for the base rules, one per value kind.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::driver::DriverValue;
use crate::types::RowValues;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const ZONED_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%dT%H:%M:%S%.f%:z"];

pub(crate) const SINGLE_PRECISION_LIMIT: u32 = 24;

fn unexpected(expected: &str, raw: &DriverValue) -> String {
    format!("expected {expected}, got {}", raw.describe())
}

fn utf8(bytes: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|e| format!("invalid UTF-8 in character data: {e}"))
}

pub(crate) fn boolean(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    match raw {
        DriverValue::Bool(b) => Ok(RowValues::Bool(*b)),
        DriverValue::Int(i) => Ok(RowValues::Bool(*i != 0)),
        DriverValue::Text(s) => parse_bool(s).map(RowValues::Bool),
        DriverValue::Bytes(bytes) => parse_bool(utf8(bytes)?).map(RowValues::Bool),
        other => Err(unexpected("a boolean", other)),
    }
}

pub(crate) fn parse_bool(text: &str) -> Result<bool, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Ok(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Ok(false),
        other => Err(format!("`{other}` is not a boolean")),
    }
}

pub(crate) fn string(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    text_of(raw).map(RowValues::String)
}

pub(crate) fn text(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    text_of(raw).map(RowValues::Text)
}

fn text_of(raw: &DriverValue) -> Result<String, String> {
    match raw {
        DriverValue::Text(s) => Ok(s.clone()),
        DriverValue::Bytes(bytes) => utf8(bytes).map(str::to_string),
        DriverValue::Bool(b) => Ok(b.to_string()),
        DriverValue::Int(i) => Ok(i.to_string()),
        DriverValue::Float(f) => Ok(f.to_string()),
        DriverValue::Date(d) => Ok(d.format(DATE_FORMAT).to_string()),
        DriverValue::Time(t) => Ok(t.format("%H:%M:%S%.f").to_string()),
        DriverValue::Timestamp(ts) => Ok(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        DriverValue::Null => Err(unexpected("character data", raw)),
    }
}

pub(crate) fn integer(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    let value = wide_integer_of(raw)?;
    i64::try_from(value)
        .map(RowValues::Int)
        .map_err(|_| format!("{value} does not fit a 64-bit integer"))
}

pub(crate) fn big_integer(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    wide_integer_of(raw).map(RowValues::BigInt)
}

fn wide_integer_of(raw: &DriverValue) -> Result<i128, String> {
    match raw {
        DriverValue::Int(i) => Ok(i128::from(*i)),
        DriverValue::Bool(b) => Ok(i128::from(*b)),
        DriverValue::Float(f) => truncate_float(*f),
        DriverValue::Text(s) => parse_integer(s),
        DriverValue::Bytes(bytes) => parse_integer(utf8(bytes)?),
        other => Err(unexpected("an integer", other)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate_float(value: f64) -> Result<i128, String> {
    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= i128::MIN as f64 && truncated < i128::MAX as f64 {
        Ok(truncated as i128)
    } else {
        Err(format!("{value} is not representable as an integer"))
    }
}

/// Parse integer text; decimal text is truncated toward zero.
pub(crate) fn parse_integer(text: &str) -> Result<i128, String> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i128>() {
        return Ok(value);
    }
    let decimal = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| format!("`{trimmed}` is not a number"))?;
    decimal
        .trunc()
        .to_i128()
        .ok_or_else(|| format!("`{trimmed}` is out of integer range"))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn float(raw: &DriverValue, limit: Option<u32>) -> Result<RowValues, String> {
    let value = match raw {
        DriverValue::Float(f) => *f,
        DriverValue::Int(i) => *i as f64,
        DriverValue::Text(s) => parse_float(s)?,
        DriverValue::Bytes(bytes) => parse_float(utf8(bytes)?)?,
        other => return Err(unexpected("a floating point number", other)),
    };
    let value = match limit {
        Some(limit) if limit <= SINGLE_PRECISION_LIMIT => f64::from(value as f32),
        _ => value,
    };
    Ok(RowValues::Float(value))
}

fn parse_float(text: &str) -> Result<f64, String> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| format!("`{trimmed}` is not a floating point number"))
}

pub(crate) fn binary(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    match raw {
        DriverValue::Bytes(bytes) => Ok(RowValues::Blob(bytes.clone())),
        DriverValue::Text(s) => Ok(RowValues::Blob(s.as_bytes().to_vec())),
        other => Err(unexpected("binary data", other)),
    }
}

pub(crate) fn date(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    match raw {
        DriverValue::Date(d) => Ok(RowValues::Date(*d)),
        DriverValue::Timestamp(ts) => Ok(RowValues::Date(ts.date())),
        DriverValue::Text(s) => parse_date(s).map(RowValues::Date),
        DriverValue::Bytes(bytes) => parse_date(utf8(bytes)?).map(RowValues::Date),
        other => Err(unexpected("a date", other)),
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .or_else(|_| parse_datetime(trimmed).map(|ts| ts.date()))
        .map_err(|_| format!("`{trimmed}` is not a date"))
}

pub(crate) fn time(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    match raw {
        DriverValue::Time(t) => Ok(RowValues::Time(*t)),
        DriverValue::Timestamp(ts) => Ok(RowValues::Time(ts.time())),
        DriverValue::Text(s) => parse_time(s).map(RowValues::Time),
        DriverValue::Bytes(bytes) => parse_time(utf8(bytes)?).map(RowValues::Time),
        other => Err(unexpected("a time", other)),
    }
}

fn parse_time(text: &str) -> Result<NaiveTime, String> {
    let trimmed = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .or_else(|| parse_datetime(trimmed).ok().map(|ts| ts.time()))
        .ok_or_else(|| format!("`{trimmed}` is not a time"))
}

pub(crate) fn datetime(raw: &DriverValue, _limit: Option<u32>) -> Result<RowValues, String> {
    match raw {
        DriverValue::Timestamp(ts) => Ok(RowValues::Timestamp(*ts)),
        DriverValue::Date(d) => Ok(RowValues::Timestamp(midnight(*d)?)),
        DriverValue::Text(s) => parse_datetime(s).map(RowValues::Timestamp),
        DriverValue::Bytes(bytes) => parse_datetime(utf8(bytes)?).map(RowValues::Timestamp),
        other => Err(unexpected("a datetime", other)),
    }
}

fn midnight(date: NaiveDate) -> Result<NaiveDateTime, String> {
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("{date} has no midnight"))
}

/// Parse datetime text. Zoned values are normalized to UTC; a bare date means midnight.
pub(crate) fn parse_datetime(text: &str) -> Result<NaiveDateTime, String> {
    let trimmed = text.trim();
    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(ts);
    }
    if let Some(ts) = ZONED_DATETIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(ts.naive_utc());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| format!("`{trimmed}` is not a datetime"))
        .and_then(midnight)
}

/// Decode PostgreSQL `bytea` hex output (`\x0102`), falling back to raw bytes.
pub(crate) fn hex_bytea(raw: &DriverValue, limit: Option<u32>) -> Result<RowValues, String> {
    let body = match raw {
        DriverValue::Text(s) => s.strip_prefix("\\x").map(str::as_bytes),
        DriverValue::Bytes(bytes) => bytes.strip_prefix(b"\\x"),
        _ => None,
    };
    match body {
        Some(hex) => decode_hex(hex).map(RowValues::Blob),
        None => binary(raw, limit),
    }
}

/// Decode a single-byte `BIT(1)` payload as a boolean.
pub(crate) fn bit_byte(raw: &DriverValue, limit: Option<u32>) -> Result<RowValues, String> {
    match raw {
        DriverValue::Bytes(bytes) if bytes.len() == 1 && bytes[0] <= 1 => {
            Ok(RowValues::Bool(bytes[0] == 1))
        }
        other => boolean(other, limit),
    }
}

pub(crate) fn decode_hex(hex: &[u8]) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex data has an odd number of digits".to_string());
    }
    hex.chunks(2)
        .map(|pair| {
            let digits = utf8(pair)?;
            if !pair.iter().all(u8::is_ascii_hexdigit) {
                return Err(format!("`{digits}` is not a hex byte"));
            }
            u8::from_str_radix(digits, 16).map_err(|_| format!("`{digits}` is not a hex byte"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_text_truncates_decimals() {
        assert_eq!(parse_integer(" 42 "), Ok(42));
        assert_eq!(parse_integer("12.7"), Ok(12));
        assert_eq!(parse_integer("-12.7"), Ok(-12));
        assert_eq!(parse_integer("1e3"), Ok(1000));
        assert!(parse_integer("twelve").is_err());
    }

    #[test]
    fn single_precision_rounds_through_f32() {
        let single = float(&DriverValue::Text("0.1".into()), Some(24)).unwrap();
        let double = float(&DriverValue::Text("0.1".into()), Some(53)).unwrap();
        assert_eq!(single, RowValues::Float(f64::from(0.1_f32)));
        assert_eq!(double, RowValues::Float(0.1));
    }

    #[test]
    fn datetime_text_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(10, 11, 12, 500_000)
            .unwrap();
        assert_eq!(parse_datetime("2024-03-09 10:11:12.5"), Ok(expected));
        assert_eq!(parse_datetime("2024-03-09T10:11:12.5"), Ok(expected));
        assert_eq!(parse_datetime("2024-03-09 12:11:12.5 +0200"), Ok(expected));
        assert_eq!(
            parse_datetime("2024-03-09"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap())
        );
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn hex_decoding() {
        assert_eq!(decode_hex(b"00ff10"), Ok(vec![0x00, 0xff, 0x10]));
        assert!(decode_hex(b"abc").is_err());
        assert!(decode_hex(b"zz").is_err());
    }

    #[test]
    fn boolean_spellings() {
        for text in ["1", "t", "TRUE", "yes", "On"] {
            assert_eq!(parse_bool(text), Ok(true), "{text}");
        }
        for text in ["0", "f", "False", "no", "off"] {
            assert_eq!(parse_bool(text), Ok(false), "{text}");
        }
        assert!(parse_bool("maybe").is_err());
    }
}
