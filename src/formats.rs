//! Value formats shared by entity schemas and their decoders
//!
//! The schema check and the serde decode must agree on what they accept, so
//! both go through the functions here: `EntityValidator` registers
//! [`is_timestamp`] as the `timestamp` format, and the entity records decode
//! with [`optional_timestamp`] and [`optional_whole_number`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Number;

/// Name of the custom JSON Schema format for date-times
pub const TIMESTAMP_FORMAT: &str = "timestamp";

/// Largest whole number a count field accepts (2^53 - 1)
///
/// Every integer up to here is exact as an `f64`, so `5.0` and `5` mean the
/// same thing on both sides of the bound.
pub const MAX_WHOLE_NUMBER: u64 = 9_007_199_254_740_991;

/// Offset-less date-times, read as UTC
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 date-time or date
///
/// Accepts RFC 3339 (`2025-06-01T18:00:00+02:00`), a date-time without an
/// offset (`2025-06-01T18:00:00`, taken as UTC) and a bare date
/// (`2025-06-01`, midnight UTC).
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    // Numeric offset without a colon: 2025-06-01T18:00:00+0200
    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0).map(|midnight| Utc.from_utc_datetime(&midnight))
}

/// Format check registered with the schema compiler
pub fn is_timestamp(input: &str) -> bool {
    parse_timestamp(input).is_some()
}

/// A JSON number that is a whole number within the count range
///
/// `5` and `5.0` both yield 5; `5.5`, negatives and anything above
/// [`MAX_WHOLE_NUMBER`] yield `None`.
pub fn whole_number(number: &Number) -> Option<u64> {
    if let Some(n) = number.as_u64() {
        return (n <= MAX_WHOLE_NUMBER).then_some(n);
    }
    let f = number.as_f64()?;
    if f.fract() == 0.0 && (0.0..=MAX_WHOLE_NUMBER as f64).contains(&f) {
        Some(f as u64)
    } else {
        None
    }
}

/// serde `deserialize_with` for `Option<DateTime<Utc>>` fields
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("'{}' is not a date or date-time", raw))),
    }
}

/// serde `deserialize_with` for `Option<u64>` count fields
pub fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(number) => whole_number(&number).map(Some).ok_or_else(|| {
            D::Error::custom(format!(
                "{} is not a whole number between 0 and {}",
                number, MAX_WHOLE_NUMBER
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    #[test]
    fn test_rfc3339_keeps_instant() {
        let dt = parse_timestamp("2025-06-01T18:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-01T16:00:00+00:00");
        assert!(parse_timestamp("2025-06-01T18:00:00Z").is_some());
        assert!(parse_timestamp("2025-06-01T18:00:00.250Z").is_some());
    }

    #[test]
    fn test_offset_less_date_time_is_utc() {
        let dt = parse_timestamp("2025-06-01T18:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-01T18:00:00+00:00");
        assert_eq!(parse_timestamp("2025-06-01 18:30").unwrap().minute(), 30);
    }

    #[test]
    fn test_bare_date_is_midnight_utc() {
        let dt = parse_timestamp("2025-06-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_rejects_non_dates() {
        for input in ["yesterday", "2025-13-01", "2025-02-30", "", "18:00"] {
            assert!(!is_timestamp(input), "{input} should be rejected");
        }
    }

    #[test]
    fn test_whole_number_accepts_integral_floats() {
        let number = |v: serde_json::Value| match v {
            serde_json::Value::Number(n) => n,
            other => panic!("Expected a number, got {other}"),
        };
        assert_eq!(whole_number(&number(json!(5))), Some(5));
        assert_eq!(whole_number(&number(json!(5.0))), Some(5));
        assert_eq!(whole_number(&number(json!(5.5))), None);
        assert_eq!(whole_number(&number(json!(-1))), None);
        assert_eq!(whole_number(&number(json!(1e20))), None);
        assert_eq!(whole_number(&number(json!(MAX_WHOLE_NUMBER))), Some(MAX_WHOLE_NUMBER));
        assert_eq!(whole_number(&number(json!(MAX_WHOLE_NUMBER + 1))), None);
    }

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "optional_whole_number")]
        seats: Option<u64>,
        #[serde(default, deserialize_with = "optional_timestamp")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_deserializers_treat_null_and_absent_as_none() {
        let sample: Sample = serde_json::from_value(json!({"seats": null})).unwrap();
        assert_eq!(sample.seats, None);
        assert_eq!(sample.at, None);

        let sample: Sample = serde_json::from_value(json!({"seats": 12.0, "at": "2025-06-01"})).unwrap();
        assert_eq!(sample.seats, Some(12));
        assert!(sample.at.is_some());
    }

    #[test]
    fn test_deserializer_errors_name_the_value() {
        let err = serde_json::from_value::<Sample>(json!({"seats": 1e20})).err().unwrap();
        assert!(err.to_string().contains("not a whole number"));
        let err = serde_json::from_value::<Sample>(json!({"at": "soon"})).err().unwrap();
        assert!(err.to_string().contains("'soon'"));
    }
}
