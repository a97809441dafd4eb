//! Firestore-style timestamp values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A timestamp that serializes as the datastore's tagged object:
///
/// ```json
/// {"__datatype__": "timestamp", "value": {"_seconds": 0, "_nanoseconds": 0}}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    /// Creates a timestamp from raw seconds/nanoseconds.
    pub fn new(seconds: i64, nanoseconds: u32) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Unix seconds component.
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Nanoseconds component.
    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanoseconds: dt.timestamp_subsec_nanos(),
        }
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .expect("midnight exists on every date")
            .and_utc();
        Self::from(midnight)
    }
}

#[derive(Serialize)]
struct TimestampValue {
    #[serde(rename = "_seconds")]
    seconds: i64,
    #[serde(rename = "_nanoseconds")]
    nanoseconds: u32,
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("__datatype__", "timestamp")?;
        map.serialize_entry(
            "value",
            &TimestampValue {
                seconds: self.seconds,
                nanoseconds: self.nanoseconds,
            },
        )?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_serialization_shape() {
        let ts = Timestamp::new(1_600_000_000, 250);
        let value = serde_json::to_value(ts).expect("should serialize");

        assert_eq!(value["__datatype__"], "timestamp");
        assert_eq!(value["value"]["_seconds"], 1_600_000_000i64);
        assert_eq!(value["value"]["_nanoseconds"], 250);
    }

    #[test]
    fn test_from_datetime() {
        let dt = DateTime::from_timestamp(1_700_000_000, 42).expect("valid timestamp");
        let ts = Timestamp::from(dt);
        assert_eq!(ts.seconds(), 1_700_000_000);
        assert_eq!(ts.nanoseconds(), 42);
    }

    #[test]
    fn test_from_naive_date() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).expect("valid date");
        let ts = Timestamp::from(date);
        assert_eq!(ts.seconds(), 86_400);
        assert_eq!(ts.nanoseconds(), 0);
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::new(100, 0);
        let later = Timestamp::new(100, 1);
        assert!(later > earlier);
        assert!(Timestamp::new(101, 0) > later);
    }
}
