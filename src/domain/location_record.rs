use crate::domain::SubmittedTimestamp;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single geolocation reading as it is kept in the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(deserialize_with = "deserialize_stored_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_address: Option<String>,
}

impl LocationRecord {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        LocationRecord {
            latitude,
            longitude,
            timestamp,
            source_address: None,
        }
    }

    pub fn received_now(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, Utc::now().trunc_subsecs(3))
    }

    pub fn with_source_address(mut self, source_address: impl Into<String>) -> Self {
        self.source_address = Some(source_address.into());
        self
    }
}

/// Older store files carry epoch numbers instead of RFC 3339 strings.
fn deserialize_stored_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    SubmittedTimestamp::deserialize(deserializer).map(SubmittedTimestamp::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tokyo() -> LocationRecord {
        LocationRecord::new(35.6895, 139.6917, Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap())
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let record = tokyo().with_source_address("203.0.113.7");

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            json!({
                "latitude": 35.6895,
                "longitude": 139.6917,
                "timestamp": "2025-03-01T09:30:00Z",
                "sourceAddress": "203.0.113.7",
            })
        );
    }

    #[test]
    fn omits_an_absent_source_address() {
        let value = serde_json::to_value(tokyo()).unwrap();

        assert!(value.get("sourceAddress").is_none());
    }

    #[test]
    fn a_serialized_sequence_reads_back_in_the_same_order() -> Result<(), serde_json::Error> {
        let records = vec![
            tokyo(),
            LocationRecord::new(43.0621, 141.3544, Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap()).with_source_address("::1"),
            LocationRecord::new(26.2124, 127.6809, Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap()),
        ];

        let text = serde_json::to_string_pretty(&records)?;
        let result: Vec<LocationRecord> = serde_json::from_str(&text)?;

        assert_eq!(result, records);
        Ok(())
    }

    #[test]
    fn reads_numeric_timestamps_and_writes_them_back_as_text() -> Result<(), serde_json::Error> {
        let records: Vec<LocationRecord> = serde_json::from_value(json!([
            {"latitude": 35.6895, "longitude": 139.6917, "timestamp": 1740821400000_i64},
            {"latitude": 35.6895, "longitude": 139.6917, "timestamp": 0.15},
        ]))?;

        assert_eq!(records[0].timestamp, Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
        assert_eq!(records[1].timestamp, Utc.timestamp_millis_opt(0).unwrap());
        assert_eq!(serde_json::to_value(&records[0])?["timestamp"], json!("2025-03-01T09:30:00Z"));
        Ok(())
    }

    #[test]
    fn received_now_truncates_to_milliseconds() {
        let record = LocationRecord::received_now(1.0, 2.0);

        assert_eq!(record.timestamp.timestamp_subsec_nanos() % 1_000_000, 0);
        assert_eq!(record.source_address, None);
    }
}
