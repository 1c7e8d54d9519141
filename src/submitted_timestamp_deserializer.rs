use crate::domain::SubmittedTimestamp;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{Error, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;

impl<'de> Deserialize<'de> for SubmittedTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SubmittedTimestampVisitor;

        impl Visitor<'_> for SubmittedTimestampVisitor {
            type Value = SubmittedTimestamp;

            fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                write!(formatter, "an ISO-8601 date-time string or milliseconds since the Unix epoch")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                let value = v.trim();
                if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
                    return Ok(SubmittedTimestamp(datetime.with_timezone(&Utc)));
                }

                // No offset given, read as UTC
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|naive| SubmittedTimestamp(naive.and_utc()))
                    .map_err(|_| Error::invalid_value(Unexpected::Str(v), &self))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                DateTime::from_timestamp_millis(v)
                    .map(SubmittedTimestamp)
                    .ok_or_else(|| Error::invalid_value(Unexpected::Signed(v), &self))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                let millis = i64::try_from(v).map_err(|_| Error::invalid_value(Unexpected::Unsigned(v), &self))?;
                self.visit_i64(millis)
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                if !v.is_finite() || v.abs() > i64::MAX as f64 {
                    return Err(Error::invalid_value(Unexpected::Float(v), &self));
                }
                self.visit_i64(v.round() as i64)
            }
        }

        deserializer.deserialize_any(SubmittedTimestampVisitor)
    }
}
