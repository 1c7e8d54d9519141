use crate::domain::BoundingBox;
use serde::de::{Error, MapAccess, Unexpected, Visitor, value::MapAccessDeserializer};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;

impl<'de> Deserialize<'de> for BoundingBox {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BoundingBoxVisitor;

        impl<'de> Visitor<'de> for BoundingBoxVisitor {
            type Value = BoundingBox;

            fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                write!(formatter, "a preset name like 'japan' or a table with min/max latitude and longitude")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                BoundingBox::preset(v).ok_or_else(|| Error::invalid_value(Unexpected::Str(v), &"a known bounding box preset ('japan')"))
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                #[derive(Debug, Deserialize)]
                struct Inner {
                    min_latitude: f64,
                    max_latitude: f64,
                    min_longitude: f64,
                    max_longitude: f64,
                }

                let inner = Inner::deserialize(MapAccessDeserializer::new(map))?;

                for latitude in [inner.min_latitude, inner.max_latitude] {
                    if !(-90.0..=90.0).contains(&latitude) {
                        return Err(Error::custom(format!("invalid bounding box latitude: {}, must be between -90 and 90", latitude)));
                    }
                }

                for longitude in [inner.min_longitude, inner.max_longitude] {
                    if !(-180.0..=180.0).contains(&longitude) {
                        return Err(Error::custom(format!("invalid bounding box longitude: {}, must be between -180 and 180", longitude)));
                    }
                }

                if inner.min_latitude > inner.max_latitude {
                    return Err(Error::custom(format!(
                        "invalid bounding box: min_latitude {} is greater than max_latitude {}",
                        inner.min_latitude, inner.max_latitude
                    )));
                }

                if inner.min_longitude > inner.max_longitude {
                    return Err(Error::custom(format!(
                        "invalid bounding box: min_longitude {} is greater than max_longitude {}",
                        inner.min_longitude, inner.max_longitude
                    )));
                }

                Ok(BoundingBox {
                    min_latitude: inner.min_latitude,
                    max_latitude: inner.max_latitude,
                    min_longitude: inner.min_longitude,
                    max_longitude: inner.max_longitude,
                })
            }
        }

        deserializer.deserialize_any(BoundingBoxVisitor)
    }
}
