use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

/// Rectangle of accepted coordinates, bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub(crate) min_latitude: f64,
    pub(crate) max_latitude: f64,
    pub(crate) min_longitude: f64,
    pub(crate) max_longitude: f64,
}

impl BoundingBox {
    pub const JAPAN: BoundingBox = BoundingBox {
        min_latitude: 20.0,
        max_latitude: 46.0,
        min_longitude: 122.0,
        max_longitude: 154.0,
    };

    pub fn preset(name: &str) -> Option<BoundingBox> {
        match name.trim().to_lowercase().as_str() {
            "japan" | "jp" => Some(Self::JAPAN),
            _ => None,
        }
    }

    pub fn latitudes(&self) -> RangeInclusive<f64> {
        self.min_latitude..=self.max_latitude
    }

    pub fn longitudes(&self) -> RangeInclusive<f64> {
        self.min_longitude..=self.max_longitude
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.latitudes().contains(&latitude) && self.longitudes().contains(&longitude)
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "latitude {} to {}, longitude {} to {}",
            self.min_latitude, self.max_latitude, self.min_longitude, self.max_longitude
        )
    }
}
