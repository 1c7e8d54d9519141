mod bounding_box;
mod location_record;
mod submitted_timestamp;

pub use bounding_box::BoundingBox;
pub use location_record::LocationRecord;
pub use submitted_timestamp::SubmittedTimestamp;
