use chrono::{DateTime, Utc};

/// Timestamp as a client or an older store file wrote it, normalized to UTC.
///
/// Accepted forms are an RFC 3339 string, an ISO-8601 date-time without offset (read as UTC) and
/// a number of milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubmittedTimestamp(pub(crate) DateTime<Utc>);

impl SubmittedTimestamp {
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}
