/// All timestamps are UTC, serialized as RFC 3339 strings.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
