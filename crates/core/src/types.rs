/// All instants handed to the engine are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Backend wall-clock date string, `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
