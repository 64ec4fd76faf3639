use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Failures of the academic calendar arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("year {0} is outside of the supported calendar range")]
    YearOutOfRange(i32),

    #[error("midnight of {0} does not exist in the schedule timezone")]
    NonexistentMidnight(NaiveDate),

    /// The reference date fell into neither half of the academic year.
    #[error("semester type could not be determined for {0}")]
    SemesterTypeNotDetermined(NaiveDate),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid participant type: {0}")]
    InvalidParticipantType(u32),

    #[error("invalid semester type: {0}")]
    InvalidSemesterType(u32),

    #[error("invalid base url {base_url}: {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// A fixed token (weekday name, daily slot) matched none of the known values.
    #[error("{kind} not found: {value:?}")]
    ValueNotFound { kind: &'static str, value: String },

    #[error("row has no column {0}")]
    MissingColumn(usize),

    #[error("malformed time range: {0:?}")]
    MalformedTimeRange(String),

    #[error("malformed week number: {0:?}")]
    MalformedWeekNumber(String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("local time {0} does not exist in the schedule timezone")]
    NonexistentLocalTime(NaiveDateTime),
}
