//! Module with the event model produced from isu.uust.ru's schedule table
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::ScheduleError;

/// Start times of the ten class periods of a day, in order.
pub const DAILY_SLOTS: [&str; 10] = [
    "08:00", "09:35", "11:35", "13:10", "15:10", "16:45", "18:20", "19:55", "21:25", "22:55",
];

/// One occurrence of a class.
/// Text fields are copied from the table cells as they are:
/// 1. Title of the class
/// 2. Type of the class (lecture, practice, ...)
/// 3. Participant involved, a student group name or a teacher's short name
/// 4. Location
/// 5. Comment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Event {
    pub title: String,
    pub event_type: String,
    pub participant: String,
    pub location: String,
    pub comment: String,
    pub start_datetime: DateTime<Tz>,
    pub end_datetime: DateTime<Tz>,
}

impl Event {
    /// 1-based sequence number of the class period this event starts in.
    pub fn daily_number(&self) -> Result<usize, ScheduleError> {
        let start_time = self.start_datetime.format("%H:%M").to_string();
        DAILY_SLOTS
            .iter()
            .position(|slot| *slot == start_time)
            .map(|index| index + 1)
            .ok_or(ScheduleError::ValueNotFound {
                kind: "daily slot",
                value: start_time,
            })
    }
}
