use std::vec;

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use log::debug;
use scraper::{html::Select, ElementRef, Html, Selector};

use crate::{calendar::TIMEZONE, error::ScheduleError, models::event_model::Event};

/// Weekday names as the site prints them in day header rows, starting from Monday.
pub const WEEKDAYS: [&str; 7] = [
    "Понедельник",
    "Вторник",
    "Среда",
    "Четверг",
    "Пятница",
    "Суббота",
    "Воскресенье",
];

const DAY_HEADER_CLASS: &str = "dayheader";
const NO_INFO_CLASS: &str = "noinfo";

/// A parsed schedule page, anchored to the start of its academic year.
pub struct SchedulePage {
    document: Html,
    rows: Selector,
    cells: Selector,
    start_of_academic_year: NaiveDateTime,
}

impl SchedulePage {
    pub fn parse(
        html: &str,
        start_of_academic_year: NaiveDateTime,
    ) -> Result<SchedulePage, ScheduleError> {
        Ok(SchedulePage {
            document: Html::parse_document(html),
            rows: selector("tbody tr")?,
            cells: selector("td")?,
            start_of_academic_year,
        })
    }

    /// Lazily walks the table rows; every call starts from the first row again.
    pub fn events(&self) -> Events<'_> {
        Events {
            rows: self.document.select(&self.rows),
            cells: &self.cells,
            start_of_academic_year: self.start_of_academic_year,
            weekday_index: 0,
            pending: None,
            finished: false,
        }
    }
}

fn selector(css: &'static str) -> Result<Selector, ScheduleError> {
    Selector::parse(css).map_err(|err| ScheduleError::Selector(err.to_string()))
}

/// A data row waiting to be emitted once per remaining week.
struct PendingRow {
    title: String,
    event_type: String,
    participant: String,
    location: String,
    comment: String,
    start_time: TimeDelta,
    end_time: TimeDelta,
    weekday_index: u32,
    weeks: vec::IntoIter<u32>,
}

impl PendingRow {
    fn occurrence(
        &self,
        start_of_academic_year: NaiveDateTime,
        week: u32,
    ) -> Result<Event, ScheduleError> {
        let weekday = TimeDelta::days(i64::from(self.weekday_index));
        let day = TimeDelta::try_weeks(i64::from(week - 1))
            .and_then(|offset| start_of_academic_year.checked_add_signed(offset + weekday))
            .ok_or_else(|| ScheduleError::MalformedWeekNumber(week.to_string()))?;

        Ok(Event {
            title: self.title.clone(),
            event_type: self.event_type.clone(),
            participant: self.participant.clone(),
            location: self.location.clone(),
            comment: self.comment.clone(),
            start_datetime: localize(day + self.start_time)?,
            end_datetime: localize(day + self.end_time)?,
        })
    }
}

/// Iterator over the events of a [`SchedulePage`], in document order.
///
/// Stops after the first error.
pub struct Events<'a> {
    rows: Select<'a, 'a>,
    cells: &'a Selector,
    start_of_academic_year: NaiveDateTime,
    weekday_index: u32,
    pending: Option<PendingRow>,
    finished: bool,
}

impl Iterator for Events<'_> {
    type Item = Result<Event, ScheduleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.advance().transpose()?;
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

impl Events<'_> {
    fn advance(&mut self) -> Result<Option<Event>, ScheduleError> {
        loop {
            if let Some(pending) = self.pending.as_mut() {
                if let Some(week) = pending.weeks.next() {
                    return pending
                        .occurrence(self.start_of_academic_year, week)
                        .map(Some);
                }
                self.pending = None;
            }

            let Some(row) = self.rows.next() else {
                return Ok(None);
            };
            self.pending = self.read_row(row)?;
        }
    }

    fn read_row(&mut self, row: ElementRef) -> Result<Option<PendingRow>, ScheduleError> {
        let columns: Vec<String> = row
            .select(self.cells)
            .map(|cell| cell.text().collect())
            .collect();
        let has_class = |class: &str| row.value().classes().any(|c| c == class);

        if has_class(DAY_HEADER_CLASS) {
            let day = column(&columns, 0)?;
            self.weekday_index = weekday_index(day)?;
            debug!("Found header for {} (weekday {})", day, self.weekday_index);
        }

        if has_class(NO_INFO_CLASS) {
            debug!("Skipping {} row", NO_INFO_CLASS);
            return Ok(None);
        }

        let (start_time, end_time) = parse_time_range(column(&columns, 1)?)?;
        let weeks = parse_weeks(column(&columns, 2)?)?;

        Ok(Some(PendingRow {
            title: column(&columns, 3)?.to_owned(),
            event_type: column(&columns, 4)?.to_owned(),
            participant: column(&columns, 5)?.to_owned(),
            location: column(&columns, 6)?.to_owned(),
            comment: column(&columns, 7)?.to_owned(),
            start_time,
            end_time,
            weekday_index: self.weekday_index,
            weeks: weeks.into_iter(),
        }))
    }
}

fn column(columns: &[String], index: usize) -> Result<&str, ScheduleError> {
    columns
        .get(index)
        .map(String::as_str)
        .ok_or(ScheduleError::MissingColumn(index))
}

fn weekday_index(day: &str) -> Result<u32, ScheduleError> {
    WEEKDAYS
        .iter()
        .position(|weekday| *weekday == day)
        .and_then(|index| u32::try_from(index).ok())
        .ok_or_else(|| ScheduleError::ValueNotFound {
            kind: "weekday",
            value: day.to_owned(),
        })
}

/// Parses `HH:MM-HH:MM` into offsets from midnight.
fn parse_time_range(text: &str) -> Result<(TimeDelta, TimeDelta), ScheduleError> {
    let malformed = || ScheduleError::MalformedTimeRange(text.to_owned());
    let (start, end) = text.split_once('-').ok_or_else(malformed)?;
    let start = parse_time_of_day(start).ok_or_else(malformed)?;
    let end = parse_time_of_day(end).ok_or_else(malformed)?;
    if end <= start {
        return Err(malformed());
    }
    Ok((start, end))
}

/// `24:00` is accepted; as a start it never passes the `end > start` check.
fn parse_time_of_day(text: &str) -> Option<TimeDelta> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: i64 = hours.trim().parse().ok()?;
    let minutes: i64 = minutes.trim().parse().ok()?;
    let in_day = (0..24).contains(&hours) && (0..60).contains(&minutes);
    if !in_day && (hours, minutes) != (24, 0) {
        return None;
    }
    Some(TimeDelta::hours(hours) + TimeDelta::minutes(minutes))
}

/// Parses a whitespace separated list of 1-based week numbers.
fn parse_weeks(text: &str) -> Result<Vec<u32>, ScheduleError> {
    text.split_whitespace()
        .map(|week| match week.parse::<u32>() {
            Ok(number) if number > 0 => Ok(number),
            _ => Err(ScheduleError::MalformedWeekNumber(week.to_owned())),
        })
        .collect()
}

fn localize(local: NaiveDateTime) -> Result<DateTime<Tz>, ScheduleError> {
    TIMEZONE
        .from_local_datetime(&local)
        .earliest()
        .ok_or(ScheduleError::NonexistentLocalTime(local))
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod tests;
