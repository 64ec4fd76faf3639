//! Academic calendar arithmetic. Everything here is pure and evaluated in [`TIMEZONE`].
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{error::CalendarError, models::SemesterType};

/// Every timestamp of the schedule is local to Ufa.
pub const TIMEZONE: Tz = chrono_tz::Asia::Yekaterinburg;

/// Returns the Monday on or before September 1 of `academic_year`, at local midnight.
pub fn start_of_academic_year(academic_year: i32) -> Result<DateTime<Tz>, CalendarError> {
    let first_september = NaiveDate::from_ymd_opt(academic_year, 9, 1)
        .ok_or(CalendarError::YearOutOfRange(academic_year))?;
    let days_since_monday = u64::from(first_september.weekday().num_days_from_monday());
    let monday = first_september
        .checked_sub_days(Days::new(days_since_monday))
        .ok_or(CalendarError::YearOutOfRange(academic_year))?;

    TIMEZONE
        .from_local_datetime(&monday.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or(CalendarError::NonexistentMidnight(monday))
}

/// Classifies `reference_date` as the autumn or the spring half of an academic year.
///
/// Autumn runs from the start of the academic year to December 31, spring
/// from there to the start of the next academic year.
pub fn semester_type(reference_date: NaiveDate) -> Result<SemesterType, CalendarError> {
    let year = reference_date.year();
    let this_year_start = start_of_academic_year(year)?.date_naive();
    let next_year = year
        .checked_add(1)
        .ok_or(CalendarError::YearOutOfRange(year))?;
    let next_year_start = start_of_academic_year(next_year)?.date_naive();

    classify(reference_date, this_year_start, next_year_start)
}

/// [`semester_type`] of today's date in [`TIMEZONE`].
pub fn current_semester_type() -> Result<SemesterType, CalendarError> {
    semester_type(Utc::now().with_timezone(&TIMEZONE).date_naive())
}

fn classify(
    reference_date: NaiveDate,
    this_year_start: NaiveDate,
    next_year_start: NaiveDate,
) -> Result<SemesterType, CalendarError> {
    if reference_date >= this_year_start {
        return Ok(SemesterType::Autumn);
    }
    if reference_date < next_year_start {
        return Ok(SemesterType::Spring);
    }

    Err(CalendarError::SemesterTypeNotDetermined(reference_date))
}
