use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;
use log::{info, warn};
use reqwest::{Client, Url};

use crate::{
    calendar::{current_semester_type, start_of_academic_year},
    error::ScheduleError,
    models::{FetchOptions, ParticipantType, SemesterType},
    parser::SchedulePage,
    transport::{ScheduleRequest, Transport},
};

/// Path of the HTML schedule table, relative to the base url.
pub const SCHEDULE_PATH: &str = "api/new_schedule_api";

/// A schedule query for one group or teacher in one academic year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    participant_type: ParticipantType,
    participant_id: u32,
    academic_year: i32,
    start_datetime_of_academic_year: DateTime<Tz>,
}

impl Schedule {
    pub fn new(
        participant_type: ParticipantType,
        participant_id: u32,
        academic_year: i32,
    ) -> Result<Schedule, ScheduleError> {
        Ok(Schedule {
            participant_type,
            participant_id,
            academic_year,
            start_datetime_of_academic_year: start_of_academic_year(academic_year)?,
        })
    }

    /// Same as [`Schedule::new`], validating a raw participant type code first.
    pub fn from_code(
        participant_type: u32,
        participant_id: u32,
        academic_year: i32,
    ) -> Result<Schedule, ScheduleError> {
        Schedule::new(
            ParticipantType::try_from(participant_type)?,
            participant_id,
            academic_year,
        )
    }

    pub fn participant_type(&self) -> ParticipantType {
        self.participant_type
    }

    pub fn participant_id(&self) -> u32 {
        self.participant_id
    }

    pub fn academic_year(&self) -> i32 {
        self.academic_year
    }

    pub fn start_datetime_of_academic_year(&self) -> DateTime<Tz> {
        self.start_datetime_of_academic_year
    }

    /// Code of the semester as the site expects it: the last two digits of the
    /// academic year followed by the semester code, e.g. `231`.
    pub fn schedule_semester_id(&self, semester_type: SemesterType) -> String {
        let year = self.academic_year.to_string();
        let suffix_start = year
            .char_indices()
            .rev()
            .nth(1)
            .map_or(0, |(index, _)| index);
        format!("{}{}", &year[suffix_start..], semester_type.code())
    }

    pub fn build_request(
        &self,
        semester_type: SemesterType,
        options: &FetchOptions,
    ) -> Result<ScheduleRequest, ScheduleError> {
        let invalid_base_url = |reason: String| ScheduleError::InvalidBaseUrl {
            base_url: options.base_url.clone(),
            reason,
        };
        let url = Url::parse(&options.base_url)
            .and_then(|base| base.join(SCHEDULE_PATH))
            .map_err(|err| invalid_base_url(err.to_string()))?;

        let mut query = vec![
            ("WhatShow", self.participant_type.code().to_string()),
            (
                "schedule_semestr_id",
                self.schedule_semester_id(semester_type),
            ),
            ("weeks", "0".to_string()),
        ];
        match self.participant_type {
            ParticipantType::Group => {
                query.push(("student_group_id", self.participant_id.to_string()))
            }
            ParticipantType::Teacher => query.push(("teacher", self.participant_id.to_string())),
            ParticipantType::Room => {
                warn!("Room schedules are not supported, requesting without a participant")
            }
        }

        Ok(ScheduleRequest {
            url: url.to_string(),
            query,
            timeout: Duration::from_secs(options.request_timeout),
        })
    }

    /// Fetches the schedule page through a fresh [`Client`].
    pub async fn fetch_events(
        &self,
        semester_type: Option<SemesterType>,
        options: &FetchOptions,
    ) -> Result<SchedulePage, ScheduleError> {
        self.fetch_events_with(&Client::new(), semester_type, options)
            .await
    }

    /// Fetches the schedule page of `semester_type`, or of the current
    /// semester when it is not given. Events are read from the returned page.
    pub async fn fetch_events_with<T: Transport>(
        &self,
        transport: &T,
        semester_type: Option<SemesterType>,
        options: &FetchOptions,
    ) -> Result<SchedulePage, ScheduleError> {
        let semester_type = match semester_type {
            Some(semester_type) => semester_type,
            None => current_semester_type()?,
        };
        info!(
            "Getting {:?} schedule of {:?} {} for {}",
            semester_type, self.participant_type, self.participant_id, self.academic_year
        );
        let request = self.build_request(semester_type, options)?;
        let body = transport.execute(&request).await?;

        SchedulePage::parse(&body, self.start_datetime_of_academic_year.naive_local())
    }
}
