use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

pub mod event_model;

/// Kind of schedule owner, with the codes the site expects in `WhatShow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParticipantType {
    Group = 1,
    Teacher = 2,
    /// Accepted, but classroom tables are not parsed.
    Room = 3,
}

impl ParticipantType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u32> for ParticipantType {
    type Error = ScheduleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Group),
            2 => Ok(Self::Teacher),
            3 => Ok(Self::Room),
            other => Err(ScheduleError::InvalidParticipantType(other)),
        }
    }
}

/// Half of the academic year.
/// 1. Autumn: from the start of the first September week to December 31
/// 2. Spring: from December 31 to the start of the first September week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SemesterType {
    Autumn = 1,
    Spring = 2,
}

impl SemesterType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u32> for SemesterType {
    type Error = ScheduleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Autumn),
            2 => Ok(Self::Spring),
            other => Err(ScheduleError::InvalidSemesterType(other)),
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "https://isu.uust.ru/";
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

/// A model for describing how the schedule is fetched.
/// Consists of:
/// 1. Base url of the site, the schedule path is resolved against it
/// 2. Request timeout in seconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FetchOptions {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}
