//! Schedule of Ufa University of Science and Technology.
//!
//! Fetches the HTML schedule table of a student group or a teacher from
//! isu.uust.ru and turns it into timezone-aware events.
//!
//! Classroom schedules are not supported: their table has a different shape.
//! Schedule endpoints block any IP except Russian ones.

pub mod calendar;
pub mod error;
pub mod models;
pub mod parser;
pub mod schedule;
pub mod transport;
