use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::core::state::DayState;
use crate::core::timeclock::Timeclock;

/// Status label stored on the day's record, assigned at clock-in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

/// One row per (employee, date), enforced by a unique key. Created on first
/// clock-in, mutated by break start/end and clock-out, never deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:02:11")]
    pub clock_in: Option<NaiveTime>,
    #[schema(value_type = String, example = "17:30:00")]
    pub clock_out: Option<NaiveTime>,
    pub status: Option<String>,
    pub is_on_break: bool,
    #[schema(value_type = String, format = "date-time")]
    pub break_start: Option<NaiveDateTime>,
    pub total_break_secs: i64,
    pub has_taken_break: bool,
    /// Shift expectations denormalized at clock-in so later shift edits do
    /// not rewrite history.
    pub shift_id: Option<u64>,
    #[schema(value_type = String, example = "09:00:00")]
    pub expected_start: Option<NaiveTime>,
    #[schema(value_type = String, example = "17:00:00")]
    pub expected_end: Option<NaiveTime>,
    pub clock_in_lat: Option<f64>,
    pub clock_in_lng: Option<f64>,
    pub clock_out_lat: Option<f64>,
    pub clock_out_lng: Option<f64>,
}

impl Attendance {
    pub fn day_state(&self) -> DayState {
        DayState {
            clocked_in: self.clock_in.is_some(),
            clocked_out: self.clock_out.is_some(),
            is_on_break: self.is_on_break,
            break_start: self.break_start,
            total_break_secs: self.total_break_secs,
        }
    }

    /// The counters view of this record, if the day has started.
    pub fn timeclock(&self) -> Option<Timeclock> {
        Some(Timeclock {
            clock_in: self.clock_in?,
            clock_out: self.clock_out,
            break_start: self.break_start,
            total_break_secs: self.total_break_secs,
            is_on_break: self.is_on_break,
        })
    }
}
