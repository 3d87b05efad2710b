use chrono::{NaiveDateTime, NaiveTime};
use derive_more::Display;

use crate::model::attendance::AttendanceStatus;

/// Recoverable validation failures for the day's clock/break actions.
/// Every variant maps to a 400 with the display text as the user message.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[display(fmt = "Already clocked in today")]
    AlreadyClockedIn,
    #[display(fmt = "No clock-in found for today")]
    NotClockedIn,
    #[display(fmt = "Already clocked out today")]
    AlreadyClockedOut,
    #[display(fmt = "A break is already in progress")]
    AlreadyOnBreak,
    #[display(fmt = "No break is in progress")]
    NotOnBreak,
    #[display(fmt = "Invalid location coordinates")]
    InvalidLocation,
}

/// Latitude/longitude sanity check, applied before any state mutation.
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ActionError> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(ActionError::InvalidLocation);
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ActionError::InvalidLocation);
    }
    Ok(())
}

/// Status assigned at clock-in: on time up to the threshold, late after it.
pub fn status_for_clock_in(clock_in: NaiveTime, threshold: NaiveTime) -> AttendanceStatus {
    if clock_in <= threshold {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Late
    }
}

/// The break-state columns of today's attendance row, as read inside the
/// mutating request. Drives the
/// NotClockedIn -> ClockedIn -> OnBreak <-> ClockedIn -> ClockedOut machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayState {
    pub clocked_in: bool,
    pub clocked_out: bool,
    pub is_on_break: bool,
    pub break_start: Option<NaiveDateTime>,
    pub total_break_secs: i64,
}

/// Values committed when a break closes, explicitly or via clock-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakClose {
    pub total_break_secs: i64,
}

impl DayState {
    pub fn ensure_can_clock_in(&self) -> Result<(), ActionError> {
        if self.clocked_in {
            return Err(ActionError::AlreadyClockedIn);
        }
        Ok(())
    }

    pub fn ensure_can_start_break(&self) -> Result<(), ActionError> {
        if !self.clocked_in {
            return Err(ActionError::NotClockedIn);
        }
        if self.clocked_out {
            return Err(ActionError::AlreadyClockedOut);
        }
        if self.is_on_break {
            return Err(ActionError::AlreadyOnBreak);
        }
        Ok(())
    }

    /// Ends the running break, folding its elapsed seconds into the total.
    pub fn end_break(&self, now: NaiveDateTime) -> Result<BreakClose, ActionError> {
        if !self.clocked_in {
            return Err(ActionError::NotClockedIn);
        }
        if !self.is_on_break {
            return Err(ActionError::NotOnBreak);
        }
        let elapsed = match self.break_start {
            Some(start) => (now - start).num_seconds().max(0),
            // is_on_break without a marker violates the record invariant;
            // treat the break as empty rather than fail the action.
            None => {
                tracing::warn!("Break in progress without a start marker, committing zero");
                0
            }
        };
        Ok(BreakClose {
            total_break_secs: self.total_break_secs + elapsed,
        })
    }

    /// Validates clock-out, implicitly closing an open break first.
    pub fn close_for_clock_out(&self, now: NaiveDateTime) -> Result<BreakClose, ActionError> {
        if !self.clocked_in {
            return Err(ActionError::NotClockedIn);
        }
        if self.clocked_out {
            return Err(ActionError::AlreadyClockedOut);
        }
        if self.is_on_break {
            return self.end_break(now);
        }
        Ok(BreakClose {
            total_break_secs: self.total_break_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn late_threshold_boundaries() {
        let nine = t(9, 0);
        assert_eq!(status_for_clock_in(t(8, 59), nine), AttendanceStatus::Present);
        assert_eq!(status_for_clock_in(t(9, 0), nine), AttendanceStatus::Present);
        assert_eq!(status_for_clock_in(t(9, 15), nine), AttendanceStatus::Late);
    }

    #[test]
    fn double_clock_in_is_rejected() {
        let state = DayState {
            clocked_in: true,
            ..DayState::default()
        };
        assert_eq!(state.ensure_can_clock_in(), Err(ActionError::AlreadyClockedIn));
        assert!(DayState::default().ensure_can_clock_in().is_ok());
    }

    #[test]
    fn break_start_requires_an_open_day() {
        assert_eq!(
            DayState::default().ensure_can_start_break(),
            Err(ActionError::NotClockedIn)
        );
        let out = DayState {
            clocked_in: true,
            clocked_out: true,
            ..DayState::default()
        };
        assert_eq!(out.ensure_can_start_break(), Err(ActionError::AlreadyClockedOut));
        let on_break = DayState {
            clocked_in: true,
            is_on_break: true,
            break_start: Some(at(9, 30)),
            ..DayState::default()
        };
        assert_eq!(on_break.ensure_can_start_break(), Err(ActionError::AlreadyOnBreak));
    }

    #[test]
    fn ending_a_break_commits_exactly_its_duration() {
        let state = DayState {
            clocked_in: true,
            is_on_break: true,
            break_start: Some(at(9, 30)),
            total_break_secs: 120,
            ..DayState::default()
        };
        let close = state.end_break(at(9, 40)).unwrap();
        assert_eq!(close.total_break_secs, 120 + 10 * 60);
    }

    #[test]
    fn ending_a_break_that_never_started_is_rejected() {
        let state = DayState {
            clocked_in: true,
            ..DayState::default()
        };
        assert_eq!(state.end_break(at(10, 0)), Err(ActionError::NotOnBreak));
    }

    #[test]
    fn clock_out_implicitly_closes_an_open_break() {
        let state = DayState {
            clocked_in: true,
            is_on_break: true,
            break_start: Some(at(16, 50)),
            total_break_secs: 600,
            ..DayState::default()
        };
        let close = state.close_for_clock_out(at(17, 0)).unwrap();
        assert_eq!(close.total_break_secs, 600 + 10 * 60);
    }

    #[test]
    fn double_clock_out_is_rejected() {
        let state = DayState {
            clocked_in: true,
            clocked_out: true,
            ..DayState::default()
        };
        assert_eq!(
            state.close_for_clock_out(at(18, 0)),
            Err(ActionError::AlreadyClockedOut)
        );
    }

    #[test]
    fn coordinate_validation() {
        assert!(validate_coordinates(23.78, 90.41).is_ok());
        assert_eq!(
            validate_coordinates(91.0, 0.0),
            Err(ActionError::InvalidLocation)
        );
        assert_eq!(
            validate_coordinates(0.0, -181.0),
            Err(ActionError::InvalidLocation)
        );
        assert_eq!(
            validate_coordinates(f64::NAN, 0.0),
            Err(ActionError::InvalidLocation)
        );
    }
}
