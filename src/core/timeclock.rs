use chrono::{NaiveDateTime, NaiveTime, Timelike};

const SECS_PER_DAY: i64 = 86_400;

/// Elapsed worked/break seconds for one attendance record, computed against a
/// caller-supplied `now`. This is the single authoritative implementation; the
/// snapshot endpoint and every persisted figure go through it.
#[derive(Debug, Clone, Copy)]
pub struct Timeclock {
    pub clock_in: NaiveTime,
    pub clock_out: Option<NaiveTime>,
    pub break_start: Option<NaiveDateTime>,
    /// Break seconds already committed by finished breaks.
    pub total_break_secs: i64,
    pub is_on_break: bool,
}

impl Timeclock {
    /// Seconds from `start` to `end` as times-of-day, rolling over midnight
    /// when the interval comes out negative.
    pub fn span_secs(start: NaiveTime, end: NaiveTime) -> i64 {
        let diff = end.num_seconds_from_midnight() as i64 - start.num_seconds_from_midnight() as i64;
        if diff < 0 { diff + SECS_PER_DAY } else { diff }
    }

    /// Seconds of the break currently in progress. Zero when not on break.
    pub fn current_break_secs(&self, now: NaiveDateTime) -> i64 {
        match (self.is_on_break, self.break_start) {
            (true, Some(start)) => (now - start).num_seconds().max(0),
            _ => 0,
        }
    }

    /// Worked seconds at `now`. Final once clocked out; paused while on break.
    pub fn worked_secs(&self, now: NaiveDateTime) -> i64 {
        let gross = match self.clock_out {
            Some(out) => Self::span_secs(self.clock_in, out),
            None => Self::span_secs(self.clock_in, now.time()),
        };
        let breaks = self.total_break_secs + self.current_break_secs(now);
        (gross - breaks).max(0)
    }

    /// Break seconds at `now`: committed total plus the running break, if any.
    pub fn break_secs(&self, now: NaiveDateTime) -> i64 {
        (self.total_break_secs + self.current_break_secs(now)).max(0)
    }
}

/// Hours/minutes/seconds triple for the display counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hms {
    pub hours: i64,
    pub minutes: u32,
    pub seconds: u32,
}

impl Hms {
    pub fn from_secs(total: i64) -> Self {
        let total = total.max(0);
        Self {
            hours: total / 3600,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }
}

impl std::fmt::Display for Hms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hr {:02} Mins {:02} Secs",
            self.hours, self.minutes, self.seconds
        )
    }
}

pub fn format_duration(secs: i64) -> String {
    Hms::from_secs(secs).to_string()
}

/// Parses an `HH:MM:SS` (or `HH:MM`) time string. A malformed value is
/// reported as a warning and treated as absent so callers can fall back
/// instead of failing.
pub fn parse_time_lenient(raw: &str, field: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| {
            tracing::warn!(field, raw, error = %e, "Unparseable time value, ignoring");
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap().and_time(t(h, m, s))
    }

    fn clocked_in(h: u32, m: u32) -> Timeclock {
        Timeclock {
            clock_in: t(h, m, 0),
            clock_out: None,
            break_start: None,
            total_break_secs: 0,
            is_on_break: false,
        }
    }

    #[test]
    fn zero_break_baseline_tracks_elapsed_time() {
        let clock = clocked_in(9, 0);
        assert_eq!(clock.worked_secs(at(9, 0, 30)), 30);
        assert_eq!(clock.worked_secs(at(10, 30, 0)), 5400);
        assert_eq!(clock.break_secs(at(10, 30, 0)), 0);
    }

    #[test]
    fn worked_counter_pauses_while_on_break() {
        let mut clock = clocked_in(9, 0);
        clock.is_on_break = true;
        clock.break_start = Some(at(9, 30, 0));

        // 10 minutes into the break: worked time is frozen at 30 minutes.
        assert_eq!(clock.worked_secs(at(9, 40, 0)), 30 * 60);
        assert_eq!(clock.current_break_secs(at(9, 40, 0)), 10 * 60);
        assert_eq!(clock.break_secs(at(9, 40, 0)), 10 * 60);
    }

    #[test]
    fn ending_a_break_resumes_from_the_paused_value() {
        // Break of exactly 10 minutes committed into the total.
        let clock = Timeclock {
            clock_in: t(9, 0, 0),
            clock_out: None,
            break_start: None,
            total_break_secs: 10 * 60,
            is_on_break: false,
        };
        // Immediately after the break ends, worked time is where it paused.
        assert_eq!(clock.worked_secs(at(9, 40, 0)), 30 * 60);
        // ... and advances again afterwards.
        assert_eq!(clock.worked_secs(at(9, 41, 0)), 31 * 60);
    }

    #[test]
    fn clocked_out_value_is_final() {
        let clock = Timeclock {
            clock_in: t(9, 0, 0),
            clock_out: Some(t(17, 0, 0)),
            break_start: None,
            total_break_secs: 10 * 60,
            is_on_break: false,
        };
        // 8h minus the 10 minute break, no drift.
        let expected = 8 * 3600 - 10 * 60;
        assert_eq!(clock.worked_secs(at(17, 0, 0)), expected);
        assert_eq!(clock.worked_secs(at(23, 0, 0)), expected);
        assert_eq!(clock.break_secs(at(23, 0, 0)), 10 * 60);
    }

    #[test]
    fn overnight_clock_out_rolls_over_midnight() {
        let clock = Timeclock {
            clock_in: t(22, 0, 0),
            clock_out: Some(t(6, 0, 0)),
            break_start: None,
            total_break_secs: 0,
            is_on_break: false,
        };
        assert_eq!(clock.worked_secs(at(6, 0, 0)), 8 * 3600);
    }

    #[test]
    fn worked_seconds_never_go_negative() {
        let clock = Timeclock {
            clock_in: t(9, 0, 0),
            clock_out: Some(t(9, 5, 0)),
            break_start: None,
            total_break_secs: 3600,
            is_on_break: false,
        };
        assert_eq!(clock.worked_secs(at(9, 5, 0)), 0);
    }

    #[test]
    fn display_format_matches_counter_style() {
        assert_eq!(format_duration(8 * 3600 + 5 * 60 + 9), "8 Hr 05 Mins 09 Secs");
        assert_eq!(format_duration(0), "0 Hr 00 Mins 00 Secs");
        assert_eq!(format_duration(-42), "0 Hr 00 Mins 00 Secs");
    }

    #[test]
    fn lenient_parse_accepts_short_form_and_rejects_garbage() {
        assert_eq!(parse_time_lenient("09:15:00", "threshold"), Some(t(9, 15, 0)));
        assert_eq!(parse_time_lenient("09:15", "threshold"), Some(t(9, 15, 0)));
        assert_eq!(parse_time_lenient("not-a-time", "threshold"), None);
    }
}
