use chrono::{Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::holiday::HolidayCalendar;

/// One calendar month, or a whole year when `month` is `None`.
#[derive(Debug, Clone, Copy)]
pub struct Period {
    pub year: i32,
    pub month: Option<u32>,
}

impl Period {
    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        let (next_y, next_m) = match self.month {
            Some(12) | None => (self.year + 1, 1),
            Some(m) => (self.year, m + 1),
        };
        Some(NaiveDate::from_ymd_opt(next_y, next_m, 1)? - Duration::days(1))
    }
}

/// Attendance facts for one (employee, date) as read from the database.
#[derive(Debug, Clone)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub clocked_in: bool,
    pub status: Option<String>,
}

/// An approved leave request's date range, inclusive on both ends.
#[derive(Debug, Clone, Copy)]
pub struct LeaveSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LeaveSpan {
    fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Per-employee attendance counts over a period. Also one company-total row
/// summed across employees for the export table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SummaryCounts {
    pub attendance: u32,
    pub late: u32,
    pub leave: u32,
    pub absent: u32,
    pub holidays: u32,
    pub sundays: u32,
    /// Working days elapsed through min(today, period end).
    pub working_days_elapsed: u32,
}

impl SummaryCounts {
    pub fn accumulate(&mut self, other: &SummaryCounts) {
        self.attendance += other.attendance;
        self.late += other.late;
        self.leave += other.leave;
        self.absent += other.absent;
        self.holidays += other.holidays;
        self.sundays += other.sundays;
        self.working_days_elapsed += other.working_days_elapsed;
    }
}

fn is_late(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("late"))
}

fn on_leave(leaves: &[LeaveSpan], date: NaiveDate) -> bool {
    leaves.iter().any(|l| l.covers(date))
}

/// Counts attended, late, on-approved-leave and absent working days for one
/// employee over `period`. Future days never count; a day with both a
/// clock-in and overlapping leave counts toward attendance only.
pub fn summarize(
    period: Period,
    today: NaiveDate,
    records: &[DayRecord],
    leaves: &[LeaveSpan],
    calendar: &HolidayCalendar,
) -> SummaryCounts {
    let mut counts = SummaryCounts::default();
    let (Some(first), Some(last)) = (period.first_day(), period.last_day()) else {
        return counts;
    };

    let mut date = first;
    while date <= last {
        if HolidayCalendar::is_sunday(date) {
            counts.sundays += 1;
        } else if calendar.is_holiday(date) {
            counts.holidays += 1;
        } else if date <= today {
            counts.working_days_elapsed += 1;

            let record = records.iter().find(|r| r.date == date && r.clocked_in);
            if let Some(record) = record {
                counts.attendance += 1;
                if is_late(record.status.as_deref()) {
                    counts.late += 1;
                }
            } else if on_leave(leaves, date) {
                counts.leave += 1;
            }
        }
        date += Duration::days(1);
    }

    counts.absent = counts
        .working_days_elapsed
        .saturating_sub(counts.attendance + counts.leave);
    counts
}

/// Classification of one calendar day for the month-view detail feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DayKind {
    Present,
    Late,
    Leave,
    Holiday,
    Sunday,
    Absent,
    Future,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayDetail {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub kind: DayKind,
}

/// Labels every day of the period for the calendar modal.
pub fn classify_days(
    period: Period,
    today: NaiveDate,
    records: &[DayRecord],
    leaves: &[LeaveSpan],
    calendar: &HolidayCalendar,
) -> Vec<DayDetail> {
    let (Some(first), Some(last)) = (period.first_day(), period.last_day()) else {
        return Vec::new();
    };

    let mut days = Vec::with_capacity(31);
    let mut date = first;
    while date <= last {
        let kind = if HolidayCalendar::is_sunday(date) {
            DayKind::Sunday
        } else if calendar.is_holiday(date) {
            DayKind::Holiday
        } else if date > today {
            DayKind::Future
        } else if let Some(record) = records.iter().find(|r| r.date == date && r.clocked_in) {
            if is_late(record.status.as_deref()) {
                DayKind::Late
            } else {
                DayKind::Present
            }
        } else if on_leave(leaves, date) {
            DayKind::Leave
        } else {
            DayKind::Absent
        };
        days.push(DayDetail { date, kind });
        date += Duration::days(1);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn attended(dates: &[NaiveDate]) -> Vec<DayRecord> {
        dates
            .iter()
            .map(|&date| DayRecord {
                date,
                clocked_in: true,
                status: Some("present".into()),
            })
            .collect()
    }

    // June 2026: 30 days, Sundays on the 7th/14th/21st/28th.
    fn june() -> Period {
        Period::month(2026, 6)
    }

    #[test]
    fn completed_month_with_one_holiday() {
        // 30 days, 4 Sundays, 1 holiday => 25 working days. 15 attended,
        // no leave, month fully elapsed => 10 absent.
        let cal = HolidayCalendar::from_dates([d(2026, 6, 1)]);
        let days: Vec<NaiveDate> = (2..=30)
            .filter(|&n| {
                let date = d(2026, 6, n);
                cal.is_working_day(date)
            })
            .take(15)
            .map(|n| d(2026, 6, n))
            .collect();
        assert_eq!(days.len(), 15);

        let counts = summarize(june(), d(2026, 7, 15), &attended(&days), &[], &cal);
        assert_eq!(counts.working_days_elapsed, 25);
        assert_eq!(counts.attendance, 15);
        assert_eq!(counts.leave, 0);
        assert_eq!(counts.absent, 10);
        assert_eq!(counts.sundays, 4);
        assert_eq!(counts.holidays, 1);
    }

    #[test]
    fn future_days_in_the_selected_month_never_count() {
        let cal = HolidayCalendar::from_dates([d(2026, 6, 1)]);
        let today = d(2026, 6, 10);
        // Elapsed: Jun 1..=10 minus Sunday the 7th minus the holiday = 8.
        let days = [
            d(2026, 6, 2),
            d(2026, 6, 3),
            d(2026, 6, 4),
            d(2026, 6, 5),
            d(2026, 6, 8),
            d(2026, 6, 9),
        ];
        let leaves = [LeaveSpan {
            start: d(2026, 6, 10),
            end: d(2026, 6, 12),
        }];

        let counts = summarize(june(), today, &attended(&days), &leaves, &cal);
        assert_eq!(counts.working_days_elapsed, 8);
        assert_eq!(counts.attendance, 6);
        assert_eq!(counts.leave, 1); // only the elapsed leave day counts
        assert_eq!(counts.absent, 1);
    }

    #[test]
    fn attendance_wins_over_overlapping_leave() {
        let cal = HolidayCalendar::default();
        let today = d(2026, 6, 3);
        let records = attended(&[d(2026, 6, 2)]);
        let leaves = [LeaveSpan {
            start: d(2026, 6, 2),
            end: d(2026, 6, 3),
        }];

        let counts = summarize(june(), today, &records, &leaves, &cal);
        assert_eq!(counts.attendance, 1);
        assert_eq!(counts.leave, 1); // Jun 3 only, Jun 2 is attendance
    }

    #[test]
    fn late_status_is_matched_case_insensitively() {
        let cal = HolidayCalendar::default();
        let records = vec![
            DayRecord {
                date: d(2026, 6, 2),
                clocked_in: true,
                status: Some("Late".into()),
            },
            DayRecord {
                date: d(2026, 6, 3),
                clocked_in: true,
                status: Some("present".into()),
            },
        ];
        let counts = summarize(june(), d(2026, 6, 3), &records, &[], &cal);
        assert_eq!(counts.attendance, 2);
        assert_eq!(counts.late, 1);
    }

    #[test]
    fn absent_count_is_clamped_at_zero() {
        let cal = HolidayCalendar::default();
        // Leave covers the whole month and every day was attended anyway;
        // attendance + leave can never push absent below zero.
        let days: Vec<NaiveDate> = (1..=30)
            .map(|n| d(2026, 6, n))
            .filter(|&date| cal.is_working_day(date))
            .collect();
        let leaves = [LeaveSpan {
            start: d(2026, 6, 1),
            end: d(2026, 6, 30),
        }];
        let counts = summarize(june(), d(2026, 7, 1), &attended(&days), &leaves, &cal);
        assert_eq!(counts.absent, 0);
    }

    #[test]
    fn yearly_period_spans_all_months() {
        let period = Period::year(2026);
        assert_eq!(period.first_day(), Some(d(2026, 1, 1)));
        assert_eq!(period.last_day(), Some(d(2026, 12, 31)));
        assert_eq!(Period::month(2026, 2).last_day(), Some(d(2026, 2, 28)));
        assert_eq!(Period::month(2028, 2).last_day(), Some(d(2028, 2, 29)));
    }

    #[test]
    fn company_total_row_sums_per_employee_counts() {
        let mut total = SummaryCounts::default();
        let a = SummaryCounts {
            attendance: 20,
            late: 2,
            leave: 1,
            absent: 4,
            holidays: 1,
            sundays: 4,
            working_days_elapsed: 25,
        };
        total.accumulate(&a);
        total.accumulate(&a);
        assert_eq!(total.attendance, 40);
        assert_eq!(total.absent, 8);
        assert_eq!(total.working_days_elapsed, 50);
    }

    #[test]
    fn calendar_feed_labels_every_day() {
        let cal = HolidayCalendar::from_dates([d(2026, 6, 1)]);
        let today = d(2026, 6, 10);
        let records = vec![DayRecord {
            date: d(2026, 6, 2),
            clocked_in: true,
            status: Some("late".into()),
        }];
        let leaves = [LeaveSpan {
            start: d(2026, 6, 3),
            end: d(2026, 6, 3),
        }];

        let days = classify_days(june(), today, &records, &leaves, &cal);
        assert_eq!(days.len(), 30);
        assert_eq!(days[0].kind, DayKind::Holiday);
        assert_eq!(days[1].kind, DayKind::Late);
        assert_eq!(days[2].kind, DayKind::Leave);
        assert_eq!(days[3].kind, DayKind::Absent);
        assert_eq!(days[6].kind, DayKind::Sunday);
        assert_eq!(days[10].kind, DayKind::Future);
    }
}
