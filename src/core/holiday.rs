use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

/// Public-holiday calendar loaded from the `holidays` table.
///
/// A working day is any calendar day that is neither a Sunday nor a
/// configured holiday.
#[derive(Debug, Default, Clone)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn is_sunday(date: NaiveDate) -> bool {
        date.weekday() == Weekday::Sun
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !Self::is_sunday(date) && !self.is_holiday(date)
    }

    /// Working days in the inclusive range, per the Sunday + holiday rule.
    pub fn working_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        let mut count = 0;
        let mut date = start;
        while date <= end {
            if self.is_working_day(date) {
                count += 1;
            }
            date += chrono::Duration::days(1);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sunday_is_not_a_working_day() {
        let cal = HolidayCalendar::default();
        // 2026-03-01 is a Sunday
        assert!(!cal.is_working_day(d(2026, 3, 1)));
        assert!(cal.is_working_day(d(2026, 3, 2)));
    }

    #[test]
    fn configured_holiday_is_not_a_working_day() {
        let cal = HolidayCalendar::from_dates([d(2026, 3, 26)]);
        assert!(cal.is_holiday(d(2026, 3, 26)));
        assert!(!cal.is_working_day(d(2026, 3, 26)));
        assert!(cal.is_working_day(d(2026, 3, 27)));
    }

    #[test]
    fn working_day_count_skips_sundays_and_holidays() {
        // 2026-06-01 is a Monday; the 7th is a Sunday.
        let cal = HolidayCalendar::from_dates([d(2026, 6, 4)]);
        assert_eq!(cal.working_days_between(d(2026, 6, 1), d(2026, 6, 7)), 5);
        assert_eq!(cal.working_days_between(d(2026, 6, 7), d(2026, 6, 7)), 0);
    }
}
