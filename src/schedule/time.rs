use std::ops::Range;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::roster::Shift;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Minutes from `start` to `end`, wrapping past midnight when `end <= start`.
/// Always in `0..MINUTES_PER_DAY`.
pub fn shift_duration_minutes(start: NaiveTime, end: NaiveTime) -> u32 {
    let start = minutes_of_day(start);
    let end = minutes_of_day(end);
    (end + MINUTES_PER_DAY - start) % MINUTES_PER_DAY
}

/// Rest between the end of `previous` and the start of `next`, measured on
/// the real calendar dates of both shifts. `None` when `previous` has no
/// defined end.
pub fn rest_minutes(previous: &Shift, next: &Shift) -> Option<i64> {
    let previous_end = previous.ends_at()?;
    Some((next.starts_at() - previous_end).num_minutes())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub start: NaiveDate,
    pub days: usize,
}

impl SchedulePeriod {
    pub fn new(start: NaiveDate, days: usize) -> Self {
        Self { start, days }
    }

    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self::new(start, (next - start).num_days() as usize))
    }

    pub fn month_of(date: NaiveDate) -> Self {
        Self::month(date.year(), date.month()).unwrap_or(Self::new(date, 1))
    }

    /// Parses `YYYY-MM`.
    pub fn parse_month(input: &str) -> Option<Self> {
        let (year, month) = input.trim().split_once('-')?;
        Self::month(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn next_month(&self) -> Self {
        self.start
            .checked_add_days(Days::new(self.days as u64))
            .map(Self::month_of)
            .unwrap_or(*self)
    }

    pub fn previous_month(&self) -> Self {
        self.start
            .pred_opt()
            .map(Self::month_of)
            .unwrap_or(*self)
    }

    pub fn end(&self) -> NaiveDate {
        self.date_of(self.days.saturating_sub(1)).unwrap_or(self.start)
    }

    pub fn date_of(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.days {
            return None;
        }
        self.start.checked_add_days(Days::new(index as u64))
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start).num_days();
        (offset >= 0 && (offset as usize) < self.days).then_some(offset as usize)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    pub fn label(&self) -> String {
        self.start.format("%B %Y").to_string()
    }

    /// Day-index ranges of the Monday-to-Sunday weeks that lie entirely
    /// inside the period.
    pub fn full_weeks(&self) -> Vec<Range<usize>> {
        let offset = (7 - self.start.weekday().num_days_from_monday() as usize) % 7;
        (offset..self.days)
            .step_by(7)
            .filter(|&first| first + 7 <= self.days)
            .map(|first| first..first + 7)
            .collect()
    }
}

impl Default for SchedulePeriod {
    fn default() -> Self {
        Self::month_of(chrono::Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub index: usize,
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub is_today: bool,
}

impl CalendarDay {
    pub fn weekday_label(&self) -> &'static str {
        match self.date.weekday() {
            Weekday::Mon => "Mo",
            Weekday::Tue => "Tu",
            Weekday::Wed => "We",
            Weekday::Thu => "Th",
            Weekday::Fri => "Fr",
            Weekday::Sat => "Sa",
            Weekday::Sun => "Su",
        }
    }
}

pub fn calendar_range(period: &SchedulePeriod, today: NaiveDate) -> Vec<CalendarDay> {
    (0..period.days)
        .filter_map(|index| {
            let date = period.date_of(index)?;
            Some(CalendarDay {
                index,
                date,
                is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                is_today: date == today,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{EmployeeId, ShiftBounds, ShiftKind};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn shift_on(day: NaiveDate, start: NaiveTime, end: NaiveTime) -> Shift {
        Shift::new("s", EmployeeId::new("e1"), day, ShiftBounds::wrapping(start, end), ShiftKind::Day)
    }

    #[test]
    fn duration_of_day_shift() {
        assert_eq!(shift_duration_minutes(t(9, 0), t(17, 30)), 510);
    }

    #[test]
    fn duration_wraps_past_midnight() {
        assert_eq!(shift_duration_minutes(t(22, 0), t(6, 0)), 480);
    }

    #[test]
    fn identical_start_and_end_is_zero() {
        assert_eq!(shift_duration_minutes(t(8, 0), t(8, 0)), 0);
    }

    #[test]
    fn rest_between_evening_and_early_shift_next_day() {
        let previous = shift_on(date(2025, 3, 3), t(9, 0), t(17, 0));
        let next = shift_on(date(2025, 3, 4), t(2, 0), t(10, 0));

        assert_eq!(rest_minutes(&previous, &next), Some(9 * 60));
    }

    #[test]
    fn rest_spans_real_calendar_gap() {
        let previous = shift_on(date(2025, 3, 3), t(9, 0), t(17, 0));
        let next = shift_on(date(2025, 3, 5), t(9, 0), t(17, 0));

        assert_eq!(rest_minutes(&previous, &next), Some(40 * 60));
    }

    #[test]
    fn rest_after_overnight_shift_starts_next_morning() {
        let previous = shift_on(date(2025, 3, 3), t(22, 0), t(6, 0));
        let next = shift_on(date(2025, 3, 4), t(14, 0), t(22, 0));

        assert_eq!(rest_minutes(&previous, &next), Some(8 * 60));
    }

    #[test]
    fn month_period_has_calendar_length() {
        assert_eq!(SchedulePeriod::month(2024, 2).unwrap().days, 29);
        assert_eq!(SchedulePeriod::month(2025, 12).unwrap().days, 31);
    }

    #[test]
    fn parse_month_accepts_year_dash_month() {
        let period = SchedulePeriod::parse_month("2025-03").unwrap();

        assert_eq!(period.start, date(2025, 3, 1));
        assert_eq!(period.days, 31);
        assert!(SchedulePeriod::parse_month("2025-13").is_none());
        assert!(SchedulePeriod::parse_month("march").is_none());
    }

    #[test]
    fn next_and_previous_month_cross_year_boundaries() {
        let december = SchedulePeriod::month(2025, 12).unwrap();

        assert_eq!(december.next_month().start, date(2026, 1, 1));
        assert_eq!(december.next_month().previous_month(), december);
    }

    #[test]
    fn index_and_date_round_trip_inside_period() {
        let period = SchedulePeriod::month(2025, 3).unwrap();

        assert_eq!(period.date_of(4), Some(date(2025, 3, 5)));
        assert_eq!(period.index_of(date(2025, 3, 5)), Some(4));
        assert_eq!(period.index_of(date(2025, 4, 1)), None);
        assert_eq!(period.date_of(31), None);
    }

    #[test]
    fn calendar_range_flags_weekends_and_today() {
        let period = SchedulePeriod::month(2025, 3).unwrap();

        let days = calendar_range(&period, date(2025, 3, 12));

        assert_eq!(days.len(), 31);
        assert!(days[0].is_weekend);
        assert!(!days[2].is_weekend);
        assert!(days[11].is_today);
        assert_eq!(days.iter().filter(|d| d.is_today).count(), 1);
    }

    #[test]
    fn full_weeks_skip_partial_weeks() {
        // March 2025 starts on a Saturday.
        let period = SchedulePeriod::month(2025, 3).unwrap();

        let weeks = period.full_weeks();

        assert_eq!(weeks, vec![2..9, 9..16, 16..23, 23..30]);
    }
}
