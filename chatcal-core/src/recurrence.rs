//! Recurrence stepping for reminders.
//!
//! Computes the next occurrence of a recurring event by advancing its anchor
//! date (the event's own date) by the frequency's fixed stride until the
//! result lands on/after "today". Idempotent for fixed inputs.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::error::{ChatCalError, ChatCalResult};
use crate::event::Frequency;

/// Compute the next occurrence on/after `today`.
///
/// `interval` is the target day-of-month (1-31) for `monthly_on_day`, the
/// day-count step (>= 1) for `custom`, and ignored for every other
/// frequency. Out-of-range intervals are a validation error, never clamped.
/// `Frequency::None` has no next occurrence; callers clear the recurrence
/// instead of stepping it.
pub fn next_occurrence(
    frequency: Frequency,
    interval: u32,
    anchor: NaiveDate,
    today: NaiveDate,
) -> ChatCalResult<NaiveDate> {
    match frequency {
        Frequency::None => Err(ChatCalError::Validation(
            "Frequency 'none' has no next occurrence; it clears the recurrence".to_string(),
        )),
        Frequency::Daily => Ok(step_days(anchor, today, 1)),
        Frequency::EveryOtherDay => Ok(step_days(anchor, today, 2)),
        Frequency::Weekly => Ok(step_days(anchor, today, 7)),
        Frequency::Biweekly => Ok(step_days(anchor, today, 14)),
        Frequency::Custom => {
            if interval < 1 {
                return Err(ChatCalError::Validation(
                    "Custom recurrence needs a day-count interval of at least 1".to_string(),
                ));
            }
            Ok(step_days(anchor, today, i64::from(interval)))
        }
        Frequency::Weekdays => Ok(next_weekday(anchor, today)),
        Frequency::Monthly => Ok(step_months(anchor, today)),
        Frequency::MonthlyOnDay => {
            if !(1..=31).contains(&interval) {
                return Err(ChatCalError::Validation(format!(
                    "Day-of-month must be between 1 and 31, got {interval}"
                )));
            }
            Ok(monthly_on_day(anchor, today, interval))
        }
    }
}

fn step_days(anchor: NaiveDate, today: NaiveDate, step: i64) -> NaiveDate {
    let mut date = anchor;
    while date < today {
        date = date + Duration::days(step);
    }
    date
}

/// First Mon-Fri day on/after both the anchor and today.
fn next_weekday(anchor: NaiveDate, today: NaiveDate) -> NaiveDate {
    let mut date = anchor;
    while date < today || is_weekend(date) {
        date = date + Duration::days(1);
    }
    date
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Advance by whole calendar months; chrono clamps the 31st into shorter
/// months.
fn step_months(anchor: NaiveDate, today: NaiveDate) -> NaiveDate {
    let mut date = anchor;
    while date < today {
        date = date + Months::new(1);
    }
    date
}

/// Soonest date on/after max(anchor, today) whose day-of-month is `day`,
/// clamped to the last day of months shorter than `day`.
fn monthly_on_day(anchor: NaiveDate, today: NaiveDate, day: u32) -> NaiveDate {
    let base = anchor.max(today);
    let this_month = clamped_day(base.year(), base.month(), day);
    if this_month >= base {
        this_month
    } else {
        let next = base + Months::new(1);
        clamped_day(next.year(), next.month(), day)
    }
}

fn clamped_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| last_day_of_month(year, month))
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("month already validated");
    (first + Months::new(1)) - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_steps_from_anchor() {
        let next = next_occurrence(
            Frequency::Weekly,
            1,
            date(2026, 2, 1),
            date(2026, 2, 10),
        )
        .unwrap();
        assert_eq!(next, date(2026, 2, 15));
    }

    #[test]
    fn test_daily_lands_on_today() {
        let next = next_occurrence(Frequency::Daily, 1, date(2026, 2, 1), date(2026, 2, 10))
            .unwrap();
        assert_eq!(next, date(2026, 2, 10));
    }

    #[test]
    fn test_every_other_day_parity() {
        // 2026-02-01 + 2n days: 3rd, 5th, 7th, 9th, 11th
        let next = next_occurrence(
            Frequency::EveryOtherDay,
            1,
            date(2026, 2, 1),
            date(2026, 2, 10),
        )
        .unwrap();
        assert_eq!(next, date(2026, 2, 11));
    }

    #[test]
    fn test_future_anchor_is_kept() {
        let next = next_occurrence(Frequency::Weekly, 1, date(2026, 3, 1), date(2026, 2, 10))
            .unwrap();
        assert_eq!(next, date(2026, 3, 1));
    }

    #[test]
    fn test_weekdays_skip_weekend() {
        // 2026-02-14 is a Saturday
        let next = next_occurrence(
            Frequency::Weekdays,
            1,
            date(2026, 2, 2),
            date(2026, 2, 14),
        )
        .unwrap();
        assert_eq!(next, date(2026, 2, 16));
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_monthly_steps_calendar_months() {
        let next = next_occurrence(Frequency::Monthly, 1, date(2026, 1, 15), date(2026, 3, 20))
            .unwrap();
        assert_eq!(next, date(2026, 4, 15));
    }

    #[test]
    fn test_monthly_clamps_short_months() {
        // Jan 31 -> Feb 28 (2026 is not a leap year)
        let next = next_occurrence(Frequency::Monthly, 1, date(2026, 1, 31), date(2026, 2, 10))
            .unwrap();
        assert_eq!(next, date(2026, 2, 28));
    }

    #[test]
    fn test_monthly_on_day_clamps_to_month_end() {
        // day 31 in 30-day April resolves to April 30, never 2026-04-31
        let next = next_occurrence(
            Frequency::MonthlyOnDay,
            31,
            date(2026, 1, 31),
            date(2026, 4, 10),
        )
        .unwrap();
        assert_eq!(next, date(2026, 4, 30));
    }

    #[test]
    fn test_monthly_on_day_rolls_to_next_month() {
        let next = next_occurrence(
            Frequency::MonthlyOnDay,
            5,
            date(2026, 1, 5),
            date(2026, 2, 10),
        )
        .unwrap();
        assert_eq!(next, date(2026, 3, 5));
    }

    #[test]
    fn test_custom_step() {
        let next = next_occurrence(Frequency::Custom, 10, date(2026, 2, 1), date(2026, 2, 15))
            .unwrap();
        assert_eq!(next, date(2026, 2, 21));
    }

    #[test]
    fn test_interval_validation() {
        assert!(matches!(
            next_occurrence(Frequency::Custom, 0, date(2026, 2, 1), date(2026, 2, 1)),
            Err(ChatCalError::Validation(_))
        ));
        assert!(matches!(
            next_occurrence(Frequency::MonthlyOnDay, 0, date(2026, 2, 1), date(2026, 2, 1)),
            Err(ChatCalError::Validation(_))
        ));
        assert!(matches!(
            next_occurrence(Frequency::MonthlyOnDay, 32, date(2026, 2, 1), date(2026, 2, 1)),
            Err(ChatCalError::Validation(_))
        ));
    }

    #[test]
    fn test_none_is_rejected() {
        assert!(matches!(
            next_occurrence(Frequency::None, 1, date(2026, 2, 1), date(2026, 2, 1)),
            Err(ChatCalError::Validation(_))
        ));
    }

    #[test]
    fn test_result_is_never_before_today() {
        let today = date(2026, 2, 10);
        for freq in [
            Frequency::Daily,
            Frequency::EveryOtherDay,
            Frequency::Weekly,
            Frequency::Biweekly,
            Frequency::Weekdays,
            Frequency::Monthly,
        ] {
            let next = next_occurrence(freq, 1, date(2025, 6, 3), today).unwrap();
            assert!(next >= today, "{freq:?} produced {next} before {today}");
        }
    }
}
