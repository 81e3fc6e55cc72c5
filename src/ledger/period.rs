//! Accounting periods and the monthly period calendar

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::traits::PeriodCalendar;
use crate::types::{LedgerError, LedgerResult, PeriodId, PERIOD_UNKNOWN};

/// One accounting period: a number plus the date range it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Period number, 1 through 12 for a monthly calendar.
    pub period: PeriodId,
    /// First day of the period.
    pub date_start: NaiveDate,
    /// Last day of the period.
    pub date_end: NaiveDate,
}

/// Fixed calendar of twelve monthly periods within one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCalendar {
    periods: Vec<Period>,
}

impl MonthlyCalendar {
    /// Build the twelve-month calendar for `year`.
    pub fn for_year(year: i32) -> Self {
        let periods = (1..=12u32)
            .map(|month| {
                let (date_start, date_end) = month_bounds(year, month);
                Period {
                    period: month as PeriodId,
                    date_start,
                    date_end,
                }
            })
            .collect();
        Self { periods }
    }

    /// All periods in calendar order.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }
}

impl PeriodCalendar for MonthlyCalendar {
    fn period(&self, id: PeriodId) -> LedgerResult<Period> {
        self.periods
            .iter()
            .find(|p| p.period == id)
            .copied()
            .ok_or(LedgerError::UnknownPeriod(id))
    }

    fn period_for(&self, date: NaiveDate) -> LedgerResult<Period> {
        self.periods
            .iter()
            .find(|p| p.date_start <= date && date <= p.date_end)
            .copied()
            .ok_or(LedgerError::PeriodNotFound(date))
    }

    fn next_period(&self, current: PeriodId) -> LedgerResult<Period> {
        self.periods
            .iter()
            .find(|p| p.period == current + 1)
            .copied()
            .ok_or(LedgerError::NoNextPeriod(current))
    }
}

/// Derive the accounting period for a possibly missing date.
///
/// The period is the calendar month number; a missing date maps to
/// [`PERIOD_UNKNOWN`] rather than an error so undated rows can still be
/// stored and reported on.
pub fn period_for_date(date: Option<NaiveDate>) -> PeriodId {
    match date {
        Some(d) => d.month() as PeriodId,
        None => PERIOD_UNKNOWN,
    }
}

fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    // NaiveDate::from_ymd_opt only fails for out-of-range dates; months
    // 1..=12 of any supported year are always valid.
    let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
    };
    (start, next_month_start.pred_opt().unwrap())
}
