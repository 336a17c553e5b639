//! # Window
//!
//! `window` is a module providing calendar anchors and the capped windows used to track daily
//! and weekly velocity limits.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::VelocityLimits;

/// Midnight UTC of the calendar day containing `instant`
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Midnight UTC of the Monday on or before the day containing `instant`
pub fn start_of_week(instant: DateTime<Utc>) -> DateTime<Utc> {
    let day = start_of_day(instant);
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Remaining capacity of a single limit window
///
/// Both caps only ever decrease while the window is current. A window whose anchor has been
/// passed is replaced wholesale rather than refilled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LimitWindow {
    /// Start of the anchor period
    start: DateTime<Utc>,
    /// Amount that can still be loaded
    remaining_amount: Decimal,
    /// Number of loads still allowed, `None` when the window has no count cap
    remaining_loads: Option<u32>,
}

impl LimitWindow {
    /// Create a full window
    pub fn new(start: DateTime<Utc>, amount_cap: Decimal, load_cap: Option<u32>) -> Self {
        Self {
            start,
            remaining_amount: amount_cap,
            remaining_loads: load_cap,
        }
    }

    /// Create a full daily window for the day containing `time`
    pub fn daily(time: DateTime<Utc>, limits: &VelocityLimits) -> Self {
        Self::new(
            start_of_day(time),
            limits.daily_amount,
            Some(limits.daily_loads),
        )
    }

    /// Create a full weekly window for the week containing `time`
    pub fn weekly(time: DateTime<Utc>, limits: &VelocityLimits) -> Self {
        Self::new(start_of_week(time), limits.weekly_amount, None)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn remaining_amount(&self) -> Decimal {
        self.remaining_amount
    }

    pub fn remaining_loads(&self) -> Option<u32> {
        self.remaining_loads
    }

    /// Whether a period starting at `anchor` has superseded this window
    pub fn is_superseded_by(&self, anchor: DateTime<Utc>) -> bool {
        anchor > self.start
    }

    /// Whether one more load of `amount` fits in the window
    pub fn allows(&self, amount: Decimal) -> bool {
        self.remaining_amount >= amount && self.remaining_loads.map_or(true, |loads| loads > 0)
    }

    /// Consume capacity for one load of `amount`
    ///
    /// Callers check [`LimitWindow::allows`] first.
    pub fn consume(&mut self, amount: Decimal) {
        self.remaining_amount -= amount;
        if let Some(loads) = self.remaining_loads.as_mut() {
            *loads -= 1;
        }
    }
}
