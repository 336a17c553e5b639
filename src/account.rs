//! # Account
//!
//! `account` is a module providing functionality for enforcing velocity limits on a single
//! customer's account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::{
    window::{start_of_day, start_of_week, LimitWindow},
    CustomerId, Transaction, VelocityLimits,
};

/// Serializable snapshot of the customer's account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AccountSnapshot {
    /// Customer's ID
    pub customer_id: CustomerId,
    /// Sum of accepted loads
    pub balance: Decimal,
    /// Amount still loadable today
    pub daily_remaining_amount: Decimal,
    /// Loads still allowed today
    pub daily_remaining_loads: u32,
    /// Amount still loadable this week
    pub weekly_remaining_amount: Decimal,
}

/// Customer's account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Customer's ID
    customer_id: CustomerId,
    /// Sum of accepted loads
    balance: Decimal,
    /// Current daily window, the only one with a load count cap
    daily: LimitWindow,
    /// Current weekly window
    weekly: LimitWindow,
}

impl Account {
    /// Create an account with full windows anchored at the day and week of `time`
    pub fn new(customer_id: CustomerId, time: DateTime<Utc>, limits: &VelocityLimits) -> Self {
        Self {
            customer_id,
            balance: Decimal::ZERO,
            daily: LimitWindow::daily(time, limits),
            weekly: LimitWindow::weekly(time, limits),
        }
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn daily(&self) -> &LimitWindow {
        &self.daily
    }

    pub fn weekly(&self) -> &LimitWindow {
        &self.weekly
    }

    /// Roll the daily and weekly windows forward if `time` falls in a later day or week
    ///
    /// The two windows roll over independently. Times at or before the current windows leave
    /// them untouched, so repeated calls are no-ops.
    pub fn reset_if_stale(&mut self, time: DateTime<Utc>, limits: &VelocityLimits) {
        let day = start_of_day(time);
        if self.daily.is_superseded_by(day) {
            debug!(customer_id = %self.customer_id, %day, "Daily window rolled over");
            self.daily = LimitWindow::daily(time, limits);
        } else if day < self.daily.start() {
            // validated against the current windows as-is
            debug!(
                customer_id = %self.customer_id,
                %time,
                window_start = %self.daily.start(),
                "Transaction predates current daily window"
            );
        }

        let week = start_of_week(time);
        if self.weekly.is_superseded_by(week) {
            debug!(customer_id = %self.customer_id, %week, "Weekly window rolled over");
            self.weekly = LimitWindow::weekly(time, limits);
        }
    }

    /// Apply a load if it fits in both windows
    ///
    /// Either every window and the balance are updated, or nothing is. The amount itself is not
    /// validated here: a negative amount passes the checks and raises the remaining capacity.
    pub fn apply(&mut self, tx: &Transaction) -> bool {
        // reject if customer id does not match
        if tx.customer_id != self.customer_id {
            return false;
        }
        if !self.daily.allows(tx.amount) || !self.weekly.allows(tx.amount) {
            return false;
        }
        self.daily.consume(tx.amount);
        self.weekly.consume(tx.amount);
        self.balance += tx.amount;
        true
    }

    /// Get a snapshot of the account
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            customer_id: self.customer_id.clone(),
            balance: self.balance,
            daily_remaining_amount: self.daily.remaining_amount(),
            daily_remaining_loads: self.daily.remaining_loads().unwrap_or_default(),
            weekly_remaining_amount: self.weekly.remaining_amount(),
        }
    }
}
