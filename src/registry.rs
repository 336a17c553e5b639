//! # Registry
//!
//! `registry` is a module providing duplicate detection and account lookup for multiple
//! customers, either owned by a single caller or shared between tasks.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use dashmap::{mapref::one::RefMut, DashMap, DashSet};

use crate::{Account, AccountSnapshot, CustomerId, LoadId, VelocityLimits};

/// Load IDs are only unique per customer
type SeenKey = (LoadId, CustomerId);

fn seen_key(id: &LoadId, customer_id: &CustomerId) -> SeenKey {
    (id.clone(), customer_id.clone())
}

/// Accounts and seen loads for multiple customers
#[derive(Debug, Default)]
pub struct Registry {
    /// Map of customer id to accounts
    accounts: HashMap<CustomerId, Account>,
    /// Set of (load id, customer id) pairs processed so far
    seen: HashSet<SeenKey>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the load was already recorded for this customer
    pub fn is_duplicate(&self, id: &LoadId, customer_id: &CustomerId) -> bool {
        self.seen.contains(&seen_key(id, customer_id))
    }

    /// Mark the load as seen, returns `false` if it already was
    pub fn record(&mut self, id: &LoadId, customer_id: &CustomerId) -> bool {
        self.seen.insert(seen_key(id, customer_id))
    }

    /// Get the customer's account, opening it with full windows anchored at `time` if needed
    pub fn get_or_create_account(
        &mut self,
        customer_id: &CustomerId,
        time: DateTime<Utc>,
        limits: &VelocityLimits,
    ) -> &mut Account {
        self.accounts
            .entry(customer_id.clone())
            .or_insert_with(|| Account::new(customer_id.clone(), time, limits))
    }

    pub fn account(&self, customer_id: &CustomerId) -> Option<&Account> {
        self.accounts.get(customer_id)
    }

    /// Get snapshots of all accounts
    pub fn snapshot_accounts(&self) -> Vec<AccountSnapshot> {
        self.accounts.values().map(|a| a.snapshot()).collect()
    }
}

/// Registry that can be shared between tasks
///
/// An account stays locked for as long as the guard returned by
/// [`SharedRegistry::get_or_create_account`] is held, which serializes all work on one customer.
#[derive(Default)]
pub struct SharedRegistry {
    accounts: DashMap<CustomerId, Account>,
    seen: DashSet<SeenKey>,
}

impl SharedRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_duplicate(&self, id: &LoadId, customer_id: &CustomerId) -> bool {
        self.seen.contains(&seen_key(id, customer_id))
    }

    /// Mark the load as seen, returns `false` if it already was
    ///
    /// Check and insert happen under the same shard lock.
    pub fn record(&self, id: &LoadId, customer_id: &CustomerId) -> bool {
        self.seen.insert(seen_key(id, customer_id))
    }

    pub fn get_or_create_account(
        &self,
        customer_id: &CustomerId,
        time: DateTime<Utc>,
        limits: &VelocityLimits,
    ) -> RefMut<'_, CustomerId, Account> {
        self.accounts
            .entry(customer_id.clone())
            .or_insert_with(|| Account::new(customer_id.clone(), time, limits))
    }

    pub fn snapshot_accounts(&self) -> Vec<AccountSnapshot> {
        self.accounts.iter().map(|a| a.snapshot()).collect()
    }
}
