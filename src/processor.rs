//! # Processor
//!
//! `processor` is a module driving transactions through a registry and the per-account velocity
//! limits, producing one decision per distinct load.
//!
//! Batches are processed either in arrival order against a [`Registry`], or partitioned by
//! customer against a [`SharedRegistry`] with one task per customer. Both yield the same
//! decisions in the same order.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use futures::{future, Stream, TryStreamExt};
use tracing::debug;

use crate::{Account, CustomerId, Decision, Registry, SharedRegistry, Transaction, VelocityLimits};

/// Result of submitting a single transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Load already seen for this customer, skipped without touching any account
    Duplicate,
    /// Load was checked against the customer's limits
    Processed(Decision),
}

impl Outcome {
    pub fn into_decision(self) -> Option<Decision> {
        match self {
            Outcome::Duplicate => None,
            Outcome::Processed(decision) => Some(decision),
        }
    }
}

/// Applies transactions under a fixed set of velocity limits
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    limits: VelocityLimits,
}

impl BatchProcessor {
    pub fn new(limits: VelocityLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &VelocityLimits {
        &self.limits
    }

    /// Roll the account's windows forward and try to apply the load
    fn decide(&self, account: &mut Account, tx: &Transaction) -> Decision {
        account.reset_if_stale(tx.time, &self.limits);
        Decision::new(tx, account.apply(tx))
    }

    /// Process a single transaction
    pub fn process(&self, registry: &mut Registry, tx: Transaction) -> Outcome {
        if !registry.record(&tx.id, &tx.customer_id) {
            debug!(id = %tx.id, customer_id = %tx.customer_id, "Ignoring duplicate transaction");
            return Outcome::Duplicate;
        }
        let account = registry.get_or_create_account(&tx.customer_id, tx.time, &self.limits);
        Outcome::Processed(self.decide(account, &tx))
    }

    /// Process a single transaction against a shared registry
    pub fn process_shared(&self, registry: &SharedRegistry, tx: Transaction) -> Outcome {
        if !registry.record(&tx.id, &tx.customer_id) {
            debug!(id = %tx.id, customer_id = %tx.customer_id, "Ignoring duplicate transaction");
            return Outcome::Duplicate;
        }
        let mut account = registry.get_or_create_account(&tx.customer_id, tx.time, &self.limits);
        Outcome::Processed(self.decide(account.value_mut(), &tx))
    }

    /// Process transactions in order, skipping duplicates
    pub fn process_batch<I>(&self, registry: &mut Registry, transactions: I) -> Vec<Decision>
    where
        I: IntoIterator<Item = Transaction>,
    {
        transactions
            .into_iter()
            .filter_map(|tx| self.process(registry, tx).into_decision())
            .collect()
    }

    /// Process a stream of transactions in order, stopping at the first input error
    pub async fn process_stream<S>(
        &self,
        registry: &mut Registry,
        transactions: S,
    ) -> Result<Vec<Decision>>
    where
        S: Stream<Item = Result<Transaction>>,
    {
        transactions
            .try_fold(Vec::new(), |mut decisions, tx| {
                decisions.extend(self.process(registry, tx).into_decision());
                future::ready(Ok(decisions))
            })
            .await
    }

    /// Process transactions with one task per customer
    ///
    /// Each customer's transactions keep their arrival order within its task, and decisions are
    /// put back into input order before returning.
    pub async fn process_concurrently(
        &self,
        registry: Arc<SharedRegistry>,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Decision>> {
        let mut partitions: HashMap<CustomerId, Vec<(usize, Transaction)>> = HashMap::new();
        for (position, tx) in transactions.into_iter().enumerate() {
            partitions
                .entry(tx.customer_id.clone())
                .or_default()
                .push((position, tx));
        }
        debug!(customers = partitions.len(), "Partitioned batch by customer");

        let tasks = partitions.into_values().map(|partition| {
            let registry = Arc::clone(&registry);
            let processor = self.clone();
            tokio::spawn(async move {
                partition
                    .into_iter()
                    .map(|(position, tx)| (position, processor.process_shared(&registry, tx)))
                    .collect::<Vec<_>>()
            })
        });
        let mut outcomes: Vec<_> = future::try_join_all(tasks)
            .await
            .context("Customer processing task failed")?
            .into_iter()
            .flatten()
            .collect();

        outcomes.sort_unstable_by_key(|(position, _)| *position);
        Ok(outcomes
            .into_iter()
            .filter_map(|(_, outcome)| outcome.into_decision())
            .collect())
    }
}
