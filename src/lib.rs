//! # Velocity Limits
//!
//! `velocity_limits` is a library for enforcing per-customer daily and weekly velocity limits on
//! a stream of fund loads.

pub mod account;
pub mod amount;
pub mod config;
pub mod io;
pub mod log;
pub mod processor;
pub mod registry;
pub mod window;

use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::{fs::File, io::BufWriter};
use tracing::info;

pub use account::{Account, AccountSnapshot};
pub use amount::{parse_amount, ParseAmountError};
pub use config::{Config, VelocityLimits};
pub use processor::{BatchProcessor, Outcome};
pub use registry::{Registry, SharedRegistry};

/// Customer identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Load identifier, unique per customer only
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadId(pub String);

impl From<&str> for LoadId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fund load transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Load ID
    pub id: LoadId,
    /// Customer's ID
    pub customer_id: CustomerId,
    /// Load amount
    pub amount: Decimal,
    /// Transaction time
    pub time: DateTime<Utc>,
}

/// Accept or reject decision for a single load
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    /// Load ID
    pub id: LoadId,
    /// Customer's ID
    pub customer_id: CustomerId,
    /// Whether the load was applied
    pub accepted: bool,
}

impl Decision {
    /// Create the decision for a transaction
    pub fn new(tx: &Transaction, accepted: bool) -> Self {
        Self {
            id: tx.id.clone(),
            customer_id: tx.customer_id.clone(),
            accepted,
        }
    }
}

/// Options for a single processing run
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Line-delimited JSON transactions file
    pub input: PathBuf,
    /// Decisions file, stdout when `None`
    pub output: Option<PathBuf>,
    /// Configured velocity limits
    pub limits: VelocityLimits,
    /// Partition the batch by customer and process partitions concurrently
    pub concurrent: bool,
}

/// Read transactions, decide each of them and write out the decisions
///
/// Decisions are only written once the whole input has been processed, so a malformed record
/// aborts the run without producing partial output.
pub async fn run(options: RunOptions) -> Result<Vec<Decision>> {
    let input = File::open(&options.input).await.with_context(|| {
        format!(
            "Failed to read transactions from {}",
            options.input.display()
        )
    })?;
    let transactions = io::read_transactions(input);
    let processor = BatchProcessor::new(options.limits);

    let decisions = if options.concurrent {
        let transactions = transactions.try_collect::<Vec<_>>().await?;
        processor
            .process_concurrently(Arc::new(SharedRegistry::new()), transactions)
            .await?
    } else {
        processor
            .process_stream(&mut Registry::new(), transactions)
            .await?
    };

    let accepted = decisions.iter().filter(|d| d.accepted).count();
    info!(
        decisions = decisions.len(),
        accepted,
        rejected = decisions.len() - accepted,
        "Processed transactions"
    );

    match &options.output {
        Some(path) => {
            let output = File::create(path).await.with_context(|| {
                format!("Failed to write decisions to {}", path.display())
            })?;
            io::write_decisions(BufWriter::new(output), &decisions).await?;
        }
        None => io::write_decisions(tokio::io::stdout(), &decisions).await?,
    }

    Ok(decisions)
}
