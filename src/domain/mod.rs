use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub mod allocation;
pub mod store;
pub mod validation;

pub use store::TransactionStore;

/// Canonical timestamp format accepted and emitted by the ledger
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Current balance of each payer with transaction history
///
/// Keys are ordered by payer name so that responses are stable.
pub type Balances = BTreeMap<String, i64>;

/// A validated transaction submitted by a caller
///
/// Serializing a record reproduces the submitted JSON object, in the same key order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// Name of the entity awarding (or adjusting) the points
    pub payer: String,
    /// Difference in points
    ///
    /// A positive number is an earning. A negative number is an adjustment that reduces the
    /// payer balance directly.
    pub points: i64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// A transaction held by the [`TransactionStore`]
#[derive(Clone, Debug)]
pub struct Transaction {
    pub transaction_id: Uuid,
    /// Position in insertion order, used to break ties between equal timestamps
    pub sequence: u64,
    pub payer: String,
    /// Points originally granted (or removed) by this transaction
    pub points: i64,
    pub timestamp: DateTime<Utc>,
    /// Portion of `points` not yet consumed by a spend
    ///
    /// Only the allocator decrements this.
    remaining: i64,
}

impl Transaction {
    pub fn new(sequence: u64, record: TransactionRecord) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            sequence,
            remaining: record.points,
            payer: record.payer,
            points: record.points,
            timestamp: record.timestamp,
        }
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Whether a spend can draw points from this transaction
    pub fn is_spendable(&self) -> bool {
        self.remaining > 0
    }
}

/// Points taken from one payer by a spend
///
/// `points` is always negative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Debit {
    pub payer: String,
    pub points: i64,
}

impl Debit {
    pub fn new(payer: impl Into<String>, points: i64) -> Self {
        Self {
            payer: payer.into(),
            points,
        }
    }
}

/// Trying to spend more points than all payers hold combined
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("trying to spend {requested} points with only {available} available")]
pub struct InsufficientBalance {
    pub requested: i64,
    pub available: i64,
}

/// Recording a batch would push the ledger's point totals past what an `i64` holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("recording these transactions would overflow the ledger point totals")]
pub struct PointsOverflow;
