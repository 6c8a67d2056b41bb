use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{Balances, PointsOverflow, Transaction, TransactionRecord};

/// Ordered collection of every transaction recorded by the ledger
///
/// Transactions are kept sorted by timestamp. Transactions sharing a timestamp stay in the order
/// they were appended, across batches.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: BTreeMap<(DateTime<Utc>, u64), Transaction>,
    next_sequence: u64,
    /// Sum of every positive `points` ever recorded
    earned: i64,
    /// Sum of every negative `points` ever recorded
    adjusted: i64,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append validated records in submission order
    ///
    /// The batch is rejected as a whole if it would push the total of earned points, or of
    /// adjustments, past what an `i64` holds. Every balance and spendable total is bounded by
    /// those two sums, so the aggregations below cannot overflow.
    pub fn append(&mut self, records: Vec<TransactionRecord>) -> Result<(), PointsOverflow> {
        let (mut earned, mut adjusted) = (self.earned, self.adjusted);
        for record in &records {
            if record.points >= 0 {
                earned = earned.checked_add(record.points).ok_or(PointsOverflow)?;
            } else {
                adjusted = adjusted.checked_add(record.points).ok_or(PointsOverflow)?;
            }
        }
        self.earned = earned;
        self.adjusted = adjusted;

        for record in records {
            let transaction = Transaction::new(self.next_sequence, record);
            self.next_sequence += 1;
            self.transactions
                .insert((transaction.timestamp, transaction.sequence), transaction);
        }

        Ok(())
    }

    /// All transactions, oldest first
    ///
    /// Every call starts a fresh walk over the store.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions.values()
    }

    pub(super) fn transactions_mut(&mut self) -> impl Iterator<Item = &mut Transaction> + '_ {
        self.transactions.values_mut()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of remaining points for every payer with at least one transaction
    ///
    /// Payers whose points were all spent are still reported, with a balance of 0.
    pub fn balances(&self) -> Balances {
        let mut balances = Balances::new();
        for transaction in self.transactions() {
            *balances.entry(transaction.payer.clone()).or_default() += transaction.remaining();
        }
        balances
    }
}
