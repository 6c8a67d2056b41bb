use crate::{
    domain::{Balances, Debit, TransactionRecord, TransactionStore},
    ports::ledger::{Error, LedgerPort},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Ledger kept in memory for the lifetime of the process
///
/// All transactions live in one [`TransactionStore`] behind a single lock. Tokio's lock is fair:
/// once a writer is queued, later readers wait behind it, so balances are never read in the
/// middle of an append or a spend.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    store: Arc<RwLock<TransactionStore>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LedgerPort for MemoryLedger {
    async fn append(&self, records: Vec<TransactionRecord>) -> Result<(), Error> {
        let count = records.len();
        let mut store = self.store.write().await;
        if let Err(err) = store.append(records) {
            warn!(count, "batch rejected: {err}");
            return Err(err.into());
        }
        info!(count, total = store.len(), "transactions recorded");

        Ok(())
    }

    async fn spend(&self, points: i64) -> Result<Vec<Debit>, Error> {
        let mut store = self.store.write().await;
        match store.spend(points) {
            Ok(debits) => {
                info!(points, payers = debits.len(), "points spent");
                Ok(debits)
            }
            Err(err) => {
                warn!(
                    requested = err.requested,
                    available = err.available,
                    "spend rejected"
                );
                Err(err.into())
            }
        }
    }

    async fn balances(&self) -> Result<Balances, Error> {
        Ok(self.store.read().await.balances())
    }
}
