use crate::domain::{Balances, Debit, InsufficientBalance, PointsOverflow, TransactionRecord};

#[mockall::automock]
#[async_trait::async_trait]
pub trait LedgerPort {
    /// Record a batch of validated transactions
    async fn append(&self, records: Vec<TransactionRecord>) -> Result<(), Error>;
    /// Spend points across all payers, oldest transactions first
    async fn spend(&self, points: i64) -> Result<Vec<Debit>, Error>;
    async fn balances(&self) -> Result<Balances, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Trying to spend more points than the ledger holds
    ///
    /// The ledger is left untouched when this happens.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(#[from] InsufficientBalance),

    /// Recording the batch would overflow the ledger point totals
    ///
    /// None of the batch is recorded when this happens.
    #[error("points overflow: {0}")]
    PointsOverflow(#[from] PointsOverflow),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
