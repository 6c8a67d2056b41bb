use std::sync::Arc;

use crate::domain::validation::ValidationError;

pub mod get_balances;
pub mod record_transactions;
pub mod spend_points;

pub use get_balances::{GetBalancesRequest, GetBalancesResponse};
pub use record_transactions::{RecordTransactionsRequest, RecordTransactionsResponse};
pub use spend_points::{SpendPointsRequest, SpendPointsResponse};

/// Entry point for every ledger operation
///
/// Each operation is a [`tower::Service`] implementation on this type. Clones share the same
/// ledger.
pub struct DomainLogic<L> {
    ledger: Arc<L>,
}

impl<L> DomainLogic<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

impl<L> Clone for DomainLogic<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("ledger port error: {0}")]
    Ledger(#[from] crate::ports::ledger::Error),
}

/// Failure categories, for transports to map onto their own status codes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedPayload,
    Shape,
    Type,
    InvalidAmount,
    InsufficientBalance,
    PointsOverflow,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use crate::ports::ledger::Error as LedgerError;

        match self {
            Error::Validation(ValidationError::MalformedPayload(_)) => ErrorKind::MalformedPayload,
            Error::Validation(ValidationError::Shape(_)) => ErrorKind::Shape,
            Error::Validation(ValidationError::Type(_)) => ErrorKind::Type,
            Error::Validation(ValidationError::InvalidAmount(_)) => ErrorKind::InvalidAmount,
            Error::Ledger(LedgerError::InsufficientBalance(_)) => ErrorKind::InsufficientBalance,
            Error::Ledger(LedgerError::PointsOverflow(_)) => ErrorKind::PointsOverflow,
            Error::Ledger(LedgerError::Adapter(_)) => ErrorKind::Internal,
        }
    }

    /// Whether the caller can fix the request and try again
    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }
}
