use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{
        validation::{self, ValidationError},
        TransactionRecord,
    },
    ports::ledger::LedgerPort,
};
use serde::Serialize;
use serde_json::Value;
use tower::Service;
use tracing::{info, warn};

use super::{DomainLogic, Error};

#[derive(Debug)]
pub struct RecordTransactionsRequest {
    payload: Value,
}

impl RecordTransactionsRequest {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// Build a request from a raw JSON body
    pub fn from_body(body: Option<&str>) -> Result<Self, ValidationError> {
        validation::parse_body(body).map(Self::new)
    }
}

/// The accepted batch, echoed back to the caller
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordTransactionsResponse {
    pub transactions: Vec<TransactionRecord>,
}

impl<L> Service<RecordTransactionsRequest> for DomainLogic<L>
where
    L: LedgerPort + Send + Sync + 'static,
{
    type Response = RecordTransactionsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RecordTransactionsRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        Box::pin(async move {
            // The whole batch is validated before anything is stored
            let transactions = validation::validate_transactions(&req.payload).map_err(|err| {
                warn!(reason = %err, "transaction batch rejected");
                err
            })?;

            if !transactions.is_empty() {
                ledger.append(transactions.clone()).await?;
            }
            info!(count = transactions.len(), "transaction batch accepted");

            Ok(RecordTransactionsResponse { transactions })
        })
    }
}
