use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{
        validation::{self, ValidationError},
        Debit,
    },
    ports::ledger::LedgerPort,
};
use serde::Serialize;
use serde_json::Value;
use tower::Service;
use tracing::warn;

use super::{DomainLogic, Error};

/// Request to spend points, with a body of the form `{"points": 5000}`
#[derive(Debug)]
pub struct SpendPointsRequest {
    payload: Value,
}

impl SpendPointsRequest {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// Build a request from a raw JSON body
    pub fn from_body(body: Option<&str>) -> Result<Self, ValidationError> {
        validation::parse_body(body).map(Self::new)
    }

    /// Request spending an already known number of points
    pub fn points(points: i64) -> Self {
        Self::new(serde_json::json!({ "points": points }))
    }
}

/// Points taken from each payer, in the order the payers were drawn from
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SpendPointsResponse {
    pub debits: Vec<Debit>,
}

impl<L> Service<SpendPointsRequest> for DomainLogic<L>
where
    L: LedgerPort + Send + Sync + 'static,
{
    type Response = SpendPointsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SpendPointsRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        Box::pin(async move {
            let points = validation::validate_spend(&req.payload).map_err(|err| {
                warn!(reason = %err, "spend request rejected");
                err
            })?;

            let debits = ledger.spend(points).await?;

            Ok(SpendPointsResponse { debits })
        })
    }
}
