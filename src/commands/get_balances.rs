use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{domain::Balances, ports::ledger::LedgerPort};
use serde::Serialize;
use tower::Service;

use super::{DomainLogic, Error};

#[derive(Debug, Default)]
pub struct GetBalancesRequest;

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GetBalancesResponse {
    pub balances: Balances,
}

impl<L> Service<GetBalancesRequest> for DomainLogic<L>
where
    L: LedgerPort + Send + Sync + 'static,
{
    type Response = GetBalancesResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: GetBalancesRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        Box::pin(async move {
            let balances = ledger.balances().await?;
            Ok(GetBalancesResponse { balances })
        })
    }
}
