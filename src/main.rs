use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use points_ledger::{
    adapters::ledger::memory::MemoryLedger,
    commands::{
        self, DomainLogic, GetBalancesRequest, RecordTransactionsRequest, SpendPointsRequest,
    },
    config::Config,
    logging,
};
use serde::Serialize;
use tower::{Service, ServiceExt};
use tracing::{error, info};

/// Exit code for requests the caller can fix: bad input or not enough points
const EXIT_REJECTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    logging::init(config.log_format, &config.log_level);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            match err.downcast_ref::<commands::Error>() {
                Some(err) if err.is_client_error() => ExitCode::from(EXIT_REJECTED),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let body = tokio::fs::read_to_string(&config.transactions)
        .await
        .with_context(|| format!("reading {}", config.transactions.display()))?;

    let mut domain = DomainLogic::new(Arc::new(MemoryLedger::new()));

    let req = RecordTransactionsRequest::from_body(Some(&body)).map_err(commands::Error::from)?;
    let recorded = ServiceExt::<RecordTransactionsRequest>::ready(&mut domain)
        .await?
        .call(req)
        .await?;
    info!(
        path = %config.transactions.display(),
        count = recorded.transactions.len(),
        "batch loaded"
    );
    print_json(&recorded)?;

    for points in config.spends {
        let debits = ServiceExt::<SpendPointsRequest>::ready(&mut domain)
            .await?
            .call(SpendPointsRequest::points(points))
            .await?;
        print_json(&debits)?;
    }

    let balances = ServiceExt::<GetBalancesRequest>::ready(&mut domain)
        .await?
        .call(GetBalancesRequest)
        .await?;
    print_json(&balances)?;

    Ok(())
}

/// Print one JSON document per line on stdout
fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
