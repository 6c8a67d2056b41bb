use std::sync::Arc;

use points_ledger::{
    adapters::ledger::memory::MemoryLedger,
    commands::{
        DomainLogic, ErrorKind, GetBalancesRequest, RecordTransactionsRequest, SpendPointsRequest,
    },
};
use serde_json::{json, Value};
use speculoos::prelude::*;
use tower::{BoxError, Service, ServiceExt};

type Domain = DomainLogic<MemoryLedger>;

fn domain() -> Domain {
    DomainLogic::new(Arc::new(MemoryLedger::new()))
}

async fn record(domain: &mut Domain, body: &str) -> Result<Value, BoxError> {
    let req = RecordTransactionsRequest::from_body(Some(body))?;
    let res = ServiceExt::<RecordTransactionsRequest>::ready(domain)
        .await?
        .call(req)
        .await?;
    Ok(serde_json::to_value(res)?)
}

async fn spend(domain: &mut Domain, body: &str) -> Result<Value, BoxError> {
    let req = SpendPointsRequest::from_body(Some(body))?;
    let res = ServiceExt::<SpendPointsRequest>::ready(domain)
        .await?
        .call(req)
        .await?;
    Ok(serde_json::to_value(res)?)
}

async fn balances(domain: &mut Domain) -> Result<Value, BoxError> {
    let res = ServiceExt::<GetBalancesRequest>::ready(domain)
        .await?
        .call(GetBalancesRequest)
        .await?;
    Ok(serde_json::to_value(res)?)
}

const BATCH: &str = r#"[
    {"payer": "DANNON", "points": -200, "timestamp": "2020-10-31T15:00:00Z"},
    {"payer": "MILLER COORS", "points": 10000, "timestamp": "2020-11-01T14:00:00Z"},
    {"payer": "DANNON", "points": 300, "timestamp": "2020-10-31T10:00:00Z"}
]"#;

#[tokio::test]
async fn test_record_then_balances() -> Result<(), BoxError> {
    let mut domain = domain();

    let recorded = record(&mut domain, BATCH).await?;
    let balances = balances(&mut domain).await?;

    assert_that!(recorded).is_equal_to(serde_json::from_str::<Value>(BATCH)?);
    assert_that!(balances).is_equal_to(json!({"DANNON": 100, "MILLER COORS": 10000}));

    Ok(())
}

#[tokio::test]
async fn test_successive_batches() -> Result<(), BoxError> {
    let mut domain = domain();
    record(&mut domain, BATCH).await?;

    // Each call echoes only its own batch
    let recorded = record(
        &mut domain,
        r#"[
            {"payer": "DANNON", "points": 1000, "timestamp": "2020-11-02T14:00:00Z"},
            {"payer": "UNILEVER", "points": 200, "timestamp": "2020-10-31T11:00:00Z"}
        ]"#,
    )
    .await?;
    assert_that!(recorded).is_equal_to(json!([
        {"payer": "DANNON", "points": 1000, "timestamp": "2020-11-02T14:00:00Z"},
        {"payer": "UNILEVER", "points": 200, "timestamp": "2020-10-31T11:00:00Z"},
    ]));

    // Oldest points are spent first, regardless of the batch that introduced them
    let debits = spend(&mut domain, r#"{"points": 5000}"#).await?;
    assert_that!(debits).is_equal_to(json!([
        {"payer": "DANNON", "points": -300},
        {"payer": "UNILEVER", "points": -200},
        {"payer": "MILLER COORS", "points": -4500},
    ]));

    let balances = balances(&mut domain).await?;
    assert_that!(balances).is_equal_to(json!({
        "DANNON": 800,
        "UNILEVER": 0,
        "MILLER COORS": 5500,
    }));

    Ok(())
}

#[tokio::test]
async fn test_oldest_first() -> Result<(), BoxError> {
    let mut domain = domain();
    record(
        &mut domain,
        r#"[
            {"payer": "MILLER COORS", "points": 200, "timestamp": "2020-10-31T11:00:00Z"},
            {"payer": "DANNON", "points": 300, "timestamp": "2020-10-31T10:00:00Z"}
        ]"#,
    )
    .await?;

    let debits = spend(&mut domain, r#"{"points": 100}"#).await?;

    assert_that!(debits).is_equal_to(json!([{"payer": "DANNON", "points": -100}]));
    assert_that!(balances(&mut domain).await?)
        .is_equal_to(json!({"DANNON": 200, "MILLER COORS": 200}));

    Ok(())
}

#[tokio::test]
async fn test_insufficient_balance_leaves_ledger_untouched() -> Result<(), BoxError> {
    let mut domain = domain();
    record(&mut domain, BATCH).await?;

    let res = ServiceExt::<SpendPointsRequest>::ready(&mut domain)
        .await?
        .call(SpendPointsRequest::points(10101))
        .await;

    assert_that!(res)
        .is_err()
        .matches(|err| err.kind() == ErrorKind::InsufficientBalance);
    assert_that!(balances(&mut domain).await?)
        .is_equal_to(json!({"DANNON": 100, "MILLER COORS": 10000}));

    Ok(())
}

#[tokio::test]
async fn test_rejected_batch_stores_nothing() -> Result<(), BoxError> {
    let mut domain = domain();

    let res = record(
        &mut domain,
        r#"[
            {"payer": "DANNON", "points": 300, "timestamp": "2020-10-31T10:00:00Z"},
            {"payer": "DANNON", "points": 300}
        ]"#,
    )
    .await;

    assert_that!(res.is_err()).is_true();
    assert_that!(balances(&mut domain).await?).is_equal_to(json!({}));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests() -> Result<(), BoxError> {
    // GIVEN one earning of 10 points for each of 20 payers
    let domain = domain();
    let batch: Vec<Value> = (0..20)
        .map(|i| {
            json!({
                "payer": format!("PAYER {i:02}"),
                "points": 10,
                "timestamp": "2020-10-31T10:00:00Z",
            })
        })
        .collect();
    record(&mut domain.clone(), &serde_json::to_string(&batch)?).await?;

    // WHEN spends and balance reads run concurrently
    let mut handles = Vec::new();
    for _ in 0..30 {
        let mut domain = domain.clone();
        handles.push(tokio::spawn(async move {
            let spent = spend(&mut domain, r#"{"points": 9}"#).await.is_ok();
            let balances = balances(&mut domain).await.map_err(|err| err.to_string())?;
            Ok::<_, String>((spent, balances))
        }));
    }

    let mut spent = 0;
    for handle in handles {
        let (ok, balances) = handle.await??;
        if ok {
            spent += 9;
        }
        // THEN no read ever observes a negative balance
        let balances = balances.as_object().cloned().unwrap_or_default();
        assert_that!(balances.values().all(|b| b.as_i64().unwrap_or(-1) >= 0)).is_true();
    }

    // AND every spend that succeeded was fully applied
    assert_that!(spent).is_equal_to(198);
    let balances = balances(&mut domain.clone()).await?;
    let total: i64 = balances
        .as_object()
        .map(|balances| balances.values().filter_map(Value::as_i64).sum())
        .unwrap_or_default();
    assert_that!(total).is_equal_to(2);

    Ok(())
}
