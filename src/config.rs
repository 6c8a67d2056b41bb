use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogFormat;

/// Record a batch of point transactions, spend from it, and print the resulting balances
#[derive(Debug, Parser)]
#[command(name = "points-ledger")]
pub struct Config {
    /// JSON file holding the batch of transactions to record
    #[arg(env = "POINTS_LEDGER_TRANSACTIONS")]
    pub transactions: PathBuf,

    /// Points to spend once the batch is recorded. Can be repeated; spends run in order.
    #[arg(long = "spend", value_name = "POINTS", allow_negative_numbers = true)]
    pub spends: Vec<i64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "POINTS_LEDGER_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format.
    #[arg(
        long,
        value_enum,
        default_value_t = LogFormat::Human,
        env = "POINTS_LEDGER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}
