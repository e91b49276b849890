use crate::snapshot::{self, PoolSnapshot};
use crate::TxHandler;
use clap::{Arg, ArgMatches, Command};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;

#[derive(Serialize)]
struct HandleOutput {
    accepted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pool: Option<PoolSnapshot>,
}

struct HandleCliOptions {
    pool: String,
    txs: String,
    out: Option<String>,
}

impl HandleCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            pool: matches.value_of("pool").ok_or("Missing --pool")?.to_string(),
            txs: matches.value_of("txs").ok_or("Missing --txs")?.to_string(),
            out: matches.value_of("out").map(|s| s.to_string()),
        })
    }
}

pub fn handle_command() -> Command<'static> {
    Command::new("handle")
        .version("0.1")
        .about("Validates a batch of transactions against a UTXO pool and applies the accepted ones.")
        .arg(
            Arg::new("pool")
                .long("pool")
                .value_name("FILE")
                .help("JSON snapshot of the current UTXO pool.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("txs")
                .long("txs")
                .value_name("FILE")
                .help("JSON array of proposed transactions, in submission order.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("FILE")
                .help("Where to write the advanced UTXO pool. Included in the printed result if omitted.")
                .takes_value(true)
                .required(false),
        )
}

pub fn run_handle_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = HandleCliOptions::parse(matches)?;
    let pool = snapshot::read_pool_file(&options.pool)?;
    let candidates = snapshot::read_transactions_file(&options.txs)?;
    info!(
        "Loaded pool with: {} outputs and: {} proposed transactions",
        pool.len(),
        candidates.len()
    );

    let mut tx_handler = TxHandler::new(&pool);
    let report = tx_handler.handle_txs_with_report(&candidates);
    for rejected in &report.rejected {
        warn!(
            "Rejected transaction #{}: {}: {}",
            rejected.position, rejected.id, rejected.reason
        );
    }

    let accepted = report
        .accepted
        .iter()
        .map(|transaction| transaction.id().to_string())
        .collect();
    let pool = match options.out {
        Some(path) => {
            snapshot::write_pool_file(&path, tx_handler.utxo_pool())?;
            info!("Wrote UTXO pool to: {}", path);
            None
        }
        None => Some(PoolSnapshot::from_pool(tx_handler.utxo_pool())),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&HandleOutput { accepted, pool })?
    );
    Ok(())
}
