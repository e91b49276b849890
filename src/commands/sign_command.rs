use crate::snapshot::{self, TransactionData};
use crate::{KeyPair, TransactionBuilder};
use clap::{Arg, ArgMatches, Command};
use log::info;
use std::error::Error;

struct SignCliOptions {
    tx: String,
    key: String,
    // None signs every input.
    inputs: Option<Vec<usize>>,
}

impl SignCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let inputs = match matches.values_of("inputs") {
            Some(values) => Some(
                values
                    .map(|v| v.trim().parse::<usize>())
                    .collect::<Result<Vec<usize>, _>>()?,
            ),
            None => None,
        };
        Ok(Self {
            tx: matches.value_of("tx").ok_or("Missing --tx")?.to_string(),
            key: matches.value_of("key").ok_or("Missing --key")?.to_string(),
            inputs,
        })
    }
}

pub fn sign_command() -> Command<'static> {
    Command::new("sign")
        .version("0.1")
        .about("Signs the inputs of a transaction and prints it with its id.")
        .arg(
            Arg::new("tx")
                .long("tx")
                .value_name("FILE")
                .help("JSON file with the transaction to sign.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .value_name("HEX")
                .help("Secret key of the owner of the spent outputs.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("inputs")
                .long("inputs")
                .value_name("[INDEX...]")
                .help("Indices of the inputs to sign. Signs all inputs if omitted.")
                .use_value_delimiter(true)
                .multiple_occurrences(true)
                .takes_value(true)
                .required(false),
        )
}

pub fn run_sign_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = SignCliOptions::parse(matches)?;
    let key_pair = KeyPair::from_secret_hex(&options.key)?;
    let transaction = snapshot::read_transaction_file(&options.tx)?;

    let indices = options
        .inputs
        .unwrap_or_else(|| (0..transaction.num_inputs()).collect());
    let mut builder = TransactionBuilder::from(transaction);
    for index in indices {
        builder = builder.sign_input(index, &key_pair)?;
    }
    let signed = builder.build();
    info!("Signed transaction: {}", signed.id());

    println!(
        "{}",
        serde_json::to_string_pretty(&TransactionData::from(&signed))?
    );
    Ok(())
}
