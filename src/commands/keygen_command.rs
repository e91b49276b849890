use crate::KeyPair;
use clap::{ArgMatches, Command};
use serde::Serialize;
use std::error::Error;

#[derive(Serialize)]
struct KeygenOutput {
    secret_key: String,
    address: String,
}

pub fn keygen_command() -> Command<'static> {
    Command::new("keygen")
        .version("0.1")
        .about("Generates an Ed25519 key pair. The public key is the address that owns outputs.")
}

pub fn run_keygen_command(_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let key_pair = KeyPair::generate();
    let output = KeygenOutput {
        secret_key: key_pair.secret_hex(),
        address: key_pair.address().to_hex(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
