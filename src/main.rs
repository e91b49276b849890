use clap::Command;
use env_logger::Env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = Command::new("utxoledger")
        .about("Validates transactions against a UTXO pool and applies the accepted ones.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(utxoledger_lib::commands::keygen_command())
        .subcommand(utxoledger_lib::commands::sign_command())
        .subcommand(utxoledger_lib::commands::handle_command())
        .get_matches();

    match matches.subcommand() {
        Some(("keygen", matches)) => utxoledger_lib::commands::run_keygen_command(matches),
        Some(("sign", matches)) => utxoledger_lib::commands::run_sign_command(matches),
        Some(("handle", matches)) => utxoledger_lib::commands::run_handle_command(matches),
        _ => panic!("Should report help."),
    }
}
