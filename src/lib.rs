pub mod address;
pub mod coin;
pub mod commands;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod snapshot;
pub mod transaction;
pub mod tx_handler;
pub mod utxo_pool;

pub use self::{
    address::*, coin::*, crypto::*, error::*, hash::*, transaction::*, tx_handler::*,
    utxo_pool::*,
};
