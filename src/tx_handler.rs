use crate::{
    Coin, Ed25519Verifier, OutputIndex, SignatureVerifier, Transaction, TransactionId, Utxo,
    UtxoPool,
};
use log::{debug, info};
use std::collections::HashSet;
use thiserror::Error;

/// The reason a transaction is not valid against the current pool.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Rejection {
    #[error("Input: {input_index} claims: {utxo} which is already claimed by an earlier input")]
    DuplicateClaim { input_index: usize, utxo: Utxo },

    #[error("Input: {input_index} claims: {utxo} which is not in the UTXO pool")]
    MissingUtxo { input_index: usize, utxo: Utxo },

    #[error("Input: {input_index} has an invalid signature for: {utxo}")]
    InvalidSignature { input_index: usize, utxo: Utxo },

    #[error("Output: {output_index} has a negative value: {value}")]
    NegativeOutput { output_index: usize, value: Coin },

    #[error("Sum of values overflows")]
    ValueOverflow,

    #[error("Output: {output_index} can't be addressed by a 32-bit output index")]
    TooManyOutputs { output_index: usize },

    #[error("Inputs: {input_sum} are less than outputs: {output_sum}")]
    InsufficientFunds { input_sum: Coin, output_sum: Coin },
}

/// Totals of a transaction that passed validation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ValidatedTransaction {
    pub input_sum: Coin,
    pub output_sum: Coin,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RejectedTransaction {
    // Position of the transaction in the submitted batch.
    pub position: usize,
    pub id: TransactionId,
    pub reason: Rejection,
}

/// The outcome of a batch: the accepted transactions in submission order, and why every other
/// transaction was dropped.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<RejectedTransaction>,
}

/// Validates transactions against a private UTXO pool and applies the accepted ones to it.
pub struct TxHandler<V = Ed25519Verifier> {
    utxo_pool: UtxoPool,
    verifier: V,
}

impl TxHandler<Ed25519Verifier> {
    /// Creates a ledger whose current pool is a copy of `utxo_pool`.
    pub fn new(utxo_pool: &UtxoPool) -> Self {
        Self::with_verifier(utxo_pool, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn with_verifier(utxo_pool: &UtxoPool, verifier: V) -> Self {
        Self {
            utxo_pool: utxo_pool.clone(),
            verifier,
        }
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }

    /// Returns true if:
    ///   - all outputs claimed by the transaction are in the current pool,
    ///   - the signatures on each input are valid,
    ///   - no UTXO is claimed multiple times,
    ///   - all output values are non-negative, and
    ///   - the sum of input values is greater than or equal to the sum of output values.
    pub fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        self.check_tx(transaction).is_ok()
    }

    /// Same checks as `is_valid_tx`, reporting the first one that fails.
    /// The pool is not modified.
    pub fn check_tx(&self, transaction: &Transaction) -> Result<ValidatedTransaction, Rejection> {
        let input_sum = self.validate_inputs(transaction)?;
        let output_sum = Self::validate_outputs(transaction)?;
        if input_sum < output_sum {
            return Err(Rejection::InsufficientFunds {
                input_sum,
                output_sum,
            });
        }
        Ok(ValidatedTransaction {
            input_sum,
            output_sum,
        })
    }

    /// Processes an unordered batch of proposed transactions and returns the mutually valid
    /// subset, in submission order, advancing the pool as each one is accepted.
    /// When several transactions claim the same output, the earliest one in the batch wins.
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.handle_txs_with_report(candidates).accepted
    }

    pub fn handle_txs_with_report(&mut self, candidates: &[Transaction]) -> BatchReport {
        let mut report = BatchReport::default();
        for (position, transaction) in candidates.iter().enumerate() {
            match self.check_tx(transaction) {
                Ok(_) => {
                    self.apply(transaction);
                    debug!("Accepted transaction: {}", transaction.id());
                    report.accepted.push(transaction.clone());
                }
                Err(reason) => {
                    debug!("Rejected transaction: {}: {}", transaction.id(), reason);
                    report.rejected.push(RejectedTransaction {
                        position,
                        id: *transaction.id(),
                        reason,
                    });
                }
            }
        }
        info!(
            "Processed batch of: {} transactions, accepted: {}, rejected: {}, pool size: {}",
            candidates.len(),
            report.accepted.len(),
            report.rejected.len(),
            self.utxo_pool.len()
        );
        report
    }

    /// Checks every input against the pool and returns the total value they spend.
    fn validate_inputs(&self, transaction: &Transaction) -> Result<Coin, Rejection> {
        let mut claimed = HashSet::with_capacity(transaction.num_inputs());
        let mut input_sum = Coin::zero();
        for (input_index, input) in transaction.inputs().iter().enumerate() {
            let utxo = Utxo::new(*input.prev_tx_id(), input.output_index());
            if !claimed.insert(utxo) {
                return Err(Rejection::DuplicateClaim { input_index, utxo });
            }

            // The pool is the only source of the spent value and its owner.
            let spent = self
                .utxo_pool
                .get(&utxo)
                .ok_or(Rejection::MissingUtxo { input_index, utxo })?;

            let payload = Transaction::payload_for(input, transaction.outputs());
            if !self
                .verifier
                .verify(spent.address(), &payload, input.signature())
            {
                return Err(Rejection::InvalidSignature { input_index, utxo });
            }

            input_sum = input_sum
                .checked_add(spent.value())
                .ok_or(Rejection::ValueOverflow)?;
        }
        Ok(input_sum)
    }

    fn validate_outputs(transaction: &Transaction) -> Result<Coin, Rejection> {
        let mut output_sum = Coin::zero();
        for (output_index, output) in transaction.outputs().iter().enumerate() {
            created_output_index(output_index)?;
            if output.value().is_negative() {
                return Err(Rejection::NegativeOutput {
                    output_index,
                    value: output.value(),
                });
            }
            output_sum = output_sum
                .checked_add(output.value())
                .ok_or(Rejection::ValueOverflow)?;
        }
        Ok(output_sum)
    }

    /// Consumes the outputs claimed by a valid transaction and adds the outputs it creates.
    fn apply(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.utxo_pool
                .remove(&Utxo::new(*input.prev_tx_id(), input.output_index()));
        }
        // Every position was checked by `validate_outputs`, so the indices never wrap.
        for (index, output) in (0..=u32::MAX).zip(transaction.outputs()) {
            let utxo = Utxo::new(*transaction.id(), OutputIndex::new(index));
            self.utxo_pool.add(utxo, output.clone());
        }
    }
}

/// The index that names the output at `position` once the transaction is applied.
fn created_output_index(position: usize) -> Result<OutputIndex, Rejection> {
    u32::try_from(position)
        .map(OutputIndex::new)
        .map_err(|_| Rejection::TooManyOutputs {
            output_index: position,
        })
}
