use crate::{OutputIndex, TransactionId, TransactionOutput};
use std::collections::hash_map::{Iter, Keys, Values};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Identifies an unspent transaction output by the transaction that created it and its index in
/// that transaction.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
pub struct Utxo {
    tx_id: TransactionId,
    output_index: OutputIndex,
}

impl Utxo {
    pub fn new(tx_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.output_index)
    }
}

/// A pool of unspent transaction outputs.
/// Every key is exactly one output that can currently be spent.
/// Cloning the pool produces an independent copy.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UtxoPool {
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    /// Inserts the output, replacing any output previously stored under the same key.
    pub fn add(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    /// Removes the output if present; removing an absent key does nothing.
    pub fn remove(&mut self, utxo: &Utxo) -> Option<TransactionOutput> {
        self.utxos.remove(utxo)
    }

    pub fn get(&self, utxo: &Utxo) -> Option<&TransactionOutput> {
        self.utxos.get(utxo)
    }

    pub fn all_outputs(&self) -> Values<'_, Utxo, TransactionOutput> {
        self.utxos.values()
    }

    pub fn utxos(&self) -> Keys<'_, Utxo, TransactionOutput> {
        self.utxos.keys()
    }

    pub fn iter(&self) -> Iter<'_, Utxo, TransactionOutput> {
        self.utxos.iter()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

impl<'a> IntoIterator for &'a UtxoPool {
    type Item = (&'a Utxo, &'a TransactionOutput);
    type IntoIter = Iter<'a, Utxo, TransactionOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
