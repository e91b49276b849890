use crate::{Address, Coin, KeyPair, LedgerError, Sha256};
use std::fmt::{Display, Formatter};

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn from_hex(s: &str) -> Result<Self, LedgerError> {
        Sha256::from_hex(s).map(Self)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output, the first one is 0.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransactionInput {
    // 32 bytes. A pointer to the transaction containing the UTXO to be spent.
    prev_tx_id: TransactionId,
    // 4 bytes. The number of the UTXO to be spent.
    output_index: OutputIndex,
    // Signature by the owner of the spent output over the signing payload of this input.
    signature: Vec<u8>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prev_tx_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(prev_tx_id: TransactionId, output_index: OutputIndex, signature: Vec<u8>) -> Self {
        Self {
            prev_tx_id,
            output_index,
            signature,
        }
    }

    pub fn unsigned(prev_tx_id: TransactionId, output_index: OutputIndex) -> Self {
        Self::new(prev_tx_id, output_index, vec![])
    }

    pub fn prev_tx_id(&self) -> &TransactionId {
        &self.prev_tx_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransactionOutput {
    value: Coin,
    address: Address,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.value, self.address)
    }
}

impl TransactionOutput {
    pub fn new(value: Coin, address: Address) -> Self {
        Self { value, address }
    }

    pub fn value(&self) -> Coin {
        self.value
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    fn write_bytes(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.value.base_units().to_le_bytes());
        buffer.extend_from_slice(self.address.as_bytes());
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transaction {
    // Equivalent to hashing `inputs` and `outputs`, cached because it names the outputs.
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let id = Self::hash_transaction_data(&inputs, &outputs);
        Self {
            id,
            inputs,
            outputs,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn input(&self, index: usize) -> Result<&TransactionInput, LedgerError> {
        input_at(&self.inputs, index)
    }

    pub fn output(&self, index: usize) -> Result<&TransactionOutput, LedgerError> {
        self.outputs
            .get(index)
            .ok_or(LedgerError::OutputIndexOutOfRange {
                index,
                len: self.outputs.len(),
            })
    }

    /// Returns the data that the owner of the output spent by the input at `index` signs.
    /// The payload commits to the spent output and to all outputs of this transaction, but not
    /// to any signatures, so inputs can be signed independently.
    pub fn signing_payload(&self, index: usize) -> Result<Vec<u8>, LedgerError> {
        let input = self.input(index)?;
        Ok(Self::payload_for(input, &self.outputs))
    }

    pub(crate) fn payload_for(input: &TransactionInput, outputs: &[TransactionOutput]) -> Vec<u8> {
        let mut payload = Vec::with_capacity(36 + outputs.len() * 40);
        payload.extend_from_slice(input.prev_tx_id.as_slice());
        payload.extend_from_slice(&input.output_index.value().to_le_bytes());
        for output in outputs {
            output.write_bytes(&mut payload);
        }
        payload
    }

    /// All fields are serialized with the little-endian format, and variable-length signatures
    /// are prefixed with their length, so the id doesn't depend on the platform.
    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> TransactionId {
        let mut data = vec![];
        for input in inputs {
            data.extend_from_slice(input.prev_tx_id.as_slice());
            data.extend_from_slice(&input.output_index.value().to_le_bytes());
            data.extend_from_slice(&(input.signature.len() as u32).to_le_bytes());
            data.extend_from_slice(&input.signature);
        }
        for output in outputs {
            output.write_bytes(&mut data);
        }
        TransactionId(Sha256::double_digest(&data))
    }
}

fn input_at(inputs: &[TransactionInput], index: usize) -> Result<&TransactionInput, LedgerError> {
    inputs.get(index).ok_or(LedgerError::InputIndexOutOfRange {
        index,
        len: inputs.len(),
    })
}

/// Assembles a transaction and signs its inputs.
/// Inputs must be signed after all outputs have been added, because the signing payload
/// commits to the outputs.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, prev_tx_id: TransactionId, output_index: u32) -> Self {
        self.inputs.push(TransactionInput::unsigned(
            prev_tx_id,
            OutputIndex::new(output_index),
        ));
        self
    }

    pub fn output(mut self, value: Coin, address: Address) -> Self {
        self.outputs.push(TransactionOutput::new(value, address));
        self
    }

    /// Sets a raw signature on the input at `index`.
    pub fn signature(mut self, index: usize, signature: Vec<u8>) -> Result<Self, LedgerError> {
        input_at(&self.inputs, index)?;
        self.inputs[index].signature = signature;
        Ok(self)
    }

    /// Signs the input at `index` with the given key pair.
    pub fn sign_input(self, index: usize, key_pair: &KeyPair) -> Result<Self, LedgerError> {
        let payload = self.signing_payload(index)?;
        let signature = key_pair.sign(&payload);
        self.signature(index, signature)
    }

    /// Signs every input with the same key pair.
    pub fn sign_all(mut self, key_pair: &KeyPair) -> Result<Self, LedgerError> {
        for index in 0..self.inputs.len() {
            self = self.sign_input(index, key_pair)?;
        }
        Ok(self)
    }

    pub fn signing_payload(&self, index: usize) -> Result<Vec<u8>, LedgerError> {
        let input = input_at(&self.inputs, index)?;
        Ok(Transaction::payload_for(input, &self.outputs))
    }

    pub fn build(self) -> Transaction {
        Transaction::new(self.inputs, self.outputs)
    }
}

impl From<Transaction> for TransactionBuilder {
    fn from(transaction: Transaction) -> Self {
        Self {
            inputs: transaction.inputs,
            outputs: transaction.outputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prev_tx_id() -> TransactionId {
        TransactionId::new(Sha256::digest(b"previous transaction"))
    }

    fn key_pair() -> KeyPair {
        KeyPair::from_secret_bytes(&[9; 32])
    }

    #[test]
    fn id_is_stable_for_equal_content() {
        let build = || {
            TransactionBuilder::new()
                .input(prev_tx_id(), 0)
                .output(Coin::new(10), key_pair().address())
                .build()
        };
        assert_eq!(build().id(), build().id());
    }

    #[test]
    fn id_commits_to_signatures_and_outputs() {
        let unsigned = TransactionBuilder::new()
            .input(prev_tx_id(), 0)
            .output(Coin::new(10), key_pair().address());
        let signed = unsigned.clone().sign_all(&key_pair()).unwrap().build();
        let other_value = TransactionBuilder::new()
            .input(prev_tx_id(), 0)
            .output(Coin::new(11), key_pair().address())
            .build();
        let unsigned = unsigned.build();

        assert_ne!(unsigned.id(), signed.id());
        assert_ne!(unsigned.id(), other_value.id());
    }

    #[test]
    fn signing_payload_ignores_signatures() {
        let unsigned = TransactionBuilder::new()
            .input(prev_tx_id(), 1)
            .output(Coin::new(10), key_pair().address())
            .build();
        let signed = TransactionBuilder::from(unsigned.clone())
            .sign_all(&key_pair())
            .unwrap()
            .build();
        assert_eq!(
            unsigned.signing_payload(0).unwrap(),
            signed.signing_payload(0).unwrap()
        );
    }

    #[test]
    fn signing_payload_differs_per_input() {
        let transaction = TransactionBuilder::new()
            .input(prev_tx_id(), 0)
            .input(prev_tx_id(), 1)
            .output(Coin::new(10), key_pair().address())
            .build();
        assert_ne!(
            transaction.signing_payload(0).unwrap(),
            transaction.signing_payload(1).unwrap()
        );
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        let transaction = TransactionBuilder::new()
            .input(prev_tx_id(), 0)
            .output(Coin::new(10), key_pair().address())
            .build();
        assert!(matches!(
            transaction.signing_payload(1),
            Err(LedgerError::InputIndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            transaction.output(3),
            Err(LedgerError::OutputIndexOutOfRange { index: 3, len: 1 })
        ));
        assert!(matches!(
            TransactionBuilder::new().sign_input(0, &key_pair()),
            Err(LedgerError::InputIndexOutOfRange { index: 0, len: 0 })
        ));
        let builder = TransactionBuilder::from(transaction);
        assert!(matches!(
            builder.signing_payload(2),
            Err(LedgerError::InputIndexOutOfRange { index: 2, len: 1 })
        ));
        assert!(matches!(
            builder.signature(1, vec![0; 64]),
            Err(LedgerError::InputIndexOutOfRange { index: 1, len: 1 })
        ));
    }
}
