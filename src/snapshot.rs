use crate::{
    Address, Coin, LedgerError, OutputIndex, Transaction, TransactionId, TransactionInput,
    TransactionOutput, Utxo, UtxoPool,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// JSON representation of one pool entry. Ids and addresses are hex, values are decimal coins.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct UtxoEntry {
    pub tx_id: String,
    pub output_index: u32,
    pub value: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct PoolSnapshot {
    pub utxos: Vec<UtxoEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct InputData {
    pub prev_tx_id: String,
    pub output_index: u32,
    // Hex-encoded, empty for inputs that haven't been signed yet.
    #[serde(default)]
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct OutputData {
    pub value: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TransactionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub inputs: Vec<InputData>,
    pub outputs: Vec<OutputData>,
}

impl PoolSnapshot {
    /// Entries are sorted by UTXO so that equal pools produce equal snapshots.
    pub fn from_pool(pool: &UtxoPool) -> Self {
        let mut entries = pool.iter().collect::<Vec<_>>();
        entries.sort_by_key(|(utxo, _)| **utxo);
        let utxos = entries
            .into_iter()
            .map(|(utxo, output)| UtxoEntry {
                tx_id: utxo.tx_id().to_string(),
                output_index: utxo.output_index().value(),
                value: output.value().to_string(),
                address: output.address().to_hex(),
            })
            .collect();
        Self { utxos }
    }

    pub fn to_pool(&self) -> Result<UtxoPool, LedgerError> {
        let mut pool = UtxoPool::new();
        for entry in &self.utxos {
            let utxo = Utxo::new(
                TransactionId::from_hex(&entry.tx_id)?,
                OutputIndex::new(entry.output_index),
            );
            let value = entry.value.parse::<Coin>()?;
            // A spendable output can't hold a negative amount.
            if value.is_negative() {
                return Err(LedgerError::InvalidAmount(entry.value.clone()));
            }
            let output = TransactionOutput::new(value, Address::from_hex(&entry.address)?);
            pool.add(utxo, output);
        }
        Ok(pool)
    }
}

impl From<&Transaction> for TransactionData {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: Some(transaction.id().to_string()),
            inputs: transaction
                .inputs()
                .iter()
                .map(|input| InputData {
                    prev_tx_id: input.prev_tx_id().to_string(),
                    output_index: input.output_index().value(),
                    signature: hex::encode(input.signature()),
                })
                .collect(),
            outputs: transaction
                .outputs()
                .iter()
                .map(|output| OutputData {
                    value: output.value().to_string(),
                    address: output.address().to_hex(),
                })
                .collect(),
        }
    }
}

impl TryFrom<&TransactionData> for Transaction {
    type Error = LedgerError;

    fn try_from(data: &TransactionData) -> Result<Self, Self::Error> {
        let inputs = data
            .inputs
            .iter()
            .map(|input| -> Result<TransactionInput, LedgerError> {
                Ok(TransactionInput::new(
                    TransactionId::from_hex(&input.prev_tx_id)?,
                    OutputIndex::new(input.output_index),
                    hex::decode(&input.signature)?,
                ))
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;
        let outputs = data
            .outputs
            .iter()
            .map(|output| -> Result<TransactionOutput, LedgerError> {
                Ok(TransactionOutput::new(
                    output.value.parse::<Coin>()?,
                    Address::from_hex(&output.address)?,
                ))
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        let transaction = Transaction::new(inputs, outputs);
        if let Some(declared) = &data.id {
            if TransactionId::from_hex(declared)? != *transaction.id() {
                return Err(LedgerError::TransactionIdMismatch {
                    declared: declared.clone(),
                    computed: transaction.id().to_string(),
                });
            }
        }
        Ok(transaction)
    }
}

pub fn read_pool<R: Read>(reader: R) -> Result<UtxoPool, LedgerError> {
    let snapshot: PoolSnapshot = serde_json::from_reader(reader)?;
    snapshot.to_pool()
}

pub fn write_pool<W: Write>(writer: W, pool: &UtxoPool) -> Result<(), LedgerError> {
    serde_json::to_writer_pretty(writer, &PoolSnapshot::from_pool(pool))?;
    Ok(())
}

pub fn read_transaction<R: Read>(reader: R) -> Result<Transaction, LedgerError> {
    let data: TransactionData = serde_json::from_reader(reader)?;
    Transaction::try_from(&data)
}

pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, LedgerError> {
    let data: Vec<TransactionData> = serde_json::from_reader(reader)?;
    data.iter().map(Transaction::try_from).collect()
}

pub fn read_pool_file<P: AsRef<Path>>(path: P) -> Result<UtxoPool, LedgerError> {
    read_pool(BufReader::new(File::open(path)?))
}

pub fn write_pool_file<P: AsRef<Path>>(path: P, pool: &UtxoPool) -> Result<(), LedgerError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_pool(&mut writer, pool)?;
    writer.flush()?;
    Ok(())
}

pub fn read_transaction_file<P: AsRef<Path>>(path: P) -> Result<Transaction, LedgerError> {
    read_transaction(BufReader::new(File::open(path)?))
}

pub fn read_transactions_file<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>, LedgerError> {
    read_transactions(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyPair, Sha256, TransactionBuilder};

    fn owner() -> KeyPair {
        KeyPair::from_secret_bytes(&[21; 32])
    }

    fn genesis_id() -> TransactionId {
        TransactionId::new(Sha256::digest(b"genesis"))
    }

    #[test]
    fn reads_pool_json() {
        let json = format!(
            r#"{{"utxos": [{{"tx_id": "{}", "output_index": 2, "value": "1.6", "address": "{}"}}]}}"#,
            genesis_id(),
            owner().address()
        );
        let pool = read_pool(json.as_bytes()).unwrap();
        let output = pool
            .get(&Utxo::new(genesis_id(), OutputIndex::new(2)))
            .unwrap();
        assert_eq!(output.value(), "1.6".parse::<Coin>().unwrap());
        assert_eq!(*output.address(), owner().address());
    }

    #[test]
    fn negative_pool_value_is_an_error() {
        let json = format!(
            r#"{{"utxos": [{{"tx_id": "{}", "output_index": 0, "value": "-5", "address": "{}"}}]}}"#,
            genesis_id(),
            owner().address()
        );
        match read_pool(json.as_bytes()) {
            Err(LedgerError::InvalidAmount(value)) => assert_eq!(value, "-5"),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("utxoledger-missing-pool-snapshot.json");
        assert!(matches!(read_pool_file(&path), Err(LedgerError::Io(_))));
        assert!(matches!(
            read_transactions_file(&path),
            Err(LedgerError::Io(_))
        ));
    }

    #[test]
    fn pool_file_reads_back() {
        let mut pool = UtxoPool::new();
        pool.add(
            Utxo::new(genesis_id(), OutputIndex::new(0)),
            TransactionOutput::new(Coin::new(7), owner().address()),
        );
        let path = std::env::temp_dir().join(format!(
            "utxoledger-pool-snapshot-{}.json",
            std::process::id()
        ));
        write_pool_file(&path, &pool).unwrap();
        let read = read_pool_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(read.unwrap(), pool);
    }

    #[test]
    fn written_pool_reads_back() {
        let mut pool = UtxoPool::new();
        for index in 0..3 {
            pool.add(
                Utxo::new(genesis_id(), OutputIndex::new(index)),
                TransactionOutput::new(Coin::new(index as i64 + 1), owner().address()),
            );
        }
        let mut buffer = vec![];
        write_pool(&mut buffer, &pool).unwrap();
        assert_eq!(read_pool(buffer.as_slice()).unwrap(), pool);

        let snapshot = PoolSnapshot::from_pool(&pool);
        let indices = snapshot
            .utxos
            .iter()
            .map(|entry| entry.output_index)
            .collect::<Vec<u32>>();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn reads_signed_transaction_with_matching_id() {
        let transaction = TransactionBuilder::new()
            .input(genesis_id(), 0)
            .output("1.6".parse().unwrap(), owner().address())
            .sign_all(&owner())
            .unwrap()
            .build();
        let json = serde_json::to_string(&TransactionData::from(&transaction)).unwrap();
        assert_eq!(read_transaction(json.as_bytes()).unwrap(), transaction);
    }

    #[test]
    fn transaction_without_id_or_signature_is_accepted() {
        let json = format!(
            r#"{{"inputs": [{{"prev_tx_id": "{}", "output_index": 0}}],
                 "outputs": [{{"value": "2", "address": "{}"}}]}}"#,
            genesis_id(),
            owner().address()
        );
        let transaction = read_transaction(json.as_bytes()).unwrap();
        assert!(transaction.inputs()[0].signature().is_empty());
        assert_eq!(transaction.num_outputs(), 1);
    }

    #[test]
    fn mismatched_id_is_an_error() {
        let transaction = TransactionBuilder::new()
            .input(genesis_id(), 0)
            .output(Coin::new(1), owner().address())
            .build();
        let mut data = TransactionData::from(&transaction);
        data.id = Some(genesis_id().to_string());
        assert!(matches!(
            Transaction::try_from(&data),
            Err(LedgerError::TransactionIdMismatch { .. })
        ));
    }

    #[test]
    fn malformed_fields_are_errors() {
        let mut data = TransactionData::from(
            &TransactionBuilder::new()
                .input(genesis_id(), 0)
                .output(Coin::new(1), owner().address())
                .build(),
        );
        data.id = None;
        data.outputs[0].value = "one".to_string();
        assert!(matches!(
            Transaction::try_from(&data),
            Err(LedgerError::InvalidAmount(_))
        ));

        data.outputs[0].value = "1".to_string();
        data.inputs[0].prev_tx_id = "zz".to_string();
        assert!(matches!(
            Transaction::try_from(&data),
            Err(LedgerError::InvalidHex(_))
        ));
    }
}
