use crate::LedgerError;
use ed25519_dalek::{VerifyingKey, PUBLIC_KEY_LENGTH};
use std::fmt::{Display, Formatter};

/// The identity that owns a transaction output: an Ed25519 public key.
/// Only the holder of the matching secret key can sign inputs that spend the output.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct Address(VerifyingKey);

impl Address {
    pub const BYTE_COUNT: usize = PUBLIC_KEY_LENGTH;

    pub fn new(public_key: VerifyingKey) -> Self {
        Self(public_key)
    }

    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self, LedgerError> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|e| LedgerError::InvalidAddress(e.to_string()))
    }

    pub fn from_hex(s: &str) -> Result<Self, LedgerError> {
        let bytes = hex::decode(s)?;
        let raw: [u8; PUBLIC_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            LedgerError::InvalidLength {
                what: "address",
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            }
        })?;
        Self::from_bytes(&raw)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.0.as_bytes()
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
