use crate::{Address, LedgerError};
use ed25519_dalek::{Signature, Signer, SigningKey, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};
use rand::rngs::OsRng;

/// Checks that a signature over a message was produced by the owner of an address.
///
/// Implementations must be pure: the same arguments always yield the same answer, and a
/// malformed signature is simply not valid.
pub trait SignatureVerifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &[u8]) -> bool;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&Address, &[u8], &[u8]) -> bool,
{
    fn verify(&self, address: &Address, message: &[u8], signature: &[u8]) -> bool {
        self(address, message, signature)
    }
}

/// Verifies Ed25519 signatures. Signatures that aren't exactly 64 bytes are invalid.
/// Verification is strict: small-order keys and non-canonical signatures are rejected, so a
/// valid signature can't be re-encoded into another valid one.
#[derive(Debug, Default, Copy, Clone)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &[u8]) -> bool {
        let signature: [u8; SIGNATURE_LENGTH] = match signature.try_into() {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let signature = Signature::from_bytes(&signature);
        address
            .verifying_key()
            .verify_strict(message, &signature)
            .is_ok()
    }
}

/// An Ed25519 key pair used to own outputs and to sign the inputs that spend them.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_secret_bytes(secret: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    pub fn from_secret_hex(s: &str) -> Result<Self, LedgerError> {
        let bytes = hex::decode(s.trim())?;
        let secret: [u8; SECRET_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            LedgerError::InvalidLength {
                what: "secret key",
                expected: SECRET_KEY_LENGTH,
                actual: bytes.len(),
            }
        })?;
        Ok(Self::from_secret_bytes(&secret))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn address(&self) -> Address {
        Address::new(self.signing_key.verifying_key())
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_own_signature() {
        let key_pair = KeyPair::from_secret_bytes(&[1; 32]);
        let signature = key_pair.sign(b"message");
        assert!(Ed25519Verifier.verify(&key_pair.address(), b"message", &signature));
    }

    #[test]
    fn rejects_signature_over_other_message() {
        let key_pair = KeyPair::from_secret_bytes(&[1; 32]);
        let signature = key_pair.sign(b"message");
        assert!(!Ed25519Verifier.verify(&key_pair.address(), b"other message", &signature));
    }

    #[test]
    fn rejects_signature_by_other_key() {
        let owner = KeyPair::from_secret_bytes(&[1; 32]);
        let thief = KeyPair::from_secret_bytes(&[2; 32]);
        let signature = thief.sign(b"message");
        assert!(!Ed25519Verifier.verify(&owner.address(), b"message", &signature));
    }

    #[test]
    fn rejects_malformed_signature() {
        let key_pair = KeyPair::from_secret_bytes(&[1; 32]);
        assert!(!Ed25519Verifier.verify(&key_pair.address(), b"message", &[]));
        assert!(!Ed25519Verifier.verify(&key_pair.address(), b"message", &[0; 65]));
    }

    #[test]
    fn rejects_signature_with_unreduced_scalar() {
        // The order of the Ed25519 base point, little-endian.
        const GROUP_ORDER: [u8; 32] = [
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9,
            0xde, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x10,
        ];
        let key_pair = KeyPair::from_secret_bytes(&[1; 32]);
        let signature = key_pair.sign(b"message");
        let mut malleated = signature.clone();
        let mut carry = 0u16;
        for (byte, order_byte) in malleated[32..].iter_mut().zip(GROUP_ORDER) {
            let sum = *byte as u16 + order_byte as u16 + carry;
            *byte = sum as u8;
            carry = sum >> 8;
        }

        assert!(Ed25519Verifier.verify(&key_pair.address(), b"message", &signature));
        assert!(!Ed25519Verifier.verify(&key_pair.address(), b"message", &malleated));
    }

    #[test]
    fn rejects_small_order_address() {
        // The identity point. With R also the identity and s = 0, the verification equation
        // holds for every message.
        let mut identity = [0u8; 32];
        identity[0] = 1;
        let address = Address::from_bytes(&identity).unwrap();
        let mut signature = [0u8; 64];
        signature[0] = 1;

        assert!(!Ed25519Verifier.verify(&address, b"message", &signature));
        assert!(!Ed25519Verifier.verify(&address, b"other message", &signature));
    }

    #[test]
    fn secret_hex_round_trip() {
        let key_pair = KeyPair::generate();
        let restored = KeyPair::from_secret_hex(&key_pair.secret_hex()).unwrap();
        assert_eq!(restored.address(), key_pair.address());
    }
}
