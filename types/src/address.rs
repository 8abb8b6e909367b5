//! Wallet addresses.
//!
//! An address is the base58 encoding of the wallet's 32-byte Ed25519 public
//! key, as produced by the browser connector. We keep the printable form as
//! the canonical representation (it is what the store and the oracle see)
//! and decode back to key bytes only when verifying ownership proofs.

use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address is not valid base58")]
    Encoding,

    #[error("address decodes to {0} bytes, expected 32")]
    Length(usize),
}

/// A base58-encoded wallet address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse an address string, validating that it decodes to a 32-byte key.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| AddressError::Encoding)?;
        if bytes.len() != 32 {
            return Err(AddressError::Length(bytes.len()));
        }
        Ok(Self(s.to_string()))
    }

    /// Derive the address for a public key.
    pub fn from_public_key(key: &PublicKey) -> Self {
        Self(bs58::encode(key.as_bytes()).into_string())
    }

    /// Recover the public key the address encodes.
    pub fn to_public_key(&self) -> Result<PublicKey, AddressError> {
        let bytes = bs58::decode(&self.0)
            .into_vec()
            .map_err(|_| AddressError::Encoding)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::Length(bytes.len()))?;
        Ok(PublicKey(arr))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_public_key() {
        let key = PublicKey([7u8; 32]);
        let addr = WalletAddress::from_public_key(&key);
        assert_eq!(addr.to_public_key().unwrap(), key);
    }

    #[test]
    fn parse_accepts_derived_address() {
        let addr = WalletAddress::from_public_key(&PublicKey([1u8; 32]));
        assert!(WalletAddress::parse(addr.as_str()).is_ok());
    }

    #[test]
    fn parse_rejects_bad_alphabet() {
        // 0, O, I, l are not in the base58 alphabet.
        assert!(matches!(
            WalletAddress::parse("0OIl"),
            Err(AddressError::Encoding)
        ));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let short = bs58::encode(&[1u8; 16]).into_string();
        assert!(matches!(
            WalletAddress::parse(&short),
            Err(AddressError::Length(16))
        ));
    }
}
