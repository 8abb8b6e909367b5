//! Envelope wire format.
//!
//! The outer envelope is plain JSON with base58-encoded byte fields; the
//! payload is ciphertext whose plaintext is one of three tagged actions.
//! Envelopes are stateless and single-use.

use crate::error::HandshakeError;
use agora_crypto::NONCE_LEN;
use agora_types::{PublicKey, Signature};
use serde::{Deserialize, Serialize};

/// The outer, unencrypted envelope as delivered by the connector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// The connector's ephemeral X25519 public key, base58.
    pub dapp_encryption_public_key: String,
    /// 24-byte AEAD nonce, base58.
    pub nonce: String,
    /// Ciphertext of the serialized [`Payload`], base58.
    pub payload: String,
}

/// Decoded byte form of an envelope.
pub struct DecodedEnvelope {
    pub dapp_public: [u8; 32],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Decrypted payload variants, tagged by `action`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Payload {
    /// Prove wallet ownership and establish a session.
    #[serde(rename = "connect")]
    Connect {
        /// The wallet's Ed25519 public key, base58.
        public_key: String,
        /// Detached signature over `message`, base58.
        signature: String,
        /// The challenge message that was signed, verbatim.
        message: String,
        /// Session token minted by the connector, base58.
        session: String,
    },

    /// Tear the session down.
    #[serde(rename = "disconnect")]
    Disconnect,

    /// Forward signed transaction bytes for submission.
    #[serde(rename = "signAndSendTransaction")]
    SignAndSendTransaction {
        session: String,
        /// Serialized signed transaction, base58, opaque to this core.
        transaction: String,
    },
}

impl Envelope {
    /// Decode the base58 fields, validating byte lengths.
    pub fn decode(&self) -> Result<DecodedEnvelope, HandshakeError> {
        Ok(DecodedEnvelope {
            dapp_public: decode_array(&self.dapp_encryption_public_key, "dapp public key")?,
            nonce: decode_array(&self.nonce, "nonce")?,
            ciphertext: decode_bytes(&self.payload, "payload")?,
        })
    }
}

pub(crate) fn decode_bytes(field: &str, what: &str) -> Result<Vec<u8>, HandshakeError> {
    bs58::decode(field)
        .into_vec()
        .map_err(|_| HandshakeError::MalformedEnvelope(format!("{what} is not base58")))
}

pub(crate) fn decode_array<const N: usize>(
    field: &str,
    what: &str,
) -> Result<[u8; N], HandshakeError> {
    let bytes = decode_bytes(field, what)?;
    bytes.as_slice().try_into().map_err(|_| {
        HandshakeError::MalformedEnvelope(format!(
            "{what} is {} bytes, expected {N}",
            bytes.len()
        ))
    })
}

pub(crate) fn decode_public_key(field: &str) -> Result<PublicKey, HandshakeError> {
    Ok(PublicKey(decode_array(field, "wallet public key")?))
}

pub(crate) fn decode_signature(field: &str) -> Result<Signature, HandshakeError> {
    Ok(Signature(decode_array(field, "signature")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b58(bytes: &[u8]) -> String {
        bs58::encode(bytes).into_string()
    }

    #[test]
    fn decode_validates_lengths() {
        let envelope = Envelope {
            dapp_encryption_public_key: b58(&[1u8; 32]),
            nonce: b58(&[2u8; 24]),
            payload: b58(b"ciphertext"),
        };
        let decoded = envelope.decode().unwrap();
        assert_eq!(decoded.dapp_public, [1u8; 32]);
        assert_eq!(decoded.nonce, [2u8; 24]);
        assert_eq!(decoded.ciphertext, b"ciphertext");
    }

    #[test]
    fn short_public_key_is_rejected() {
        let envelope = Envelope {
            dapp_encryption_public_key: b58(&[1u8; 16]),
            nonce: b58(&[2u8; 24]),
            payload: b58(b"x"),
        };
        assert!(matches!(
            envelope.decode(),
            Err(HandshakeError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn non_base58_field_is_rejected() {
        let envelope = Envelope {
            dapp_encryption_public_key: "0OIl".into(),
            nonce: b58(&[2u8; 24]),
            payload: b58(b"x"),
        };
        assert!(matches!(
            envelope.decode(),
            Err(HandshakeError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn payload_action_tags_roundtrip() {
        let connect = Payload::Connect {
            public_key: "pk".into(),
            signature: "sig".into(),
            message: "msg".into(),
            session: "sess".into(),
        };
        let json = serde_json::to_value(&connect).unwrap();
        assert_eq!(json["action"], "connect");

        let disconnect = serde_json::to_value(Payload::Disconnect).unwrap();
        assert_eq!(disconnect["action"], "disconnect");

        let sst = serde_json::to_value(Payload::SignAndSendTransaction {
            session: "s".into(),
            transaction: "t".into(),
        })
        .unwrap();
        assert_eq!(sst["action"], "signAndSendTransaction");
    }
}
