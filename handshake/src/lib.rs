//! The wallet-linking handshake.
//!
//! A browser-embedded connector proves control of a wallet to the backend
//! without the private key ever leaving the client. The backend mints an
//! ephemeral X25519 key pair per link attempt; the connector mints its own,
//! derives the shared secret, and delivers an encrypted envelope
//! out-of-band. This crate decodes envelopes, validates ownership proofs,
//! and manages the short-lived session records that survive a successful
//! connect.
//!
//! State machine per session: `Initiated → Connected → Expired|Disconnected`,
//! one-directional. There is no resume; a dead session means a fresh
//! handshake.

pub mod envelope;
pub mod error;
pub mod linker;
pub mod session;

pub use envelope::{Envelope, Payload};
pub use error::HandshakeError;
pub use linker::{LinkEvent, LinkerConfig, WalletLinker};
pub use session::{HandshakeSession, PendingLinks, SessionStore};
