//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (balance oracle, chat delivery, transaction
//! submission) are abstracted behind traits; this crate provides
//! implementations that return programmable values and never touch the
//! network. Swap real implementations for nullables in tests. Time needs
//! no double: every time-dependent operation takes `now` as an explicit
//! `Timestamp` argument, so tests just pass the instant they mean.

pub mod chat;
pub mod oracle;

pub use chat::{NullChatSender, NullSubmitter};
pub use oracle::NullOracle;
