//! Opaque identifiers used across the bot.
//!
//! All of these are newtypes over strings handed to us by external systems
//! (the chat transport, the connector, the store). They carry no structure
//! beyond equality and hashing; anything that needs to look inside an id
//! is doing something wrong.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A chat user identifier, as reported by the chat transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

/// A group channel identifier (proposal announcements go here).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

/// A handshake session identifier: a 256-bit token minted by the connector,
/// base58-encoded. Treated as opaque on the server side.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

/// A proposal identifier minted at creation time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(UserId);
string_id!(GroupId);
string_id!(SessionId);
string_id!(ProposalId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(UserId::new("42"), UserId::from("42"));
        assert_ne!(UserId::new("42"), UserId::new("43"));
    }

    #[test]
    fn display_is_the_raw_value() {
        assert_eq!(ProposalId::new("abc123").to_string(), "abc123");
    }
}
