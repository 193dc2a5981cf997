//! Conversation history types.
//!
//! A session's history is an ordered list of [`Turn`]s, persisted as a JSON
//! array in the key-value store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn.
///
/// Serialized as the lowercase strings `"user"` and `"model"`. Any other
/// string read back from storage is treated as [`TurnRole::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TurnRole {
    User,
    Model,
}

impl From<String> for TurnRole {
    fn from(s: String) -> Self {
        if s == "user" {
            TurnRole::User
        } else {
            TurnRole::Model
        }
    }
}

impl From<TurnRole> for String {
    fn from(role: TurnRole) -> Self {
        role.to_string()
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Model => write!(f, "model"),
        }
    }
}

/// One message in a stored conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}
