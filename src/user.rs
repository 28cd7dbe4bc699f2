//! The identity of a user as known to the client.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};

/// A newtype wrapper for user IDs.
///
/// The remote store sends integer IDs, but IDs are only ever used to build
/// request paths, so they are kept as text. Both JSON strings and integers
/// deserialize into a [UserID].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct UserID(String);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The user ID as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for UserID {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for UserID {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawUserID {
            Text(String),
            Integer(i64),
        }

        Ok(match RawUserID::deserialize(deserializer)? {
            RawUserID::Text(text) => UserID(text),
            RawUserID::Integer(id) => UserID::from(id),
        })
    }
}

/// The profile fields that accompany a credential.
///
/// Every field is optional: a session restored from storage keeps whatever
/// fields were persisted, which may be none at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// The user's ID in the remote store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserID>,
    /// The user's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// The user's email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Profile {
    /// The user ID, if it is present and not blank.
    pub fn user_id(&self) -> Option<&UserID> {
        self.id.as_ref().filter(|id| !id.is_blank())
    }
}
