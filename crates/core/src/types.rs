//! Gemeinsame Identifikationstypen fuer Talkwire
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Session-IDs und Raum-Tokens zur Compilezeit auszuschliessen. Beide sind
//! vom Signaling-Backend vergebene, opake Strings.

use serde::{Deserialize, Serialize};

/// Signaling-Session eines Teilnehmers (vom Backend vergeben)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Erstellt eine SessionId aus dem Wire-String
    pub fn neu(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt den inneren String zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::neu(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Token eines Raums bzw. einer Konversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomToken(String);

impl RoomToken {
    /// Erstellt ein RoomToken aus dem Wire-String
    pub fn neu(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Gibt den inneren String zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomToken {
    fn from(token: &str) -> Self {
        Self::neu(token)
    }
}

impl From<String> for RoomToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Display for RoomToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room:{}", self.0)
    }
}
