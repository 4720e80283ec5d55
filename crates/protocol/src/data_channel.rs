//! Data-Channel-Nachrichten zwischen Peers
//!
//! Kurze Statusmeldungen, die Peers direkt ueber den WebRTC-Data-Channel
//! austauschen (Mikrofon/Kamera an/aus, Sprechindikator, Nickname).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data-Channel-Nachricht wie sie auf der Leitung steht
///
/// `payload` ist je nach Absender ein String oder ein Objekt mit `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataChannelMessage {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl DataChannelMessage {
    /// Erstellt eine Nachricht ohne Payload
    pub fn neu(typ: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            payload: None,
        }
    }

    /// Nickname-Aenderung im Objekt-Format `{"name": ...}`
    pub fn nick_changed(nick: impl Into<String>) -> Self {
        Self {
            typ: "nickChanged".into(),
            payload: Some(serde_json::json!({ "name": nick.into() })),
        }
    }

    /// Liest den Nickname aus der Payload (String- oder Objekt-Format)
    pub fn nick(&self) -> Option<&str> {
        match self.payload.as_ref()? {
            Value::String(nick) => Some(nick),
            Value::Object(obj) => obj.get("name")?.as_str(),
            _ => None,
        }
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
