//! talkwire-protocol – Wire-Definitionen
//!
//! Dieses Crate definiert die Nachrichtentypen, die zwischen Client und
//! Signaling-Backend ausgetauscht werden: ausgehende Call-Nachrichten,
//! Teilnehmerlisten und Data-Channel-Nachrichten zwischen Peers.

pub mod data_channel;
pub mod participant;
pub mod signaling;

pub use data_channel::DataChannelMessage;
pub use participant::{InCallFlags, Participant};
pub use signaling::{IceCandidate, MessageKind, SignalingMessage, SignalingPayload};

/// Rohes Ereignis wie es vom Transport geliefert wird
///
/// Ein JSON-Objekt mit beliebigen Werten. Die Struktur variiert je nach
/// Backend-Version und wird erst im Normalizer interpretiert.
pub type RawEvent = serde_json::Map<String, serde_json::Value>;
