//! Call-Signaling-Nachrichten
//!
//! Nachrichten zur Aushandlung einer Peer-Verbindung (Offer/Answer/ICE) sowie
//! Steuerungsnachrichten innerhalb eines laufenden Calls.
//!
//! ## Design
//! - JSON-Serialisierung via serde, Feldnamen wie vom Backend erwartet
//! - Die Payload ist fuer den Dispatcher opak und wird nur weitergereicht
//! - Nicht gesetzte optionale Felder werden nicht serialisiert

use serde::{Deserialize, Serialize};
use talkwire_core::types::SessionId;

// ---------------------------------------------------------------------------
// Nachrichtenart
// ---------------------------------------------------------------------------

/// Art einer Call-Signaling-Nachricht (Wire-Feld `type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    Offer,
    Answer,
    Candidate,
    UnshareScreen,
    RaiseHand,
    Reaction,
}

impl MessageKind {
    /// Wire-Bezeichnung der Nachrichtenart
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::Candidate => "candidate",
            Self::UnshareScreen => "unshareScreen",
            Self::RaiseHand => "raiseHand",
            Self::Reaction => "reaction",
        }
    }

    /// Parst die Wire-Bezeichnung, `None` fuer unbekannte Arten
    pub fn from_wire(typ: &str) -> Option<Self> {
        match typ {
            "offer" => Some(Self::Offer),
            "answer" => Some(Self::Answer),
            "candidate" => Some(Self::Candidate),
            "unshareScreen" => Some(Self::UnshareScreen),
            "raiseHand" => Some(Self::RaiseHand),
            "reaction" => Some(Self::Reaction),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// ICE-Kandidat einer Peer-Verbindung
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    #[serde(rename = "sdpMid", default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u32>,
    pub candidate: String,
}

/// Aushandlungs- bzw. Steuerungs-Payload einer Call-Nachricht
///
/// Welche Felder gesetzt sind haengt von der Nachrichtenart ab:
/// Offer/Answer tragen `sdp` (und optional `nick`), Candidate traegt
/// `candidate`, RaiseHand traegt `state`/`timestamp`, Reaction traegt `reaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingPayload {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<IceCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
}

impl SignalingPayload {
    /// Prueft ob keinerlei Feld gesetzt ist
    pub fn ist_leer(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// SignalingMessage
// ---------------------------------------------------------------------------

/// Ausgehende (bzw. empfangene) Call-Signaling-Nachricht
///
/// Traegt Nachrichtenart, Absender, optionalen Empfaenger und die opake
/// Payload. Die Serialisierung auf die Leitung uebernimmt der Transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalingMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub from: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<SessionId>,
    #[serde(rename = "roomType", default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "SignalingPayload::ist_leer")]
    pub payload: SignalingPayload,
}

impl SignalingMessage {
    /// Erstellt eine Nachricht mit leerer Payload
    pub fn new(kind: MessageKind, from: SessionId, to: Option<SessionId>) -> Self {
        Self {
            kind,
            from,
            to,
            room_type: None,
            sid: None,
            payload: SignalingPayload::default(),
        }
    }

    /// Erstellt ein SDP-Offer an einen Peer
    pub fn offer(
        from: SessionId,
        to: SessionId,
        sdp: impl Into<String>,
        nick: Option<String>,
    ) -> Self {
        let mut msg = Self::new(MessageKind::Offer, from, Some(to));
        msg.payload.typ = Some("offer".into());
        msg.payload.sdp = Some(sdp.into());
        msg.payload.nick = nick;
        msg
    }

    /// Erstellt eine SDP-Answer an einen Peer
    pub fn answer(
        from: SessionId,
        to: SessionId,
        sdp: impl Into<String>,
        nick: Option<String>,
    ) -> Self {
        let mut msg = Self::new(MessageKind::Answer, from, Some(to));
        msg.payload.typ = Some("answer".into());
        msg.payload.sdp = Some(sdp.into());
        msg.payload.nick = nick;
        msg
    }

    /// Erstellt eine ICE-Candidate-Nachricht an einen Peer
    pub fn candidate(from: SessionId, to: SessionId, candidate: IceCandidate) -> Self {
        let mut msg = Self::new(MessageKind::Candidate, from, Some(to));
        msg.payload.typ = Some("candidate".into());
        msg.payload.candidate = Some(candidate);
        msg
    }

    /// Teilt allen (oder einem) Peers mit, dass die Bildschirmfreigabe endet
    pub fn unshare_screen(from: SessionId, to: Option<SessionId>) -> Self {
        let mut msg = Self::new(MessageKind::UnshareScreen, from, to);
        msg.room_type = Some("screen".into());
        msg
    }

    /// Meldet gehobene bzw. gesenkte Hand
    pub fn raise_hand(from: SessionId, state: bool, timestamp: i64) -> Self {
        let mut msg = Self::new(MessageKind::RaiseHand, from, None);
        msg.payload.state = Some(state);
        msg.payload.timestamp = Some(timestamp);
        msg
    }

    /// Sendet eine Reaktion (Emoji) in den Call
    pub fn reaction(from: SessionId, reaction: impl Into<String>) -> Self {
        let mut msg = Self::new(MessageKind::Reaction, from, None);
        msg.payload.reaction = Some(reaction.into());
        msg
    }

    /// Setzt den Raum-Typ (`video` oder `screen`)
    pub fn mit_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = Some(room_type.into());
        self
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert eine Nachricht aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn offer_wire_format() {
        let msg = SignalingMessage::offer(
            SessionId::neu("alice"),
            SessionId::neu("bob"),
            "v=0",
            Some("Alice".into()),
        )
        .mit_room_type("video");
        let wert: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            wert,
            json!({
                "type": "offer",
                "from": "alice",
                "to": "bob",
                "roomType": "video",
                "payload": {"type": "offer", "sdp": "v=0", "nick": "Alice"}
            })
        );
    }

    #[test]
    fn unshare_ohne_payload_und_empfaenger() {
        let msg = SignalingMessage::unshare_screen(SessionId::neu("alice"), None);
        let wert: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            wert,
            json!({"type": "unshareScreen", "from": "alice", "roomType": "screen"})
        );
    }

    #[test]
    fn candidate_feldnamen() {
        let msg = SignalingMessage::candidate(
            SessionId::neu("a"),
            SessionId::neu("b"),
            IceCandidate {
                sdp_mid: Some("0".into()),
                sdp_m_line_index: Some(0),
                candidate: "candidate:1 1 UDP 1 10.0.0.1 5000 typ host".into(),
            },
        );
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"sdpMid\":\"0\""));
        assert!(json.contains("\"sdpMLineIndex\":0"));

        let decoded = SignalingMessage::from_json(&json).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn message_kind_wire_namen() {
        for kind in [
            MessageKind::Offer,
            MessageKind::Answer,
            MessageKind::Candidate,
            MessageKind::UnshareScreen,
            MessageKind::RaiseHand,
            MessageKind::Reaction,
        ] {
            assert_eq!(MessageKind::from_wire(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(MessageKind::from_wire("switchto"), None);
    }
}
