//! Teilnehmerliste eines Raums
//!
//! Das Backend verschickt bei jeder Aenderung die betroffenen Teilnehmer.
//! Aeltere Backends senden `inCall` als Bool, neuere als Bitfeld.

use serde::{Deserialize, Deserializer, Serialize};
use talkwire_core::types::SessionId;

/// Bitfeld fuer den Call-Status eines Teilnehmers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InCallFlags(pub u32);

impl InCallFlags {
    pub const GETRENNT: u32 = 0;
    pub const IM_CALL: u32 = 1;
    pub const MIT_AUDIO: u32 = 2;
    pub const MIT_VIDEO: u32 = 4;
    pub const MIT_TELEFON: u32 = 8;

    /// Teilnehmer ist im Call (egal mit welchen Medien)
    pub fn ist_im_call(&self) -> bool {
        self.0 & Self::IM_CALL != 0
    }

    pub fn hat_audio(&self) -> bool {
        self.0 & Self::MIT_AUDIO != 0
    }

    pub fn hat_video(&self) -> bool {
        self.0 & Self::MIT_VIDEO != 0
    }
}

/// Eintrag der Teilnehmerliste
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "in_call_flags")]
    pub in_call: InCallFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ping: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_permissions: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<bool>,
}

impl Participant {
    /// Erstellt einen Teilnehmer nur mit Session-ID
    pub fn neu(session_id: SessionId) -> Self {
        Self {
            session_id,
            user_id: None,
            in_call: InCallFlags::default(),
            last_ping: None,
            participant_type: None,
            participant_permissions: None,
            actor_type: None,
            actor_id: None,
            internal: None,
        }
    }
}

/// Akzeptiert `inCall` als Bool (alte Backends), Zahl oder `null`
fn in_call_flags<'de, D>(deserializer: D) -> Result<InCallFlags, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Roh {
        Bool(bool),
        Zahl(u32),
    }

    Ok(match Option::<Roh>::deserialize(deserializer)? {
        Some(Roh::Bool(true)) => InCallFlags(InCallFlags::IM_CALL),
        Some(Roh::Bool(false)) | None => InCallFlags(InCallFlags::GETRENNT),
        Some(Roh::Zahl(flags)) => InCallFlags(flags),
    })
}
