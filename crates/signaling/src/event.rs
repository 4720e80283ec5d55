//! Kanonische Signaling-Ereignisse
//!
//! Der Normalizer uebersetzt jede rohe Transport-Nachricht in genau eine
//! Variante von [`SignalingEvent`]. Jede Variante gehoert zu hoechstens einer
//! [`ListenerCategory`]; `Unknown` gehoert zu keiner und wird verworfen.

use talkwire_core::types::{RoomToken, SessionId};
use talkwire_protocol::{IceCandidate, InCallFlags, Participant};

// ---------------------------------------------------------------------------
// Listener-Kategorien
// ---------------------------------------------------------------------------

/// Faehigkeit, fuer die ein Listener registriert wird
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerCategory {
    /// Offer/Answer/Candidate/Unshare (plus Hand heben, Reaktionen)
    CallParticipant,
    /// Nachrichten an den lokalen Teilnehmer (SwitchTo)
    LocalParticipant,
    /// Aenderungen der Teilnehmerliste
    ParticipantList,
}

impl ListenerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CallParticipant => "call_participant",
            Self::LocalParticipant => "local_participant",
            Self::ParticipantList => "participant_list",
        }
    }
}

impl std::fmt::Display for ListenerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Call-Umschlag
// ---------------------------------------------------------------------------

/// Adressierung einer Call-Nachricht
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEnvelope {
    /// Session des Absenders
    pub from: SessionId,
    /// Empfaenger-Session, `None` bei Nachrichten an alle
    pub to: Option<SessionId>,
    /// `video` oder `screen`
    pub room_type: Option<String>,
    /// Kennung der Peer-Verbindung
    pub sid: Option<String>,
}

impl CallEnvelope {
    pub fn neu(from: SessionId) -> Self {
        Self {
            from,
            to: None,
            room_type: None,
            sid: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SignalingEvent
// ---------------------------------------------------------------------------

/// Normalisiertes Signaling-Ereignis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingEvent {
    CallOffer {
        call: CallEnvelope,
        sdp: String,
        nick: Option<String>,
    },
    CallAnswer {
        call: CallEnvelope,
        sdp: String,
        nick: Option<String>,
    },
    CallCandidate {
        call: CallEnvelope,
        candidate: IceCandidate,
    },
    CallUnshare {
        call: CallEnvelope,
    },
    CallRaiseHand {
        call: CallEnvelope,
        state: bool,
        timestamp: Option<i64>,
    },
    CallReaction {
        call: CallEnvelope,
        reaction: String,
    },
    /// Der lokale Teilnehmer soll in einen anderen Raum wechseln
    SwitchTo { room: RoomToken },
    /// Geaenderte Eintraege der Teilnehmerliste
    ParticipantsUpdate { participants: Vec<Participant> },
    /// Raumweite Aenderung des Call-Status (z.B. Call fuer alle beendet)
    AllParticipantsUpdate { in_call: InCallFlags },
    /// Fehlerhafte oder nicht unterstuetzte Eingabe
    Unknown,
}

impl SignalingEvent {
    /// Zuordnung Ereignisart -> Listener-Kategorie
    pub fn category(&self) -> Option<ListenerCategory> {
        match self {
            Self::CallOffer { .. }
            | Self::CallAnswer { .. }
            | Self::CallCandidate { .. }
            | Self::CallUnshare { .. }
            | Self::CallRaiseHand { .. }
            | Self::CallReaction { .. } => Some(ListenerCategory::CallParticipant),
            Self::SwitchTo { .. } => Some(ListenerCategory::LocalParticipant),
            Self::ParticipantsUpdate { .. } | Self::AllParticipantsUpdate { .. } => {
                Some(ListenerCategory::ParticipantList)
            }
            Self::Unknown => None,
        }
    }

    /// Kurzname fuer Logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::CallOffer { .. } => "offer",
            Self::CallAnswer { .. } => "answer",
            Self::CallCandidate { .. } => "candidate",
            Self::CallUnshare { .. } => "unshareScreen",
            Self::CallRaiseHand { .. } => "raiseHand",
            Self::CallReaction { .. } => "reaction",
            Self::SwitchTo { .. } => "switchto",
            Self::ParticipantsUpdate { .. } => "participants.update",
            Self::AllParticipantsUpdate { .. } => "participants.update.all",
            Self::Unknown => "unknown",
        }
    }

    pub fn ist_unbekannt(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}
