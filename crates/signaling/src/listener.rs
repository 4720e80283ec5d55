//! Listener-Traits pro Kategorie
//!
//! Jede Kategorie hat einen eigenen Trait mit eigenen Callback-Signaturen.
//! Ein Objekt implementiert nur die Traits der Kategorien, fuer die es
//! registriert wird. Callbacks duerfen die Registry veraendern und neue
//! Ereignisse dispatchen, aber nicht dasselbe laufende Ereignis erneut.

use std::sync::Arc;

use talkwire_core::types::RoomToken;
use talkwire_protocol::{IceCandidate, InCallFlags, Participant};

use crate::event::{CallEnvelope, ListenerCategory};

/// Ergebnis eines Listener-Callbacks
///
/// Fehler werden vom Dispatcher geloggt und gezaehlt, die Zustellung an die
/// uebrigen Listener laeuft weiter.
pub type ListenerResult = anyhow::Result<()>;

/// Nachrichten eines anderen Call-Teilnehmers
pub trait CallParticipantMessageListener: Send + Sync {
    fn on_offer(&self, call: &CallEnvelope, sdp: &str, nick: Option<&str>) -> ListenerResult;

    fn on_answer(&self, call: &CallEnvelope, sdp: &str, nick: Option<&str>) -> ListenerResult;

    fn on_candidate(&self, call: &CallEnvelope, candidate: &IceCandidate) -> ListenerResult;

    fn on_unshare_screen(&self, call: &CallEnvelope) -> ListenerResult;

    fn on_raise_hand(
        &self,
        _call: &CallEnvelope,
        _state: bool,
        _timestamp: Option<i64>,
    ) -> ListenerResult {
        Ok(())
    }

    fn on_reaction(&self, _call: &CallEnvelope, _reaction: &str) -> ListenerResult {
        Ok(())
    }
}

/// Nachrichten an den lokalen Teilnehmer
pub trait LocalParticipantMessageListener: Send + Sync {
    /// Der lokale Teilnehmer soll in den Raum `room` wechseln
    fn on_switch_to(&self, room: &RoomToken) -> ListenerResult;
}

/// Aenderungen der Teilnehmerliste
pub trait ParticipantListMessageListener: Send + Sync {
    /// Nur die geaenderten Teilnehmer, nicht die komplette Liste
    fn on_participants_update(&self, participants: &[Participant]) -> ListenerResult;

    /// Call-Status aller Teilnehmer wurde auf einmal gesetzt
    fn on_all_participants_update(&self, _in_call: InCallFlags) -> ListenerResult {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SignalingListener
// ---------------------------------------------------------------------------

/// Listener zusammen mit der Kategorie, fuer die er registriert wird
#[derive(Clone)]
pub enum SignalingListener {
    CallParticipant(Arc<dyn CallParticipantMessageListener>),
    LocalParticipant(Arc<dyn LocalParticipantMessageListener>),
    ParticipantList(Arc<dyn ParticipantListMessageListener>),
}

impl SignalingListener {
    pub fn call_participant(listener: Arc<dyn CallParticipantMessageListener>) -> Self {
        Self::CallParticipant(listener)
    }

    pub fn local_participant(listener: Arc<dyn LocalParticipantMessageListener>) -> Self {
        Self::LocalParticipant(listener)
    }

    pub fn participant_list(listener: Arc<dyn ParticipantListMessageListener>) -> Self {
        Self::ParticipantList(listener)
    }

    /// Kategorie, fuer die der Listener registriert wird
    pub fn category(&self) -> ListenerCategory {
        match self {
            Self::CallParticipant(_) => ListenerCategory::CallParticipant,
            Self::LocalParticipant(_) => ListenerCategory::LocalParticipant,
            Self::ParticipantList(_) => ListenerCategory::ParticipantList,
        }
    }

    fn adresse(&self) -> *const () {
        match self {
            Self::CallParticipant(l) => Arc::as_ptr(l) as *const (),
            Self::LocalParticipant(l) => Arc::as_ptr(l) as *const (),
            Self::ParticipantList(l) => Arc::as_ptr(l) as *const (),
        }
    }
}

impl std::fmt::Debug for SignalingListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalingListener")
            .field("kategorie", &self.category())
            .field("adresse", &self.adresse())
            .finish()
    }
}
