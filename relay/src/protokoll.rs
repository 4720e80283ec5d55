//! Protokollierender Listener
//!
//! Meldet sich fuer alle drei Kategorien an und schreibt jedes zugestellte
//! Ereignis als strukturierten Log-Eintrag.

use talkwire_core::types::RoomToken;
use talkwire_protocol::{IceCandidate, InCallFlags, Participant};
use talkwire_signaling::{
    CallEnvelope, CallParticipantMessageListener, ListenerResult, LocalParticipantMessageListener,
    ParticipantListMessageListener,
};

#[derive(Debug, Default)]
pub struct ProtokollListener;

impl CallParticipantMessageListener for ProtokollListener {
    fn on_offer(&self, call: &CallEnvelope, sdp: &str, nick: Option<&str>) -> ListenerResult {
        tracing::info!(
            from = %call.from,
            room_type = call.room_type.as_deref().unwrap_or("-"),
            sdp_laenge = sdp.len(),
            nick = nick.unwrap_or("-"),
            "Offer empfangen"
        );
        Ok(())
    }

    fn on_answer(&self, call: &CallEnvelope, sdp: &str, nick: Option<&str>) -> ListenerResult {
        tracing::info!(
            from = %call.from,
            sdp_laenge = sdp.len(),
            nick = nick.unwrap_or("-"),
            "Answer empfangen"
        );
        Ok(())
    }

    fn on_candidate(&self, call: &CallEnvelope, candidate: &IceCandidate) -> ListenerResult {
        tracing::info!(
            from = %call.from,
            sdp_mid = candidate.sdp_mid.as_deref().unwrap_or("-"),
            candidate = %candidate.candidate,
            "ICE-Kandidat empfangen"
        );
        Ok(())
    }

    fn on_unshare_screen(&self, call: &CallEnvelope) -> ListenerResult {
        tracing::info!(from = %call.from, "Bildschirmfreigabe beendet");
        Ok(())
    }

    fn on_raise_hand(
        &self,
        call: &CallEnvelope,
        state: bool,
        timestamp: Option<i64>,
    ) -> ListenerResult {
        tracing::info!(from = %call.from, state, timestamp, "Hand gehoben/gesenkt");
        Ok(())
    }

    fn on_reaction(&self, call: &CallEnvelope, reaction: &str) -> ListenerResult {
        tracing::info!(from = %call.from, reaction, "Reaktion empfangen");
        Ok(())
    }
}

impl LocalParticipantMessageListener for ProtokollListener {
    fn on_switch_to(&self, room: &RoomToken) -> ListenerResult {
        tracing::info!(room = %room, "Raumwechsel angefordert");
        Ok(())
    }
}

impl ParticipantListMessageListener for ProtokollListener {
    fn on_participants_update(&self, participants: &[Participant]) -> ListenerResult {
        for p in participants {
            tracing::info!(
                session = %p.session_id,
                user = p.user_id.as_deref().unwrap_or("-"),
                in_call = p.in_call.0,
                "Teilnehmer aktualisiert"
            );
        }
        Ok(())
    }

    fn on_all_participants_update(&self, in_call: InCallFlags) -> ListenerResult {
        tracing::info!(in_call = in_call.0, "Call-Status aller Teilnehmer gesetzt");
        Ok(())
    }
}
