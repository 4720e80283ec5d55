//! Signaling-Dispatcher – Verteilt normalisierte Ereignisse an Listener
//!
//! Der Dispatcher empfaengt rohe Ereignisse vom Transport, normalisiert sie,
//! bestimmt die zustaendige Listener-Kategorie und ruft den passenden Callback
//! auf jedem Listener der Kategorie auf.
//!
//! ## Zustellgarantien
//! - Die Empfaenger stehen mit dem Snapshot zu Beginn der Zustellung fest,
//!   in Registrierungsreihenfolge
//! - Waehrend der Zustellung hinzugefuegte Listener erhalten erst das
//!   naechste Ereignis
//! - Waehrend der Zustellung entfernte Listener erhalten das laufende
//!   Ereignis noch, falls sie im Snapshot stehen
//! - Ein fehlschlagender oder abstuerzender Listener unterbricht die Zustellung
//!   an die uebrigen nicht
//! - Unbekannte Ereignisse werden ohne Fehler verworfen

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use talkwire_protocol::RawEvent;

use crate::error::{SignalingError, SignalingResult};
use crate::event::{ListenerCategory, SignalingEvent};
use crate::listener::{
    CallParticipantMessageListener, ListenerResult, LocalParticipantMessageListener,
    ParticipantListMessageListener, SignalingListener,
};
use crate::normalizer;
use crate::registry::{ListenerRegistry, Snapshot};
use crate::stats::DispatchStatistik;

// ---------------------------------------------------------------------------
// DispatchReport
// ---------------------------------------------------------------------------

/// Ergebnis der Zustellung eines einzelnen Ereignisses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Zustaendige Kategorie, `None` fuer unbekannte Ereignisse
    pub kategorie: Option<ListenerCategory>,
    /// Listener, deren Callback erfolgreich war
    pub zugestellt: usize,
    /// Listener, deren Callback fehlschlug oder abstuerzte
    pub fehlgeschlagen: usize,
}

impl DispatchReport {
    /// Anzahl aufgerufener Listener
    pub fn aufgerufen(&self) -> usize {
        self.zugestellt + self.fehlgeschlagen
    }
}

// ---------------------------------------------------------------------------
// SignalingDispatcher
// ---------------------------------------------------------------------------

/// Listener-Registry und Dispatcher in einer Komponente
///
/// Thread-safe. Clone teilt den inneren Zustand, sodass Listener einen Klon
/// halten und sich darueber selbst (oder andere) an- und abmelden koennen.
#[derive(Clone, Default)]
pub struct SignalingDispatcher {
    inner: Arc<SignalingDispatcherInner>,
}

#[derive(Default)]
struct SignalingDispatcherInner {
    call_participant: ListenerRegistry<dyn CallParticipantMessageListener>,
    local_participant: ListenerRegistry<dyn LocalParticipantMessageListener>,
    participant_list: ListenerRegistry<dyn ParticipantListMessageListener>,
    statistik: Arc<DispatchStatistik>,
}

impl SignalingDispatcher {
    /// Erstellt einen Dispatcher ohne Listener
    pub fn neu() -> Self {
        Self::default()
    }

    /// Erstellt einen Dispatcher, der in gemeinsame Zaehler schreibt
    pub fn mit_statistik(statistik: Arc<DispatchStatistik>) -> Self {
        Self {
            inner: Arc::new(SignalingDispatcherInner {
                call_participant: ListenerRegistry::neu(),
                local_participant: ListenerRegistry::neu(),
                participant_list: ListenerRegistry::neu(),
                statistik,
            }),
        }
    }

    /// Zaehler dieses Dispatchers
    pub fn statistik(&self) -> Arc<DispatchStatistik> {
        Arc::clone(&self.inner.statistik)
    }

    /// Registriert einen Listener fuer seine Kategorie
    ///
    /// `None` wird mit `UngueltigesArgument` abgelehnt, ohne die Registry zu
    /// veraendern. Eine bereits registrierte Instanz bleibt an ihrer Position.
    pub fn add_listener(
        &self,
        listener: impl Into<Option<SignalingListener>>,
    ) -> SignalingResult<()> {
        let listener = listener.into().ok_or_else(|| {
            SignalingError::ungueltiges_argument("Listener darf nicht fehlen")
        })?;

        let kategorie = listener.category();
        let neu = match listener {
            SignalingListener::CallParticipant(l) => self.inner.call_participant.hinzufuegen(l),
            SignalingListener::LocalParticipant(l) => self.inner.local_participant.hinzufuegen(l),
            SignalingListener::ParticipantList(l) => self.inner.participant_list.hinzufuegen(l),
        };

        if neu {
            tracing::debug!(kategorie = %kategorie, "Listener registriert");
        } else {
            tracing::trace!(kategorie = %kategorie, "Listener bereits registriert");
        }
        Ok(())
    }

    /// Meldet einen Listener ab, no-op wenn er nicht registriert ist
    ///
    /// Sicher auch waehrend einer laufenden Zustellung; die Abmeldung wirkt
    /// erst fuer nachfolgende Ereignisse.
    pub fn remove_listener(&self, listener: &SignalingListener) {
        let entfernt = match listener {
            SignalingListener::CallParticipant(l) => self.inner.call_participant.entfernen(l),
            SignalingListener::LocalParticipant(l) => self.inner.local_participant.entfernen(l),
            SignalingListener::ParticipantList(l) => self.inner.participant_list.entfernen(l),
        };

        if entfernt {
            tracing::debug!(kategorie = %listener.category(), "Listener abgemeldet");
        }
    }

    /// Prueft ob die Instanz fuer ihre Kategorie registriert ist
    pub fn ist_registriert(&self, listener: &SignalingListener) -> bool {
        match listener {
            SignalingListener::CallParticipant(l) => self.inner.call_participant.enthaelt(l),
            SignalingListener::LocalParticipant(l) => self.inner.local_participant.enthaelt(l),
            SignalingListener::ParticipantList(l) => self.inner.participant_list.enthaelt(l),
        }
    }

    /// Anzahl registrierter Listener einer Kategorie
    pub fn listener_anzahl(&self, kategorie: ListenerCategory) -> usize {
        match kategorie {
            ListenerCategory::CallParticipant => self.inner.call_participant.len(),
            ListenerCategory::LocalParticipant => self.inner.local_participant.len(),
            ListenerCategory::ParticipantList => self.inner.participant_list.len(),
        }
    }

    /// Normalisiert ein rohes Ereignis und stellt es zu
    ///
    /// Schlaegt nie fehl: fehlerhafte Eingaben werden als unbekannt verworfen.
    pub fn process_event(&self, raw: &RawEvent) -> DispatchReport {
        let event = match normalizer::try_normalize(raw) {
            Ok(event) => event,
            Err(grund) => {
                tracing::debug!(grund = %grund, "Signaling-Ereignis verworfen");
                SignalingEvent::Unknown
            }
        };
        self.dispatch(&event)
    }

    /// Stellt ein bereits normalisiertes Ereignis zu
    pub fn dispatch(&self, event: &SignalingEvent) -> DispatchReport {
        let inner = &self.inner;
        inner.statistik.ereignis(event.ist_unbekannt());

        let Some(kategorie) = event.category() else {
            return DispatchReport::default();
        };

        let name = event.name();
        let (zugestellt, fehlgeschlagen) = match event {
            SignalingEvent::CallOffer { call, sdp, nick } => {
                zustellen(&inner.call_participant.snapshot(), name, |l| {
                    l.on_offer(call, sdp, nick.as_deref())
                })
            }
            SignalingEvent::CallAnswer { call, sdp, nick } => {
                zustellen(&inner.call_participant.snapshot(), name, |l| {
                    l.on_answer(call, sdp, nick.as_deref())
                })
            }
            SignalingEvent::CallCandidate { call, candidate } => {
                zustellen(&inner.call_participant.snapshot(), name, |l| {
                    l.on_candidate(call, candidate)
                })
            }
            SignalingEvent::CallUnshare { call } => {
                zustellen(&inner.call_participant.snapshot(), name, |l| {
                    l.on_unshare_screen(call)
                })
            }
            SignalingEvent::CallRaiseHand {
                call,
                state,
                timestamp,
            } => zustellen(&inner.call_participant.snapshot(), name, |l| {
                l.on_raise_hand(call, *state, *timestamp)
            }),
            SignalingEvent::CallReaction { call, reaction } => {
                zustellen(&inner.call_participant.snapshot(), name, |l| {
                    l.on_reaction(call, reaction)
                })
            }
            SignalingEvent::SwitchTo { room } => {
                zustellen(&inner.local_participant.snapshot(), name, |l| {
                    l.on_switch_to(room)
                })
            }
            SignalingEvent::ParticipantsUpdate { participants } => {
                zustellen(&inner.participant_list.snapshot(), name, |l| {
                    l.on_participants_update(participants)
                })
            }
            SignalingEvent::AllParticipantsUpdate { in_call } => {
                zustellen(&inner.participant_list.snapshot(), name, |l| {
                    l.on_all_participants_update(*in_call)
                })
            }
            SignalingEvent::Unknown => (0, 0),
        };

        inner.statistik.zustellungen(zugestellt, fehlgeschlagen);
        tracing::debug!(
            ereignis = name,
            kategorie = %kategorie,
            zugestellt,
            fehlgeschlagen,
            "Signaling-Ereignis zugestellt"
        );

        DispatchReport {
            kategorie: Some(kategorie),
            zugestellt,
            fehlgeschlagen,
        }
    }
}

impl std::fmt::Debug for SignalingDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalingDispatcher")
            .field("call_participant", &self.inner.call_participant)
            .field("local_participant", &self.inner.local_participant)
            .field("participant_list", &self.inner.participant_list)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Zustellung
// ---------------------------------------------------------------------------

/// Ruft `aufruf` fuer jeden Listener des Snapshots auf
///
/// Jeder Aufruf ist isoliert: Fehler und Panics werden geloggt und gezaehlt.
/// Gibt `(erfolgreich, fehlgeschlagen)` zurueck.
pub(crate) fn zustellen<L: ?Sized>(
    snapshot: &Snapshot<L>,
    ereignis: &'static str,
    aufruf: impl Fn(&L) -> ListenerResult,
) -> (usize, usize) {
    let mut erfolgreich = 0;
    let mut fehlgeschlagen = 0;

    for (position, listener) in snapshot.iter().enumerate() {
        match panic::catch_unwind(AssertUnwindSafe(|| aufruf(&**listener))) {
            Ok(Ok(())) => {
                erfolgreich += 1;
                tracing::trace!(ereignis, position, "Listener benachrichtigt");
            }
            Ok(Err(e)) => {
                fehlgeschlagen += 1;
                tracing::warn!(ereignis, position, fehler = %e, "Listener-Callback fehlgeschlagen");
            }
            Err(panik) => {
                fehlgeschlagen += 1;
                tracing::error!(
                    ereignis,
                    position,
                    grund = panik_text(&*panik),
                    "Listener-Callback abgestuerzt"
                );
            }
        }
    }

    (erfolgreich, fehlgeschlagen)
}

fn panik_text(panik: &(dyn Any + Send)) -> &str {
    if let Some(text) = panik.downcast_ref::<&str>() {
        text
    } else if let Some(text) = panik.downcast_ref::<String>() {
        text
    } else {
        "unbekannte Ursache"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use talkwire_core::types::RoomToken;

    #[derive(Default)]
    struct Aufzeichner {
        aufrufe: Mutex<Vec<String>>,
    }

    impl LocalParticipantMessageListener for Aufzeichner {
        fn on_switch_to(&self, room: &RoomToken) -> ListenerResult {
            self.aufrufe.lock().push(room.as_str().to_string());
            Ok(())
        }
    }

    struct Fehlerhaft;

    impl LocalParticipantMessageListener for Fehlerhaft {
        fn on_switch_to(&self, _room: &RoomToken) -> ListenerResult {
            anyhow::bail!("absichtlicher Fehler")
        }
    }

    struct Panisch;

    impl LocalParticipantMessageListener for Panisch {
        fn on_switch_to(&self, _room: &RoomToken) -> ListenerResult {
            panic!("absichtliche Panik")
        }
    }

    fn switch_to(token: &str) -> RawEvent {
        match json!({"type": "switchto", "target": "room", "switchto": {"roomid": token}}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn fehlender_listener_wird_abgelehnt() {
        let dispatcher = SignalingDispatcher::neu();
        let res = dispatcher.add_listener(None);
        assert!(matches!(res, Err(SignalingError::UngueltigesArgument(_))));
        assert_eq!(dispatcher.listener_anzahl(ListenerCategory::LocalParticipant), 0);
    }

    #[test]
    fn fehler_und_panik_unterbrechen_zustellung_nicht() {
        let dispatcher = SignalingDispatcher::neu();
        let danach = Arc::new(Aufzeichner::default());

        dispatcher
            .add_listener(SignalingListener::local_participant(Arc::new(Fehlerhaft)))
            .unwrap();
        dispatcher
            .add_listener(SignalingListener::local_participant(Arc::new(Panisch)))
            .unwrap();
        dispatcher
            .add_listener(SignalingListener::local_participant(danach.clone()))
            .unwrap();

        let report = dispatcher.process_event(&switch_to("theToken"));

        assert_eq!(report.kategorie, Some(ListenerCategory::LocalParticipant));
        assert_eq!(report.zugestellt, 1);
        assert_eq!(report.fehlgeschlagen, 2);
        assert_eq!(*danach.aufrufe.lock(), vec!["theToken".to_string()]);

        let stand = dispatcher.statistik().stand();
        assert_eq!(stand.listener_fehler, 2);
        assert_eq!(stand.zustellungen, 1);
    }

    #[test]
    fn unbekanntes_ereignis_wird_gezaehlt() {
        let dispatcher = SignalingDispatcher::neu();
        let raw = match json!({"type": "unbekannt"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let report = dispatcher.process_event(&raw);
        assert_eq!(report, DispatchReport::default());
        assert_eq!(report.aufgerufen(), 0);

        let stand = dispatcher.statistik().stand();
        assert_eq!(stand.ereignisse, 1);
        assert_eq!(stand.unbekannt, 1);
    }

    #[test]
    fn panik_text_aus_string_und_str() {
        let a: Box<dyn Any + Send> = Box::new("statisch");
        let b: Box<dyn Any + Send> = Box::new(String::from("dynamisch"));
        let c: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panik_text(&*a), "statisch");
        assert_eq!(panik_text(&*b), "dynamisch");
        assert_eq!(panik_text(&*c), "unbekannte Ursache");
    }
}
