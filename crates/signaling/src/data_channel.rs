//! Data-Channel-Notifier – Verteilt Peer-Statusmeldungen
//!
//! Peers melden ueber den Data-Channel Mikrofon/Kamera-Status, den
//! Sprechindikator und Nickname-Aenderungen. Der Notifier nutzt dieselbe
//! Registry wie der Signaling-Dispatcher und damit dieselben Garantien
//! (Snapshot-Isolation, Identitaet, Fehlerisolation).

use std::sync::Arc;

use talkwire_protocol::{DataChannelMessage, RawEvent};

use crate::dispatcher::zustellen;
use crate::error::{SignalingError, SignalingResult};
use crate::listener::ListenerResult;
use crate::registry::ListenerRegistry;

/// Empfaenger von Data-Channel-Nachrichten eines Peers
pub trait DataChannelMessageListener: Send + Sync {
    fn on_audio_on(&self) -> ListenerResult;

    fn on_audio_off(&self) -> ListenerResult;

    fn on_video_on(&self) -> ListenerResult;

    fn on_video_off(&self) -> ListenerResult;

    fn on_speaking(&self) -> ListenerResult {
        Ok(())
    }

    fn on_stopped_speaking(&self) -> ListenerResult {
        Ok(())
    }

    fn on_nick_changed(&self, nick: &str) -> ListenerResult;
}

/// Normalisierte Data-Channel-Nachricht
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataChannelEvent {
    AudioOn,
    AudioOff,
    VideoOn,
    VideoOff,
    Speaking,
    StoppedSpeaking,
    NickChanged(String),
    Unknown,
}

impl DataChannelEvent {
    /// Uebersetzt eine Wire-Nachricht, unbekannte Typen werden zu `Unknown`
    pub fn aus_nachricht(nachricht: &DataChannelMessage) -> Self {
        match nachricht.typ.as_str() {
            "audioOn" => Self::AudioOn,
            "audioOff" => Self::AudioOff,
            "videoOn" => Self::VideoOn,
            "videoOff" => Self::VideoOff,
            "speaking" => Self::Speaking,
            "stoppedSpeaking" => Self::StoppedSpeaking,
            "nickChanged" => match nachricht.nick() {
                Some(nick) => Self::NickChanged(nick.to_string()),
                None => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }

    /// Uebersetzt ein rohes JSON-Objekt
    pub fn normalize(raw: &RawEvent) -> Self {
        match serde_json::from_value::<DataChannelMessage>(serde_json::Value::Object(raw.clone())) {
            Ok(nachricht) => Self::aus_nachricht(&nachricht),
            Err(e) => {
                tracing::debug!(fehler = %e, "Data-Channel-Nachricht nicht lesbar");
                Self::Unknown
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::AudioOn => "audioOn",
            Self::AudioOff => "audioOff",
            Self::VideoOn => "videoOn",
            Self::VideoOff => "videoOff",
            Self::Speaking => "speaking",
            Self::StoppedSpeaking => "stoppedSpeaking",
            Self::NickChanged(_) => "nickChanged",
            Self::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// DataChannelMessageNotifier
// ---------------------------------------------------------------------------

/// Verteilt Data-Channel-Nachrichten eines Peers an registrierte Listener
///
/// Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct DataChannelMessageNotifier {
    listeners: Arc<ListenerRegistry<dyn DataChannelMessageListener>>,
}

impl DataChannelMessageNotifier {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert einen Listener, `None` wird abgelehnt
    pub fn add_listener(
        &self,
        listener: Option<Arc<dyn DataChannelMessageListener>>,
    ) -> SignalingResult<()> {
        let listener = listener.ok_or_else(|| {
            SignalingError::ungueltiges_argument("DataChannelMessageListener darf nicht fehlen")
        })?;
        self.listeners.hinzufuegen(listener);
        Ok(())
    }

    /// Meldet einen Listener ab, no-op wenn er nicht registriert ist
    pub fn remove_listener(&self, listener: &Arc<dyn DataChannelMessageListener>) {
        self.listeners.entfernen(listener);
    }

    pub fn ist_registriert(&self, listener: &Arc<dyn DataChannelMessageListener>) -> bool {
        self.listeners.enthaelt(listener)
    }

    pub fn notify_audio_on(&self) {
        self.notify(&DataChannelEvent::AudioOn);
    }

    pub fn notify_audio_off(&self) {
        self.notify(&DataChannelEvent::AudioOff);
    }

    pub fn notify_video_on(&self) {
        self.notify(&DataChannelEvent::VideoOn);
    }

    pub fn notify_video_off(&self) {
        self.notify(&DataChannelEvent::VideoOff);
    }

    /// `true` = spricht gerade, `false` = hat aufgehoert
    pub fn notify_speaking(&self, spricht: bool) {
        if spricht {
            self.notify(&DataChannelEvent::Speaking);
        } else {
            self.notify(&DataChannelEvent::StoppedSpeaking);
        }
    }

    pub fn notify_nick_changed(&self, nick: &str) {
        self.notify(&DataChannelEvent::NickChanged(nick.to_string()));
    }

    /// Normalisiert eine rohe Data-Channel-Nachricht und stellt sie zu
    pub fn process_message(&self, raw: &RawEvent) {
        self.notify(&DataChannelEvent::normalize(raw));
    }

    /// Stellt ein Ereignis an alle Listener des aktuellen Snapshots zu
    pub fn notify(&self, event: &DataChannelEvent) {
        let snapshot = self.listeners.snapshot();
        let name = event.name();
        let (zugestellt, fehlgeschlagen) = match event {
            DataChannelEvent::AudioOn => zustellen(&snapshot, name, |l| l.on_audio_on()),
            DataChannelEvent::AudioOff => zustellen(&snapshot, name, |l| l.on_audio_off()),
            DataChannelEvent::VideoOn => zustellen(&snapshot, name, |l| l.on_video_on()),
            DataChannelEvent::VideoOff => zustellen(&snapshot, name, |l| l.on_video_off()),
            DataChannelEvent::Speaking => zustellen(&snapshot, name, |l| l.on_speaking()),
            DataChannelEvent::StoppedSpeaking => {
                zustellen(&snapshot, name, |l| l.on_stopped_speaking())
            }
            DataChannelEvent::NickChanged(nick) => {
                zustellen(&snapshot, name, |l| l.on_nick_changed(nick))
            }
            DataChannelEvent::Unknown => {
                tracing::debug!("Unbekannte Data-Channel-Nachricht verworfen");
                return;
            }
        };
        tracing::trace!(
            ereignis = name,
            zugestellt,
            fehlgeschlagen,
            "Data-Channel-Nachricht zugestellt"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Aufzeichner {
        aufrufe: Mutex<Vec<String>>,
    }

    impl Aufzeichner {
        fn log(&self, eintrag: impl Into<String>) -> ListenerResult {
            self.aufrufe.lock().push(eintrag.into());
            Ok(())
        }

        fn aufrufe(&self) -> Vec<String> {
            self.aufrufe.lock().clone()
        }
    }

    impl DataChannelMessageListener for Aufzeichner {
        fn on_audio_on(&self) -> ListenerResult {
            self.log("audioOn")
        }
        fn on_audio_off(&self) -> ListenerResult {
            self.log("audioOff")
        }
        fn on_video_on(&self) -> ListenerResult {
            self.log("videoOn")
        }
        fn on_video_off(&self) -> ListenerResult {
            self.log("videoOff")
        }
        fn on_speaking(&self) -> ListenerResult {
            self.log("speaking")
        }
        fn on_stopped_speaking(&self) -> ListenerResult {
            self.log("stoppedSpeaking")
        }
        fn on_nick_changed(&self, nick: &str) -> ListenerResult {
            self.log(format!("nickChanged:{nick}"))
        }
    }

    fn setup() -> (
        DataChannelMessageNotifier,
        Arc<Aufzeichner>,
        Arc<dyn DataChannelMessageListener>,
    ) {
        let notifier = DataChannelMessageNotifier::neu();
        let aufzeichner = Arc::new(Aufzeichner::default());
        let listener: Arc<dyn DataChannelMessageListener> = aufzeichner.clone();
        (notifier, aufzeichner, listener)
    }

    #[test]
    fn listener_hinzufuegen() {
        let (notifier, _, listener) = setup();
        notifier.add_listener(Some(Arc::clone(&listener))).unwrap();
        assert!(notifier.ist_registriert(&listener));
    }

    #[test]
    fn listener_entfernen() {
        let (notifier, _, listener) = setup();
        notifier.add_listener(Some(Arc::clone(&listener))).unwrap();
        notifier.remove_listener(&listener);
        assert!(!notifier.ist_registriert(&listener));
    }

    #[test]
    fn fehlender_listener_wird_abgelehnt() {
        let notifier = DataChannelMessageNotifier::neu();
        assert!(matches!(
            notifier.add_listener(None),
            Err(SignalingError::UngueltigesArgument(_))
        ));
    }

    #[test]
    fn alle_benachrichtigungen() {
        let (notifier, aufzeichner, listener) = setup();
        notifier.add_listener(Some(listener)).unwrap();

        notifier.notify_audio_on();
        notifier.notify_audio_off();
        notifier.notify_video_on();
        notifier.notify_video_off();
        notifier.notify_speaking(true);
        notifier.notify_speaking(false);
        notifier.notify_nick_changed("NewNick");

        assert_eq!(
            aufzeichner.aufrufe(),
            vec![
                "audioOn",
                "audioOff",
                "videoOn",
                "videoOff",
                "speaking",
                "stoppedSpeaking",
                "nickChanged:NewNick"
            ]
        );
    }

    #[test]
    fn rohe_nachrichten() {
        let (notifier, aufzeichner, listener) = setup();
        notifier.add_listener(Some(listener)).unwrap();

        for wert in [
            json!({"type": "audioOn"}),
            json!({"type": "nickChanged", "payload": "Alice"}),
            json!({"type": "nickChanged", "payload": {"name": "Bob", "userid": "bob"}}),
            json!({"type": "nickChanged"}),
            json!({"type": "tanzen"}),
            json!({"payload": "ohne typ"}),
        ] {
            let serde_json::Value::Object(raw) = wert else {
                unreachable!()
            };
            notifier.process_message(&raw);
        }

        assert_eq!(
            aufzeichner.aufrufe(),
            vec!["audioOn", "nickChanged:Alice", "nickChanged:Bob"]
        );
    }

    #[test]
    fn doppelte_registrierung_liefert_einmal() {
        let (notifier, aufzeichner, listener) = setup();
        notifier.add_listener(Some(Arc::clone(&listener))).unwrap();
        notifier.add_listener(Some(listener)).unwrap();

        notifier.notify_video_on();
        assert_eq!(aufzeichner.aufrufe(), vec!["videoOn"]);
    }
}
