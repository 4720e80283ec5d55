//! Prometheus-kompatible Metriken fuer Talkwire
//!
//! Registrierte Metriken (gespiegelt aus `StatistikStand`):
//! - `talkwire_events_total` – Counter: Verarbeitete Signaling-Ereignisse
//! - `talkwire_events_unknown_total` – Counter: Verworfene, unbekannte Ereignisse
//! - `talkwire_deliveries_total` – Counter: Erfolgreiche Listener-Aufrufe
//! - `talkwire_listener_failures_total` – Counter: Listener-Fehler und Panics
//! - `talkwire_messages_sent_total` – Counter: Ausgehende Nachrichten
//! - `talkwire_messages_dropped_total` – Counter: Verworfene ausgehende Nachrichten

use anyhow::Result;
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;
use talkwire_signaling::StatistikStand;

/// Alle Talkwire-Prometheus-Metriken
#[derive(Clone)]
pub struct SignalingMetrics {
    pub registry: Arc<Registry>,

    pub events_total: IntCounter,
    pub events_unknown_total: IntCounter,
    pub deliveries_total: IntCounter,
    pub listener_failures_total: IntCounter,
    pub messages_sent_total: IntCounter,
    pub messages_dropped_total: IntCounter,
}

fn counter(registry: &Registry, name: &str, hilfe: &str) -> Result<IntCounter> {
    let counter = IntCounter::with_opts(Opts::new(name, hilfe))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl SignalingMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Dispatch ---
        let events_total = counter(
            &registry,
            "talkwire_events_total",
            "Gesamtanzahl verarbeiteter Signaling-Ereignisse",
        )?;
        let events_unknown_total = counter(
            &registry,
            "talkwire_events_unknown_total",
            "Verworfene, nicht erkannte Signaling-Ereignisse",
        )?;
        let deliveries_total = counter(
            &registry,
            "talkwire_deliveries_total",
            "Erfolgreiche Listener-Aufrufe",
        )?;
        let listener_failures_total = counter(
            &registry,
            "talkwire_listener_failures_total",
            "Listener-Aufrufe mit Fehler oder Panic",
        )?;

        // --- Versand ---
        let messages_sent_total = counter(
            &registry,
            "talkwire_messages_sent_total",
            "An den Transport uebergebene Signaling-Nachrichten",
        )?;
        let messages_dropped_total = counter(
            &registry,
            "talkwire_messages_dropped_total",
            "Verworfene ausgehende Signaling-Nachrichten",
        )?;

        Ok(Self {
            registry: Arc::new(registry),
            events_total,
            events_unknown_total,
            deliveries_total,
            listener_failures_total,
            messages_sent_total,
            messages_dropped_total,
        })
    }

    /// Gleicht die Counter an eine Momentaufnahme der Zaehler an
    ///
    /// Counter sind monoton: es wird nur die Differenz zum bisherigen Wert
    /// addiert, ein kleinerer Stand aendert nichts.
    pub fn uebernehmen(&self, stand: &StatistikStand) {
        nachziehen(&self.events_total, stand.ereignisse);
        nachziehen(&self.events_unknown_total, stand.unbekannt);
        nachziehen(&self.deliveries_total, stand.zustellungen);
        nachziehen(&self.listener_failures_total, stand.listener_fehler);
        nachziehen(&self.messages_sent_total, stand.gesendet);
        nachziehen(&self.messages_dropped_total, stand.verworfen);
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn rendern(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn nachziehen(counter: &IntCounter, ziel: u64) {
    let differenz = ziel.saturating_sub(counter.get());
    if differenz > 0 {
        counter.inc_by(differenz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stand(ereignisse: u64, unbekannt: u64) -> StatistikStand {
        StatistikStand {
            ereignisse,
            unbekannt,
            zustellungen: 4,
            listener_fehler: 1,
            gesendet: 2,
            verworfen: 0,
        }
    }

    #[test]
    fn metriken_erstellen_erfolgreich() {
        let metriken = SignalingMetrics::neu().unwrap();
        assert_eq!(metriken.registry.gather().len(), 6);
    }

    #[test]
    fn stand_wird_uebernommen() {
        let metriken = SignalingMetrics::neu().unwrap();
        metriken.uebernehmen(&stand(5, 2));
        assert_eq!(metriken.events_total.get(), 5);
        assert_eq!(metriken.events_unknown_total.get(), 2);
        assert_eq!(metriken.deliveries_total.get(), 4);
        assert_eq!(metriken.listener_failures_total.get(), 1);
        assert_eq!(metriken.messages_sent_total.get(), 2);
        assert_eq!(metriken.messages_dropped_total.get(), 0);

        // Erneut uebernehmen addiert nur die Differenz
        metriken.uebernehmen(&stand(8, 2));
        assert_eq!(metriken.events_total.get(), 8);
        assert_eq!(metriken.events_unknown_total.get(), 2);
    }

    #[test]
    fn counter_sinken_nie() {
        let metriken = SignalingMetrics::neu().unwrap();
        metriken.uebernehmen(&stand(5, 2));
        metriken.uebernehmen(&stand(3, 0));
        assert_eq!(metriken.events_total.get(), 5);
        assert_eq!(metriken.events_unknown_total.get(), 2);
    }

    #[test]
    fn metriken_export_prometheus_format() {
        let metriken = SignalingMetrics::neu().unwrap();
        metriken.uebernehmen(&stand(3, 1));

        let output = metriken.rendern().unwrap();
        assert!(output.contains("talkwire_events_total 3"));
        assert!(output.contains("talkwire_events_unknown_total 1"));
        assert!(output.contains("talkwire_messages_dropped_total 0"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE talkwire_deliveries_total counter"));
    }
}
