//! Zaehler fuer Dispatch und Versand
//!
//! Lock-freie Atomics, die von Dispatcher und Sender fortgeschrieben werden.
//! `stand()` liefert eine Momentaufnahme fuer Logs und Metrik-Export.

use std::sync::atomic::{AtomicU64, Ordering};

/// Laufende Zaehler der Signaling-Engine
#[derive(Debug, Default)]
pub struct DispatchStatistik {
    ereignisse: AtomicU64,
    unbekannt: AtomicU64,
    zustellungen: AtomicU64,
    listener_fehler: AtomicU64,
    gesendet: AtomicU64,
    verworfen: AtomicU64,
}

/// Momentaufnahme der Zaehler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatistikStand {
    /// Verarbeitete Ereignisse (inkl. unbekannter)
    pub ereignisse: u64,
    /// Verworfene, nicht erkannte Ereignisse
    pub unbekannt: u64,
    /// Erfolgreiche Listener-Aufrufe
    pub zustellungen: u64,
    /// Listener-Aufrufe mit Fehler oder Panic
    pub listener_fehler: u64,
    /// An den Transport uebergebene Nachrichten
    pub gesendet: u64,
    /// Nicht zustellbare ausgehende Nachrichten
    pub verworfen: u64,
}

impl DispatchStatistik {
    pub fn neu() -> Self {
        Self::default()
    }

    pub(crate) fn ereignis(&self, unbekannt: bool) {
        self.ereignisse.fetch_add(1, Ordering::Relaxed);
        if unbekannt {
            self.unbekannt.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn zustellungen(&self, erfolgreich: usize, fehlgeschlagen: usize) {
        self.zustellungen
            .fetch_add(erfolgreich as u64, Ordering::Relaxed);
        self.listener_fehler
            .fetch_add(fehlgeschlagen as u64, Ordering::Relaxed);
    }

    pub(crate) fn gesendet(&self) {
        self.gesendet.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn verworfen(&self) {
        self.verworfen.fetch_add(1, Ordering::Relaxed);
    }

    /// Liest alle Zaehler
    pub fn stand(&self) -> StatistikStand {
        StatistikStand {
            ereignisse: self.ereignisse.load(Ordering::Relaxed),
            unbekannt: self.unbekannt.load(Ordering::Relaxed),
            zustellungen: self.zustellungen.load(Ordering::Relaxed),
            listener_fehler: self.listener_fehler.load(Ordering::Relaxed),
            gesendet: self.gesendet.load(Ordering::Relaxed),
            verworfen: self.verworfen.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zaehler_summieren() {
        let stat = DispatchStatistik::neu();
        stat.ereignis(false);
        stat.ereignis(true);
        stat.zustellungen(3, 1);
        stat.gesendet();
        stat.verworfen();

        assert_eq!(
            stat.stand(),
            StatistikStand {
                ereignisse: 2,
                unbekannt: 1,
                zustellungen: 3,
                listener_fehler: 1,
                gesendet: 1,
                verworfen: 1,
            }
        );
    }
}
