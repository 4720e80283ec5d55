//! Outbound-Sender – Uebergibt ausgehende Nachrichten an den Transport
//!
//! Der Sender ist eine schmale Schnittstelle: er nimmt eine fertig gebaute
//! [`SignalingMessage`] entgegen und reicht sie an den Transport weiter, der
//! sie serialisiert und zustellt. Die Reihenfolge der `send`-Aufrufe bleibt
//! erhalten.

use std::sync::Arc;

use talkwire_protocol::SignalingMessage;
use tokio::sync::mpsc;

use crate::error::{SignalingError, SignalingResult};
use crate::stats::DispatchStatistik;

/// Groesse der Send-Queue, wenn nichts anderes konfiguriert ist
pub const SEND_QUEUE_GROESSE: usize = 64;

/// Uebergibt Signaling-Nachrichten an den Transport
pub trait SignalingMessageSender: Send + Sync {
    /// Sendet die gegebene Nachricht
    fn send(&self, message: SignalingMessage) -> SignalingResult<()>;
}

impl<T: SignalingMessageSender + ?Sized> SignalingMessageSender for Arc<T> {
    fn send(&self, message: SignalingMessage) -> SignalingResult<()> {
        (**self).send(message)
    }
}

// ---------------------------------------------------------------------------
// ChannelSender
// ---------------------------------------------------------------------------

/// Sender auf eine begrenzte tokio-Queue
///
/// Der Transport liest die Queue und schreibt auf die Leitung. `send`
/// blockiert nie: bei voller oder geschlossener Queue wird die Nachricht
/// verworfen und ein Fehler zurueckgegeben.
#[derive(Clone, Debug)]
pub struct ChannelSender {
    tx: mpsc::Sender<SignalingMessage>,
    statistik: Option<Arc<DispatchStatistik>>,
}

impl ChannelSender {
    /// Erstellt Sender und Empfangsseite der Queue
    pub fn neu(queue_groesse: usize) -> (Self, mpsc::Receiver<SignalingMessage>) {
        let (tx, rx) = mpsc::channel(queue_groesse.max(1));
        (
            Self {
                tx,
                statistik: None,
            },
            rx,
        )
    }

    /// Zaehlt gesendete und verworfene Nachrichten in `statistik`
    pub fn mit_statistik(mut self, statistik: Arc<DispatchStatistik>) -> Self {
        self.statistik = Some(statistik);
        self
    }

    fn verworfen(&self) {
        if let Some(stat) = &self.statistik {
            stat.verworfen();
        }
    }
}

impl SignalingMessageSender for ChannelSender {
    fn send(&self, message: SignalingMessage) -> SignalingResult<()> {
        let kind = message.kind;
        match self.tx.try_send(message) {
            Ok(()) => {
                if let Some(stat) = &self.statistik {
                    stat.gesendet();
                }
                tracing::trace!(kind = %kind, "Signaling-Nachricht eingereiht");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.verworfen();
                tracing::warn!(kind = %kind, "Send-Queue voll – Nachricht verworfen");
                Err(SignalingError::SendFehler("Send-Queue voll".into()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.verworfen();
                tracing::debug!(kind = %kind, "Send-Queue geschlossen (Transport getrennt)");
                Err(SignalingError::SendFehler("Transport getrennt".into()))
            }
        }
    }
}
