//! talkwire-relay – Bibliotheks-Root
//!
//! Das Relay liest rohe Signaling-Ereignisse als JSON-Zeilen, stellt sie
//! ueber den Dispatcher zu und schreibt ausgehende Nachrichten als JSON-Zeilen
//! zurueck. Eingabe und Ausgabe sind generisch, damit Tests ohne stdin/stdout
//! auskommen.

pub mod config;
pub mod protokoll;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use talkwire_observability::SignalingMetrics;
use talkwire_protocol::SignalingMessage;
use talkwire_signaling::{
    ChannelSender, DispatchReport, DispatchStatistik, SignalingDispatcher, SignalingListener,
    StatistikStand,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use config::RelayConfig;
use protokoll::ProtokollListener;

/// Haelt Dispatcher, Send-Queue und Metriken zusammen
pub struct Relay {
    pub config: RelayConfig,
    dispatcher: SignalingDispatcher,
    sender: ChannelSender,
    ausgang: Option<mpsc::Receiver<SignalingMessage>>,
    metriken: SignalingMetrics,
}

impl Relay {
    /// Erstellt ein Relay mit protokollierendem Listener in allen Kategorien
    pub fn neu(config: RelayConfig) -> Result<Self> {
        config.pruefen()?;
        let statistik = Arc::new(DispatchStatistik::neu());
        let dispatcher = SignalingDispatcher::mit_statistik(Arc::clone(&statistik));

        let protokoll = Arc::new(ProtokollListener);
        dispatcher.add_listener(SignalingListener::call_participant(protokoll.clone()))?;
        dispatcher.add_listener(SignalingListener::local_participant(protokoll.clone()))?;
        dispatcher.add_listener(SignalingListener::participant_list(protokoll))?;

        let (sender, ausgang) = ChannelSender::neu(config.ausgang.queue_groesse);

        Ok(Self {
            config,
            dispatcher,
            sender: sender.mit_statistik(statistik),
            ausgang: Some(ausgang),
            metriken: SignalingMetrics::neu()?,
        })
    }

    /// Dispatcher, um weitere Listener anzumelden
    pub fn dispatcher(&self) -> &SignalingDispatcher {
        &self.dispatcher
    }

    /// Sender fuer ausgehende Nachrichten
    ///
    /// Beim Beenden wartet [`Relay::ausfuehren`] hoechstens
    /// `ausgang.abschluss_timeout_ms` auf noch gehaltene Klone, danach wird
    /// der Schreiber abgebrochen und nicht geschriebene Nachrichten verfallen.
    pub fn sender(&self) -> ChannelSender {
        self.sender.clone()
    }

    /// Verarbeitet eine Eingabezeile
    ///
    /// Leere Zeilen, ungueltiges JSON und Nicht-Objekte werden geloggt und
    /// uebersprungen (`None`).
    pub fn zeile_verarbeiten(&self, zeile: &str) -> Option<DispatchReport> {
        let zeile = zeile.trim();
        if zeile.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(zeile) {
            Ok(Value::Object(raw)) => Some(self.dispatcher.process_event(&raw)),
            Ok(_) => {
                tracing::warn!("Eingabezeile ist kein JSON-Objekt, uebersprungen");
                None
            }
            Err(e) => {
                tracing::warn!(fehler = %e, "Eingabezeile ist kein gueltiges JSON, uebersprungen");
                None
            }
        }
    }

    /// Laeuft bis die Eingabe endet oder `shutdown` abschliesst
    ///
    /// Gibt den Endstand der Zaehler zurueck, nachdem die eingereihten
    /// ausgehenden Nachrichten geschrieben wurden oder der Abschluss-Timeout
    /// abgelaufen ist.
    pub async fn ausfuehren<E, A, S>(
        mut self,
        eingabe: E,
        ausgabe: A,
        shutdown: S,
    ) -> Result<StatistikStand>
    where
        E: AsyncRead + Unpin,
        A: AsyncWrite + Unpin + Send + 'static,
        S: Future<Output = ()>,
    {
        let ausgang = self
            .ausgang
            .take()
            .ok_or_else(|| anyhow!("Relay wurde bereits ausgefuehrt"))?;
        let schreiber = tokio::spawn(ausgang_schreiben(ausgang, ausgabe));

        let mut zeilen = FramedRead::new(
            eingabe,
            LinesCodec::new_with_max_length(self.config.eingang.max_zeilen_laenge),
        );
        tokio::pin!(shutdown);
        // Nach einem Decoder-Fehler liefert FramedRead einmal `None` und liest danach weiter
        let mut nach_fehler = false;

        tracing::info!(
            max_zeilen_laenge = self.config.eingang.max_zeilen_laenge,
            queue_groesse = self.config.ausgang.queue_groesse,
            "Relay laeuft, warte auf Ereignisse"
        );

        loop {
            tokio::select! {
                zeile = zeilen.next() => match zeile {
                    Some(Ok(zeile)) => {
                        nach_fehler = false;
                        self.zeile_verarbeiten(&zeile);
                    }
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        nach_fehler = true;
                        tracing::warn!(
                            max = self.config.eingang.max_zeilen_laenge,
                            "Eingabezeile zu lang, uebersprungen"
                        );
                    }
                    Some(Err(LinesCodecError::Io(e))) => {
                        return Err(anyhow!("Eingabe nicht lesbar: {e}"));
                    }
                    None if std::mem::take(&mut nach_fehler) => {}
                    None => {
                        tracing::info!("Eingabe beendet");
                        break;
                    }
                },
                _ = &mut shutdown => {
                    tracing::info!("Shutdown-Signal empfangen, Relay wird beendet");
                    break;
                }
            }
        }

        // Eigenen Sender freigeben, damit der Schreiber die Queue leert und endet
        let Relay {
            config,
            dispatcher,
            sender,
            metriken,
            ..
        } = self;
        drop(sender);
        let geschrieben = schreiber_abschliessen(
            schreiber,
            Duration::from_millis(config.ausgang.abschluss_timeout_ms),
        )
        .await?;

        let stand = dispatcher.statistik().stand();
        metriken.uebernehmen(&stand);

        tracing::info!(
            ereignisse = stand.ereignisse,
            unbekannt = stand.unbekannt,
            zustellungen = stand.zustellungen,
            listener_fehler = stand.listener_fehler,
            gesendet = stand.gesendet,
            verworfen = stand.verworfen,
            geschrieben = ?geschrieben,
            "Relay beendet"
        );

        if config.observability.metriken_ausgeben {
            eprint!("{}", metriken.rendern()?);
        }

        Ok(stand)
    }
}

/// Wartet begrenzt auf den Schreiber und bricht ihn danach ab
async fn schreiber_abschliessen(
    mut schreiber: JoinHandle<Result<u64>>,
    timeout: Duration,
) -> Result<Option<u64>> {
    match tokio::time::timeout(timeout, &mut schreiber).await {
        Ok(ergebnis) => {
            let geschrieben = ergebnis.map_err(|e| anyhow!("Schreib-Task abgebrochen: {e}"))??;
            Ok(Some(geschrieben))
        }
        Err(_) => {
            schreiber.abort();
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Sender noch gehalten, Schreiber wird abgebrochen"
            );
            Ok(None)
        }
    }
}

/// Schreibt ausgehende Nachrichten als JSON-Zeilen, bis alle Sender weg sind
async fn ausgang_schreiben<A>(
    mut rx: mpsc::Receiver<SignalingMessage>,
    ausgabe: A,
) -> Result<u64>
where
    A: AsyncWrite + Unpin,
{
    let mut zeilen = FramedWrite::new(ausgabe, LinesCodec::new());
    let mut geschrieben = 0;

    while let Some(nachricht) = rx.recv().await {
        match nachricht.to_json() {
            Ok(json) => {
                zeilen.send(json).await?;
                geschrieben += 1;
            }
            Err(e) => {
                tracing::warn!(
                    kind = %nachricht.kind,
                    fehler = %e,
                    "Nachricht nicht serialisierbar"
                );
            }
        }
    }

    SinkExt::<String>::close(&mut zeilen).await?;
    Ok(geschrieben)
}
