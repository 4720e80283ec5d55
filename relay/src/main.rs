//! Talkwire Relay – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und verarbeitet
//! Signaling-Ereignisse von stdin bis EOF oder Ctrl-C.

use anyhow::Result;
use talkwire_observability::logging_initialisieren;
use talkwire_relay::{config::RelayConfig, Relay};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("TALKWIRE_CONFIG").unwrap_or_else(|_| "relay.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = RelayConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Talkwire Relay wird initialisiert"
    );

    let relay = Relay::neu(config)?;
    relay
        .ausfuehren(tokio::io::stdin(), tokio::io::stdout(), async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
