//! Relay-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass das Relay ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};
use talkwire_observability::{log_format_gueltig, log_level_gueltig};
use talkwire_signaling::sender::SEND_QUEUE_GROESSE;

/// Vollstaendige Relay-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Eingehende Ereignisse (stdin)
    pub eingang: EingangEinstellungen,
    /// Ausgehende Nachrichten (stdout)
    pub ausgang: AusgangEinstellungen,
    /// Observability-Einstellungen (Metriken)
    pub observability: ObservabilityEinstellungen,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Einstellungen fuer eingehende Ereignisse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EingangEinstellungen {
    /// Maximale Laenge einer Eingabezeile in Bytes, laengere werden uebersprungen
    pub max_zeilen_laenge: usize,
}

impl Default for EingangEinstellungen {
    fn default() -> Self {
        Self {
            max_zeilen_laenge: 64 * 1024,
        }
    }
}

/// Einstellungen fuer ausgehende Nachrichten
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AusgangEinstellungen {
    /// Kapazitaet der Send-Queue
    pub queue_groesse: usize,
    /// Wie lange beim Beenden auf das Leeren der Queue gewartet wird (Millisekunden)
    pub abschluss_timeout_ms: u64,
}

impl Default for AusgangEinstellungen {
    fn default() -> Self {
        Self {
            queue_groesse: SEND_QUEUE_GROESSE,
            abschluss_timeout_ms: 2000,
        }
    }
}

/// Observability-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Gibt beim Beenden die Metriken im Prometheus-Textformat auf stderr aus
    pub metriken_ausgeben: bool,
}

impl RelayConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.pruefen()?;
        Ok(config)
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("logging.level '{}' ist kein gueltiger Filter", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("logging.format muss 'text' oder 'json' sein");
        }
        if self.eingang.max_zeilen_laenge == 0 {
            anyhow::bail!("eingang.max_zeilen_laenge muss groesser als 0 sein");
        }
        if self.ausgang.queue_groesse == 0 {
            anyhow::bail!("ausgang.queue_groesse muss groesser als 0 sein");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, "text");
        assert_eq!(cfg.eingang.max_zeilen_laenge, 65536);
        assert_eq!(cfg.ausgang.queue_groesse, SEND_QUEUE_GROESSE);
        assert_eq!(cfg.ausgang.abschluss_timeout_ms, 2000);
        assert!(!cfg.observability.metriken_ausgeben);
        assert!(cfg.pruefen().is_ok());
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [logging]
            format = "json"

            [ausgang]
            queue_groesse = 8

            [observability]
            metriken_ausgeben = true
        "#;
        let cfg: RelayConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.logging.format, "json");
        assert_eq!(cfg.ausgang.queue_groesse, 8);
        assert!(cfg.observability.metriken_ausgeben);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.eingang.max_zeilen_laenge, 65536);
    }

    #[test]
    fn null_werte_werden_abgelehnt() {
        let cfg: RelayConfig = toml::from_str("[eingang]\nmax_zeilen_laenge = 0").unwrap();
        assert!(cfg.pruefen().is_err());

        let cfg: RelayConfig = toml::from_str("[ausgang]\nqueue_groesse = 0").unwrap();
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn unbekanntes_log_level_wird_abgelehnt() {
        let cfg: RelayConfig = toml::from_str("[logging]\nlevel = \"verbose\"").unwrap();
        assert!(cfg.pruefen().is_err());

        let cfg: RelayConfig = toml::from_str("[logging]\nformat = \"xml\"").unwrap();
        assert!(cfg.pruefen().is_err());

        let cfg: RelayConfig =
            toml::from_str("[logging]\nlevel = \"warn,talkwire_relay=debug\"").unwrap();
        assert!(cfg.pruefen().is_ok());
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let cfg = RelayConfig::laden("/nicht/vorhanden/relay.toml").unwrap();
        assert_eq!(cfg.ausgang.queue_groesse, SEND_QUEUE_GROESSE);
    }

    #[test]
    fn kaputte_datei_ist_ein_fehler() {
        let pfad = std::env::temp_dir().join(format!("talkwire-relay-{}.toml", std::process::id()));
        std::fs::write(&pfad, "[eingang\nmax_zeilen_laenge = ").unwrap();
        let res = RelayConfig::laden(pfad.to_str().unwrap());
        std::fs::remove_file(&pfad).unwrap();
        assert!(res.is_err());
    }
}
