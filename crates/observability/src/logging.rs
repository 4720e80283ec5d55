//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `TW_LOG_LEVEL`: Log-Level oder Filter-Direktive, Standard: info
//! - `TW_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Die Umgebung hat Vorrang vor den Werten aus der Konfigurationsdatei.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

const ENV_LEVEL: &str = "TW_LOG_LEVEL";
const ENV_FORMAT: &str = "TW_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Liest `TW_LOG_LEVEL` und `TW_LOG_FORMAT` aus der Umgebung, sonst die
/// uebergebenen Werte. Ein ungueltiger Filter faellt auf `info` zurueck.
/// Schlaegt fehl, wenn bereits ein globaler Subscriber installiert ist.
pub fn logging_initialisieren(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env(ENV_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = format_waehlen(std::env::var(ENV_FORMAT).ok(), format);

    let ergebnis = match format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
        _ => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    ergebnis.map_err(|e| anyhow!("Logging konnte nicht initialisiert werden: {e}"))
}

/// Waehlt das Format: Umgebung vor Konfiguration, unbekannte Werte -> text
fn format_waehlen(aus_env: Option<String>, konfiguriert: &str) -> String {
    let format = aus_env.unwrap_or_else(|| konfiguriert.to_string());
    if log_format_gueltig(&format) {
        format
    } else {
        "text".to_string()
    }
}

/// Validiert einen Log-Level oder eine Filter-Direktive wie `info,talkwire_relay=debug`.
///
/// Jede Direktive ist ein Level oder `ziel=level`. Ein nacktes Wort ohne `=`
/// wuerde von EnvFilter als Ziel gelesen und das Logging fast abschalten.
pub fn log_level_gueltig(level: &str) -> bool {
    !level.is_empty()
        && level.split(',').all(|direktive| {
            let level = match direktive.rsplit_once('=') {
                Some((ziel, level)) => {
                    if ziel.is_empty() {
                        return false;
                    }
                    level
                }
                None => direktive,
            };
            matches!(level, "trace" | "debug" | "info" | "warn" | "error" | "off")
        })
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_gueltige_werte() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(log_level_gueltig(level));
        }
    }

    #[test]
    fn log_level_ungueltige_werte() {
        assert!(!log_level_gueltig("verbose"));
        assert!(!log_level_gueltig("INFO")); // Gross-/Kleinschreibung
        assert!(!log_level_gueltig(""));
        assert!(!log_level_gueltig("info,verbose"));
        assert!(!log_level_gueltig("=debug"));
    }

    #[test]
    fn filter_direktiven() {
        assert!(log_level_gueltig("off"));
        assert!(log_level_gueltig("info,talkwire_relay=debug"));
        assert!(log_level_gueltig("talkwire_signaling=trace"));
    }

    #[test]
    fn log_format_werte() {
        assert!(log_format_gueltig("text"));
        assert!(log_format_gueltig("json"));
        assert!(!log_format_gueltig("xml"));
        assert!(!log_format_gueltig("JSON"));
    }

    #[test]
    fn format_umgebung_vor_konfiguration() {
        assert_eq!(format_waehlen(Some("json".into()), "text"), "json");
        assert_eq!(format_waehlen(None, "json"), "json");
        assert_eq!(format_waehlen(Some("xml".into()), "json"), "text");
    }
}
