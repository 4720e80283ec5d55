//! Fehlertypen fuer die Signaling-Engine

use thiserror::Error;

/// Fehlertyp fuer die Signaling-Engine
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Ungueltiges Argument (z.B. fehlender Listener bei der Registrierung)
    #[error("Ungueltiges Argument: {0}")]
    UngueltigesArgument(String),

    /// Senden an den Transport fehlgeschlagen (Queue voll oder geschlossen)
    #[error("Senden fehlgeschlagen: {0}")]
    SendFehler(String),

    /// Nachricht konnte nicht serialisiert werden
    #[error("Serialisierungsfehler: {0}")]
    Serialisierung(#[from] serde_json::Error),
}

impl SignalingError {
    /// Erstellt einen Argumentfehler
    pub fn ungueltiges_argument(msg: impl Into<String>) -> Self {
        Self::UngueltigesArgument(msg.into())
    }
}

/// Result-Typ fuer die Signaling-Engine
pub type SignalingResult<T> = Result<T, SignalingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = SignalingError::ungueltiges_argument("Listener fehlt");
        assert_eq!(e.to_string(), "Ungueltiges Argument: Listener fehlt");
    }
}
