//! Message-Normalizer – Uebersetzt rohe Transport-Ereignisse
//!
//! Das Signaling-Backend liefert lose typisierte JSON-Objekte, deren Aufbau
//! je nach Backend-Version variiert. Der Normalizer bildet sie auf genau eine
//! Variante von [`SignalingEvent`] ab.
//!
//! ## Unterstuetzte Formen
//! - `{"type": "switchto", "switchto": {"roomid": ...}}`
//! - `{"target": "participants", "type": "update", "update": {"users": [...]}}`
//! - `{"target": "participants", "type": "update", "update": {"all": true, "incall": 0}}`
//! - `{"type": <call-typ>, "from": ..., "payload": {...}}` mit `<call-typ>` aus
//!   `offer`, `answer`, `candidate`, `unshareScreen`, `raiseHand`, `reaction`
//! - `{"type": "message", "message": {"sender": {"sessionid": ...}, "data": {...}}}`
//!
//! Alles andere wird zu `SignalingEvent::Unknown`; der Normalizer schlaegt
//! nie fehl und hat keine Seiteneffekte.

use serde_json::{Map, Value};
use talkwire_core::types::{RoomToken, SessionId};
use talkwire_protocol::{InCallFlags, MessageKind, Participant, RawEvent, SignalingPayload};
use thiserror::Error;

use crate::event::{CallEnvelope, SignalingEvent};

/// Grund, warum ein rohes Ereignis verworfen wurde
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Feld 'type' fehlt oder ist kein String")]
    TypFehlt,

    #[error("Unbekannter Ereignistyp: {0}")]
    UnbekannterTyp(String),

    #[error("Pflichtfeld fehlt: {0}")]
    FeldFehlt(&'static str),

    #[error("Ungueltiges Feld '{feld}': {grund}")]
    UngueltigesFeld { feld: &'static str, grund: String },
}

/// Normalisiert ein rohes Ereignis, fehlerhafte Eingaben werden zu `Unknown`
pub fn normalize(raw: &RawEvent) -> SignalingEvent {
    try_normalize(raw).unwrap_or(SignalingEvent::Unknown)
}

/// Wie [`normalize`], liefert aber den Grund fuer verworfene Eingaben
pub fn try_normalize(raw: &RawEvent) -> Result<SignalingEvent, NormalizeError> {
    let typ = text(raw, "type").ok_or(NormalizeError::TypFehlt)?;

    match typ {
        "switchto" => switch_to(raw),
        "update" if text(raw, "target") == Some("participants") => participants_update(raw),
        "message" => eingepackte_nachricht(raw),
        andere => match MessageKind::from_wire(andere) {
            Some(kind) => call_nachricht(kind, raw, None),
            None => Err(NormalizeError::UnbekannterTyp(andere.to_string())),
        },
    }
}

// ---------------------------------------------------------------------------
// Raum-Steuerung
// ---------------------------------------------------------------------------

fn switch_to(raw: &RawEvent) -> Result<SignalingEvent, NormalizeError> {
    let switchto = objekt(raw, "switchto").ok_or(NormalizeError::FeldFehlt("switchto"))?;
    let roomid = nicht_leer(switchto, "roomid", "switchto.roomid")?;

    Ok(SignalingEvent::SwitchTo {
        room: RoomToken::neu(roomid),
    })
}

// ---------------------------------------------------------------------------
// Teilnehmerliste
// ---------------------------------------------------------------------------

fn participants_update(raw: &RawEvent) -> Result<SignalingEvent, NormalizeError> {
    let update = objekt(raw, "update").ok_or(NormalizeError::FeldFehlt("update"))?;

    if update.get("all").and_then(Value::as_bool) == Some(true) {
        let in_call = match update.get("incall") {
            Some(Value::Bool(true)) => InCallFlags(InCallFlags::IM_CALL),
            Some(Value::Bool(false)) => InCallFlags(InCallFlags::GETRENNT),
            Some(Value::Number(n)) => {
                let flags = n.as_u64().and_then(|n| u32::try_from(n).ok()).ok_or_else(|| {
                    NormalizeError::UngueltigesFeld {
                        feld: "update.incall",
                        grund: format!("kein gueltiges Bitfeld: {n}"),
                    }
                })?;
                InCallFlags(flags)
            }
            Some(_) => {
                return Err(NormalizeError::UngueltigesFeld {
                    feld: "update.incall",
                    grund: "weder Zahl noch Bool".into(),
                })
            }
            None => return Err(NormalizeError::FeldFehlt("update.incall")),
        };
        return Ok(SignalingEvent::AllParticipantsUpdate { in_call });
    }

    let users = update
        .get("users")
        .and_then(Value::as_array)
        .ok_or(NormalizeError::FeldFehlt("update.users"))?;

    // Ein einziger fehlerhafter Eintrag verwirft das ganze Update
    let participants = users
        .iter()
        .map(|eintrag| {
            serde_json::from_value::<Participant>(eintrag.clone()).map_err(|e| {
                NormalizeError::UngueltigesFeld {
                    feld: "update.users",
                    grund: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SignalingEvent::ParticipantsUpdate { participants })
}

// ---------------------------------------------------------------------------
// Call-Nachrichten
// ---------------------------------------------------------------------------

/// Entpackt das Format des externen Signaling-Servers
///
/// Die Session aus `message.sender.sessionid` hat Vorrang vor `data.from`.
fn eingepackte_nachricht(raw: &RawEvent) -> Result<SignalingEvent, NormalizeError> {
    let message = objekt(raw, "message").ok_or(NormalizeError::FeldFehlt("message"))?;
    let data = objekt(message, "data").ok_or(NormalizeError::FeldFehlt("message.data"))?;

    let absender = objekt(message, "sender")
        .and_then(|sender| text(sender, "sessionid"))
        .filter(|s| !s.is_empty());

    let typ = text(data, "type").ok_or(NormalizeError::FeldFehlt("message.data.type"))?;
    let kind =
        MessageKind::from_wire(typ).ok_or_else(|| NormalizeError::UnbekannterTyp(typ.to_string()))?;

    call_nachricht(kind, data, absender)
}

fn call_nachricht(
    kind: MessageKind,
    data: &Map<String, Value>,
    absender: Option<&str>,
) -> Result<SignalingEvent, NormalizeError> {
    let from = match absender {
        Some(session) => session,
        None => nicht_leer(data, "from", "from")?,
    };

    let call = CallEnvelope {
        from: SessionId::neu(from),
        to: text(data, "to")
            .filter(|s| !s.is_empty())
            .map(SessionId::neu),
        room_type: text(data, "roomType").map(str::to_string),
        sid: text(data, "sid").map(str::to_string),
    };

    let payload = payload(data)?;

    let event = match kind {
        MessageKind::Offer | MessageKind::Answer => {
            let sdp = payload.sdp.ok_or(NormalizeError::FeldFehlt("payload.sdp"))?;
            if kind == MessageKind::Offer {
                SignalingEvent::CallOffer {
                    call,
                    sdp,
                    nick: payload.nick,
                }
            } else {
                SignalingEvent::CallAnswer {
                    call,
                    sdp,
                    nick: payload.nick,
                }
            }
        }
        MessageKind::Candidate => SignalingEvent::CallCandidate {
            call,
            candidate: payload
                .candidate
                .ok_or(NormalizeError::FeldFehlt("payload.candidate"))?,
        },
        MessageKind::UnshareScreen => SignalingEvent::CallUnshare { call },
        MessageKind::RaiseHand => SignalingEvent::CallRaiseHand {
            call,
            state: payload.state.ok_or(NormalizeError::FeldFehlt("payload.state"))?,
            timestamp: payload.timestamp,
        },
        MessageKind::Reaction => SignalingEvent::CallReaction {
            call,
            reaction: payload
                .reaction
                .filter(|r| !r.is_empty())
                .ok_or(NormalizeError::FeldFehlt("payload.reaction"))?,
        },
    };

    Ok(event)
}

/// Liest die optionale Payload, fehlend = leer
fn payload(data: &Map<String, Value>) -> Result<SignalingPayload, NormalizeError> {
    match data.get("payload") {
        None | Some(Value::Null) => Ok(SignalingPayload::default()),
        Some(wert @ Value::Object(_)) => {
            serde_json::from_value(wert.clone()).map_err(|e| NormalizeError::UngueltigesFeld {
                feld: "payload",
                grund: e.to_string(),
            })
        }
        Some(_) => Err(NormalizeError::UngueltigesFeld {
            feld: "payload",
            grund: "kein Objekt".into(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Hilfsfunktionen
// ---------------------------------------------------------------------------

fn text<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn objekt<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

fn nicht_leer<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    feld: &'static str,
) -> Result<&'a str, NormalizeError> {
    match text(map, key) {
        Some(s) if !s.is_empty() => Ok(s),
        Some(_) => Err(NormalizeError::UngueltigesFeld {
            feld,
            grund: "leerer String".into(),
        }),
        None => Err(NormalizeError::FeldFehlt(feld)),
    }
}
