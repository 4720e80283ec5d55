//! talkwire-signaling – Signaling-Dispatch-Engine
//!
//! Dieser Crate nimmt rohe Signaling-Ereignisse vom Transport entgegen,
//! normalisiert sie in typisierte Ereignisse und verteilt sie an die
//! registrierten Listener der zustaendigen Kategorie. Ausgehende Nachrichten
//! laufen ueber eine schmale Sender-Schnittstelle zurueck zum Transport.
//!
//! ## Architektur
//!
//! ```text
//! Transport (rohes JSON-Objekt)
//!     |
//!     v
//! Normalizer  – RawEvent -> SignalingEvent (unbekannt -> Unknown)
//!     |
//!     v
//! SignalingDispatcher
//!     |  Snapshot der Registry, Zustellung ausserhalb des Locks
//!     |
//!     +-- CallParticipant   (Offer, Answer, Candidate, Unshare, RaiseHand, Reaction)
//!     +-- LocalParticipant  (SwitchTo)
//!     +-- ParticipantList   (ParticipantsUpdate, AllParticipantsUpdate)
//!
//! DataChannelMessageNotifier – Peer-Statusmeldungen (Audio, Video, Nick)
//! SignalingMessageSender     – Ausgehende Nachrichten an den Transport
//! DispatchStatistik          – Zaehler fuer Logs und Metriken
//! ```

pub mod data_channel;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod listener;
pub mod normalizer;
pub mod registry;
pub mod sender;
pub mod stats;

// Bequeme Re-Exporte
pub use data_channel::{DataChannelEvent, DataChannelMessageListener, DataChannelMessageNotifier};
pub use dispatcher::{DispatchReport, SignalingDispatcher};
pub use error::{SignalingError, SignalingResult};
pub use event::{CallEnvelope, ListenerCategory, SignalingEvent};
pub use listener::{
    CallParticipantMessageListener, ListenerResult, LocalParticipantMessageListener,
    ParticipantListMessageListener, SignalingListener,
};
pub use normalizer::{normalize, try_normalize, NormalizeError};
pub use registry::ListenerRegistry;
pub use sender::{ChannelSender, SignalingMessageSender};
pub use stats::{DispatchStatistik, StatistikStand};
