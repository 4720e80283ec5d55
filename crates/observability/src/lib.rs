//! # talkwire-observability
//!
//! Observability-Crate fuer Talkwire:
//! - Prometheus-kompatible Metriken aus den Dispatch-Zaehlern
//! - Structured Logging (Text oder JSON) via tracing-subscriber

pub mod logging;
pub mod metrics;

pub use logging::{log_format_gueltig, log_level_gueltig, logging_initialisieren};
pub use metrics::SignalingMetrics;
