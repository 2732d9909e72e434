//! `firewatch-runtime` – The Collection Engine
//!
//! Orchestrates one fetch–evaluate–write pass per polling tick and keeps
//! doing so until shut down.
//!
//! # Modules
//!
//! - [`evaluator`] – the per-room state machine
//!   (aggregate → fire short-circuit → predictive override → escalation
//!   vote) and the per-location roll-up that derives the alarm flag.
//! - [`collector`] – [`Collector`][collector::Collector]: the
//!   non-overlapping polling loop. Each tick owns its own snapshot; errors
//!   on one sensor, room or location are isolated and never abort the
//!   enclosing pass, and a failed fetch just waits for the next tick.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter
//!   (set `OTEL_EXPORTER_OTLP_ENDPOINT` to export spans).

pub mod collector;
pub mod evaluator;
pub mod telemetry;

pub use collector::{Collector, CycleReport};
pub use evaluator::{evaluate_location, evaluate_room};
