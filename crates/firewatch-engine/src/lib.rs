//! `firewatch-engine` – The Hazard Decision Engine
//!
//! Pure functions that turn one room's raw sensor readings and one
//! location's escalation policy into a hazard level. No I/O happens here;
//! the collector feeds snapshots in and persists the verdicts.
//!
//! # Modules
//!
//! - [`aggregate`] – [`aggregate`][aggregate::aggregate]: collapses N
//!   same-kind readings into one mean per [`SensorKind`][firewatch_types::SensorKind]
//!   and detects the any-"1" fire signal.
//! - [`level`] – [`classify`][level::classify]: maps one value through a
//!   `(medium, maximum)` threshold band to a
//!   [`HazardLevel`][firewatch_types::HazardLevel].
//! - [`voter`] – [`vote`][voter::vote]: combines per-kind levels into one
//!   room verdict — immediate critical escalation, majority mode, and the
//!   priority tie-break.

pub mod aggregate;
pub mod level;
pub mod voter;

pub use aggregate::aggregate;
pub use level::classify;
pub use voter::vote;
