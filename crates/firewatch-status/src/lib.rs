//! `firewatch-status` – The Liveness Endpoint
//!
//! A deliberately tiny HTTP server: any request on the status port gets a
//! `200 OK` JSON body confirming the collector process is up. Operators
//! point their uptime checks here; everything of substance happens in the
//! collector loop and is visible through logs and the remote store.

pub mod server;

pub use server::StatusServer;
