//! Visitor Gate - browser session verification service
//!
//! Distinguishes automated clients from interactive browser sessions by
//! combining three evidence channels:
//! - HTTP header fingerprinting
//! - A round-trip JavaScript execution challenge
//! - A browser-environment fingerprint submitted by the client collector
//!
//! Each visitor IP gets a verdict (human / suspicious / bot) with a
//! bounded suspicion score and an itemized signal list.

pub mod analysis;
pub mod challenge;
pub mod config;
pub mod error;
pub mod events;
pub mod server;
pub mod tracker;
