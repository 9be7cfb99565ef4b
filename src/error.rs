//! Unified error types for Visitor Gate

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GateError>;
