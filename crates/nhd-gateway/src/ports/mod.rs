//! Ports for the gateway.

pub mod outbound;

pub use outbound::*;
