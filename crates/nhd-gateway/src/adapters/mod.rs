//! Adapters implementing the gateway's outbound ports.

pub mod identity;
pub mod publisher;

pub use identity::{constant_time_compare, parse_static_tokens, StaticToken, StaticTokenVerifier};
pub use publisher::{InMemoryPublisher, PublishedMessage};
