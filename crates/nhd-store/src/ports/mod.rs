//! Port traits (driven side).

pub mod datastore;

pub use datastore::Datastore;
