//! Provider protocol: wire types, status resolution, acknowledgment policy.

pub mod ack;
pub mod resolver;
pub mod types;
