//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod rest;
pub mod session;

pub use rest::RestLineStore;
pub use session::SessionIdentity;
