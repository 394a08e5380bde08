//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod identity;
pub mod line_store;

pub use identity::IdentityProvider;
pub use line_store::LineStore;
