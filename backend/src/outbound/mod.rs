//! Outbound adapters implementing the domain's driven ports.
//!
//! [`wiring`] assembles the production set used by the binaries.

pub mod email;
pub mod persistence;
pub mod security;
pub mod storage;
pub mod wiring;
