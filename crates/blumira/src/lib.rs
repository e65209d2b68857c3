//! Client for the Blumira public API plus the aggregation layer that
//! composes per-account calls into the shapes the dashboard views render.
//!
//! The client owns its credential store and token cache as explicit struct
//! state (no module-level globals), so tests and multi-tenant callers can
//! construct independent instances. All domain objects it returns are
//! read-only: they are superseded wholesale on the next fetch and are never
//! merged into or mutated by downstream components.

pub mod client;
pub mod credentials;
pub mod enrich;
pub mod error;
pub mod token;

pub use client::{BlumiraClient, BlumiraConfig};
pub use credentials::{CredentialStatus, CredentialStore};
pub use error::BlumiraError;
