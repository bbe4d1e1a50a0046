//! reposync core - pure domain logic with no I/O
//!
//! This crate contains the domain types, the status classifier, and the ports
//! (interfaces) used by the update orchestrator. Filesystem walking, the git
//! executable and libgit2 all live behind adapters in the app crate.

pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for ergonomics
pub use domain::*;
pub use error::*;
