pub mod repo;
pub mod status;
pub mod update;

// Re-exports for convenience
pub use repo::*;
pub use status::*;
pub use update::*;
