pub mod discovery;
pub mod git;
pub mod persistence;
pub mod status;

// Re-exports
pub use discovery::*;
pub use git::*;
pub use persistence::*;
pub use status::*;
