pub mod discovery;
pub mod git;
pub mod persistence;
pub mod status;
