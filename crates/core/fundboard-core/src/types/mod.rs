//! Core type definitions for Fundboard

pub mod model;
pub mod profile;
pub mod store;
pub mod upload;

// Re-export commonly used types
pub use model::*;
pub use profile::*;
pub use store::*;
pub use upload::*;
