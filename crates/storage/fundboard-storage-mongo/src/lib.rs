//! Fundboard MongoDB storage
//!
//! [`MongoProfileStore`] keeps startup profiles in the `startup_profiles`
//! collection.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-exports
pub use fundboard_core;

pub mod mongo;

pub use mongo::MongoProfileStore;
