//! Profile store trait

use super::profile::{ProfilePatch, StartupProfile};
use crate::Result;
use async_trait::async_trait;

/// Collection holding startup profile documents
pub const PROFILES_COLLECTION: &str = "startup_profiles";

/// Remote document store for startup profiles
///
/// Each call is independent; no transactional guarantee is assumed and
/// concurrent writes resolve as last-write-wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &str;

    /// Insert a new profile and return the id the store assigned.
    ///
    /// Implementations set `createdAt` and `updatedAt`.
    async fn create(&self, profile: &StartupProfile) -> Result<String>;

    /// Apply a partial update and refresh `updatedAt`. Never touches `userId`.
    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<()>;

    /// All profiles owned by a user
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<StartupProfile>>;

    /// Fetch one profile by id
    async fn get(&self, id: &str) -> Result<Option<StartupProfile>>;
}
