//! Test doubles for the store, the text generator and the PDF backend

use crate::extraction::{PdfBackend, PdfDocument};
use crate::types::{ProfilePatch, ProfileStore, StartupProfile, TextGenerator};
use crate::{FundboardError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One write observed by [`InMemoryProfileStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    /// `create` with the profile as submitted
    Create(StartupProfile),
    /// `update` with the target id and patch
    Update(String, ProfilePatch),
}

/// Profile store kept in memory that records every write
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<String, StartupProfile>>,
    writes: Mutex<Vec<StoreWrite>>,
    next_id: Mutex<u64>,
    failing: AtomicBool,
}

impl InMemoryProfileStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a store error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Writes seen so far, in order
    pub fn writes(&self) -> Vec<StoreWrite> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of writes seen so far
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn check_failing(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(FundboardError::store("in-memory store set to fail"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(&self, profile: &StartupProfile) -> Result<String> {
        self.check_failing()?;
        self.writes
            .lock()
            .unwrap()
            .push(StoreWrite::Create(profile.clone()));

        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("profile-{}", *next)
        };

        let now = Utc::now();
        let mut stored = profile.clone();
        stored.id = Some(id.clone());
        stored.created_at = Some(now);
        stored.updated_at = Some(now);
        self.profiles.lock().unwrap().insert(id.clone(), stored);
        Ok(id)
    }

    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<()> {
        self.check_failing()?;
        self.writes
            .lock()
            .unwrap()
            .push(StoreWrite::Update(id.to_string(), patch.clone()));

        let mut profiles = self.profiles.lock().unwrap();
        let stored = profiles
            .get_mut(id)
            .ok_or_else(|| FundboardError::store(format!("no profile with id {}", id)))?;
        patch.apply_to(stored);
        stored.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<StartupProfile>> {
        let mut owned: Vec<StartupProfile> = self
            .profiles
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(owned)
    }

    async fn get(&self, id: &str) -> Result<Option<StartupProfile>> {
        Ok(self.profiles.lock().unwrap().get(id).cloned())
    }
}

/// Text generator returning canned replies and capturing prompts
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    /// Reply with each string in turn
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Fail the first call with `error`
    pub fn failing(error: FundboardError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Wait before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FundboardError::runtime("no scripted reply left")))
    }
}

/// Page behavior for [`ScriptedPdfBackend`]
#[derive(Debug, Clone)]
pub enum ScriptedPage {
    /// Page yielding these text runs
    Text(Vec<String>),
    /// Page whose parsing fails
    Failing,
}

impl ScriptedPage {
    /// Page with the given runs
    pub fn text(runs: &[&str]) -> Self {
        ScriptedPage::Text(runs.iter().map(|r| r.to_string()).collect())
    }

    /// Page that fails to parse
    pub fn failing() -> Self {
        ScriptedPage::Failing
    }
}

/// PDF backend that ignores the payload and serves scripted pages
#[derive(Debug, Clone, Default)]
pub struct ScriptedPdfBackend {
    pages: Vec<ScriptedPage>,
}

impl ScriptedPdfBackend {
    /// Backend serving `pages` for every document
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        Self { pages }
    }
}

impl PdfBackend for ScriptedPdfBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open(&self, _bytes: &[u8]) -> Result<Box<dyn PdfDocument>> {
        Ok(Box::new(ScriptedDocument {
            pages: self.pages.clone(),
        }))
    }
}

struct ScriptedDocument {
    pages: Vec<ScriptedPage>,
}

impl PdfDocument for ScriptedDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_runs(&self, index: usize) -> Result<Vec<String>> {
        match self.pages.get(index) {
            Some(ScriptedPage::Text(runs)) => Ok(runs.clone()),
            Some(ScriptedPage::Failing) => Err(FundboardError::unreadable(format!(
                "scripted failure on page {}",
                index + 1
            ))),
            None => Err(FundboardError::not_found(format!("page index {}", index))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProfileField;

    #[tokio::test]
    async fn test_in_memory_store_create_and_update() {
        let store = InMemoryProfileStore::new();
        let mut profile = StartupProfile::new_for("user-1");
        profile.name = Some("Acme".to_string());

        let id = store.create(&profile).await.unwrap();
        store
            .update(&id, &ProfilePatch::new().with(ProfileField::Revenue, Some("$1M".into())))
            .await
            .unwrap();

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.user_id, "user-1");
        assert_eq!(stored.revenue.as_deref(), Some("$1M"));
        assert!(stored.created_at.is_some());
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.list_by_owner("user-1").await.unwrap().len(), 1);
        assert!(store.list_by_owner("user-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_store_rejects_writes() {
        let store = InMemoryProfileStore::new();
        store.set_failing(true);
        let err = store.create(&StartupProfile::new_for("u")).await.unwrap_err();
        assert!(matches!(err, FundboardError::Store(_)));
        assert_eq!(store.write_count(), 0);
    }
}
