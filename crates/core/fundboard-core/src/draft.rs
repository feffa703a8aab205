//! Profile draft editing
//!
//! A draft moves through `Empty -> Extracting -> Parsed -> (Saved | Dirty) -> Saved`.
//! Manual edits mark it `Dirty` and arm a debounced auto-save. A failed
//! extraction puts the draft back in the state it had before the upload and
//! records the error; no field is cleared.

use crate::autosave::Debouncer;
use crate::config::EditorConfig;
use crate::extraction::{ExtractionPipeline, ExtractionResult};
use crate::session::SessionContext;
use crate::types::{ProfileField, ProfilePatch, ProfileStore, StartupProfile, UploadedDocument};
use crate::{FundboardError, Result};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Lifecycle of an in-memory profile draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftState {
    /// Nothing loaded or entered yet
    Empty,
    /// A pitch deck is being processed
    Extracting,
    /// Extracted values were merged into the draft
    Parsed,
    /// Edited since the last save
    Dirty,
    /// Matches what was last written to the store
    Saved,
}

/// Point-in-time view of a draft
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    /// Current state
    pub state: DraftState,
    /// Draft contents
    pub profile: StartupProfile,
    /// Message of the most recent failure, cleared by the next success
    pub last_error: Option<String>,
    /// Bumped on every change to the draft contents
    pub revision: u64,
}

struct Draft {
    state: DraftState,
    profile: StartupProfile,
    last_error: Option<String>,
    revision: u64,
    // state to return to if the running extraction fails
    before_extraction: Option<DraftState>,
    extractions_in_flight: usize,
    edited_while_extracting: bool,
}

impl Draft {
    fn new(profile: StartupProfile) -> Self {
        Self {
            state: DraftState::Empty,
            profile,
            last_error: None,
            revision: 0,
            before_extraction: None,
            extractions_in_flight: 0,
            edited_while_extracting: false,
        }
    }

    fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            state: self.state,
            profile: self.profile.clone(),
            last_error: self.last_error.clone(),
            revision: self.revision,
        }
    }
}

struct EditorInner {
    session: SessionContext,
    store: Arc<dyn ProfileStore>,
    pipeline: ExtractionPipeline,
    config: EditorConfig,
    draft: Mutex<Draft>,
    // one store write at a time so a new profile is created once
    write_lock: Mutex<()>,
}

impl EditorInner {
    async fn save(&self) -> Result<DraftSnapshot> {
        let user = self.session.require_user()?;
        let _write = self.write_lock.lock().await;

        let (profile, revision) = {
            let draft = self.draft.lock().await;
            (draft.profile.clone(), draft.revision)
        };

        if !profile.user_id.is_empty() && profile.user_id != user.user_id {
            return Err(FundboardError::auth(
                "draft belongs to a different user than the signed-in session",
            ));
        }

        let outcome = match profile.id.as_deref() {
            None => {
                let mut new_profile = profile.clone();
                new_profile.user_id = user.user_id.clone();
                self.store.create(&new_profile).await.map(Some)
            }
            Some(id) => self
                .store
                .update(id, &ProfilePatch::from_profile(&profile))
                .await
                .map(|_| None),
        };

        let mut draft = self.draft.lock().await;
        match outcome {
            Ok(created_id) => {
                // mirrors the stamps the store writes
                let now = Utc::now();
                draft.profile.updated_at = Some(now);
                if let Some(id) = created_id {
                    info!(user_id = %user.user_id, profile_id = %id, store = self.store.name(), "Created startup profile");
                    draft.profile.id = Some(id);
                    draft.profile.user_id = user.user_id.clone();
                    draft.profile.created_at = Some(now);
                } else {
                    debug!(user_id = %user.user_id, store = self.store.name(), "Updated startup profile");
                }
                draft.last_error = None;
                if draft.state != DraftState::Extracting && draft.revision == revision {
                    draft.state = DraftState::Saved;
                }
                Ok(draft.snapshot())
            }
            Err(e) => {
                warn!(user_id = %user.user_id, error = %e, "Failed to save startup profile");
                draft.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// One user's profile draft with extraction and auto-save
pub struct ProfileEditor {
    inner: Arc<EditorInner>,
    autosaver: Debouncer<String>,
}

impl ProfileEditor {
    /// Create an editor for whoever is signed in to `session`
    pub fn new(
        session: SessionContext,
        store: Arc<dyn ProfileStore>,
        pipeline: ExtractionPipeline,
        config: EditorConfig,
    ) -> Self {
        let owner = session.current().map(|u| u.user_id).unwrap_or_default();
        Self {
            inner: Arc::new(EditorInner {
                session,
                store,
                pipeline,
                config,
                draft: Mutex::new(Draft::new(StartupProfile::new_for(owner))),
                write_lock: Mutex::new(()),
            }),
            autosaver: Debouncer::new(),
        }
    }

    /// Load the signed-in user's most recently updated profile into the draft
    pub async fn load(&self) -> Result<DraftSnapshot> {
        let user = self.inner.session.require_user()?;
        let profiles = self.inner.store.list_by_owner(&user.user_id).await?;
        let latest = profiles.into_iter().max_by_key(|p| p.updated_at);

        let mut draft = self.inner.draft.lock().await;
        match latest {
            Some(profile) => {
                debug!(user_id = %user.user_id, profile_id = ?profile.id, "Loaded startup profile");
                draft.profile = profile;
                draft.state = DraftState::Saved;
            }
            None => {
                draft.profile = StartupProfile::new_for(user.user_id.clone());
                draft.state = DraftState::Empty;
            }
        }
        draft.last_error = None;
        draft.revision += 1;
        Ok(draft.snapshot())
    }

    /// Apply a manual edit and arm the auto-save
    ///
    /// Blank values clear the field.
    pub async fn edit_field(&self, field: ProfileField, value: Option<String>) -> DraftSnapshot {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let snapshot = {
            let mut draft = self.inner.draft.lock().await;
            draft.profile.set(field, value);
            draft.revision += 1;
            if draft.state == DraftState::Extracting {
                draft.edited_while_extracting = true;
                draft.before_extraction = Some(DraftState::Dirty);
            } else {
                draft.state = DraftState::Dirty;
            }
            draft.snapshot()
        };

        self.schedule_autosave().await;
        snapshot
    }

    async fn schedule_autosave(&self) {
        let Some(user) = self.inner.session.current() else {
            debug!("No signed-in user, auto-save not scheduled");
            return;
        };

        let inner = Arc::clone(&self.inner);
        let delay = self.inner.config.autosave_debounce;
        self.autosaver
            .schedule(user.user_id, delay, move || async move {
                if let Err(e) = inner.save().await {
                    warn!(error = %e, "Auto-save failed");
                }
            })
            .await;
    }

    /// Extract fields from a pitch deck and merge them into the draft
    ///
    /// Recognized fields overwrite the draft; unrecognized ones keep their
    /// value. When configured, the draft is written to the store right after.
    pub async fn import_pitch_deck(&self, upload: &UploadedDocument) -> Result<ExtractionResult> {
        {
            let mut draft = self.inner.draft.lock().await;
            if draft.extractions_in_flight == 0 {
                draft.before_extraction = Some(draft.state);
                draft.edited_while_extracting = false;
            }
            draft.extractions_in_flight += 1;
            draft.state = DraftState::Extracting;
        }

        let outcome = self.inner.pipeline.run(upload).await;

        {
            let mut draft = self.inner.draft.lock().await;
            draft.extractions_in_flight -= 1;
            let finished = draft.extractions_in_flight == 0;

            match &outcome {
                Ok(result) => {
                    if draft.edited_while_extracting {
                        warn!(
                            fields = result.len(),
                            "Extracted values overwrite edits made during extraction"
                        );
                    }
                    result.apply_to(&mut draft.profile);
                    draft.revision += 1;
                    draft.last_error = None;
                    if finished {
                        draft.state = DraftState::Parsed;
                        draft.before_extraction = None;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Pitch deck extraction failed");
                    draft.last_error = Some(e.to_string());
                    if finished {
                        let prior = draft.before_extraction.take();
                        draft.state = prior.unwrap_or(DraftState::Empty);
                    }
                }
            }
        }

        let result = outcome?;
        if self.inner.config.persist_after_extraction {
            if let Some(user) = self.inner.session.current() {
                self.autosaver.cancel(&user.user_id).await;
            }
            self.inner.save().await?;
        }
        Ok(result)
    }

    /// Write the draft to the store now
    pub async fn save(&self) -> Result<DraftSnapshot> {
        if let Some(user) = self.inner.session.current() {
            self.autosaver.cancel(&user.user_id).await;
        }
        self.inner.save().await
    }

    /// Discard unsaved changes and re-read the stored profile
    ///
    /// A draft that was never saved falls back to [`ProfileEditor::load`].
    pub async fn reload(&self) -> Result<DraftSnapshot> {
        let user = self.inner.session.require_user()?;
        self.autosaver.cancel(&user.user_id).await;

        let id = self.inner.draft.lock().await.profile.id.clone();
        let Some(id) = id else {
            return self.load().await;
        };

        let stored = self
            .inner
            .store
            .get(&id)
            .await?
            .ok_or_else(|| FundboardError::not_found(format!("Profile {}", id)))?;
        if stored.user_id != user.user_id {
            return Err(FundboardError::auth("profile belongs to a different user"));
        }

        let mut draft = self.inner.draft.lock().await;
        if draft.state == DraftState::Extracting {
            return Err(FundboardError::validation(
                "cannot reload while a pitch deck is being extracted",
            ));
        }
        debug!(user_id = %user.user_id, profile_id = %id, "Reloaded startup profile");
        draft.profile = stored;
        draft.state = DraftState::Saved;
        draft.last_error = None;
        draft.revision += 1;
        Ok(draft.snapshot())
    }

    /// Current view of the draft
    pub async fn snapshot(&self) -> DraftSnapshot {
        self.inner.draft.lock().await.snapshot()
    }

    /// Whether an auto-save is waiting to fire
    pub async fn autosave_pending(&self) -> bool {
        self.autosaver.pending().await > 0
    }
}
