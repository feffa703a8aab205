//! Session context
//!
//! Holds the signed-in user for the components that need it. The context is
//! passed in explicitly; there is no process-wide session.

use crate::{FundboardError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Stable user id; becomes `userId` on stored profiles
    pub user_id: String,
    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// Identity with only a user id
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
        }
    }
}

/// Shared, observable session state
#[derive(Clone)]
pub struct SessionContext {
    sender: Arc<watch::Sender<Option<UserIdentity>>>,
}

impl SessionContext {
    /// Signed-out session
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Session already signed in as `identity`
    pub fn signed_in(identity: UserIdentity) -> Self {
        let context = Self::new();
        context.sender.send_replace(Some(identity));
        context
    }

    /// Sign in, replacing any current user
    pub fn sign_in(&self, identity: UserIdentity) {
        info!(user_id = %identity.user_id, "Session signed in");
        self.sender.send_replace(Some(identity));
    }

    /// Sign out
    pub fn sign_out(&self) {
        if let Some(previous) = self.sender.send_replace(None) {
            info!(user_id = %previous.user_id, "Session signed out");
        }
    }

    /// Current user, if any
    pub fn current(&self) -> Option<UserIdentity> {
        self.sender.borrow().clone()
    }

    /// Current user or an auth error
    pub fn require_user(&self) -> Result<UserIdentity> {
        self.current()
            .ok_or_else(|| FundboardError::auth("no user is signed in"))
    }

    /// Start observing sign-in and sign-out
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`SessionContext::subscribe`]
pub struct SessionSubscription {
    receiver: watch::Receiver<Option<UserIdentity>>,
}

impl SessionSubscription {
    /// Wait for the next change and return the new user.
    ///
    /// Returns `None` once every clone of the context is gone.
    pub async fn changed(&mut self) -> Option<Option<UserIdentity>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// User as last observed
    pub fn current(&self) -> Option<UserIdentity> {
        self.receiver.borrow().clone()
    }

    /// Stop observing
    pub fn unsubscribe(self) {}
}
