//! Bearer-token authentication for the REST API
//!
//! Tokens are stored as SHA-256 hashes, each mapped to the user it signs in.
//! With no tokens configured the manager runs in development mode and takes
//! the presented token as the user id.

use crate::config::TokenGrant;
use crate::session::UserIdentity;
use crate::{FundboardError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Maps session tokens to users
pub struct SessionAuthManager {
    /// Token hash -> user id
    tokens: HashMap<String, String>,
}

impl SessionAuthManager {
    /// Create from configured grants
    pub fn new(grants: Vec<TokenGrant>) -> Self {
        let tokens = grants
            .into_iter()
            .map(|g| (Self::hash_token(&g.token), g.user_id))
            .collect();
        Self { tokens }
    }

    /// Create with no tokens (development mode)
    pub fn disabled() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    /// Whether tokens are being checked
    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Hash a token for secure storage
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Resolve a bearer token to the user it belongs to
    pub fn authenticate(&self, token: &str) -> Result<UserIdentity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(FundboardError::auth("Empty bearer token"));
        }

        if !self.is_enabled() {
            debug!("Authentication disabled, using token as user id");
            return Ok(UserIdentity::new(token));
        }

        match self.tokens.get(&Self::hash_token(token)) {
            Some(user_id) => Ok(UserIdentity::new(user_id.clone())),
            None => {
                warn!("Authentication failed: invalid token");
                Err(FundboardError::auth("Invalid authentication token"))
            }
        }
    }
}
