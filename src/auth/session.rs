use crate::auth::store::CredentialStore;
use crate::error::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Issues and validates session tokens.
///
/// Cloning shares the same session table.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Verify credentials and open a session
    pub fn login(
        &self,
        store: &dyn CredentialStore,
        username: &str,
        password: &str,
    ) -> Result<Session> {
        let accepted = store.check_login(username, password)?;
        crate::metrics::record_login(accepted);

        if !accepted {
            warn!(username, "Rejected login");
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let now = Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            username: username.trim().to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions.insert(session.token.clone(), session.clone());

        info!(username = %session.username, "User logged in");
        Ok(session)
    }

    /// Look up a live session by token
    pub fn resolve(&self, token: &str) -> Result<Session> {
        let session = self
            .sessions
            .get(token)
            .map(|s| s.clone())
            .ok_or_else(|| AppError::Authentication("Unknown session token".to_string()))?;

        if session.is_expired(Utc::now()) {
            self.sessions.remove(token);
            return Err(AppError::Authentication("Session expired".to_string()));
        }

        Ok(session)
    }

    /// Drop a session. Returns whether it existed.
    pub fn logout(&self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some((_, session)) => {
                info!(username = %session.username, "User logged out");
                true
            }
            None => false,
        }
    }

    /// Remove every expired session, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now));
        before - self.sessions.len()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
