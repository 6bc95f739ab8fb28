pub mod extract;
pub mod handlers;
pub mod routes;

pub use extract::AuthSession;
pub use routes::*;

use crate::advisor::Advisor;
use crate::auth::{CredentialStore, SessionManager};
use crate::ml::ModelCache;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: SessionManager,
    pub advisor: Advisor,
    pub history_path: Arc<PathBuf>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: SessionManager,
        model: Arc<ModelCache>,
        history_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            advisor: Advisor::new(model),
            history_path: Arc::new(history_path.into()),
            started_at: Instant::now(),
        }
    }
}
