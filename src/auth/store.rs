use crate::auth::password::PasswordHash;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Stored credential for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: PasswordHash,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(username: &str, password: &str, iterations: u32) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        Ok(Self {
            username: username.to_string(),
            password: PasswordHash::new(password, iterations),
            created_at: Utc::now(),
        })
    }
}

/// Trait for credential storage backends
pub trait CredentialStore: Send + Sync {
    /// Whether the username exists and the password matches
    fn check_login(&self, username: &str, password: &str) -> Result<bool>;

    /// Register a new user; duplicate usernames are rejected
    fn add_user(&self, username: &str, password: &str) -> Result<()>;

    /// Number of registered users
    fn user_count(&self) -> Result<usize>;
}

/// Persistent credential store using Sled embedded database
#[derive(Clone)]
pub struct SledCredentialStore {
    db: Arc<Db>,
    users: sled::Tree,
    iterations: u32,
}

impl SledCredentialStore {
    /// Open (or create) a store at the specified path
    pub fn open<P: AsRef<Path>>(path: P, iterations: u32) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        let users = db.open_tree("users")?;

        info!("Initialized credential store at {:?}", path);

        Ok(Self {
            db: Arc::new(db),
            users,
            iterations,
        })
    }

    /// Temporary store that is removed on drop
    pub fn temporary(iterations: u32) -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        let users = db.open_tree("users")?;
        Ok(Self {
            db: Arc::new(db),
            users,
            iterations,
        })
    }

    fn serialize(record: &UserRecord) -> Result<Vec<u8>> {
        bincode::serialize(record)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize user: {}", e)))
    }

    fn deserialize(bytes: &[u8]) -> Result<UserRecord> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize user: {}", e)))
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl CredentialStore for SledCredentialStore {
    fn check_login(&self, username: &str, password: &str) -> Result<bool> {
        match self.users.get(username.trim().as_bytes())? {
            Some(bytes) => Ok(Self::deserialize(&bytes)?.password.verify(password)),
            None => {
                debug!(username, "Unknown user");
                Ok(false)
            }
        }
    }

    fn add_user(&self, username: &str, password: &str) -> Result<()> {
        let record = UserRecord::new(username, password, self.iterations)?;
        let bytes = Self::serialize(&record)?;

        self.users
            .compare_and_swap(record.username.as_bytes(), None::<&[u8]>, Some(bytes))?
            .map_err(|_| {
                AppError::Validation(format!("User '{}' already exists", record.username))
            })?;
        self.users.flush()?;

        info!(username = %record.username, "Added user");
        Ok(())
    }

    fn user_count(&self) -> Result<usize> {
        Ok(self.users.len())
    }
}

/// In-memory credential store
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    users: Arc<DashMap<String, UserRecord>>,
    iterations: u32,
}

impl InMemoryCredentialStore {
    pub fn new(iterations: u32) -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            iterations,
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn check_login(&self, username: &str, password: &str) -> Result<bool> {
        Ok(self
            .users
            .get(username.trim())
            .map(|record| record.password.verify(password))
            .unwrap_or(false))
    }

    fn add_user(&self, username: &str, password: &str) -> Result<()> {
        let record = UserRecord::new(username, password, self.iterations)?;

        match self.users.entry(record.username.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(AppError::Validation(format!(
                "User '{}' already exists",
                record.username
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    fn user_count(&self) -> Result<usize> {
        Ok(self.users.len())
    }
}

/// Seed the first user when the store is empty.
///
/// Returns whether a user was created.
pub fn bootstrap_admin(
    store: &dyn CredentialStore,
    username: &str,
    password: Option<&str>,
) -> Result<bool> {
    if store.user_count()? > 0 {
        return Ok(false);
    }

    let password = password.filter(|p| !p.is_empty()).ok_or_else(|| {
        AppError::Configuration(format!(
            "No password available to bootstrap user '{}'",
            username
        ))
    })?;

    store.add_user(username, password)?;
    info!(username, "🔐 Bootstrapped initial user");
    Ok(true)
}
