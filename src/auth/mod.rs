//! Credential storage and session handling.
//!
//! Passwords are only ever held as salted, iterated digests. Login state lives
//! in an explicit [`SessionManager`] owned by the caller.

pub mod password;
pub mod session;
pub mod store;

pub use password::{PasswordHash, DEFAULT_ITERATIONS};
pub use session::{Session, SessionManager};
pub use store::{
    bootstrap_admin, CredentialStore, InMemoryCredentialStore, SledCredentialStore, UserRecord,
};
