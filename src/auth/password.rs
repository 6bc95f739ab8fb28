use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default number of SHA-256 rounds per password
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Salted, iterated SHA-256 digest of a password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    /// Random per-user salt
    pub salt: String,

    /// Hex-encoded final digest
    pub digest: String,

    /// Rounds applied
    pub iterations: u32,
}

impl PasswordHash {
    /// Hash a password under a fresh random salt
    pub fn new(password: &str, iterations: u32) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = derive(password, &salt, iterations);
        Self {
            salt,
            digest,
            iterations,
        }
    }

    /// Whether `password` produces the stored digest
    pub fn verify(&self, password: &str) -> bool {
        let candidate = derive(password, &self.salt, self.iterations);
        constant_time_eq(candidate.as_bytes(), self.digest.as_bytes())
    }
}

fn derive(password: &str, salt: &str, iterations: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..iterations.max(1) {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt.as_bytes());
        digest = hasher.finalize();
    }

    format!("{:x}", digest)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
