//! Admin session authentication
//!
//! The admin surface is guarded by a configured password list. A successful
//! login issues an opaque bearer token; protected routes validate the token
//! against the in-memory session set. Only SHA-256 digests of issued tokens
//! are retained.
//!
//! This module contains only pure functions and synchronized state.
//! No HTTP framework dependencies - those live in module-specific code.

use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::RwLock;

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Password not in the configured list
    InvalidPassword,
    /// Token missing, expired, or never issued
    InvalidToken,
    /// No admin passwords configured; admin surface disabled
    AdminDisabled,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidPassword => write!(f, "Invalid password"),
            AuthError::InvalidToken => write!(f, "Invalid session token"),
            AuthError::AdminDisabled => write!(f, "Admin access is not configured"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Check a candidate password against the configured list
pub fn verify_password(candidate: &str, configured: &[String]) -> Result<(), AuthError> {
    if configured.is_empty() {
        return Err(AuthError::AdminDisabled);
    }
    if configured.iter().any(|p| p == candidate) {
        Ok(())
    } else {
        Err(AuthError::InvalidPassword)
    }
}

/// Generate a fresh opaque session token (64 hex chars)
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// SHA-256 digest of a token, hex encoded
fn token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// In-memory set of active admin sessions
///
/// Interior mutability so services can hold it inside a shared `AppState`.
#[derive(Debug, Default)]
pub struct SessionTokens {
    digests: RwLock<HashSet<String>>,
}

impl SessionTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new session token and record its digest
    pub fn issue(&self) -> String {
        let token = generate_token();
        self.digests
            .write()
            .expect("session lock poisoned")
            .insert(token_digest(&token));
        token
    }

    /// Validate a presented token
    pub fn validate(&self, token: &str) -> Result<(), AuthError> {
        let digests = self.digests.read().expect("session lock poisoned");
        if digests.contains(&token_digest(token)) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    /// Revoke a token (logout); unknown tokens are ignored
    pub fn revoke(&self, token: &str) {
        self.digests
            .write()
            .expect("session lock poisoned")
            .remove(&token_digest(token));
    }
}
