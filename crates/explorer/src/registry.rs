//! Short path tokens for button payloads.
//!
//! Chat platforms cap the size of callback payloads (Telegram allows 64 bytes),
//! which is too small for arbitrary filesystem paths. The registry hands out a
//! fixed-length token for every path that is displayed and maps it back when
//! the button is pressed.
//!
//! Tokens are a truncated SHA-256 digest of the path, so two distinct paths
//! can collide. Collisions are not detected: the most recent registration for
//! a token wins and the older path becomes unreachable through that token.

use std::fmt;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the path digest.
pub const TOKEN_LENGTH: usize = 12;

/// Opaque short identifier for a registered path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathToken(String);

impl PathToken {
    /// Derive the token for a path.
    ///
    /// The same path always yields the same token.
    pub fn for_path(path: &Path) -> Self {
        let digest = Sha256::digest(path.as_os_str().as_encoded_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(TOKEN_LENGTH);
        Self(hex)
    }

    /// Wrap a token received from a button payload.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The token as it appears in payloads.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-wide token → path table.
///
/// Entries are never evicted. The table only grows as new paths are shown,
/// which is fine for interactive browsing of a single tree.
#[derive(Debug)]
pub struct PathRegistry {
    entries: DashMap<PathToken, PathBuf>,
    fallback: PathBuf,
}

impl PathRegistry {
    /// Create an empty registry.
    ///
    /// `fallback` is returned for tokens that were never registered, so a
    /// stale or forged payload leads back to the browsing root.
    pub fn new(fallback: impl Into<PathBuf>) -> Self {
        Self {
            entries: DashMap::new(),
            fallback: fallback.into(),
        }
    }

    /// Register a path and return its token.
    pub fn register(&self, path: &Path) -> PathToken {
        let token = PathToken::for_path(path);
        self.entries.insert(token.clone(), path.to_path_buf());
        token
    }

    /// Look up the path for a token, falling back to the root path.
    pub fn resolve(&self, token: &PathToken) -> PathBuf {
        match self.entries.get(token) {
            Some(path) => path.clone(),
            None => {
                tracing::debug!(%token, "Unknown path token, using fallback");
                self.fallback.clone()
            }
        }
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
