//! Content-addressed identifiers.
//!
//! A [`ContentId`] is derived from the canonical key of an ingested payload,
//! never generated at random. Ingesting the same logical package, artifact or
//! relationship twice yields the same `ContentId`, which is what makes writes
//! idempotent: the store upserts on it instead of creating a duplicate.
//!
//! The derivation is pinned by an [`IdScheme`]. Every stored node's identifier
//! depends on the scheme's digest and namespace, so a new scheme is a data
//! migration, never an in-place change to an existing variant.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 128-bit content-addressed identifier (UUID layout, version 5).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(uuid::Uuid);

impl ContentId {
    /// Derive the identifier for a canonical key under [`IdScheme::CURRENT`].
    pub fn derive(key: &[u8]) -> Self {
        IdScheme::CURRENT.derive(key)
    }

    /// First 8 hex characters, for display only. Not unique enough for lookup.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }

    /// Full 32-character hex string (no hyphens).
    pub fn to_hex(&self) -> String {
        self.0.as_simple().to_string()
    }

    /// The raw 16 bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Reconstruct from 16 bytes.
    pub fn from_bytes(b: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(b))
    }

    /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(s).map(Self)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl From<ContentId> for uuid::Uuid {
    fn from(id: ContentId) -> uuid::Uuid {
        id.0
    }
}

impl From<ContentId> for [u8; 16] {
    fn from(id: ContentId) -> [u8; 16] {
        *id.as_bytes()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hyphenated form doubles as the store-local ID string
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.short())
    }
}

// ── Derivation scheme ───────────────────────────────────────────────────────

/// Versioned algorithm for turning a canonical key into a [`ContentId`].
///
/// Persisted alongside backend configuration so that a deployment states
/// which scheme its stored identifiers were minted under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// SHA-256 over `namespace || key`, truncated to 16 bytes and stamped
    /// with the RFC 4122 variant and version 5 bits.
    #[default]
    Sha256NameV5,
}

impl IdScheme {
    /// The scheme new identifiers are minted under.
    pub const CURRENT: IdScheme = IdScheme::Sha256NameV5;

    /// Namespace UUID mixed into every digest.
    pub fn namespace(&self) -> uuid::Uuid {
        match self {
            IdScheme::Sha256NameV5 => uuid::Uuid::NAMESPACE_DNS,
        }
    }

    /// UUID version nibble stamped into derived identifiers.
    pub fn version_tag(&self) -> usize {
        match self {
            IdScheme::Sha256NameV5 => 5,
        }
    }

    /// Derive the identifier for `key`. Total over all inputs, including empty.
    pub fn derive(&self, key: &[u8]) -> ContentId {
        match self {
            IdScheme::Sha256NameV5 => {
                let mut hasher = Sha256::new();
                hasher.update(self.namespace().as_bytes());
                hasher.update(key);
                let digest = hasher.finalize();

                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&digest[..16]);
                ContentId(uuid::Builder::from_sha1_bytes(bytes).into_uuid())
            }
        }
    }
}

/// Derive a [`ContentId`] for a canonical key under [`IdScheme::CURRENT`].
pub fn derive_id(key: &[u8]) -> ContentId {
    IdScheme::CURRENT.derive(key)
}

// ============================================================================
// Tests
// ============================================================================
