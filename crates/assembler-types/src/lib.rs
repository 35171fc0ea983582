//! Identity and node model types for the supply-chain graph assembler.
//!
//! This crate is the leaf of the workspace: typed identifiers, the node model
//! the query layer materializes, and the ingestion inputs those nodes are
//! created from. It has **no internal dependencies**.
//!
//! # Identity Overview
//!
//! ```text
//! ingestion input ──canonical_key()──► CanonicalKey (bytes)
//!                                          │
//!                                    IdScheme::derive
//!                                          ▼
//!                                      ContentId ── store upserts on it (LocalID)
//!                                          │
//!                                 encode(NodeType, id)
//!                                          ▼
//!                         GlobalId "<nodeType>:<localID>" ── returned to clients
//! ```
//!
//! # Key Types
//!
//! |-----------------------|-------------------------------------------------|
//! | Type                  | Purpose                                         |
//! |-----------------------|-------------------------------------------------|
//! | [`NodeType`]          | Partition tag for every stored kind             |
//! | [`GlobalId`]          | Decoded `(node type, local id)` pair            |
//! | [`ContentId`]         | Deterministic 128-bit ID from a canonical key   |
//! | [`IdScheme`]          | Versioned derivation algorithm for `ContentId`  |
//! | [`CanonicalKey`]      | Segment builder for canonical key bytes         |
//! | [`Node`]              | Materialized node, one variant per GraphQL type |
//! |-----------------------|-------------------------------------------------|

pub mod global;
pub mod ids;
pub mod input;
pub mod node;

// Re-export primary types at crate root for convenience.
pub use global::{GLOBAL_ID_SEPARATOR, GlobalId, NodeType, decode, encode, encode_many};
pub use ids::{ContentId, IdScheme, derive_id};
pub use input::{
    ArtifactInputSpec, BuilderInputSpec, CanonicalKey, CanonicalKeyed, HasSbomIngest,
    HasSbomInputSpec, IsDependencyIngest, IsDependencyInputSpec, LicenseInputSpec, PkgInputSpec,
    QualifierInputSpec, SourceInputSpec, SubjectKey, VulnerabilityInputSpec,
};
pub use node::Node;
