//! Global identifiers: a store-local ID tagged with its node type.
//!
//! The store assigns local IDs per node-type partition, so the same local ID
//! can name a package version and a vulnerability at once. Client-facing APIs
//! only ever see the tagged form `<nodeType>:<localID>`.
//!
//! That string is a compatibility surface. Clients hold on to issued IDs, so
//! the separator and the tag spellings in [`NodeType`] are frozen.
//!
//! Decoding is total. An ID without a separator predates type tagging and
//! decodes to an empty node type with the whole string as the local ID.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Separator between the node-type tag and the local ID.
pub const GLOBAL_ID_SEPARATOR: char = ':';

/// Every node kind the store partitions IDs by.
///
/// Includes the nested levels of packages, sources and vulnerabilities, since
/// each level is its own partition.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum NodeType {
    // Software trees
    Package,
    PackageNamespace,
    PackageName,
    PackageVersion,
    Source,
    SourceNamespace,
    SourceName,

    // Leaf entities
    Artifact,
    Builder,
    License,
    Vulnerability,
    VulnerabilityId,

    // Evidence and relationships
    CertifyBad,
    CertifyGood,
    CertifyLegal,
    CertifyScorecard,
    CertifyVexStatement,
    CertifyVuln,
    HashEqual,
    HasMetadata,
    HasSbom,
    HasSlsa,
    HasSourceAt,
    IsDependency,
    IsOccurrence,
    PkgEqual,
    PointOfContact,
    VulnEqual,
    VulnerabilityMetadata,
}

/// A decoded global identifier.
///
/// `node_type` is kept as a string rather than a [`NodeType`] so that tags
/// minted by newer writers still decode; use [`GlobalId::kind`] to check it
/// against the known set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct GlobalId {
    pub node_type: String,
    pub local_id: String,
}

impl GlobalId {
    pub fn new(node_type: impl AsRef<str>, local_id: impl Into<String>) -> Self {
        Self {
            node_type: node_type.as_ref().to_string(),
            local_id: local_id.into(),
        }
    }

    /// The tag as a known [`NodeType`], if it is one.
    pub fn kind(&self) -> Option<NodeType> {
        NodeType::from_str(&self.node_type).ok()
    }

    /// True for legacy identifiers that carried no type tag.
    pub fn is_untagged(&self) -> bool {
        self.node_type.is_empty()
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.node_type, GLOBAL_ID_SEPARATOR, self.local_id)
    }
}

impl FromStr for GlobalId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(decode(s))
    }
}

impl From<String> for GlobalId {
    fn from(s: String) -> Self {
        decode(&s)
    }
}

impl From<GlobalId> for String {
    fn from(id: GlobalId) -> String {
        id.to_string()
    }
}

/// Tag a local ID with its node type.
///
/// The tag is not checked against [`NodeType`]; unknown tags pass through.
pub fn encode(node_type: impl AsRef<str>, local_id: &str) -> String {
    let node_type = node_type.as_ref();
    let mut out = String::with_capacity(node_type.len() + 1 + local_id.len());
    out.push_str(node_type);
    out.push(GLOBAL_ID_SEPARATOR);
    out.push_str(local_id);
    out
}

/// Tag every local ID with the same node type, preserving order and duplicates.
pub fn encode_many<I, S>(node_type: impl AsRef<str>, local_ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let node_type = node_type.as_ref();
    local_ids
        .into_iter()
        .map(|id| encode(node_type, id.as_ref()))
        .collect()
}

/// Split a global ID on its first separator.
pub fn decode(global_id: &str) -> GlobalId {
    match global_id.split_once(GLOBAL_ID_SEPARATOR) {
        Some((node_type, local_id)) => GlobalId {
            node_type: node_type.to_string(),
            local_id: local_id.to_string(),
        },
        None => {
            tracing::debug!(id = global_id, "decoding untagged legacy ID");
            GlobalId {
                node_type: String::new(),
                local_id: global_id.to_string(),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    // ── Encoding ────────────────────────────────────────────────────────

    #[test]
    fn test_encode_joins_with_separator() {
        assert_eq!(encode("package", "42"), "package:42");
        assert_eq!(encode(NodeType::PackageVersion, "V1"), "packageVersion:V1");
    }

    #[test]
    fn test_encode_accepts_unknown_tags() {
        assert_eq!(encode("futureThing", "7"), "futureThing:7");
    }

    #[test]
    fn test_encode_many_preserves_order_and_duplicates() {
        let ids = encode_many(NodeType::Artifact, ["b", "a", "b"]);
        assert_eq!(ids, vec!["artifact:b", "artifact:a", "artifact:b"]);
        assert!(encode_many("artifact", Vec::<String>::new()).is_empty());
    }

    // ── Decoding ────────────────────────────────────────────────────────

    #[test]
    fn test_roundtrip() {
        for kind in NodeType::iter() {
            for local in ["1", "NS1", "4e882d99-2f2e-5804-ad0f-943ca7e4cc4e", ""] {
                let decoded = decode(&encode(kind, local));
                assert_eq!(decoded.node_type, kind.as_ref());
                assert_eq!(decoded.local_id, local);
                assert_eq!(decoded.kind(), Some(kind));
            }
        }
    }

    #[test]
    fn test_untagged_degrades() {
        let decoded = decode("plainID");
        assert_eq!(decoded.node_type, "");
        assert_eq!(decoded.local_id, "plainID");
        assert!(decoded.is_untagged());
        assert_eq!(decoded.kind(), None);
    }

    #[test]
    fn test_empty_input() {
        let decoded = decode("");
        assert!(decoded.is_untagged());
        assert_eq!(decoded.local_id, "");
    }

    #[test]
    fn test_splits_on_first_separator_only() {
        let decoded = decode("source:git:abc");
        assert_eq!(decoded.node_type, "source");
        assert_eq!(decoded.local_id, "git:abc");
    }

    #[test]
    fn test_leading_separator() {
        let decoded = decode(":abc");
        assert_eq!(decoded.node_type, "");
        assert_eq!(decoded.local_id, "abc");
    }

    #[test]
    fn test_unknown_tag_decodes_without_kind() {
        let decoded = decode("futureThing:7");
        assert_eq!(decoded.node_type, "futureThing");
        assert_eq!(decoded.kind(), None);
        assert!(!decoded.is_untagged());
    }

    // ── GlobalId conversions ────────────────────────────────────────────

    #[test]
    fn test_display_matches_encode() {
        let id = GlobalId::new(NodeType::IsDependency, "99");
        assert_eq!(id.to_string(), encode(NodeType::IsDependency, "99"));
    }

    #[test]
    fn test_from_str_is_infallible() {
        let id: GlobalId = "vulnerability:CVE".parse().unwrap();
        assert_eq!(id.kind(), Some(NodeType::Vulnerability));
        assert_eq!(id.local_id, "CVE");
    }

    #[test]
    fn test_serde_as_encoded_string() {
        let id = GlobalId::new(NodeType::HasSbom, "s1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"hasSbom:s1\"");
        let parsed: GlobalId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    // ── Tag spellings ───────────────────────────────────────────────────

    #[test]
    fn test_tag_spellings_are_stable() {
        assert_eq!(NodeType::Package.as_ref(), "package");
        assert_eq!(NodeType::VulnerabilityId.as_ref(), "vulnerabilityId");
        assert_eq!(NodeType::CertifyVexStatement.as_ref(), "certifyVexStatement");
        assert_eq!(NodeType::HasSlsa.to_string(), "hasSlsa");
    }

    #[test]
    fn test_serde_and_strum_agree() {
        for kind in NodeType::iter() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_ref()));
        }
    }
}
