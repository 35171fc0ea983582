//! Ingestion input specs and their canonical keys.
//!
//! A canonical key is the byte string a [`ContentId`] is derived from. It holds
//! only the semantically significant fields of an input, in a fixed order, so
//! that two submissions of the same entity collide on purpose. Volatile fields
//! (collection timestamps) are left out.
//!
//! Field values are opaque here: nothing is validated, only normalized where
//! the entity is case-insensitive (digests, vulnerability IDs). Every value is
//! escaped before it is joined, so distinct inputs never share a key even when
//! their values contain separators.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::ids::ContentId;

/// Separator between key segments.
pub const KEY_SEPARATOR: &str = "::";

/// Characters that carry structure inside a key and are escaped in values.
const RESERVED: [char; 4] = ['\\', ':', ',', '='];

/// Backslash-escape the characters a key uses as delimiters.
pub fn escape_segment(value: &str) -> Cow<'_, str> {
    if !value.contains(RESERVED) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Builder for a canonical key.
///
/// Every call appends exactly one segment. Absent optional values become
/// empty segments so later fields keep their position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalKey {
    buf: String,
    segments: usize,
}

impl CanonicalKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one segment, escaped.
    pub fn field(self, value: &str) -> Self {
        self.raw_field(&escape_segment(value))
    }

    /// Append a segment whose values were already escaped. The segment may
    /// use `,`, `=` or a single `:` as inner delimiters, never `::`.
    fn raw_field(mut self, escaped: &str) -> Self {
        if self.segments > 0 {
            self.buf.push_str(KEY_SEPARATOR);
        }
        self.buf.push_str(escaped);
        self.segments += 1;
        self
    }

    /// Append one segment, empty when `value` is absent.
    pub fn opt_field(self, value: Option<&str>) -> Self {
        self.field(value.unwrap_or_default())
    }

    /// Append another entity's key as a single escaped segment.
    pub fn nested(self, other: &CanonicalKey) -> Self {
        self.field(other.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Derive the content ID for this key.
    pub fn content_id(&self) -> ContentId {
        ContentId::derive(self.as_bytes())
    }
}

impl std::fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buf)
    }
}

/// An input with a canonical key, and therefore a stable content ID.
pub trait CanonicalKeyed {
    fn canonical_key(&self) -> CanonicalKey;

    fn content_id(&self) -> ContentId {
        self.canonical_key().content_id()
    }
}

// ── Leaf inputs ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInputSpec {
    pub algorithm: String,
    pub digest: String,
}

impl CanonicalKeyed for ArtifactInputSpec {
    /// `algorithm:digest`, lowercased. Digests are hex and case-insensitive.
    fn canonical_key(&self) -> CanonicalKey {
        let joined = format!(
            "{}:{}",
            escape_segment(&self.algorithm.to_lowercase()),
            escape_segment(&self.digest.to_lowercase())
        );
        CanonicalKey::new().raw_field(&joined)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderInputSpec {
    pub uri: String,
}

impl CanonicalKeyed for BuilderInputSpec {
    fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new().field(&self.uri)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifierInputSpec {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkgInputSpec {
    #[serde(rename = "type")]
    pub pkg_type: String,
    pub namespace: Option<String>,
    pub name: String,
    pub version: Option<String>,
    #[serde(default)]
    pub qualifiers: Vec<QualifierInputSpec>,
    pub subpath: Option<String>,
}

impl PkgInputSpec {
    /// Qualifiers as escaped `k=v` pairs sorted by key then value, joined
    /// with `,`.
    ///
    /// Qualifier order carries no meaning, so it must not change the key.
    pub fn qualifiers_key(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = self
            .qualifiers
            .iter()
            .map(|q| (q.key.as_str(), q.value.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", escape_segment(k), escape_segment(v)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl CanonicalKeyed for PkgInputSpec {
    fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new()
            .field(&self.pkg_type)
            .opt_field(self.namespace.as_deref())
            .field(&self.name)
            .opt_field(self.version.as_deref())
            .raw_field(&self.qualifiers_key())
            .opt_field(self.subpath.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInputSpec {
    #[serde(rename = "type")]
    pub src_type: String,
    pub namespace: String,
    pub name: String,
    pub tag: Option<String>,
    pub commit: Option<String>,
}

impl CanonicalKeyed for SourceInputSpec {
    fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new()
            .field(&self.src_type)
            .field(&self.namespace)
            .field(&self.name)
            .opt_field(self.tag.as_deref())
            .opt_field(self.commit.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityInputSpec {
    #[serde(rename = "type")]
    pub vuln_type: String,
    #[serde(rename = "vulnerabilityID")]
    pub vulnerability_id: String,
}

impl CanonicalKeyed for VulnerabilityInputSpec {
    fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new()
            .field(&self.vuln_type.to_lowercase())
            .field(&self.vulnerability_id.to_lowercase())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInputSpec {
    pub name: String,
    pub inline: Option<String>,
    pub list_version: Option<String>,
}

impl CanonicalKeyed for LicenseInputSpec {
    fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new()
            .field(&self.name)
            .opt_field(self.inline.as_deref())
            .opt_field(self.list_version.as_deref())
    }
}

// ── Relationship inputs ─────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsDependencyInputSpec {
    pub version_range: String,
    pub dependency_type: String,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

/// An `IsDependency` edge together with both endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IsDependencyIngest<'a> {
    pub package: &'a PkgInputSpec,
    pub dependency_package: &'a PkgInputSpec,
    pub dependency: &'a IsDependencyInputSpec,
}

impl CanonicalKeyed for IsDependencyIngest<'_> {
    fn canonical_key(&self) -> CanonicalKey {
        let dep = self.dependency;
        CanonicalKey::new()
            .nested(&self.package.canonical_key())
            .nested(&self.dependency_package.canonical_key())
            .field(&dep.version_range)
            .field(&dep.dependency_type)
            .field(&dep.justification)
            .field(&dep.origin)
            .field(&dep.collector)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasSbomInputSpec {
    pub uri: String,
    pub algorithm: String,
    pub digest: String,
    pub download_location: String,
    /// Unix millis. Not part of the key.
    pub known_since: u64,
    pub origin: String,
    pub collector: String,
}

/// A `HasSBOM` attestation together with its subject.
#[derive(Clone, Debug)]
pub struct HasSbomIngest<'a> {
    pub subject: &'a dyn SubjectKey,
    pub has_sbom: &'a HasSbomInputSpec,
}

/// Anything an attestation can be about.
pub trait SubjectKey: std::fmt::Debug {
    fn subject_key(&self) -> CanonicalKey;
}

impl SubjectKey for PkgInputSpec {
    fn subject_key(&self) -> CanonicalKey {
        CanonicalKey::new().field("package").nested(&self.canonical_key())
    }
}

impl SubjectKey for ArtifactInputSpec {
    fn subject_key(&self) -> CanonicalKey {
        CanonicalKey::new().field("artifact").nested(&self.canonical_key())
    }
}

impl CanonicalKeyed for HasSbomIngest<'_> {
    fn canonical_key(&self) -> CanonicalKey {
        let sbom = self.has_sbom;
        CanonicalKey::new()
            .nested(&self.subject.subject_key())
            .field(&sbom.uri)
            .field(&sbom.algorithm.to_lowercase())
            .field(&sbom.digest.to_lowercase())
            .field(&sbom.download_location)
            .field(&sbom.origin)
            .field(&sbom.collector)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dpkg() -> PkgInputSpec {
        PkgInputSpec {
            pkg_type: "deb".into(),
            namespace: Some("ubuntu".into()),
            name: "dpkg".into(),
            version: Some("1.19.0.4".into()),
            qualifiers: vec![QualifierInputSpec {
                key: "arch".into(),
                value: "amd64".into(),
            }],
            subpath: None,
        }
    }

    fn openssl() -> PkgInputSpec {
        PkgInputSpec {
            pkg_type: "conan".into(),
            namespace: Some("openssl.org".into()),
            name: "openssl".into(),
            ..Default::default()
        }
    }

    // ── CanonicalKey builder ────────────────────────────────────────────

    #[test]
    fn test_builder_keeps_positions() {
        let key = CanonicalKey::new().field("a").opt_field(None).field("c");
        assert_eq!(key.as_str(), "a::::c");
    }

    #[test]
    fn test_empty_builder() {
        assert_eq!(CanonicalKey::new().as_str(), "");
        assert_eq!(CanonicalKey::new().field("").as_str(), "");
    }

    #[test]
    fn test_escape_segment() {
        assert!(matches!(escape_segment("dpkg"), Cow::Borrowed("dpkg")));
        assert_eq!(escape_segment(r"a::b"), r"a\:\:b");
        assert_eq!(escape_segment(r"k=v,w"), r"k\=v\,w");
        assert_eq!(escape_segment(r"c:\tmp"), r"c\:\\tmp");
    }

    #[test]
    fn test_separator_in_value_does_not_shift_fields() {
        let a = CanonicalKey::new().field("a::b").field("c");
        let b = CanonicalKey::new().field("a").field("b::c");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), r"a\:\:b::c");
    }

    // ── Packages ────────────────────────────────────────────────────────

    #[test]
    fn test_package_key() {
        assert_eq!(
            dpkg().canonical_key().as_str(),
            "deb::ubuntu::dpkg::1.19.0.4::arch=amd64::"
        );
    }

    #[test]
    fn test_package_content_id_golden() {
        assert_eq!(
            dpkg().content_id().to_string(),
            "4e882d99-2f2e-5804-ad0f-943ca7e4cc4e"
        );
    }

    #[test]
    fn test_qualifier_order_does_not_matter() {
        let mut a = dpkg();
        a.qualifiers.push(QualifierInputSpec {
            key: "distro".into(),
            value: "bionic".into(),
        });
        let mut b = a.clone();
        b.qualifiers.reverse();
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a.qualifiers_key(), "arch=amd64,distro=bionic");
    }

    #[test]
    fn test_separator_in_namespace_or_name_keeps_packages_apart() {
        let a = PkgInputSpec {
            pkg_type: "generic".into(),
            namespace: Some("a::b".into()),
            name: "c".into(),
            ..Default::default()
        };
        let b = PkgInputSpec {
            pkg_type: "generic".into(),
            namespace: Some("a".into()),
            name: "b::c".into(),
            ..Default::default()
        };
        assert_ne!(a.content_id(), b.content_id());
        assert_eq!(a.canonical_key().as_str(), r"generic::a\:\:b::c::::::");
        assert_eq!(
            a.content_id().to_string(),
            "9e11ee9f-e1ce-56fc-a701-e5dcb9e5f5a1"
        );
    }

    #[test]
    fn test_delimiters_in_qualifier_value_keep_packages_apart() {
        let mut one = dpkg();
        one.qualifiers = vec![QualifierInputSpec {
            key: "arch".into(),
            value: "amd64,distro=bionic".into(),
        }];
        let mut two = dpkg();
        two.qualifiers.push(QualifierInputSpec {
            key: "distro".into(),
            value: "bionic".into(),
        });
        assert_ne!(one.content_id(), two.content_id());
        assert_eq!(one.qualifiers_key(), r"arch=amd64\,distro\=bionic");
        assert_eq!(two.qualifiers_key(), "arch=amd64,distro=bionic");
    }

    #[test]
    fn test_artifact_digest_cannot_forge_algorithm() {
        let a = ArtifactInputSpec {
            algorithm: "sha256:abc".into(),
            digest: "def".into(),
        };
        let b = ArtifactInputSpec {
            algorithm: "sha256".into(),
            digest: "abc:def".into(),
        };
        assert_ne!(a.content_id(), b.content_id());
    }

    #[test]
    fn test_missing_version_differs_from_present() {
        let mut unversioned = dpkg();
        unversioned.version = None;
        assert_ne!(unversioned.content_id(), dpkg().content_id());
    }

    // ── Leaf entities ───────────────────────────────────────────────────

    #[test]
    fn test_artifact_key_is_case_insensitive() {
        let lower = ArtifactInputSpec {
            algorithm: "sha256".into(),
            digest: "6bbb0da1891646e58eb3e6a63af3a6fc3c8eb5a0d44824cba581d2e14a0450cf".into(),
        };
        let upper = ArtifactInputSpec {
            algorithm: "SHA256".into(),
            digest: lower.digest.to_uppercase(),
        };
        assert_eq!(lower.content_id(), upper.content_id());
        assert_eq!(
            lower.content_id().to_string(),
            "e0aef4ee-5ff9-5b80-8cae-7db62fc59239"
        );
    }

    #[test]
    fn test_source_key() {
        let src = SourceInputSpec {
            src_type: "git".into(),
            namespace: "github".into(),
            name: "github.com/tensorflow/tensorflow".into(),
            tag: Some("v2.12.0".into()),
            commit: None,
        };
        assert_eq!(
            src.canonical_key().as_str(),
            "git::github::github.com/tensorflow/tensorflow::v2.12.0::"
        );
    }

    #[test]
    fn test_vulnerability_key_lowercases() {
        let a = VulnerabilityInputSpec {
            vuln_type: "CVE".into(),
            vulnerability_id: "CVE-2023-1234".into(),
        };
        assert_eq!(a.canonical_key().as_str(), "cve::cve-2023-1234");
    }

    #[test]
    fn test_builder_and_license_keys() {
        let builder = BuilderInputSpec {
            uri: "https://github.com/actions".into(),
        };
        assert_eq!(
            builder.canonical_key().as_str(),
            r"https\://github.com/actions"
        );

        let license = LicenseInputSpec {
            name: "Apache-2.0".into(),
            inline: None,
            list_version: Some("3.21".into()),
        };
        assert_eq!(license.canonical_key().as_str(), "Apache-2.0::::3.21");
    }

    // ── Relationships ───────────────────────────────────────────────────

    #[test]
    fn test_is_dependency_key_covers_both_endpoints() {
        let (pkg, dep) = (dpkg(), openssl());
        let spec = IsDependencyInputSpec {
            version_range: "3.0.3".into(),
            dependency_type: "DIRECT".into(),
            justification: "deb: part of SBOM - openssl".into(),
            origin: "Demo ingestion".into(),
            collector: "Demo ingestion".into(),
        };
        let forward = IsDependencyIngest {
            package: &pkg,
            dependency_package: &dep,
            dependency: &spec,
        };
        let backward = IsDependencyIngest {
            package: &dep,
            dependency_package: &pkg,
            dependency: &spec,
        };
        assert_eq!(forward.content_id(), forward.clone().content_id());
        assert_ne!(forward.content_id(), backward.content_id());
        let pkg_key = escape_segment(pkg.canonical_key().as_str()).into_owned();
        assert!(forward.canonical_key().as_str().starts_with(&pkg_key));
    }

    #[test]
    fn test_nested_endpoint_boundaries_are_unambiguous() {
        let spec = IsDependencyInputSpec::default();
        let (a1, a2) = (
            PkgInputSpec {
                name: "x".into(),
                ..Default::default()
            },
            PkgInputSpec {
                name: "y::z".into(),
                ..Default::default()
            },
        );
        let (b1, b2) = (
            PkgInputSpec {
                name: "x::y".into(),
                ..Default::default()
            },
            PkgInputSpec {
                name: "z".into(),
                ..Default::default()
            },
        );
        let a = IsDependencyIngest {
            package: &a1,
            dependency_package: &a2,
            dependency: &spec,
        };
        let b = IsDependencyIngest {
            package: &b1,
            dependency_package: &b2,
            dependency: &spec,
        };
        assert_ne!(a.content_id(), b.content_id());
    }

    #[test]
    fn test_has_sbom_ignores_known_since() {
        let pkg = dpkg();
        let first = HasSbomInputSpec {
            uri: "https://example.com/sbom.json".into(),
            algorithm: "sha256".into(),
            digest: "abc".into(),
            known_since: 1_700_000_000_000,
            ..Default::default()
        };
        let mut later = first.clone();
        later.known_since = 1_800_000_000_000;

        let a = HasSbomIngest {
            subject: &pkg,
            has_sbom: &first,
        };
        let b = HasSbomIngest {
            subject: &pkg,
            has_sbom: &later,
        };
        assert_eq!(a.content_id(), b.content_id());
    }

    #[test]
    fn test_has_sbom_subject_kind_is_part_of_key() {
        let artifact = ArtifactInputSpec {
            algorithm: "sha256".into(),
            digest: "abc".into(),
        };
        let pkg = dpkg();
        let sbom = HasSbomInputSpec::default();
        let on_artifact = HasSbomIngest {
            subject: &artifact,
            has_sbom: &sbom,
        };
        let on_package = HasSbomIngest {
            subject: &pkg,
            has_sbom: &sbom,
        };
        assert_ne!(on_artifact.content_id(), on_package.content_id());
    }

    #[test]
    fn test_pkg_input_json_shape() {
        let json = r#"{ "type": "deb", "namespace": "ubuntu", "name": "dpkg",
                        "version": "1.19.0.4",
                        "qualifiers": [{ "key": "arch", "value": "amd64" }] }"#;
        let parsed: PkgInputSpec = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, dpkg());
    }
}
