//! Materialized nodes, as the query layer hands them to response assembly.
//!
//! Most nodes carry a single `id`. Packages, sources and vulnerabilities are
//! trees: a query may materialize only part of the tree, so every nested list
//! can be empty.
//!
//! ```text
//! Package (type)            Source (type)             Vulnerability (type)
//!   └── PackageNamespace      └── SourceNamespace       └── VulnerabilityId
//!         └── PackageName           └── SourceName
//!               └── PackageVersion
//! ```
//!
//! [`Node`] is a union over the registered GraphQL types, tagged by
//! `__typename` on the wire. Any other typename deserializes to
//! [`Node::Unregistered`] with the remaining fields kept as JSON.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::global::NodeType;

// ── Package tree ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    #[serde(rename = "type")]
    pub pkg_type: String,
    #[serde(default)]
    pub namespaces: Vec<PackageNamespace>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageNamespace {
    pub id: String,
    pub namespace: String,
    #[serde(default)]
    pub names: Vec<PackageName>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageName {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub versions: Vec<PackageVersion>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageVersion {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub qualifiers: Vec<PackageQualifier>,
    #[serde(default)]
    pub subpath: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageQualifier {
    pub key: String,
    pub value: String,
}

// ── Source tree ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    #[serde(rename = "type")]
    pub src_type: String,
    #[serde(default)]
    pub namespaces: Vec<SourceNamespace>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceNamespace {
    pub id: String,
    pub namespace: String,
    #[serde(default)]
    pub names: Vec<SourceName>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceName {
    pub id: String,
    pub name: String,
    pub tag: Option<String>,
    pub commit: Option<String>,
}

// ── Vulnerability tree ──────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: String,
    #[serde(rename = "type")]
    pub vuln_type: String,
    #[serde(default, rename = "vulnerabilityIDs")]
    pub vulnerability_ids: Vec<VulnerabilityId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityId {
    pub id: String,
    #[serde(rename = "vulnerabilityID")]
    pub vulnerability_id: String,
}

// ── Leaf entities ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    pub algorithm: String,
    pub digest: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Builder {
    pub id: String,
    pub uri: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: String,
    pub name: String,
    pub inline: Option<String>,
    pub list_version: Option<String>,
}

// ── Evidence and relationships ──────────────────────────────────────────────
//
// Subjects are elided to the fields response assembly needs; `origin` and
// `collector` record where each piece of evidence came from.

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifyBad {
    pub id: String,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifyGood {
    pub id: String,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifyLegal {
    pub id: String,
    pub declared_license: String,
    pub discovered_license: String,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifyScorecard {
    pub id: String,
    pub source: Source,
    pub aggregate_score: f64,
    pub scorecard_version: String,
    pub scorecard_commit: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifyVexStatement {
    pub id: String,
    pub status: String,
    pub justification: String,
    pub statement: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifyVuln {
    pub id: String,
    pub package: Package,
    pub vulnerability: Vulnerability,
    pub scanner_uri: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashEqual {
    pub id: String,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasMetadata {
    pub id: String,
    pub key: String,
    pub value: String,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasSbom {
    pub id: String,
    pub uri: String,
    pub algorithm: String,
    pub digest: String,
    pub download_location: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasSlsa {
    pub id: String,
    pub subject: Artifact,
    pub build_type: String,
    pub slsa_version: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasSourceAt {
    pub id: String,
    pub package: Package,
    pub source: Source,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsDependency {
    pub id: String,
    pub package: Package,
    pub dependency_package: Package,
    pub version_range: String,
    pub dependency_type: String,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsOccurrence {
    pub id: String,
    pub artifact: Artifact,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkgEqual {
    pub id: String,
    #[serde(default)]
    pub packages: Vec<Package>,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfContact {
    pub id: String,
    pub email: String,
    pub info: String,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnEqual {
    pub id: String,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    pub justification: String,
    pub origin: String,
    pub collector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityMetadata {
    pub id: String,
    pub vulnerability: Vulnerability,
    pub score_type: String,
    pub score_value: f64,
    pub origin: String,
    pub collector: String,
}

// ── The union ───────────────────────────────────────────────────────────────

/// Wire field that names a node's type.
pub const TYPENAME_TAG: &str = "__typename";

/// Any node the query layer can materialize.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "__typename")]
pub enum Node {
    Package(Package),
    Source(Source),
    Vulnerability(Vulnerability),
    Artifact(Artifact),
    Builder(Builder),
    License(License),
    CertifyBad(CertifyBad),
    CertifyGood(CertifyGood),
    CertifyLegal(CertifyLegal),
    CertifyScorecard(CertifyScorecard),
    #[serde(rename = "CertifyVEXStatement")]
    CertifyVexStatement(CertifyVexStatement),
    CertifyVuln(CertifyVuln),
    HashEqual(HashEqual),
    HasMetadata(HasMetadata),
    #[serde(rename = "HasSBOM")]
    HasSbom(HasSbom),
    #[serde(rename = "HasSLSA")]
    HasSlsa(HasSlsa),
    HasSourceAt(HasSourceAt),
    IsDependency(IsDependency),
    IsOccurrence(IsOccurrence),
    PkgEqual(PkgEqual),
    PointOfContact(PointOfContact),
    VulnEqual(VulnEqual),
    VulnerabilityMetadata(VulnerabilityMetadata),
    /// A type this model has no variant for (e.g. added by a newer schema).
    /// `fields` holds everything except the tag. Never serialized.
    #[serde(skip_serializing)]
    Unregistered {
        typename: String,
        fields: serde_json::Value,
    },
}

impl Node {
    /// The GraphQL type name of this node.
    pub fn typename(&self) -> &str {
        match self {
            Node::Package(_) => "Package",
            Node::Source(_) => "Source",
            Node::Vulnerability(_) => "Vulnerability",
            Node::Artifact(_) => "Artifact",
            Node::Builder(_) => "Builder",
            Node::License(_) => "License",
            Node::CertifyBad(_) => "CertifyBad",
            Node::CertifyGood(_) => "CertifyGood",
            Node::CertifyLegal(_) => "CertifyLegal",
            Node::CertifyScorecard(_) => "CertifyScorecard",
            Node::CertifyVexStatement(_) => "CertifyVEXStatement",
            Node::CertifyVuln(_) => "CertifyVuln",
            Node::HashEqual(_) => "HashEqual",
            Node::HasMetadata(_) => "HasMetadata",
            Node::HasSbom(_) => "HasSBOM",
            Node::HasSlsa(_) => "HasSLSA",
            Node::HasSourceAt(_) => "HasSourceAt",
            Node::IsDependency(_) => "IsDependency",
            Node::IsOccurrence(_) => "IsOccurrence",
            Node::PkgEqual(_) => "PkgEqual",
            Node::PointOfContact(_) => "PointOfContact",
            Node::VulnEqual(_) => "VulnEqual",
            Node::VulnerabilityMetadata(_) => "VulnerabilityMetadata",
            Node::Unregistered { typename, .. } => typename.as_str(),
        }
    }

    /// The partition of the node's top-level entity. `None` when unregistered.
    pub fn node_type(&self) -> Option<NodeType> {
        let kind = match self {
            Node::Package(_) => NodeType::Package,
            Node::Source(_) => NodeType::Source,
            Node::Vulnerability(_) => NodeType::Vulnerability,
            Node::Artifact(_) => NodeType::Artifact,
            Node::Builder(_) => NodeType::Builder,
            Node::License(_) => NodeType::License,
            Node::CertifyBad(_) => NodeType::CertifyBad,
            Node::CertifyGood(_) => NodeType::CertifyGood,
            Node::CertifyLegal(_) => NodeType::CertifyLegal,
            Node::CertifyScorecard(_) => NodeType::CertifyScorecard,
            Node::CertifyVexStatement(_) => NodeType::CertifyVexStatement,
            Node::CertifyVuln(_) => NodeType::CertifyVuln,
            Node::HashEqual(_) => NodeType::HashEqual,
            Node::HasMetadata(_) => NodeType::HasMetadata,
            Node::HasSbom(_) => NodeType::HasSbom,
            Node::HasSlsa(_) => NodeType::HasSlsa,
            Node::HasSourceAt(_) => NodeType::HasSourceAt,
            Node::IsDependency(_) => NodeType::IsDependency,
            Node::IsOccurrence(_) => NodeType::IsOccurrence,
            Node::PkgEqual(_) => NodeType::PkgEqual,
            Node::PointOfContact(_) => NodeType::PointOfContact,
            Node::VulnEqual(_) => NodeType::VulnEqual,
            Node::VulnerabilityMetadata(_) => NodeType::VulnerabilityMetadata,
            Node::Unregistered { .. } => return None,
        };
        Some(kind)
    }
}

type ParsePayload = fn(serde_json::Value) -> serde_json::Result<Node>;

fn payload<T>(fields: serde_json::Value) -> serde_json::Result<Node>
where
    T: DeserializeOwned + Into<Node>,
{
    serde_json::from_value::<T>(fields).map(Into::into)
}

fn payload_parser(typename: &str) -> Option<ParsePayload> {
    let parse: ParsePayload = match typename {
        "Package" => payload::<Package>,
        "Source" => payload::<Source>,
        "Vulnerability" => payload::<Vulnerability>,
        "Artifact" => payload::<Artifact>,
        "Builder" => payload::<Builder>,
        "License" => payload::<License>,
        "CertifyBad" => payload::<CertifyBad>,
        "CertifyGood" => payload::<CertifyGood>,
        "CertifyLegal" => payload::<CertifyLegal>,
        "CertifyScorecard" => payload::<CertifyScorecard>,
        "CertifyVEXStatement" => payload::<CertifyVexStatement>,
        "CertifyVuln" => payload::<CertifyVuln>,
        "HashEqual" => payload::<HashEqual>,
        "HasMetadata" => payload::<HasMetadata>,
        "HasSBOM" => payload::<HasSbom>,
        "HasSLSA" => payload::<HasSlsa>,
        "HasSourceAt" => payload::<HasSourceAt>,
        "IsDependency" => payload::<IsDependency>,
        "IsOccurrence" => payload::<IsOccurrence>,
        "PkgEqual" => payload::<PkgEqual>,
        "PointOfContact" => payload::<PointOfContact>,
        "VulnEqual" => payload::<VulnEqual>,
        "VulnerabilityMetadata" => payload::<VulnerabilityMetadata>,
        _ => return None,
    };
    Some(parse)
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields =
            serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let typename = match fields.remove(TYPENAME_TAG) {
            Some(serde_json::Value::String(name)) => name,
            Some(other) => {
                return Err(de::Error::custom(format_args!(
                    "{TYPENAME_TAG} must be a string, got {other}"
                )));
            }
            None => return Err(de::Error::missing_field(TYPENAME_TAG)),
        };
        let fields = serde_json::Value::Object(fields);
        match payload_parser(&typename) {
            Some(parse) => parse(fields).map_err(de::Error::custom),
            None => {
                tracing::debug!(typename = %typename, "unregistered node type");
                Ok(Node::Unregistered { typename, fields })
            }
        }
    }
}

macro_rules! impl_from_payload {
    ($($T:ident),* $(,)?) => {
        $(
            impl From<$T> for Node {
                fn from(v: $T) -> Self {
                    Node::$T(v)
                }
            }
        )*
    };
}

impl_from_payload!(
    Package,
    Source,
    Vulnerability,
    Artifact,
    Builder,
    License,
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
);

// ============================================================================
// Tests
// ============================================================================
