//! Resolve a materialized node to the ID of its most specific loaded entity.
//!
//! A package query may stop at any level of the namespace → name → version
//! tree. Response assembly doesn't care which level was loaded; it wants the
//! ID of the deepest one. Only the first element of each nested list is
//! followed.
//!
//! | Node            | Resolution order                                     |
//! |-----------------|------------------------------------------------------|
//! | `Package`       | version → name → namespace → package                 |
//! | `Source`        | name → namespace → source                            |
//! | `Vulnerability` | first vulnerability ID → vulnerability               |
//! | everything else | own ID                                               |

use assembler_types::node::{Package, Source, Vulnerability};
use assembler_types::{GlobalId, Node, NodeType};

use crate::error::ResolveError;

/// An ID together with the partition it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedId<'a> {
    pub node_type: NodeType,
    pub id: &'a str,
}

impl<'a> ResolvedId<'a> {
    pub fn new(node_type: NodeType, id: &'a str) -> Self {
        Self { node_type, id }
    }

    /// Tag the ID for client consumption.
    pub fn to_global(&self) -> GlobalId {
        GlobalId::new(self.node_type, self.id)
    }
}

/// Resolve `node` to its most specific populated level.
pub fn resolve(node: &Node) -> Result<ResolvedId<'_>, ResolveError> {
    let flat = ResolvedId::new;

    let resolved = match node {
        Node::Package(p) => resolve_package(p),
        Node::Source(s) => resolve_source(s),
        Node::Vulnerability(v) => resolve_vulnerability(v),

        Node::Artifact(v) => flat(NodeType::Artifact, &v.id),
        Node::Builder(v) => flat(NodeType::Builder, &v.id),
        Node::License(v) => flat(NodeType::License, &v.id),
        Node::CertifyBad(v) => flat(NodeType::CertifyBad, &v.id),
        Node::CertifyGood(v) => flat(NodeType::CertifyGood, &v.id),
        Node::CertifyLegal(v) => flat(NodeType::CertifyLegal, &v.id),
        Node::CertifyScorecard(v) => flat(NodeType::CertifyScorecard, &v.id),
        Node::CertifyVexStatement(v) => flat(NodeType::CertifyVexStatement, &v.id),
        Node::CertifyVuln(v) => flat(NodeType::CertifyVuln, &v.id),
        Node::HashEqual(v) => flat(NodeType::HashEqual, &v.id),
        Node::HasMetadata(v) => flat(NodeType::HasMetadata, &v.id),
        Node::HasSbom(v) => flat(NodeType::HasSbom, &v.id),
        Node::HasSlsa(v) => flat(NodeType::HasSlsa, &v.id),
        Node::HasSourceAt(v) => flat(NodeType::HasSourceAt, &v.id),
        Node::IsDependency(v) => flat(NodeType::IsDependency, &v.id),
        Node::IsOccurrence(v) => flat(NodeType::IsOccurrence, &v.id),
        Node::PkgEqual(v) => flat(NodeType::PkgEqual, &v.id),
        Node::PointOfContact(v) => flat(NodeType::PointOfContact, &v.id),
        Node::VulnEqual(v) => flat(NodeType::VulnEqual, &v.id),
        Node::VulnerabilityMetadata(v) => flat(NodeType::VulnerabilityMetadata, &v.id),

        Node::Unregistered { typename, fields } => {
            tracing::warn!(typename = %typename, "cannot resolve ID of unregistered node type");
            return Err(ResolveError::UnrecognizedNodeType {
                typename: typename.clone(),
                value: format!("{fields:?}"),
            });
        }
    };
    Ok(resolved)
}

/// Resolve `node` to a bare ID.
pub fn resolve_id(node: &Node) -> Result<&str, ResolveError> {
    resolve(node).map(|r| r.id)
}

/// Resolve `node` to a type-tagged global ID.
pub fn resolve_global_id(node: &Node) -> Result<GlobalId, ResolveError> {
    resolve(node).map(|r| r.to_global())
}

fn resolve_package(p: &Package) -> ResolvedId<'_> {
    let Some(ns) = p.namespaces.first() else {
        return ResolvedId::new(NodeType::Package, &p.id);
    };
    let Some(name) = ns.names.first() else {
        return ResolvedId::new(NodeType::PackageNamespace, &ns.id);
    };
    match name.versions.first() {
        Some(version) => ResolvedId::new(NodeType::PackageVersion, &version.id),
        None => ResolvedId::new(NodeType::PackageName, &name.id),
    }
}

fn resolve_source(s: &Source) -> ResolvedId<'_> {
    let Some(ns) = s.namespaces.first() else {
        return ResolvedId::new(NodeType::Source, &s.id);
    };
    match ns.names.first() {
        Some(name) => ResolvedId::new(NodeType::SourceName, &name.id),
        None => ResolvedId::new(NodeType::SourceNamespace, &ns.id),
    }
}

fn resolve_vulnerability(v: &Vulnerability) -> ResolvedId<'_> {
    match v.vulnerability_ids.first() {
        Some(vid) => ResolvedId::new(NodeType::VulnerabilityId, &vid.id),
        None => ResolvedId::new(NodeType::Vulnerability, &v.id),
    }
}

// ============================================================================
// Tests
// ============================================================================
