//! Compound identifiers for hierarchical GA4GH resources.
//!
//! A resource is addressed by the chain of local keys from its root container
//! down to itself, e.g. a call set by `[dataset, variant set, call set]`. The
//! chain is joined with [`SEPARATOR`] and rendered as unpadded URL-safe base64
//! so that the identifier is opaque to clients.
//!
//! Decoding never distinguishes "malformed" from "well-formed but unknown":
//! callers turn every [`IdError::MalformedId`] into a not-found failure.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use std::fmt;

/// Reserved separator between segments.
pub const SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("invalid identifier segment {0:?}")]
    InvalidSegment(String),

    #[error("malformed identifier '{0}'")]
    MalformedId(String),

    #[error("{child:?} cannot be nested under {parent:?}")]
    KindMismatch {
        parent: ResourceKind,
        child: ResourceKind,
    },
}

/// Every resource type that can be addressed by a compound identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Dataset,
    ReferenceSet,
    Reference,
    VariantSet,
    CallSet,
    VariantAnnotationSet,
    Variant,
    VariantAnnotation,
    ReadGroupSet,
    ReadGroup,
    ReadAlignment,
    FeatureSet,
    Feature,
}

impl ResourceKind {
    pub fn parent(&self) -> Option<ResourceKind> {
        use ResourceKind::*;
        match self {
            Dataset | ReferenceSet => None,
            Reference => Some(ReferenceSet),
            VariantSet | ReadGroupSet | FeatureSet => Some(Dataset),
            CallSet | VariantAnnotationSet | Variant => Some(VariantSet),
            VariantAnnotation => Some(VariantAnnotationSet),
            ReadGroup => Some(ReadGroupSet),
            ReadAlignment => Some(ReadGroup),
            Feature => Some(FeatureSet),
        }
    }

    /// Number of segments in identifiers of this kind.
    pub fn depth(&self) -> usize {
        // Variants carry two local segments: reference name and start.
        let own = match self {
            ResourceKind::Variant | ResourceKind::VariantAnnotation => 2,
            _ => 1,
        };
        own + self.parent().map_or(0, |p| p.depth())
    }
}

/// Joins `segments` into an opaque identifier.
pub fn encode<S: AsRef<str>>(segments: &[S]) -> Result<String, IdError> {
    if segments.is_empty() {
        return Err(IdError::InvalidSegment(String::new()));
    }
    for segment in segments {
        validate_segment(segment.as_ref())?;
    }
    let joined = segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(&SEPARATOR.to_string());
    Ok(URL_SAFE_NO_PAD.encode(joined))
}

/// Splits an opaque identifier back into exactly `expected_depth` segments.
pub fn decode(id: &str, expected_depth: usize) -> Result<Vec<String>, IdError> {
    let malformed = || IdError::MalformedId(id.to_string());

    let raw = URL_SAFE_NO_PAD.decode(id).map_err(|_| malformed())?;
    let joined = String::from_utf8(raw).map_err(|_| malformed())?;

    let segments: Vec<String> = joined.split(SEPARATOR).map(str::to_string).collect();
    if segments.len() != expected_depth || segments.iter().any(|s| validate_segment(s).is_err()) {
        return Err(malformed());
    }
    Ok(segments)
}

fn validate_segment(segment: &str) -> Result<(), IdError> {
    if segment.is_empty() || segment.contains(SEPARATOR) || segment.chars().any(char::is_control) {
        return Err(IdError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

/// Identifier of one resource: its kind plus the full key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundId {
    kind: ResourceKind,
    segments: Vec<String>,
}

impl CompoundId {
    /// Identifier of a top-level resource.
    pub fn root(kind: ResourceKind, key: impl Into<String>) -> Result<Self, IdError> {
        let key = key.into();
        validate_segment(&key)?;
        if let Some(parent) = kind.parent() {
            return Err(IdError::KindMismatch { parent, child: kind });
        }
        Ok(Self {
            kind,
            segments: vec![key],
        })
    }

    /// Identifier of a resource nested directly below `self`.
    pub fn child<S: AsRef<str>>(&self, kind: ResourceKind, keys: &[S]) -> Result<Self, IdError> {
        if kind.parent() != Some(self.kind) || self.segments.len() + keys.len() != kind.depth() {
            return Err(IdError::KindMismatch {
                parent: self.kind,
                child: kind,
            });
        }
        let mut segments = self.segments.clone();
        for key in keys {
            validate_segment(key.as_ref())?;
            segments.push(key.as_ref().to_string());
        }
        Ok(Self { kind, segments })
    }

    /// Parses a client-supplied identifier of the given kind.
    pub fn parse(kind: ResourceKind, id: &str) -> Result<Self, IdError> {
        let segments = decode(id, kind.depth())?;
        Ok(Self { kind, segments })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment: this resource's key within its parent.
    pub fn local_id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<CompoundId> {
        let kind = self.kind.parent()?;
        Some(CompoundId {
            kind,
            segments: self.segments[..kind.depth()].to_vec(),
        })
    }

    pub fn encode(&self) -> String {
        // Segments are validated on construction.
        URL_SAFE_NO_PAD.encode(self.segments.join(&SEPARATOR.to_string()))
    }
}

impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Capability shared by every data-model object: a local key plus an
/// optional parent, from which the compound identifier derives.
pub trait Identified {
    fn id(&self) -> &CompoundId;

    fn local_id(&self) -> &str {
        self.id().local_id()
    }

    fn parent_id(&self) -> Option<CompoundId> {
        self.id().parent()
    }
}
