//! In-memory data repository backing the search and get endpoints.
//!
//! Containers (datasets, variant sets, read group sets, ...) are held
//! eagerly. Leaf records that can be very numerous - variants, annotations,
//! alignments and features - are generated on demand from per-container seeds,
//! so a search over a chromosome-sized interval never materializes more than
//! one page.
//!
//! Every object implements [`Identified`]; lookups walk the compound
//! identifier from the root down, one local key per level.

mod fasta;
mod features;
mod reads;
mod simulated;
mod variants;

pub use fasta::load_reference_set;
pub use features::{FEATURE_REFERENCE, FeatureCandidates};
pub use reads::ReadCandidates;
pub use simulated::SimulationParams;
pub use variants::{AnnotationCandidates, VariantCandidates};

use bytes::Bytes;
use md5::{Digest, Md5};

use crate::ids::{CompoundId, Identified, ResourceKind};
use crate::{Error, Result, types};

pub struct Dataset {
    pub id: CompoundId,
    pub description: String,
    pub variant_sets: Vec<VariantSet>,
    pub read_group_sets: Vec<ReadGroupSet>,
    pub feature_sets: Vec<FeatureSet>,
}

pub struct VariantSet {
    pub id: CompoundId,
    pub reference_set_id: Option<CompoundId>,
    pub seed: u64,
    pub density: f64,
    pub call_sets: Vec<CallSet>,
    pub annotation_sets: Vec<VariantAnnotationSet>,
}

pub struct CallSet {
    pub id: CompoundId,
    pub sample_id: String,
}

pub struct VariantAnnotationSet {
    pub id: CompoundId,
    pub seed: u64,
}

pub struct ReadGroupSet {
    pub id: CompoundId,
    pub reference_set_id: CompoundId,
    pub read_groups: Vec<ReadGroup>,
}

pub struct ReadGroup {
    pub id: CompoundId,
    pub sample_name: String,
    pub alignments_per_reference: u64,
}

pub struct FeatureSet {
    pub id: CompoundId,
    pub reference_set_id: Option<CompoundId>,
    pub seed: u64,
}

#[derive(Debug)]
pub struct ReferenceSet {
    pub id: CompoundId,
    pub description: String,
    pub md5checksum: String,
    pub ncbi_taxon_id: i32,
    pub assembly_id: String,
    pub source_uri: String,
    pub source_accessions: Vec<String>,
    pub is_derived: bool,
    pub references: Vec<Reference>,
}

#[derive(Debug)]
pub struct Reference {
    pub id: CompoundId,
    pub md5checksum: String,
    pub ncbi_taxon_id: i32,
    pub source_uri: String,
    pub source_accessions: Vec<String>,
    pub is_derived: bool,
    pub source_divergence: f64,
    pub bases: Bytes,
}

macro_rules! identified {
    ($($ty:ty),+ $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &CompoundId {
                &self.id
            }
        })+
    };
}

identified!(
    Dataset,
    VariantSet,
    CallSet,
    VariantAnnotationSet,
    ReadGroupSet,
    ReadGroup,
    FeatureSet,
    ReferenceSet,
    Reference,
);

/// Lowercase hex MD5 digest of `data`.
pub fn checksum(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

fn parent_string(id: &CompoundId) -> String {
    id.parent().map(|p| p.to_string()).unwrap_or_default()
}

fn find_local<'a, T: Identified>(items: &'a [T], key: &str) -> Option<&'a T> {
    items.iter().find(|item| item.local_id() == key)
}

impl Dataset {
    pub fn to_protocol(&self) -> types::Dataset {
        types::Dataset {
            id: self.id.to_string(),
            name: self.local_id().to_string(),
            description: self.description.clone(),
        }
    }
}

impl VariantSet {
    pub fn to_protocol(&self) -> types::VariantSet {
        types::VariantSet {
            id: self.id.to_string(),
            name: self.local_id().to_string(),
            dataset_id: parent_string(&self.id),
            reference_set_id: self
                .reference_set_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

impl CallSet {
    pub fn to_protocol(&self) -> types::CallSet {
        types::CallSet {
            id: self.id.to_string(),
            name: self.local_id().to_string(),
            sample_id: self.sample_id.clone(),
            variant_set_ids: vec![parent_string(&self.id)],
        }
    }
}

impl VariantAnnotationSet {
    pub fn to_protocol(&self) -> types::VariantAnnotationSet {
        types::VariantAnnotationSet {
            id: self.id.to_string(),
            name: self.local_id().to_string(),
            variant_set_id: parent_string(&self.id),
        }
    }
}

impl ReadGroup {
    pub fn to_protocol(&self) -> types::ReadGroup {
        let dataset_id = self
            .id
            .parent()
            .and_then(|set| set.parent())
            .map(|d| d.to_string())
            .unwrap_or_default();
        types::ReadGroup {
            id: self.id.to_string(),
            name: self.local_id().to_string(),
            dataset_id,
            sample_name: self.sample_name.clone(),
        }
    }
}

impl ReadGroupSet {
    pub fn to_protocol(&self) -> types::ReadGroupSet {
        types::ReadGroupSet {
            id: self.id.to_string(),
            name: self.local_id().to_string(),
            dataset_id: parent_string(&self.id),
            reference_set_id: self.reference_set_id.to_string(),
            read_groups: self.read_groups.iter().map(ReadGroup::to_protocol).collect(),
        }
    }
}

impl FeatureSet {
    pub fn to_protocol(&self) -> types::FeatureSet {
        types::FeatureSet {
            id: self.id.to_string(),
            name: self.local_id().to_string(),
            dataset_id: parent_string(&self.id),
            reference_set_id: self
                .reference_set_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

impl ReferenceSet {
    pub fn to_protocol(&self) -> types::ReferenceSet {
        types::ReferenceSet {
            id: self.id.to_string(),
            name: self.local_id().to_string(),
            md5checksum: self.md5checksum.clone(),
            ncbi_taxon_id: self.ncbi_taxon_id,
            description: self.description.clone(),
            assembly_id: self.assembly_id.clone(),
            source_uri: self.source_uri.clone(),
            source_accessions: self.source_accessions.clone(),
            is_derived: self.is_derived,
        }
    }

    /// Checksum over the sorted checksums of the member references.
    pub fn compute_checksum(references: &[Reference]) -> String {
        let mut sums: Vec<&str> = references.iter().map(|r| r.md5checksum.as_str()).collect();
        sums.sort_unstable();
        checksum(sums.concat().as_bytes())
    }
}

impl Reference {
    pub fn name(&self) -> &str {
        self.local_id()
    }

    pub fn length(&self) -> u64 {
        self.bases.len() as u64
    }

    pub fn to_protocol(&self) -> types::Reference {
        types::Reference {
            id: self.id.to_string(),
            name: self.name().to_string(),
            length: self.length(),
            md5checksum: self.md5checksum.clone(),
            ncbi_taxon_id: self.ncbi_taxon_id,
            source_uri: self.source_uri.clone(),
            source_accessions: self.source_accessions.clone(),
            is_derived: self.is_derived,
            source_divergence: self.source_divergence,
        }
    }
}

/// All datasets and reference sets served by this process.
#[derive(Default)]
pub struct DataRepository {
    datasets: Vec<Dataset>,
    reference_sets: Vec<ReferenceSet>,
}

impl DataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dataset(&mut self, dataset: Dataset) -> Result<()> {
        if find_local(&self.datasets, dataset.local_id()).is_some() {
            return Err(Error::Internal(format!(
                "duplicate dataset '{}'",
                dataset.local_id()
            )));
        }
        self.datasets.push(dataset);
        Ok(())
    }

    pub fn add_reference_set(&mut self, reference_set: ReferenceSet) -> Result<()> {
        if find_local(&self.reference_sets, reference_set.local_id()).is_some() {
            return Err(Error::Internal(format!(
                "duplicate reference set '{}'",
                reference_set.local_id()
            )));
        }
        self.reference_sets.push(reference_set);
        Ok(())
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn reference_sets(&self) -> &[ReferenceSet] {
        &self.reference_sets
    }

    // Resolution by already-parsed identifiers. `None` means "no such object".

    fn dataset_at(&self, id: &CompoundId) -> Option<&Dataset> {
        find_local(&self.datasets, id.segments().first()?)
    }

    fn reference_set_at(&self, id: &CompoundId) -> Option<&ReferenceSet> {
        find_local(&self.reference_sets, id.segments().first()?)
    }

    fn reference_at(&self, id: &CompoundId) -> Option<&Reference> {
        let set = self.reference_set_at(&id.parent()?)?;
        find_local(&set.references, id.local_id())
    }

    fn variant_set_at(&self, id: &CompoundId) -> Option<&VariantSet> {
        let dataset = self.dataset_at(&id.parent()?)?;
        find_local(&dataset.variant_sets, id.local_id())
    }

    fn read_group_set_at(&self, id: &CompoundId) -> Option<&ReadGroupSet> {
        let dataset = self.dataset_at(&id.parent()?)?;
        find_local(&dataset.read_group_sets, id.local_id())
    }

    fn feature_set_at(&self, id: &CompoundId) -> Option<&FeatureSet> {
        let dataset = self.dataset_at(&id.parent()?)?;
        find_local(&dataset.feature_sets, id.local_id())
    }

    fn variant_annotation_set_at(&self, id: &CompoundId) -> Option<&VariantAnnotationSet> {
        let variant_set = self.variant_set_at(&id.parent()?)?;
        find_local(&variant_set.annotation_sets, id.local_id())
    }

    // Resolution of client-supplied identifier strings.

    fn resolve<'a, T>(
        &'a self,
        kind: ResourceKind,
        id: &str,
        lookup: impl FnOnce(&'a Self, &CompoundId) -> Option<&'a T>,
    ) -> Result<&'a T> {
        let parsed = CompoundId::parse(kind, id)?;
        lookup(self, &parsed).ok_or_else(|| Error::not_found(id))
    }

    pub fn get_dataset(&self, id: &str) -> Result<&Dataset> {
        self.resolve(ResourceKind::Dataset, id, Self::dataset_at)
    }

    pub fn get_reference_set(&self, id: &str) -> Result<&ReferenceSet> {
        self.resolve(ResourceKind::ReferenceSet, id, Self::reference_set_at)
    }

    pub fn get_reference(&self, id: &str) -> Result<&Reference> {
        self.resolve(ResourceKind::Reference, id, Self::reference_at)
    }

    pub fn get_variant_set(&self, id: &str) -> Result<&VariantSet> {
        self.resolve(ResourceKind::VariantSet, id, Self::variant_set_at)
    }

    pub fn get_call_set(&self, id: &str) -> Result<&CallSet> {
        self.resolve(ResourceKind::CallSet, id, |repo, parsed| {
            let variant_set = repo.variant_set_at(&parsed.parent()?)?;
            find_local(&variant_set.call_sets, parsed.local_id())
        })
    }

    pub fn get_variant_annotation_set(&self, id: &str) -> Result<&VariantAnnotationSet> {
        self.resolve(
            ResourceKind::VariantAnnotationSet,
            id,
            Self::variant_annotation_set_at,
        )
    }

    pub fn get_read_group_set(&self, id: &str) -> Result<&ReadGroupSet> {
        self.resolve(ResourceKind::ReadGroupSet, id, Self::read_group_set_at)
    }

    pub fn get_read_group(&self, id: &str) -> Result<&ReadGroup> {
        self.resolve(ResourceKind::ReadGroup, id, |repo, parsed| {
            let set = repo.read_group_set_at(&parsed.parent()?)?;
            find_local(&set.read_groups, parsed.local_id())
        })
    }

    pub fn get_feature_set(&self, id: &str) -> Result<&FeatureSet> {
        self.resolve(ResourceKind::FeatureSet, id, Self::feature_set_at)
    }

    /// The variant set containing `annotation_set`.
    pub fn annotated_variant_set(&self, annotation_set: &VariantAnnotationSet) -> Result<&VariantSet> {
        annotation_set
            .parent_id()
            .and_then(|parent| self.variant_set_at(&parent))
            .ok_or_else(|| Error::Internal(format!("orphaned annotation set {}", annotation_set.id)))
    }

    /// The read group set containing `read_group`.
    pub fn read_group_set_of(&self, read_group: &ReadGroup) -> Result<&ReadGroupSet> {
        read_group
            .parent_id()
            .and_then(|parent| self.read_group_set_at(&parent))
            .ok_or_else(|| Error::Internal(format!("orphaned read group {}", read_group.id)))
    }

    pub fn get_variant(&self, id: &str) -> Result<types::Variant> {
        let parsed = CompoundId::parse(ResourceKind::Variant, id)?;
        let segments = parsed.segments();
        let variant_set = self
            .dataset_at(&parsed)
            .and_then(|dataset| find_local(&dataset.variant_sets, &segments[1]));
        variant_set
            .zip(parse_position(&segments[3]))
            .filter(|(set, start)| {
                self.reference_length(set.reference_set_id.as_ref(), &segments[2])
                    .is_some_and(|length| *start < length)
            })
            .and_then(|(set, start)| set.variant_at(&segments[2], start, None))
            .ok_or_else(|| Error::not_found(id))
    }

    /// Length of the reference called `name` in the given reference set.
    /// Variants only exist on references their variant set is aligned to.
    pub fn reference_length(&self, reference_set_id: Option<&CompoundId>, name: &str) -> Option<u64> {
        let reference_set = self.reference_set_at(reference_set_id?)?;
        find_local(&reference_set.references, name).map(Reference::length)
    }

    pub fn get_feature(&self, id: &str) -> Result<types::Feature> {
        let parsed = CompoundId::parse(ResourceKind::Feature, id)?;
        parsed
            .parent()
            .and_then(|parent| self.feature_set_at(&parent))
            .and_then(|set| set.feature_by_key(parsed.local_id()))
            .ok_or_else(|| Error::not_found(id))
    }
}

/// Parses a canonical decimal position; "007" and "+7" are not positions.
pub(crate) fn parse_position(segment: &str) -> Option<u64> {
    let value: u64 = segment.parse().ok()?;
    (value.to_string() == segment).then_some(value)
}
