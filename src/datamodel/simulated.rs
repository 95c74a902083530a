use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    CallSet, DataRepository, Dataset, FeatureSet, ReadGroup, ReadGroupSet, Reference,
    ReferenceSet, VariantAnnotationSet, VariantSet, checksum,
};
use crate::ids::{CompoundId, ResourceKind};
use crate::{Error, Result};

const HUMAN_TAXON_ID: i32 = 9606;

/// Shape of the simulated repository. The same parameters always produce
/// the same repository, identifiers and records.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub seed: u64,
    pub num_datasets: usize,
    pub num_variant_sets: usize,
    pub num_calls: usize,
    pub variant_density: f64,
    pub num_reference_sets: usize,
    pub num_references_per_reference_set: usize,
    pub num_read_groups_per_read_group_set: usize,
    pub num_alignments_per_read_group: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            seed: 1111,
            num_datasets: 2,
            num_variant_sets: 4,
            num_calls: 5,
            variant_density: 1.0,
            num_reference_sets: 3,
            num_references_per_reference_set: 4,
            num_read_groups_per_read_group_set: 2,
            num_alignments_per_read_group: 5,
        }
    }
}

fn simulate_reference(
    rng: &mut StdRng,
    set_id: &CompoundId,
    set_index: usize,
    index: usize,
) -> Result<Reference> {
    let length = rng.gen_range(50..=200);
    let bases: Vec<u8> = (0..length).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
    Ok(Reference {
        id: set_id.child(ResourceKind::Reference, &[format!("srs{index}")])?,
        md5checksum: checksum(&bases),
        ncbi_taxon_id: HUMAN_TAXON_ID,
        source_uri: format!("simulated://references/{set_index}/{index}"),
        source_accessions: vec![format!("SIMREF{set_index}_{index}.1")],
        is_derived: false,
        source_divergence: 0.0,
        bases: Bytes::from(bases),
    })
}

fn simulate_reference_set(
    rng: &mut StdRng,
    params: &SimulationParams,
    index: usize,
) -> Result<ReferenceSet> {
    let id = CompoundId::root(ResourceKind::ReferenceSet, format!("referenceSet{index}"))?;
    let references = (0..params.num_references_per_reference_set)
        .map(|i| simulate_reference(rng, &id, index, i))
        .collect::<Result<Vec<_>>>()?;
    Ok(ReferenceSet {
        md5checksum: ReferenceSet::compute_checksum(&references),
        description: format!("Simulated reference set {index}"),
        ncbi_taxon_id: HUMAN_TAXON_ID,
        assembly_id: format!("simulatedAssembly{index}"),
        source_uri: format!("simulated://referencesets/{index}"),
        source_accessions: vec![format!("SIMRS{index}.1")],
        is_derived: false,
        references,
        id,
    })
}

fn simulate_variant_set(
    rng: &mut StdRng,
    params: &SimulationParams,
    dataset_id: &CompoundId,
    reference_set_id: Option<&CompoundId>,
    index: usize,
) -> Result<VariantSet> {
    let id = dataset_id.child(ResourceKind::VariantSet, &[format!("simVs{index}")])?;
    let call_sets = (0..params.num_calls)
        .map(|c| {
            Ok(CallSet {
                id: id.child(ResourceKind::CallSet, &[format!("simCallSet_{c}")])?,
                sample_id: format!("simSample_{c}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let annotation_sets = vec![VariantAnnotationSet {
        id: id.child(ResourceKind::VariantAnnotationSet, &["simVas0"])?,
        seed: rng.r#gen(),
    }];
    Ok(VariantSet {
        reference_set_id: reference_set_id.cloned(),
        seed: rng.r#gen(),
        density: params.variant_density,
        call_sets,
        annotation_sets,
        id,
    })
}

fn simulate_dataset(
    rng: &mut StdRng,
    params: &SimulationParams,
    reference_sets: &[ReferenceSet],
    index: usize,
) -> Result<Dataset> {
    let id = CompoundId::root(ResourceKind::Dataset, format!("simulatedDataset{index}"))?;
    let reference_set_id = match reference_sets.len() {
        0 => None,
        n => Some(reference_sets[index % n].id.clone()),
    };

    let variant_sets = (0..params.num_variant_sets)
        .map(|v| simulate_variant_set(rng, params, &id, reference_set_id.as_ref(), v))
        .collect::<Result<Vec<_>>>()?;

    // Read group sets need a reference set to align against.
    let read_group_sets = match &reference_set_id {
        Some(reference_set_id) => {
            let set_id = id.child(ResourceKind::ReadGroupSet, &["simRgs0"])?;
            let read_groups = (0..params.num_read_groups_per_read_group_set)
                .map(|g| {
                    Ok(ReadGroup {
                        id: set_id.child(ResourceKind::ReadGroup, &[format!("simRg{g}")])?,
                        sample_name: format!("simSample_{g}"),
                        alignments_per_reference: params.num_alignments_per_read_group,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            vec![ReadGroupSet {
                id: set_id,
                reference_set_id: reference_set_id.clone(),
                read_groups,
            }]
        }
        None => Vec::new(),
    };

    let feature_sets = vec![FeatureSet {
        id: id.child(ResourceKind::FeatureSet, &["simFs0"])?,
        reference_set_id: reference_set_id.clone(),
        seed: rng.r#gen(),
    }];

    Ok(Dataset {
        description: format!("Simulated dataset {index}"),
        variant_sets,
        read_group_sets,
        feature_sets,
        id,
    })
}

impl DataRepository {
    /// Builds a deterministic simulated repository.
    pub fn simulated(params: &SimulationParams) -> Result<Self> {
        if !(0.0..=1.0).contains(&params.variant_density) {
            return Err(Error::Internal(format!(
                "variant density must be within [0, 1], got {}",
                params.variant_density
            )));
        }
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut repo = DataRepository::new();

        for index in 0..params.num_reference_sets {
            let reference_set = simulate_reference_set(&mut rng, params, index)?;
            repo.add_reference_set(reference_set)?;
        }
        for index in 0..params.num_datasets {
            let dataset = simulate_dataset(&mut rng, params, repo.reference_sets(), index)?;
            repo.add_dataset(dataset)?;
        }

        tracing::debug!(
            datasets = repo.datasets().len(),
            reference_sets = repo.reference_sets().len(),
            "simulated repository ready"
        );
        Ok(repo)
    }
}
