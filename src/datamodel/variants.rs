use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use super::{VariantAnnotationSet, VariantSet};
use crate::ids::ResourceKind;
use crate::paging::CandidateSource;
use crate::types::{self, OntologyTerm, TranscriptEffect};

const BASES: &[u8; 4] = b"ACGT";

/// Sequence Ontology terms annotations are drawn from.
pub(crate) const EFFECT_TERMS: [(&str, &str); 4] = [
    ("SO:0001627", "intron_variant"),
    ("SO:0001791", "exon_variant"),
    ("SO:0001583", "missense_variant"),
    ("SO:0001819", "synonymous_variant"),
];

/// Deterministic RNG for one (container, reference, position) triple.
pub(crate) fn position_rng(seed: u64, reference_name: &str, position: u64) -> StdRng {
    let name_hash = u64::from(crc32fast::hash(reference_name.as_bytes()));
    StdRng::seed_from_u64(
        seed ^ (name_hash << 32) ^ position.wrapping_mul(0x9e37_79b9_7f4a_7c15),
    )
}

fn other_base(rng: &mut StdRng, base: u8) -> u8 {
    let alternatives: Vec<u8> = BASES.iter().copied().filter(|&b| b != base).collect();
    alternatives[rng.gen_range(0..alternatives.len())]
}

impl VariantSet {
    /// The variant starting at `position`, if the simulation places one there.
    /// `call_sets` restricts the calls to the given call set local ids.
    pub fn variant_at(
        &self,
        reference_name: &str,
        position: u64,
        call_sets: Option<&HashSet<String>>,
    ) -> Option<types::Variant> {
        let mut rng = position_rng(self.seed, reference_name, position);
        if rng.r#gen::<f64>() >= self.density {
            return None;
        }
        let id = self
            .id
            .child(ResourceKind::Variant, &[reference_name, position.to_string().as_str()])
            .ok()?;

        let reference_base = BASES[rng.gen_range(0..BASES.len())];
        let alternate_base = other_base(&mut rng, reference_base);

        // Genotypes are drawn for every call set so that filtering never
        // changes the calls that remain.
        let mut calls = Vec::new();
        for call_set in &self.call_sets {
            let genotype = vec![rng.gen_range(0..=1), rng.gen_range(0..=1)];
            let likelihood = -f64::from(rng.gen_range(0..1000i32)) / 100.0;
            if call_sets.is_none_or(|keep| keep.contains(call_set.id.local_id())) {
                calls.push(types::Call {
                    call_set_id: call_set.id.to_string(),
                    call_set_name: call_set.id.local_id().to_string(),
                    genotype,
                    genotype_likelihood: vec![likelihood],
                });
            }
        }

        Some(types::Variant {
            id: id.to_string(),
            variant_set_id: self.id.to_string(),
            reference_name: reference_name.to_string(),
            start: position as i64,
            end: position as i64 + 1,
            reference_bases: char::from(reference_base).to_string(),
            alternate_bases: vec![char::from(alternate_base).to_string()],
            calls,
        })
    }

    /// Variants starting in `[start, end)`, in position order.
    pub fn variants<'a>(
        &'a self,
        reference_name: &'a str,
        start: u64,
        end: u64,
        call_sets: Option<&'a HashSet<String>>,
    ) -> VariantCandidates<'a> {
        VariantCandidates {
            variant_set: self,
            reference_name,
            start,
            end,
            call_sets,
        }
    }
}

/// Variants of one window, resumable at any position.
pub struct VariantCandidates<'a> {
    variant_set: &'a VariantSet,
    reference_name: &'a str,
    start: u64,
    end: u64,
    call_sets: Option<&'a HashSet<String>>,
}

impl<'a> CandidateSource for VariantCandidates<'a> {
    type Item = types::Variant;

    /// The cursor is the variant's start position.
    fn resume_at(self, offset: u64) -> impl Iterator<Item = (u64, Self::Item)> {
        let Self {
            variant_set,
            reference_name,
            start,
            end,
            call_sets,
        } = self;
        (offset.max(start)..end).filter_map(move |position| {
            variant_set
                .variant_at(reference_name, position, call_sets)
                .map(|variant| (position, variant))
        })
    }
}

impl VariantAnnotationSet {
    /// Annotation of the variant at `position`, if there is one.
    pub fn annotation_at(
        &self,
        variant_set: &VariantSet,
        reference_name: &str,
        position: u64,
    ) -> Option<types::VariantAnnotation> {
        let variant = variant_set.variant_at(reference_name, position, Some(&HashSet::new()))?;
        let id = self
            .id
            .child(
                ResourceKind::VariantAnnotation,
                &[reference_name, position.to_string().as_str()],
            )
            .ok()?;

        let mut rng = position_rng(self.seed, reference_name, position);
        let count = rng.gen_range(1..=2);
        let alternate_bases = variant.alternate_bases.first().cloned().unwrap_or_default();
        let transcript_effects = (0..count)
            .map(|i| {
                // The leading term cycles with position so every term occurs
                // in any window of a few consecutive variants.
                let term_index = if i == 0 {
                    (position % EFFECT_TERMS.len() as u64) as usize
                } else {
                    rng.gen_range(0..EFFECT_TERMS.len())
                };
                let (term_id, term) = EFFECT_TERMS[term_index];
                TranscriptEffect {
                    id: format!("{}.{i}", id),
                    feature_id: format!("transcript{}", rng.gen_range(0..100)),
                    alternate_bases: alternate_bases.clone(),
                    effects: vec![OntologyTerm {
                        id: term_id.to_string(),
                        term: term.to_string(),
                    }],
                }
            })
            .collect();

        Some(types::VariantAnnotation {
            id: id.to_string(),
            variant_id: variant.id,
            variant_annotation_set_id: self.id.to_string(),
            transcript_effects,
        })
    }

    /// Annotations of variants starting in `[start, end)`. A non-empty
    /// `effects` set keeps only annotations carrying at least one of those
    /// ontology term ids.
    pub fn annotations<'a>(
        &'a self,
        variant_set: &'a VariantSet,
        reference_name: &'a str,
        start: u64,
        end: u64,
        effects: &'a HashSet<String>,
    ) -> AnnotationCandidates<'a> {
        AnnotationCandidates {
            annotation_set: self,
            variant_set,
            reference_name,
            start,
            end,
            effects,
        }
    }
}

/// Annotations of one window, resumable at any position.
pub struct AnnotationCandidates<'a> {
    annotation_set: &'a VariantAnnotationSet,
    variant_set: &'a VariantSet,
    reference_name: &'a str,
    start: u64,
    end: u64,
    effects: &'a HashSet<String>,
}

impl<'a> CandidateSource for AnnotationCandidates<'a> {
    type Item = types::VariantAnnotation;

    /// The cursor is the annotated variant's start position.
    fn resume_at(self, offset: u64) -> impl Iterator<Item = (u64, Self::Item)> {
        let Self {
            annotation_set,
            variant_set,
            reference_name,
            start,
            end,
            effects,
        } = self;
        (offset.max(start)..end)
            .filter_map(move |position| {
                annotation_set
                    .annotation_at(variant_set, reference_name, position)
                    .map(|annotation| (position, annotation))
            })
            .filter(move |(_, annotation)| {
                effects.is_empty()
                    || annotation
                        .transcript_effects
                        .iter()
                        .flat_map(|effect| &effect.effects)
                        .any(|term| effects.contains(&term.id))
            })
    }
}
