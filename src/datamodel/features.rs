use rand::Rng;
use std::ops::Range;

use super::FeatureSet;
use super::parse_position;
use super::variants::position_rng;
use crate::ids::ResourceKind;
use crate::paging::CandidateSource;
use crate::types::{self, OntologyTerm};

/// The only reference simulated features are placed on.
pub const FEATURE_REFERENCE: &str = "chr1";

/// One gene (with one exon) per locus; locus `k` starts at `k * LOCUS_SPACING`.
const LOCUS_SPACING: u64 = 1000;

/// Loci are numbered `1..=LOCUS_COUNT`.
const LOCUS_COUNT: u64 = 1000;

const PARTS: [Part; 2] = [Part::Gene, Part::Exon];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Gene,
    Exon,
}

impl Part {
    fn prefix(&self) -> &'static str {
        match self {
            Part::Gene => "gene",
            Part::Exon => "exon",
        }
    }

    fn term(&self) -> OntologyTerm {
        let (id, term) = match self {
            Part::Gene => ("SO:0000704", "gene"),
            Part::Exon => ("SO:0000147", "exon"),
        };
        OntologyTerm {
            id: id.to_string(),
            term: term.to_string(),
        }
    }
}

impl FeatureSet {
    fn locus_bounds(&self, locus: u64) -> (u64, u64) {
        let mut rng = position_rng(self.seed, FEATURE_REFERENCE, locus);
        let start = locus * LOCUS_SPACING;
        (start, start + rng.gen_range(200..800))
    }

    fn feature(&self, locus: u64, part: Part) -> Option<types::Feature> {
        if locus == 0 || locus > LOCUS_COUNT {
            return None;
        }
        let key = |part: Part| format!("{}.{locus}", part.prefix());
        let id_of = |part: Part| {
            self.id
                .child(ResourceKind::Feature, &[key(part).as_str()])
                .map(|id| id.to_string())
        };

        let (gene_start, gene_end) = self.locus_bounds(locus);
        let (start, end, parent_id, child_ids) = match part {
            Part::Gene => (gene_start, gene_end, String::new(), vec![id_of(Part::Exon).ok()?]),
            Part::Exon => (gene_start + 50, gene_start + 150, id_of(Part::Gene).ok()?, Vec::new()),
        };

        Some(types::Feature {
            id: id_of(part).ok()?,
            parent_id,
            child_ids,
            feature_set_id: self.id.to_string(),
            reference_name: FEATURE_REFERENCE.to_string(),
            start: start as i64,
            end: end as i64,
            feature_type: part.term(),
        })
    }

    /// Looks a feature up by its local key (`gene.<k>` or `exon.<k>`).
    pub fn feature_by_key(&self, key: &str) -> Option<types::Feature> {
        let (prefix, locus) = key.split_once('.')?;
        let part = PARTS
            .into_iter()
            .find(|p| p.prefix() == prefix)?;
        self.feature(parse_position(locus)?, part)
    }

    /// Features overlapping `[start, end)` on `reference_name`, gene before
    /// exon, in locus order. A `parent_id` keeps only that feature's children.
    pub fn features<'a>(
        &'a self,
        reference_name: &str,
        start: u64,
        end: u64,
        parent_id: Option<&'a str>,
    ) -> FeatureCandidates<'a> {
        let loci = if reference_name == FEATURE_REFERENCE && start < end {
            (start / LOCUS_SPACING).max(1)..((end - 1) / LOCUS_SPACING + 1).min(LOCUS_COUNT + 1)
        } else {
            0..0
        };
        FeatureCandidates {
            feature_set: self,
            loci,
            start,
            end,
            parent_id,
        }
    }
}

/// Features of one window, resumable at any locus part.
pub struct FeatureCandidates<'a> {
    feature_set: &'a FeatureSet,
    loci: Range<u64>,
    start: u64,
    end: u64,
    parent_id: Option<&'a str>,
}

impl<'a> CandidateSource for FeatureCandidates<'a> {
    type Item = types::Feature;

    /// The cursor of part `p` of locus `k` is `2k + p`.
    fn resume_at(self, offset: u64) -> impl Iterator<Item = (u64, Self::Item)> {
        let Self {
            feature_set,
            loci,
            start,
            end,
            parent_id,
        } = self;
        let width = PARTS.len() as u64;
        (offset.max(loci.start * width)..loci.end * width)
            .filter_map(move |cursor| {
                let part = PARTS[(cursor % width) as usize];
                feature_set
                    .feature(cursor / width, part)
                    .map(|feature| (cursor, feature))
            })
            .filter(move |(_, f)| (f.start as u64) < end && (f.end as u64) > start)
            .filter(move |(_, f)| parent_id.is_none_or(|parent| f.parent_id == parent))
    }
}
