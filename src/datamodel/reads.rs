use super::{ReadGroup, Reference};
use crate::ids::ResourceKind;
use crate::paging::CandidateSource;
use crate::types;

/// Bases per simulated read.
pub const READ_LENGTH: u64 = 10;

impl ReadGroup {
    /// Spacing between consecutive alignments on `reference`.
    fn stride(&self, reference: &Reference) -> u64 {
        (reference.length() / self.alignments_per_reference.max(1)).max(1)
    }

    /// Number of alignments this group has on `reference`.
    pub fn alignment_count(&self, reference: &Reference) -> u64 {
        self.alignments_per_reference.min(reference.length())
    }

    /// Indexes of alignments whose position falls in `[start, end)`.
    pub fn alignment_span(&self, reference: &Reference, start: u64, end: u64) -> (u64, u64) {
        let stride = self.stride(reference);
        let count = self.alignment_count(reference);
        let first = start.div_ceil(stride).min(count);
        let last = end.div_ceil(stride).min(count);
        (first, last.max(first))
    }

    pub fn alignment(&self, reference: &Reference, index: u64) -> Option<types::ReadAlignment> {
        let position = index * self.stride(reference);
        if index >= self.alignment_count(reference) || position >= reference.length() {
            return None;
        }
        let key = format!("{}.{index}", reference.name());
        let id = self.id.child(ResourceKind::ReadAlignment, &[key.as_str()]).ok()?;

        let from = position as usize;
        let to = (position + READ_LENGTH).min(reference.length()) as usize;
        Some(types::ReadAlignment {
            id: id.to_string(),
            read_group_id: self.id.to_string(),
            fragment_name: format!("{}:{key}", self.id.local_id()),
            reference_name: reference.name().to_string(),
            position: position as i64,
            aligned_sequence: String::from_utf8_lossy(&reference.bases[from..to]).into_owned(),
        })
    }
}

/// Alignments of several read groups on one reference, group by group.
///
/// Resuming at an offset seeks directly to the right group and index
/// instead of regenerating earlier alignments.
pub struct ReadCandidates<'a> {
    reference: &'a Reference,
    spans: Vec<(&'a ReadGroup, u64, u64)>,
}

impl<'a> ReadCandidates<'a> {
    pub fn new(groups: &[&'a ReadGroup], reference: &'a Reference, start: u64, end: u64) -> Self {
        let spans = groups
            .iter()
            .map(|&group| {
                let (first, last) = group.alignment_span(reference, start, end);
                (group, first, last)
            })
            .collect();
        Self { reference, spans }
    }

    pub fn len(&self) -> u64 {
        self.spans.iter().map(|(_, first, last)| last - first).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> CandidateSource for ReadCandidates<'a> {
    type Item = types::ReadAlignment;

    /// The cursor is the alignment's rank across all groups' spans.
    fn resume_at(self, offset: u64) -> impl Iterator<Item = (u64, Self::Item)> {
        let reference = self.reference;
        let mut base = 0;
        self.spans
            .into_iter()
            .flat_map(move |(group, first, last)| {
                let span_base = base;
                base += last - first;
                let skipped = offset.saturating_sub(span_base).min(last - first);
                (first + skipped..last).map(move |index| (span_base + index - first, group, index))
            })
            .filter_map(move |(cursor, group, index)| {
                group.alignment(reference, index).map(|alignment| (cursor, alignment))
            })
    }
}
