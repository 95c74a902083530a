use bytes::Bytes;
use noodles::fasta;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{Reference, ReferenceSet, checksum};
use crate::ids::{CompoundId, ResourceKind};
use crate::{Error, Result};

/// Loads every record of a FASTA file into one reference set named after the
/// file stem.
///
/// Bases are held in memory; this is meant for reference panels of modest
/// size, not whole genomes.
pub fn load_reference_set(path: &Path) -> Result<ReferenceSet> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.split('.').next().unwrap_or(n))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::Internal(format!("unusable FASTA path {:?}", path)))?;
    let id = CompoundId::root(ResourceKind::ReferenceSet, name)?;
    let source_uri = format!("file://{}", path.display());

    let mut reader = File::open(path)
        .map(BufReader::new)
        .map(fasta::io::Reader::new)?;

    let mut references = Vec::new();
    for result in reader.records() {
        let record = result?;
        let record_name = String::from_utf8_lossy(record.name()).into_owned();
        let bases: &[u8] = record.sequence().as_ref();
        let reference_id = id
            .child(ResourceKind::Reference, &[record_name.as_str()])
            .map_err(|_| {
                Error::Internal(format!(
                    "FASTA record name {record_name:?} cannot be used as an identifier"
                ))
            })?;
        tracing::debug!(name = %record_name, length = bases.len(), "loaded reference");
        references.push(Reference {
            id: reference_id,
            md5checksum: checksum(bases),
            ncbi_taxon_id: 0,
            source_uri: source_uri.clone(),
            source_accessions: Vec::new(),
            is_derived: false,
            source_divergence: 0.0,
            bases: Bytes::copy_from_slice(bases),
        });
    }

    if references.is_empty() {
        return Err(Error::Internal(format!(
            "FASTA file {:?} has no records",
            path
        )));
    }

    tracing::info!(path = ?path, references = references.len(), "loaded FASTA reference set");

    Ok(ReferenceSet {
        md5checksum: ReferenceSet::compute_checksum(&references),
        description: format!("Reference set loaded from {}", path.display()),
        ncbi_taxon_id: 0,
        assembly_id: name.to_string(),
        source_uri,
        source_accessions: Vec::new(),
        is_derived: false,
        references,
        id,
    })
}
