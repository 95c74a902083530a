//! GA4GH wire types: resource objects plus search request/response pairs.

use serde::{Deserialize, Serialize};

// Resources

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSet {
    pub id: String,
    pub name: String,
    pub md5checksum: String,
    pub ncbi_taxon_id: i32,
    pub description: String,
    pub assembly_id: String,
    pub source_uri: String,
    pub source_accessions: Vec<String>,
    pub is_derived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub name: String,
    pub length: u64,
    pub md5checksum: String,
    pub ncbi_taxon_id: i32,
    pub source_uri: String,
    pub source_accessions: Vec<String>,
    pub is_derived: bool,
    pub source_divergence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    pub id: String,
    pub name: String,
    pub dataset_id: String,
    pub reference_set_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSet {
    pub id: String,
    pub name: String,
    pub sample_id: String,
    pub variant_set_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub call_set_id: String,
    pub call_set_name: String,
    pub genotype: Vec<i32>,
    pub genotype_likelihood: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub variant_set_id: String,
    pub reference_name: String,
    pub start: i64,
    pub end: i64,
    pub reference_bases: String,
    pub alternate_bases: Vec<String>,
    pub calls: Vec<Call>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAnnotationSet {
    pub id: String,
    pub name: String,
    pub variant_set_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyTerm {
    pub id: String,
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEffect {
    pub id: String,
    pub feature_id: String,
    pub alternate_bases: String,
    pub effects: Vec<OntologyTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAnnotation {
    pub id: String,
    pub variant_id: String,
    pub variant_annotation_set_id: String,
    pub transcript_effects: Vec<TranscriptEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadGroup {
    pub id: String,
    pub name: String,
    pub dataset_id: String,
    pub sample_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadGroupSet {
    pub id: String,
    pub name: String,
    pub dataset_id: String,
    pub reference_set_id: String,
    pub read_groups: Vec<ReadGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadAlignment {
    pub id: String,
    pub read_group_id: String,
    pub fragment_name: String,
    pub reference_name: String,
    pub position: i64,
    pub aligned_sequence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub id: String,
    pub name: String,
    pub dataset_id: String,
    pub reference_set_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub parent_id: String,
    pub child_ids: Vec<String>,
    pub feature_set_id: String,
    pub reference_name: String,
    pub start: i64,
    pub end: i64,
    pub feature_type: OntologyTerm,
}

// Search requests. Every field is optional on the wire; an absent page size
// means the server default.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDatasetsRequest {
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchReferenceSetsRequest {
    pub md5checksum: String,
    pub accession: String,
    pub assembly_id: String,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchReferencesRequest {
    pub reference_set_id: String,
    pub md5checksum: String,
    pub accession: String,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchVariantSetsRequest {
    pub dataset_id: String,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCallSetsRequest {
    pub variant_set_id: String,
    pub name: String,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchVariantsRequest {
    pub variant_set_id: String,
    pub reference_name: String,
    pub start: i64,
    pub end: i64,
    pub call_set_ids: Vec<String>,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchVariantAnnotationSetsRequest {
    pub variant_set_id: String,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchVariantAnnotationsRequest {
    pub variant_annotation_set_id: String,
    pub reference_name: String,
    pub start: i64,
    pub end: i64,
    pub effects: Vec<OntologyTerm>,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchReadGroupSetsRequest {
    pub dataset_id: String,
    pub name: String,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchReadsRequest {
    pub read_group_ids: Vec<String>,
    pub reference_id: String,
    pub start: i64,
    pub end: Option<i64>,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFeatureSetsRequest {
    pub dataset_id: String,
    pub page_size: Option<i64>,
    pub page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFeaturesRequest {
    pub feature_set_id: String,
    pub reference_name: String,
    pub start: i64,
    pub end: i64,
    pub parent_id: String,
    pub page_size: Option<i64>,
    pub page_token: String,
}

/// Query string of `GET /references/:id/bases`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListReferenceBasesRequest {
    pub start: i64,
    pub end: Option<i64>,
    pub page_token: String,
}

// Search responses

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDatasetsResponse {
    pub datasets: Vec<Dataset>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReferenceSetsResponse {
    pub reference_sets: Vec<ReferenceSet>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReferencesResponse {
    pub references: Vec<Reference>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchVariantSetsResponse {
    pub variant_sets: Vec<VariantSet>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCallSetsResponse {
    pub call_sets: Vec<CallSet>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchVariantsResponse {
    pub variants: Vec<Variant>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchVariantAnnotationSetsResponse {
    pub variant_annotation_sets: Vec<VariantAnnotationSet>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchVariantAnnotationsResponse {
    pub variant_annotations: Vec<VariantAnnotation>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReadGroupSetsResponse {
    pub read_group_sets: Vec<ReadGroupSet>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReadsResponse {
    pub alignments: Vec<ReadAlignment>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFeatureSetsResponse {
    pub feature_sets: Vec<FeatureSet>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFeaturesResponse {
    pub features: Vec<Feature>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListReferenceBasesResponse {
    pub sequence: String,
    pub offset: u64,
    pub next_page_token: String,
}

/// Service info response (GA4GH service-info spec)
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub r#type: ServiceType,
    pub description: Option<String>,
    pub organization: Organization,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceType {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct Organization {
    pub name: String,
    pub url: String,
}
