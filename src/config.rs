use clap::Parser;
use std::path::PathBuf;

use crate::datamodel::SimulationParams;

#[derive(Debug, Clone, Parser)]
#[command(name = "ga4ghr")]
#[command(about = "GA4GH genomics data-access API server")]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "GA4GH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "GA4GH_PORT", default_value = "8000")]
    pub port: u16,

    /// Enable CORS for all origins
    #[arg(long, env = "GA4GH_CORS", default_value = "true")]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Serialized size limit for one search page or bases chunk, in bytes
    #[arg(long, env = "GA4GH_MAX_RESPONSE_LENGTH", default_value = "1048576")]
    pub max_response_length: usize,

    /// Page size used when a search request leaves it unset
    #[arg(long, env = "GA4GH_DEFAULT_PAGE_SIZE", default_value = "100")]
    pub default_page_size: usize,

    /// FASTA file to serve as an additional reference set
    #[arg(long, env = "GA4GH_REFERENCE_FASTA")]
    pub reference_fasta: Option<PathBuf>,

    /// Seed of the simulated repository
    #[arg(long, env = "GA4GH_SIM_SEED", default_value = "1111")]
    pub sim_seed: u64,

    #[arg(long, env = "GA4GH_SIM_DATASETS", default_value = "2")]
    pub sim_datasets: usize,

    #[arg(long, env = "GA4GH_SIM_VARIANT_SETS", default_value = "4")]
    pub sim_variant_sets: usize,

    #[arg(long, env = "GA4GH_SIM_CALLS", default_value = "5")]
    pub sim_calls: usize,

    /// Probability that a position carries a variant
    #[arg(long, env = "GA4GH_SIM_VARIANT_DENSITY", default_value = "1.0")]
    pub sim_variant_density: f64,

    #[arg(long, env = "GA4GH_SIM_REFERENCE_SETS", default_value = "3")]
    pub sim_reference_sets: usize,

    #[arg(long, env = "GA4GH_SIM_REFERENCES_PER_SET", default_value = "4")]
    pub sim_references_per_set: usize,

    #[arg(long, env = "GA4GH_SIM_READ_GROUPS_PER_SET", default_value = "2")]
    pub sim_read_groups_per_set: usize,

    #[arg(long, env = "GA4GH_SIM_ALIGNMENTS_PER_READ_GROUP", default_value = "5")]
    pub sim_alignments_per_read_group: u64,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            seed: self.sim_seed,
            num_datasets: self.sim_datasets,
            num_variant_sets: self.sim_variant_sets,
            num_calls: self.sim_calls,
            variant_density: self.sim_variant_density,
            num_reference_sets: self.sim_reference_sets,
            num_references_per_reference_set: self.sim_references_per_set,
            num_read_groups_per_read_group_set: self.sim_read_groups_per_set,
            num_alignments_per_read_group: self.sim_alignments_per_read_group,
        }
    }
}
