pub mod adaptation;
pub mod comparison;
pub mod gene;
pub mod gene_set;
pub mod genetic_code;
pub mod nucleotide;
pub mod stats;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("gene {id:?}: length {length} is not a multiple of codon length {codon_length}")]
    LengthMismatch {
        id: String,
        length: usize,
        codon_length: usize,
    },
    #[error("invalid gene set input: {0}")]
    InvalidInput(String),
    #[error("too many skipped genes: {skipped} of {total} exceeded the imprecision threshold (limit {threshold})")]
    TooManySkippedGenes {
        skipped: usize,
        total: usize,
        threshold: f64,
    },
}

pub use adaptation::{AdaptationIndex, AdaptationScores};
pub use comparison::{LineFit, UsageComparison};
pub use gene::{CodonCounts, GcByPosition, Gene, CODON_LENGTH};
pub use gene_set::{CodonAggregate, GeneRecord, GeneSet, Thresholds, TrnaCounts, TrnaFrequency};
pub use genetic_code::{GeneticCode, STOP};
pub use nucleotide::{complement, reverse_complement};
