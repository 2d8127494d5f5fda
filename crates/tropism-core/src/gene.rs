use std::cell::OnceCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::genetic_code::GeneticCode;
use crate::UsageError;

/// Number of bases per codon.
pub const CODON_LENGTH: usize = 3;

/// Codon counts of a single gene over the full 64-codon universe, together
/// with the count of imprecise codons (windows that are not one of the 64
/// codons, e.g. due to ambiguity bases).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodonCounts {
    pub counts: BTreeMap<String, u64>,
    pub imprecise: u64,
    pub percent_imprecise: f64,
}

/// GC content at each position within a codon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GcByPosition {
    pub gc1: f64,
    pub gc2: f64,
    pub gc3: f64,
}

/// A single coding sequence with lazily computed codon and amino-acid
/// statistics.
///
/// Construction validates divisibility of the sequence length by the codon
/// length; nothing else. Ambiguity characters are accepted and surface later
/// as imprecise codons.
#[derive(Debug)]
pub struct Gene {
    seq: String,
    codon_length: usize,
    n_codons: usize,
    id: String,
    product: String,
    codon: OnceCell<CodonCounts>,
    amino_acids: OnceCell<BTreeMap<char, u64>>,
    gc: OnceCell<GcByPosition>,
}

impl Gene {
    pub fn new(
        seq: impl Into<String>,
        id: impl Into<String>,
        product: impl Into<String>,
    ) -> Result<Self, UsageError> {
        Self::with_codon_length(seq, id, product, CODON_LENGTH)
    }

    pub fn with_codon_length(
        seq: impl Into<String>,
        id: impl Into<String>,
        product: impl Into<String>,
        codon_length: usize,
    ) -> Result<Self, UsageError> {
        let mut seq = seq.into();
        let id = id.into();
        if codon_length == 0 || seq.len() % codon_length != 0 {
            return Err(UsageError::LengthMismatch {
                id,
                length: seq.len(),
                codon_length,
            });
        }
        seq.make_ascii_uppercase();
        Ok(Gene {
            n_codons: seq.len() / codon_length,
            seq,
            codon_length,
            id,
            product: product.into(),
            codon: OnceCell::new(),
            amino_acids: OnceCell::new(),
            gc: OnceCell::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn seq(&self) -> &str {
        &self.seq
    }

    pub fn n_codons(&self) -> usize {
        self.n_codons
    }

    /// Count every non-overlapping codon window of the sequence. Windows that
    /// are not one of the 64 codons increment the imprecise counter instead.
    /// Computed once, cached.
    pub fn codon_counts(&self) -> &CodonCounts {
        self.codon.get_or_init(|| {
            let code = GeneticCode::standard();
            let mut counts: BTreeMap<String, u64> =
                code.codons().iter().map(|c| (c.to_string(), 0)).collect();
            let mut imprecise = 0u64;

            for chunk in self.seq.as_bytes().chunks(self.codon_length) {
                match std::str::from_utf8(chunk).ok().and_then(|c| counts.get_mut(c)) {
                    Some(n) => *n += 1,
                    None => imprecise += 1,
                }
            }

            let percent_imprecise = if self.n_codons == 0 {
                0.0
            } else {
                imprecise as f64 / self.n_codons as f64
            };
            CodonCounts {
                counts,
                imprecise,
                percent_imprecise,
            }
        })
    }

    /// Sum codon counts into their amino acids over the 20-key universe.
    /// Stop codons are dropped, not redistributed.
    pub fn amino_acid_counts(&self) -> &BTreeMap<char, u64> {
        self.amino_acids.get_or_init(|| {
            let code = GeneticCode::standard();
            let mut counts: BTreeMap<char, u64> =
                code.amino_acids().iter().map(|&aa| (aa, 0)).collect();
            for (codon, &n) in &self.codon_counts().counts {
                if n == 0 || code.is_stop(codon) {
                    continue;
                }
                if let Some(aa) = code.amino_acid(codon) {
                    if let Some(slot) = counts.get_mut(&aa) {
                        *slot += n;
                    }
                }
            }
            counts
        })
    }

    /// GC fraction at codon positions 1, 2 and 3 (window offsets 0, 1, 2),
    /// each normalized by the codon count. Zero for an empty sequence.
    pub fn gc_by_position(&self) -> GcByPosition {
        *self.gc.get_or_init(|| {
            let mut gc = [0u64; 3];
            for chunk in self.seq.as_bytes().chunks(self.codon_length) {
                for (offset, &base) in chunk.iter().take(3).enumerate() {
                    if base == b'G' || base == b'C' {
                        gc[offset] += 1;
                    }
                }
            }
            let norm = |n: u64| {
                if self.n_codons == 0 {
                    0.0
                } else {
                    n as f64 / self.n_codons as f64
                }
            };
            GcByPosition {
                gc1: norm(gc[0]),
                gc2: norm(gc[1]),
                gc3: norm(gc[2]),
            }
        })
    }
}
