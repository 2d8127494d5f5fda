use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gene_set::{GeneSet, Thresholds, TrnaCounts, TrnaFrequency};
use crate::genetic_code::GeneticCode;
use crate::stats::spearman;
use crate::UsageError;

/// Adaptation score against the host tRNA pool, and optionally against the
/// pooled virus + host tRNA pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptationScores {
    pub host_trna: f64,
    pub total_trna: Option<f64>,
}

/// tRNA adaptation indices for a virus–host pair: Spearman rank correlation
/// between the virus's usage frequencies and the host's (or the pooled
/// virocell's) tRNA gene-copy frequencies.
///
/// Construction triggers the lazy frequency pipelines of both gene sets and
/// snapshots the profiles it needs; keys are aligned in sorted order
/// throughout so results are reproducible bit for bit.
#[derive(Debug, Clone)]
pub struct AdaptationIndex {
    virus_aa_frequency: BTreeMap<char, f64>,
    virus_codon_frequency: BTreeMap<String, f64>,
    virus_trna: TrnaCounts,
    host_trna: TrnaCounts,
    host_trna_frequency: TrnaFrequency,
}

impl AdaptationIndex {
    pub fn new(
        virus: &GeneSet,
        host: &GeneSet,
        thresholds: Thresholds,
    ) -> Result<Self, UsageError> {
        virus.trna_frequency();
        host.trna_frequency();
        Ok(AdaptationIndex {
            virus_aa_frequency: virus.amino_acid_frequency(thresholds)?.clone(),
            virus_codon_frequency: virus.codon_frequency(thresholds)?.clone(),
            virus_trna: virus.trna_counts().clone(),
            host_trna: host.trna_counts().clone(),
            host_trna_frequency: host.trna_frequency().clone(),
        })
    }

    /// tRNA amino-acid adaptation index: virus amino-acid frequency against
    /// per-amino-acid tRNA frequency, over all 20 amino acids.
    pub fn taai(&self, include_virus_trna: bool) -> AdaptationScores {
        let virus: Vec<f64> = self.virus_aa_frequency.values().copied().collect();
        let host: Vec<f64> = self
            .virus_aa_frequency
            .keys()
            .map(|aa| {
                self.host_trna_frequency
                    .by_amino_acid
                    .get(aa)
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();
        let host_trna = spearman(&virus, &host);

        let total_trna = include_virus_trna.then(|| {
            let pooled = pool(&self.host_trna.by_amino_acid, &self.virus_trna.by_amino_acid);
            let pooled_values: Vec<f64> = self
                .virus_aa_frequency
                .keys()
                .map(|aa| pooled.get(aa).copied().unwrap_or(0.0))
                .collect();
            spearman(&virus, &pooled_values)
        });

        AdaptationScores { host_trna, total_trna }
    }

    /// tRNA codon adaptation index: virus codon frequency against per-codon
    /// tRNA frequency. Stop codons are always excluded (no tRNA recognizes a
    /// stop); non-degenerate codons can additionally be excluded since they
    /// have no synonym to prefer.
    pub fn tcai(&self, skip_non_degenerate: bool, include_virus_trna: bool) -> AdaptationScores {
        let code = GeneticCode::standard();
        let keys: Vec<&String> = self
            .virus_codon_frequency
            .keys()
            .filter(|codon| !code.is_stop(codon))
            .filter(|codon| !(skip_non_degenerate && code.is_non_degenerate(codon)))
            .collect();

        let virus: Vec<f64> = keys
            .iter()
            .map(|&codon| self.virus_codon_frequency[codon])
            .collect();
        let host: Vec<f64> = keys
            .iter()
            .map(|&codon| {
                self.host_trna_frequency
                    .by_codon
                    .get(codon)
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();
        let host_trna = spearman(&virus, &host);

        let total_trna = include_virus_trna.then(|| {
            // Pool over the aligned key set only, so the excluded codons do
            // not inflate the normalizing total.
            let host_subset: BTreeMap<String, u64> = keys
                .iter()
                .map(|&codon| {
                    (
                        codon.clone(),
                        self.host_trna.by_codon.get(codon).copied().unwrap_or(0),
                    )
                })
                .collect();
            let virus_subset: BTreeMap<String, u64> = keys
                .iter()
                .map(|&codon| {
                    (
                        codon.clone(),
                        self.virus_trna.by_codon.get(codon).copied().unwrap_or(0),
                    )
                })
                .collect();
            let pooled = pool(&host_subset, &virus_subset);
            let pooled_values: Vec<f64> = keys
                .iter()
                .map(|&codon| pooled.get(codon).copied().unwrap_or(0.0))
                .collect();
            spearman(&virus, &pooled_values)
        });

        AdaptationScores { host_trna, total_trna }
    }
}

/// Sum two count mappings over the union of their keys and normalize by the
/// pooled total. All-zero when the pooled total is zero.
fn pool<K: Ord + Clone>(host: &BTreeMap<K, u64>, virus: &BTreeMap<K, u64>) -> BTreeMap<K, f64> {
    let mut pooled: BTreeMap<K, u64> = host.clone();
    for (key, n) in virus {
        *pooled.entry(key.clone()).or_insert(0) += n;
    }
    let total: u64 = pooled.values().sum();
    pooled
        .into_iter()
        .map(|(key, n)| {
            let frequency = if total == 0 {
                0.0
            } else {
                n as f64 / total as f64
            };
            (key, frequency)
        })
        .collect()
}
