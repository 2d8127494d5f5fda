use std::cell::OnceCell;
use std::collections::BTreeMap;

use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::gene::Gene;
use crate::genetic_code::GeneticCode;
use crate::nucleotide::reverse_complement;
use crate::UsageError;

/// Bakta-style tRNA gene product, e.g. `tRNA-Ala(agc)`. Anchored: the
/// annotation must start with the pattern.
const TRNA_PRODUCT_PATTERN: &str = r"^tRNA-(\w{3})\((\w{3})\)";

/// Raw (sequence, id, product) triple as produced by an annotated-genes
/// reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneRecord {
    pub seq: String,
    pub id: String,
    pub product: String,
}

/// Imprecision tolerances for codon aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Fraction of imprecise codons tolerated in a single gene before it is
    /// excluded from the aggregate.
    pub imprecise: f64,
    /// Fraction of genes that may be excluded for imprecision before the
    /// whole aggregation fails.
    pub skipped_genes: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            imprecise: 0.0,
            skipped_genes: 0.5,
        }
    }
}

/// Aggregate codon counts across a gene set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodonAggregate {
    pub counts: BTreeMap<String, u64>,
    pub imprecise: u64,
    /// Ids of genes excluded because their imprecise fraction exceeded the
    /// threshold.
    pub skipped_imprecise: Vec<String>,
}

/// tRNA gene-copy counts by amino acid and by the codon each tRNA recognizes
/// (reverse complement of its anticodon).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrnaCounts {
    pub by_amino_acid: BTreeMap<char, u64>,
    pub by_codon: BTreeMap<String, u64>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrnaFrequency {
    pub by_amino_acid: BTreeMap<char, f64>,
    pub by_codon: BTreeMap<String, f64>,
}

/// All genes of one organism, with lazily computed usage aggregates.
///
/// Each aggregate is computed at most once and cached; later calls return the
/// cached value regardless of the thresholds passed. Frequencies over a
/// zero-count total stay at their initialized zero state.
#[derive(Debug)]
pub struct GeneSet {
    id: String,
    genes: Vec<Gene>,
    skipped_genes: Vec<String>,
    n_records: usize,
    codon: OnceCell<CodonAggregate>,
    codon_frq: OnceCell<BTreeMap<String, f64>>,
    amino_acid: OnceCell<BTreeMap<char, u64>>,
    amino_acid_frq: OnceCell<BTreeMap<char, f64>>,
    rscu: OnceCell<BTreeMap<String, f64>>,
    trna: OnceCell<TrnaCounts>,
    trna_frq: OnceCell<TrnaFrequency>,
}

impl GeneSet {
    /// Build a gene set from raw records. Records whose sequence length is
    /// not a multiple of the codon length are routed to the skipped list
    /// instead of failing the whole set.
    pub fn from_records(
        id: impl Into<String>,
        records: Vec<GeneRecord>,
    ) -> Result<Self, UsageError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UsageError::InvalidInput(
                "gene set source is not provided".to_string(),
            ));
        }
        if records.is_empty() {
            return Err(UsageError::InvalidInput(format!(
                "gene set source {id:?} contains no gene records"
            )));
        }

        let n_records = records.len();
        let mut genes = Vec::with_capacity(n_records);
        let mut skipped_genes = Vec::new();
        for record in records {
            match Gene::new(record.seq, record.id, record.product) {
                Ok(gene) => genes.push(gene),
                Err(UsageError::LengthMismatch { id, .. }) => skipped_genes.push(id),
                Err(other) => return Err(other),
            }
        }

        info!(
            "{}: skipped {}/{} genes ({:.1}%) whose length is not a multiple of the codon length",
            id,
            skipped_genes.len(),
            n_records,
            skipped_genes.len() as f64 / n_records as f64 * 100.0,
        );

        Ok(GeneSet {
            id,
            genes,
            skipped_genes,
            n_records,
            codon: OnceCell::new(),
            codon_frq: OnceCell::new(),
            amino_acid: OnceCell::new(),
            amino_acid_frq: OnceCell::new(),
            rscu: OnceCell::new(),
            trna: OnceCell::new(),
            trna_frq: OnceCell::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Ids of records rejected at construction for length mismatch.
    pub fn skipped_genes(&self) -> &[String] {
        &self.skipped_genes
    }

    /// Fraction of input records rejected at construction. Informational,
    /// never fatal.
    pub fn skipped_fraction(&self) -> f64 {
        self.skipped_genes.len() as f64 / self.n_records as f64
    }

    /// Aggregate codon counts across all genes whose imprecise fraction is
    /// within `thresholds.imprecise`. Fails with `TooManySkippedGenes` when
    /// the excluded fraction exceeds `thresholds.skipped_genes`.
    pub fn codon_counts(&self, thresholds: Thresholds) -> Result<&CodonAggregate, UsageError> {
        if let Some(aggregate) = self.codon.get() {
            return Ok(aggregate);
        }

        let code = GeneticCode::standard();
        let mut counts: BTreeMap<String, u64> =
            code.codons().iter().map(|c| (c.to_string(), 0)).collect();
        let mut imprecise = 0u64;
        let mut skipped_imprecise = Vec::new();

        for gene in &self.genes {
            let per_gene = gene.codon_counts();
            imprecise += per_gene.imprecise;
            if per_gene.percent_imprecise <= thresholds.imprecise {
                for (codon, n) in &per_gene.counts {
                    if let Some(slot) = counts.get_mut(codon) {
                        *slot += n;
                    }
                }
            } else {
                skipped_imprecise.push(gene.id().to_string());
            }
        }

        if !self.genes.is_empty()
            && skipped_imprecise.len() as f64 / self.genes.len() as f64 > thresholds.skipped_genes
        {
            return Err(UsageError::TooManySkippedGenes {
                skipped: skipped_imprecise.len(),
                total: self.genes.len(),
                threshold: thresholds.skipped_genes,
            });
        }
        if !skipped_imprecise.is_empty() {
            info!(
                "{}: excluded {} genes with too many imprecise codons",
                self.id,
                skipped_imprecise.len(),
            );
        }

        Ok(self.codon.get_or_init(|| CodonAggregate {
            counts,
            imprecise,
            skipped_imprecise,
        }))
    }

    /// Codon counts normalized to sum 1. All-zero when the aggregate total is
    /// zero.
    pub fn codon_frequency(
        &self,
        thresholds: Thresholds,
    ) -> Result<&BTreeMap<String, f64>, UsageError> {
        if let Some(frequency) = self.codon_frq.get() {
            return Ok(frequency);
        }
        let counts = &self.codon_counts(thresholds)?.counts;
        let total: u64 = counts.values().sum();
        let mut frequency: BTreeMap<String, f64> =
            counts.keys().map(|codon| (codon.clone(), 0.0)).collect();
        if total > 0 {
            for (codon, &n) in counts {
                frequency.insert(codon.clone(), n as f64 / total as f64);
            }
        }
        Ok(self.codon_frq.get_or_init(|| frequency))
    }

    /// Aggregate codon counts re-mapped per amino acid, stop codons excluded.
    pub fn amino_acid_counts(
        &self,
        thresholds: Thresholds,
    ) -> Result<&BTreeMap<char, u64>, UsageError> {
        if let Some(counts) = self.amino_acid.get() {
            return Ok(counts);
        }
        let code = GeneticCode::standard();
        let codon_counts = &self.codon_counts(thresholds)?.counts;
        let mut counts: BTreeMap<char, u64> =
            code.amino_acids().iter().map(|&aa| (aa, 0)).collect();
        for (codon, &n) in codon_counts {
            if code.is_stop(codon) {
                continue;
            }
            if let Some(aa) = code.amino_acid(codon) {
                if let Some(slot) = counts.get_mut(&aa) {
                    *slot += n;
                }
            }
        }
        Ok(self.amino_acid.get_or_init(|| counts))
    }

    /// Amino-acid counts normalized to sum 1. All-zero when the total is
    /// zero.
    pub fn amino_acid_frequency(
        &self,
        thresholds: Thresholds,
    ) -> Result<&BTreeMap<char, f64>, UsageError> {
        if let Some(frequency) = self.amino_acid_frq.get() {
            return Ok(frequency);
        }
        let counts = self.amino_acid_counts(thresholds)?;
        let total: u64 = counts.values().sum();
        let mut frequency: BTreeMap<char, f64> =
            counts.keys().map(|&aa| (aa, 0.0)).collect();
        if total > 0 {
            for (&aa, &n) in counts {
                frequency.insert(aa, n as f64 / total as f64);
            }
        }
        Ok(self.amino_acid_frq.get_or_init(|| frequency))
    }

    /// Relative synonymous codon usage: observed count divided by the count
    /// expected if all synonymous codons were used equally. Codons with a
    /// zero count keep an RSCU of 0.0.
    pub fn rscu(&self, thresholds: Thresholds) -> Result<&BTreeMap<String, f64>, UsageError> {
        if let Some(rscu) = self.rscu.get() {
            return Ok(rscu);
        }
        let code = GeneticCode::standard();
        let counts = &self.codon_counts(thresholds)?.counts;
        let mut rscu: BTreeMap<String, f64> =
            counts.keys().map(|codon| (codon.clone(), 0.0)).collect();
        for (codon, &count) in counts {
            if count == 0 {
                continue;
            }
            let aa = match code.amino_acid(codon) {
                Some(aa) => aa,
                None => continue,
            };
            let synonyms = code.synonyms(aa);
            let synonym_total: u64 = synonyms
                .iter()
                .map(|&syn| counts.get(syn).copied().unwrap_or(0))
                .sum();
            let expected = synonym_total as f64 / synonyms.len() as f64;
            rscu.insert(codon.clone(), count as f64 / expected);
        }
        Ok(self.rscu.get_or_init(|| rscu))
    }

    /// tRNA gene-copy counts parsed from product annotations. Products that
    /// do not match the `tRNA-Xxx(NNN)` pattern are ignored; matches naming
    /// an unknown amino acid or whose anticodon complements to a stop codon
    /// are skipped with a warning. Zero matches is valid (viral genomes
    /// typically encode no tRNAs).
    pub fn trna_counts(&self) -> &TrnaCounts {
        self.trna.get_or_init(|| {
            let code = GeneticCode::standard();
            let mut by_amino_acid: BTreeMap<char, u64> =
                code.amino_acids().iter().map(|&aa| (aa, 0)).collect();
            let mut by_codon: BTreeMap<String, u64> = code
                .codons()
                .iter()
                .filter(|&&codon| !code.is_stop(codon))
                .map(|&codon| (codon.to_string(), 0))
                .collect();

            let pattern = Regex::new(TRNA_PRODUCT_PATTERN).expect("static pattern compiles");
            for gene in &self.genes {
                let captures = match pattern.captures(gene.product()) {
                    Some(captures) => captures,
                    None => continue,
                };
                let amino_acid = match code.one_letter(&captures[1]) {
                    Some(aa) => aa,
                    None => {
                        warn!(
                            "{}: unknown amino acid in tRNA product {:?}, ignored",
                            self.id,
                            gene.product(),
                        );
                        continue;
                    }
                };
                let anticodon = captures[2].to_ascii_uppercase();
                let codon = reverse_complement(&anticodon);
                match by_codon.get_mut(&codon) {
                    Some(slot) => {
                        *slot += 1;
                        if let Some(aa_slot) = by_amino_acid.get_mut(&amino_acid) {
                            *aa_slot += 1;
                        }
                    }
                    None => warn!(
                        "{}: tRNA anticodon {} maps to non-codon {}, ignored",
                        self.id, anticodon, codon,
                    ),
                }
            }

            let total: u64 = by_codon.values().sum();
            if total == 0 {
                info!("{}: no tRNA genes found", self.id);
            }
            TrnaCounts {
                by_amino_acid,
                by_codon,
                total,
            }
        })
    }

    /// tRNA counts normalized by the grand tRNA total. All-zero when the set
    /// has no tRNA genes.
    pub fn trna_frequency(&self) -> &TrnaFrequency {
        self.trna_frq.get_or_init(|| {
            let counts = self.trna_counts();
            let mut by_amino_acid: BTreeMap<char, f64> =
                counts.by_amino_acid.keys().map(|&aa| (aa, 0.0)).collect();
            let mut by_codon: BTreeMap<String, f64> =
                counts.by_codon.keys().map(|codon| (codon.clone(), 0.0)).collect();
            if counts.total > 0 {
                for (&aa, &n) in &counts.by_amino_acid {
                    by_amino_acid.insert(aa, n as f64 / counts.total as f64);
                }
                for (codon, &n) in &counts.by_codon {
                    by_codon.insert(codon.clone(), n as f64 / counts.total as f64);
                }
            }
            TrnaFrequency {
                by_amino_acid,
                by_codon,
            }
        })
    }
}
