use std::collections::HashMap;
use std::sync::OnceLock;

/// Marker for codons that terminate translation.
pub const STOP: char = '*';

const CODON_TABLE: [(&str, char); 64] = [
    ("TTT", 'F'), ("TTC", 'F'), ("TTA", 'L'), ("TTG", 'L'),
    ("CTT", 'L'), ("CTC", 'L'), ("CTA", 'L'), ("CTG", 'L'),
    ("ATT", 'I'), ("ATC", 'I'), ("ATA", 'I'), ("ATG", 'M'),
    ("GTT", 'V'), ("GTC", 'V'), ("GTA", 'V'), ("GTG", 'V'),
    ("TCT", 'S'), ("TCC", 'S'), ("TCA", 'S'), ("TCG", 'S'),
    ("CCT", 'P'), ("CCC", 'P'), ("CCA", 'P'), ("CCG", 'P'),
    ("ACT", 'T'), ("ACC", 'T'), ("ACA", 'T'), ("ACG", 'T'),
    ("GCT", 'A'), ("GCC", 'A'), ("GCA", 'A'), ("GCG", 'A'),
    ("TAT", 'Y'), ("TAC", 'Y'), ("TAA", STOP), ("TAG", STOP),
    ("CAT", 'H'), ("CAC", 'H'), ("CAA", 'Q'), ("CAG", 'Q'),
    ("AAT", 'N'), ("AAC", 'N'), ("AAA", 'K'), ("AAG", 'K'),
    ("GAT", 'D'), ("GAC", 'D'), ("GAA", 'E'), ("GAG", 'E'),
    ("TGT", 'C'), ("TGC", 'C'), ("TGA", STOP), ("TGG", 'W'),
    ("CGT", 'R'), ("CGC", 'R'), ("CGA", 'R'), ("CGG", 'R'),
    ("AGT", 'S'), ("AGC", 'S'), ("AGA", 'R'), ("AGG", 'R'),
    ("GGT", 'G'), ("GGC", 'G'), ("GGA", 'G'), ("GGG", 'G'),
];

// Three-letter amino acid names as they appear in gene product annotations.
const AA_NAMES: [(&str, char); 20] = [
    ("Ala", 'A'), ("Arg", 'R'), ("Asn", 'N'), ("Asp", 'D'),
    ("Cys", 'C'), ("Gln", 'Q'), ("Glu", 'E'), ("Gly", 'G'),
    ("His", 'H'), ("Ile", 'I'), ("Leu", 'L'), ("Lys", 'K'),
    ("Met", 'M'), ("Phe", 'F'), ("Pro", 'P'), ("Ser", 'S'),
    ("Thr", 'T'), ("Trp", 'W'), ("Tyr", 'Y'), ("Val", 'V'),
];

/// The standard genetic code (NCBI table 1) with the derived codon and
/// amino-acid sets used throughout the usage statistics.
pub struct GeneticCode {
    table: HashMap<&'static str, char>,
    codons: Vec<&'static str>,
    amino_acids: Vec<char>,
    stop_codons: Vec<&'static str>,
    non_degenerate: Vec<&'static str>,
    names: HashMap<&'static str, char>,
}

impl GeneticCode {
    /// Process-wide instance, built once on first use.
    pub fn standard() -> &'static GeneticCode {
        static CODE: OnceLock<GeneticCode> = OnceLock::new();
        CODE.get_or_init(GeneticCode::build)
    }

    fn build() -> GeneticCode {
        let table: HashMap<&'static str, char> = CODON_TABLE.iter().copied().collect();
        let codons: Vec<&'static str> = CODON_TABLE.iter().map(|&(codon, _)| codon).collect();

        let mut amino_acids: Vec<char> = table
            .values()
            .copied()
            .filter(|&aa| aa != STOP)
            .collect();
        amino_acids.sort_unstable();
        amino_acids.dedup();

        let stop_codons: Vec<&'static str> = codons
            .iter()
            .copied()
            .filter(|&codon| table[codon] == STOP)
            .collect();

        let mut multiplicity: HashMap<char, usize> = HashMap::new();
        for &(_, aa) in &CODON_TABLE {
            *multiplicity.entry(aa).or_insert(0) += 1;
        }
        let non_degenerate: Vec<&'static str> = codons
            .iter()
            .copied()
            .filter(|&codon| multiplicity[&table[codon]] == 1)
            .collect();

        GeneticCode {
            table,
            codons,
            amino_acids,
            stop_codons,
            non_degenerate,
            names: AA_NAMES.iter().copied().collect(),
        }
    }

    /// One-letter amino acid for a codon, `STOP` for stop codons, `None` for
    /// anything that is not one of the 64 codons.
    pub fn amino_acid(&self, codon: &str) -> Option<char> {
        self.table.get(codon).copied()
    }

    pub fn is_stop(&self, codon: &str) -> bool {
        self.amino_acid(codon) == Some(STOP)
    }

    /// A codon is non-degenerate when its amino acid has no other codon.
    pub fn is_non_degenerate(&self, codon: &str) -> bool {
        self.non_degenerate.iter().any(|&c| c == codon)
    }

    /// All codons encoding the given amino acid, in table order.
    pub fn synonyms(&self, amino_acid: char) -> Vec<&'static str> {
        self.codons
            .iter()
            .copied()
            .filter(|&codon| self.table[codon] == amino_acid)
            .collect()
    }

    /// Convert a three-letter amino acid name (e.g. "Ser") to its one-letter
    /// code. `None` for names outside the 20 standard amino acids.
    pub fn one_letter(&self, name: &str) -> Option<char> {
        self.names.get(name).copied()
    }

    /// All 64 codons in fixed table order.
    pub fn codons(&self) -> &[&'static str] {
        &self.codons
    }

    /// The 20 amino acids, sorted, stop excluded.
    pub fn amino_acids(&self) -> &[char] {
        &self.amino_acids
    }

    pub fn stop_codons(&self) -> &[&'static str] {
        &self.stop_codons
    }

    pub fn non_degenerate(&self) -> &[&'static str] {
        &self.non_degenerate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let code = GeneticCode::standard();
        assert_eq!(code.codons().len(), 64);
        assert_eq!(code.amino_acids().len(), 20);
        assert_eq!(code.stop_codons(), &["TAA", "TAG", "TGA"]);
    }

    #[test]
    fn test_lookups() {
        let code = GeneticCode::standard();
        assert_eq!(code.amino_acid("ATG"), Some('M'));
        assert_eq!(code.amino_acid("TAA"), Some(STOP));
        assert_eq!(code.amino_acid("NNN"), None);
        assert!(code.is_stop("TGA"));
        assert!(!code.is_stop("TGG"));
    }

    #[test]
    fn test_non_degenerate_is_met_and_trp() {
        let code = GeneticCode::standard();
        assert_eq!(code.non_degenerate(), &["ATG", "TGG"]);
        assert!(code.is_non_degenerate("ATG"));
        assert!(!code.is_non_degenerate("GAA"));
    }

    #[test]
    fn test_synonyms() {
        let code = GeneticCode::standard();
        assert_eq!(code.synonyms('S').len(), 6);
        assert_eq!(code.synonyms('E'), vec!["GAA", "GAG"]);
        assert_eq!(code.synonyms('M'), vec!["ATG"]);
        assert_eq!(code.synonyms(STOP).len(), 3);
    }

    #[test]
    fn test_one_letter_names() {
        let code = GeneticCode::standard();
        assert_eq!(code.one_letter("Ser"), Some('S'));
        assert_eq!(code.one_letter("Trp"), Some('W'));
        assert_eq!(code.one_letter("Sec"), None);
    }
}
