/// Complement a single nucleotide base, IUPAC ambiguity codes included.
pub fn complement(base: char) -> char {
    match base.to_ascii_uppercase() {
        'A' => 'T',
        'T' => 'A',
        'G' => 'C',
        'C' => 'G',
        'R' => 'Y',
        'Y' => 'R',
        'S' => 'S',
        'W' => 'W',
        'K' => 'M',
        'M' => 'K',
        'B' => 'V',
        'V' => 'B',
        'D' => 'H',
        'H' => 'D',
        'N' => 'N',
        other => other,
    }
}

/// Reverse complement of a nucleotide sequence.
///
/// Used to turn a tRNA anticodon into the codon it recognizes.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement).collect()
}
