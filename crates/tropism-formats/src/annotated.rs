use std::fs;
use std::path::Path;

use tropism_core::{GeneRecord, GeneSet, UsageError};

use crate::{fasta, ParseError};

/// Parse a Bakta-style annotated genes file (`.ffn`): FASTA records whose
/// header is `<gene id> <product annotation>`.
pub fn parse(input: &str) -> Result<Vec<GeneRecord>, ParseError> {
    let records = fasta::parse(input)?;
    Ok(records
        .into_iter()
        .map(|r| GeneRecord {
            seq: r.sequence,
            id: r.id,
            product: r.description,
        })
        .collect())
}

/// Read an annotated genes file into raw records.
pub fn read_genes(path: impl AsRef<Path>) -> Result<Vec<GeneRecord>, ParseError> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Read an annotated genes file and build a `GeneSet` keyed by the file
/// path. A missing or empty file is rejected before parsing.
pub fn read_gene_set(path: impl AsRef<Path>) -> Result<GeneSet, ParseError> {
    let path = path.as_ref();
    let non_empty = path.metadata().map(|m| m.len() > 0).unwrap_or(false);
    if !non_empty {
        return Err(ParseError::Usage(UsageError::InvalidInput(format!(
            "genes file {} is missing or empty",
            path.display(),
        ))));
    }
    let records = read_genes(path)?;
    Ok(GeneSet::from_records(path.to_string_lossy(), records)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FFN: &str = "\
>v_0001 major capsid protein
ATGTCATCCGAA
>v_0002 tRNA-Ser(tga)
ATGGAA
";

    #[test]
    fn test_parse_records() {
        let records = parse(FFN).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "v_0001");
        assert_eq!(records[0].product, "major capsid protein");
        assert_eq!(records[0].seq, "ATGTCATCCGAA");
        assert_eq!(records[1].product, "tRNA-Ser(tga)");
    }

    #[test]
    fn test_records_feed_gene_set() {
        let records = parse(FFN).unwrap();
        let set = GeneSet::from_records("test.ffn", records).unwrap();
        assert_eq!(set.genes().len(), 2);
        assert_eq!(set.trna_counts().total, 1);
    }

    #[test]
    fn test_missing_file_is_invalid_input() {
        let err = read_gene_set("does/not/exist.ffn").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Usage(UsageError::InvalidInput(_))
        ));
    }
}
