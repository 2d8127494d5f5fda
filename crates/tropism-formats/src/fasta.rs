use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// One FASTA record: header id, remaining header text, concatenated
/// uppercase sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastaRecord {
    pub id: String,
    pub description: String,
    pub sequence: String,
}

/// Parse a FASTA format string into records
pub fn parse(input: &str) -> Result<Vec<FastaRecord>, ParseError> {
    let mut records = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_desc = String::new();
    let mut current_seq = String::new();

    for line in input.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('>') {
            // Save previous record if it has any sequence
            if let Some(id) = current_id.take() {
                if !current_seq.is_empty() {
                    records.push(FastaRecord {
                        id,
                        description: std::mem::take(&mut current_desc),
                        sequence: std::mem::take(&mut current_seq),
                    });
                }
            }

            let parts: Vec<&str> = header.splitn(2, |c: char| c.is_whitespace()).collect();
            current_id = Some(parts[0].to_string());
            current_desc = parts.get(1).map(|s| s.trim().to_string()).unwrap_or_default();
            current_seq = String::new();
        } else if trimmed.starts_with(';') {
            // Comment line, skip
            continue;
        } else {
            current_seq.push_str(
                &trimmed
                    .chars()
                    .filter(|c| c.is_ascii_alphabetic())
                    .collect::<String>()
                    .to_uppercase(),
            );
        }
    }

    if let Some(id) = current_id {
        if !current_seq.is_empty() {
            records.push(FastaRecord {
                id,
                description: current_desc,
                sequence: current_seq,
            });
        }
    }

    if records.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA input".to_string(),
        ));
    }

    Ok(records)
}

/// Read the first record's sequence from a FASTA file: the whole-genome
/// reader used for genome-level profiles.
pub fn read_sequence(path: impl AsRef<Path>) -> Result<String, ParseError> {
    let content = fs::read_to_string(path)?;
    let mut records = parse(&content)?;
    Ok(records.remove(0).sequence)
}

/// Read all record ids from a FASTA file.
pub fn read_headers(path: impl AsRef<Path>) -> Result<Vec<String>, ParseError> {
    let content = fs::read_to_string(path)?;
    Ok(parse(&content)?.into_iter().map(|r| r.id).collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_single_record() {
        let input = ">seq1 A test sequence\nATCGATCG\nGGCCTTAA\n";
        let records = parse(input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].description, "A test sequence");
        assert_eq!(records[0].sequence, "ATCGATCGGGCCTTAA");
    }

    #[test]
    fn test_parse_multi_record() {
        let input = ">seq1\nATCG\n>seq2\nGGCC\n>seq3\nTTAA\n";
        let records = parse(input).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[2].sequence, "TTAA");
    }

    #[test]
    fn test_lowercase_and_comments() {
        let input = ">seq1\n; comment\natcg\n";
        let records = parse(input).unwrap();
        assert_eq!(records[0].sequence, "ATCG");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_err());
        assert!(parse("> \n").is_err());
    }
}
