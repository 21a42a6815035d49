//! Turn protein sequences into songs

use std::str::FromStr;

use crate::{Error, Letter, Result};

/// A single FASTA record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fasta {
    /// The description line, without the leading `>`
    pub header: String,
    /// The residues, with line breaks and whitespace removed
    pub sequence: String,
}

impl Fasta {
    /// Parse the first record of FASTA text
    ///
    /// The header line is optional. Parsing stops at the next header.
    pub fn parse(text: &str) -> Result<Self> {
        let mut header = String::new();
        let mut sequence = String::new();
        let mut first = true;
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if let Some(desc) = line.strip_prefix('>') {
                if !first {
                    break;
                }
                header = desc.trim().into();
            } else {
                sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
            }
            first = false;
        }
        if sequence.is_empty() {
            return Err(Error::EmptyFasta);
        }
        Ok(Fasta { header, sequence })
    }
    /// Get the notes for this record's sequence
    pub fn notes(&self) -> Vec<f64> {
        protein_notes(&self.sequence)
    }
}

impl FromStr for Fasta {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Fasta::parse(s)
    }
}

/// The pair of notes played for every residue
pub fn residue_notes() -> [f64; 2] {
    [Letter::G.frequency(3), Letter::Eb.frequency(4)]
}

/// Get two notes for every residue in the sequence
pub fn protein_notes(sequence: &str) -> Vec<f64> {
    let pair = residue_notes();
    sequence
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|_| pair)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSULIN: &str = ">sp|P01308|INS_HUMAN Insulin
MALWMRLLPLLALLALWGPDPAAA
FVNQHLCGSHLVEALYLVCGERGF
";

    #[test]
    fn parse_record() {
        let fasta = Fasta::parse(INSULIN).unwrap();
        assert_eq!(fasta.header, "sp|P01308|INS_HUMAN Insulin");
        assert_eq!(fasta.sequence.len(), 48);
        assert!(fasta.sequence.starts_with("MALW"));
        assert!(fasta.sequence.ends_with("ERGF"));
    }

    #[test]
    fn only_first_record_is_read() {
        let fasta: Fasta = ">a\nMK\n>b\nQQQ\n".parse().unwrap();
        assert_eq!(fasta.sequence, "MK");
        assert_eq!(fasta.header, "a");
    }

    #[test]
    fn bare_sequence_without_header() {
        let fasta = Fasta::parse("MK V\n").unwrap();
        assert_eq!(fasta.header, "");
        assert_eq!(fasta.sequence, "MKV");
    }

    #[test]
    fn empty_record_is_an_error() {
        assert!(matches!(Fasta::parse(">header only\n"), Err(Error::EmptyFasta)));
        assert!(matches!(Fasta::parse(""), Err(Error::EmptyFasta)));
    }

    #[test]
    fn two_notes_per_residue() {
        let notes = protein_notes("MKV");
        assert_eq!(notes.len(), 6);
        for pair in notes.chunks(2) {
            assert!((pair[0] - 196.00).abs() < 0.01);
            assert!((pair[1] - 311.13).abs() < 0.01);
        }
    }
}
