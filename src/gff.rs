// gff.rs

//! GFF3 feature reader.
//!
//! GFF3 is a 9-column tab-separated format with 1-based, inclusive
//! coordinates. Records are yielded one per data line, in file order;
//! no parent/child hierarchy is reconstructed because the downstream
//! table consumes each feature independently.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::GeneCallError;
use crate::io::InputStream;

/// Strand of a feature. Anything other than `+` or `-` (GFF3 allows
/// `.` and `?`) is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl From<&str> for Strand {
    fn from(field: &str) -> Self {
        match field {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

/// One feature line of a GFF3 file.
#[derive(Debug, Clone, PartialEq)]
pub struct GffRecord {
    /// Contig or sequence id (column 1).
    pub seqid: String,
    /// Source attribution: the producing tool's name and version (column 2).
    pub source: String,
    /// Feature type tag, e.g. `CDS` or `tRNA` (column 3).
    pub feature_type: String,
    /// 1-based inclusive start (column 4).
    pub start: u64,
    /// 1-based inclusive end (column 5).
    pub end: u64,
    /// Strand (column 7).
    pub strand: Strand,
    /// Attribute map (column 9). GFF3 values are comma-separated lists,
    /// kept in order.
    pub attributes: HashMap<String, Vec<String>>,
}

impl GffRecord {
    /// First value of an attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Streaming reader over the feature lines of a GFF3 file.
///
/// Blank lines and `#`-prefixed comments/directives are skipped. A
/// `##FASTA` directive ends the stream: the embedded sequence section
/// must not be parsed as feature lines.
pub struct GffReader<R> {
    reader: R,
    line: u64,
    done: bool,
}

impl GffReader<BufReader<Box<dyn Read>>> {
    pub fn from_path(path: &Path) -> Result<Self, GeneCallError> {
        Ok(GffReader::new(InputStream::new(path).reader()?))
    }
}

impl<R: BufRead> GffReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for GffReader<R> {
    type Item = Result<GffRecord, GeneCallError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = String::new();
        loop {
            buf.clear();
            match self.reader.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;
            let line = buf.trim_end_matches(['\n', '\r']);

            if line.trim().is_empty() {
                continue;
            }
            // Must come before the generic comment skip.
            if line == "##FASTA" {
                debug!(line = self.line, "FASTA section reached, stopping");
                self.done = true;
                return None;
            }
            if line.starts_with('#') {
                continue;
            }

            return Some(parse_line(line, self.line));
        }
    }
}

fn parse_line(line: &str, line_no: u64) -> Result<GffRecord, GeneCallError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 {
        return Err(GeneCallError::Gff {
            line: line_no,
            reason: format!(
                "expected 9 tab-separated columns, found {}",
                fields.len()
            ),
        });
    }

    let start: u64 = fields[3].parse().map_err(|_| GeneCallError::Gff {
        line: line_no,
        reason: format!("invalid start coordinate {:?}", fields[3]),
    })?;
    let end: u64 = fields[4].parse().map_err(|_| GeneCallError::Gff {
        line: line_no,
        reason: format!("invalid end coordinate {:?}", fields[4]),
    })?;

    Ok(GffRecord {
        seqid: fields[0].to_string(),
        source: fields[1].to_string(),
        feature_type: fields[2].to_string(),
        start,
        end,
        strand: Strand::from(fields[6]),
        attributes: parse_attributes(fields[8]),
    })
}

/// Parse the attribute column: `;`-separated `key=value` pairs, values
/// being comma-separated lists with percent-encoded characters.
fn parse_attributes(field: &str) -> HashMap<String, Vec<String>> {
    let mut attributes = HashMap::new();
    for pair in field.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((key, values)) = pair.split_once('=') {
            attributes.insert(
                key.to_string(),
                values.split(',').map(percent_decode).collect(),
            );
        }
    }
    attributes
}

fn percent_decode(value: &str) -> String {
    value
        .replace("%3B", ";")
        .replace("%3D", "=")
        .replace("%26", "&")
        .replace("%2C", ",")
        .replace("%09", "\t")
        .replace("%0A", "\n")
        .replace("%25", "%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(content: &str) -> Result<Vec<GffRecord>, GeneCallError> {
        GffReader::new(Cursor::new(content.to_string())).collect()
    }

    #[test]
    fn parses_a_prodigal_cds_line() {
        let records = read_all(
            "##gff-version 3\n\
             contig_1\tProdigal 2.6.3\tCDS\t137\t1120\t156.4\t+\t0\tID=1_1;partial=00;start_type=ATG\n",
        )
        .unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.seqid, "contig_1");
        assert_eq!(record.source, "Prodigal 2.6.3");
        assert_eq!(record.feature_type, "CDS");
        assert_eq!(record.start, 137);
        assert_eq!(record.end, 1120);
        assert_eq!(record.strand, Strand::Forward);
        assert_eq!(record.attribute("ID"), Some("1_1"));
        assert_eq!(record.attribute("partial"), Some("00"));
    }

    #[test]
    fn skips_comments_directives_and_blank_lines() {
        let records = read_all(
            "##gff-version 3\n\
             # a comment\n\
             \n\
             contig_1\tProdigal 2.6.3\tCDS\t10\t100\t.\t+\t0\tID=1_1\n\
             contig_1\tProdigal 2.6.3\ttRNA\t200\t260\t.\t-\t.\tID=1_2\n",
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].feature_type, "tRNA");
        assert_eq!(records[1].strand, Strand::Reverse);
    }

    #[test]
    fn stops_at_fasta_section() {
        let records = read_all(
            "contig_1\tProdigal 2.6.3\tCDS\t10\t100\t.\t+\t0\tID=1_1\n\
             ##FASTA\n\
             >contig_1\n\
             ATCGATCG\n",
        )
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn unstranded_features_parse_as_unknown() {
        let records =
            read_all("contig_1\tsome_tool 1.0\trepeat_region\t5\t50\t.\t.\t.\tnote=palindrome\n")
                .unwrap();
        assert_eq!(records[0].strand, Strand::Unknown);
    }

    #[test]
    fn rejects_wrong_column_count() {
        let err = read_all("contig_1\tCDS\t10\t100\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 1"), "unexpected message: {message}");
        assert!(message.contains("9 tab-separated columns"));
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        let err =
            read_all("contig_1\ttool 1.0\tCDS\tten\t100\t.\t+\t0\tID=1\n").unwrap_err();
        assert!(err.to_string().contains("invalid start coordinate"));
    }

    #[test]
    fn reports_line_numbers_past_skipped_lines() {
        let err = read_all(
            "##gff-version 3\n\
             # comment\n\
             contig_1\tbroken line\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn multi_valued_attributes_keep_order_and_decode() {
        let records = read_all(
            "contig_1\ttool 1.0\tCDS\t1\t9\t.\t+\t0\tParent=a,b;product=30S%2C ribosomal\n",
        )
        .unwrap();
        let record = &records[0];
        assert_eq!(
            records[0].attributes.get("Parent"),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(record.attribute("Parent"), Some("a"));
        assert_eq!(record.attribute("product"), Some("30S, ribosomal"));
    }

    #[test]
    fn gene_attribute_lookup_is_empty_when_absent() {
        let records =
            read_all("contig_1\ttool 1.0\tCDS\t1\t9\t.\t+\t0\tID=1_1\n").unwrap();
        assert_eq!(records[0].attribute("gene"), None);
    }

    #[test]
    fn crlf_line_endings_are_handled() {
        let records =
            read_all("contig_1\ttool 1.0\tCDS\t1\t9\t.\t+\t0\tID=1_1\r\n").unwrap();
        assert_eq!(records[0].attribute("ID"), Some("1_1"));
    }
}
