// calls.rs

//! Feature records to anvi'o external gene calls.
//!
//! Each GFF3 feature becomes exactly one table row, in input order,
//! numbered from 1. Rows are written as they are produced.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::GeneCallError;
use crate::gff::{GffReader, GffRecord, Strand};
use crate::io::OutputStream;
use crate::stats::RunSummary;

const HEADER: [&str; 9] = [
    "gene_callers_id",
    "contig",
    "start",
    "stop",
    "direction",
    "partial",
    "call_type",
    "source",
    "version",
];

/// A supported gene caller. The source attribution column of its GFF3
/// output holds the tool name and version joined by `separator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Prodigal,
}

impl Source {
    pub fn separator(&self) -> char {
        match self {
            Source::Prodigal => ' ',
        }
    }
}

impl FromStr for Source {
    type Err = GeneCallError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Prodigal" => Ok(Source::Prodigal),
            other => Err(GeneCallError::UnsupportedSource(other.to_string())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Prodigal => write!(f, "Prodigal"),
        }
    }
}

/// Coarse category of a gene call. Serializes as the anvi'o integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    Coding,
    Rna,
    Unknown,
}

impl CallType {
    /// First match wins: the exact `CDS` tag is coding, anything with
    /// `RNA` in the tag is RNA, the rest is unknown.
    pub fn classify(feature_type: &str) -> Self {
        if feature_type == "CDS" {
            CallType::Coding
        } else if feature_type.contains("RNA") {
            CallType::Rna
        } else {
            CallType::Unknown
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            CallType::Coding => 1,
            CallType::Rna => 2,
            CallType::Unknown => 3,
        }
    }
}

impl Serialize for CallType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Direction of a call in the output table. Serializes as `f`/`r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Repeat regions are not stranded and always come out forward.
    /// Otherwise `+` is forward and everything else, the unknown strand
    /// included, is reverse.
    pub fn from_feature(feature_type: &str, strand: Strand) -> Self {
        if feature_type == "repeat_region" {
            return Direction::Forward;
        }
        match strand {
            Strand::Forward => Direction::Forward,
            Strand::Reverse | Strand::Unknown => Direction::Reverse,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Direction::Forward => 'f',
            Direction::Reverse => 'r',
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.symbol())
    }
}

/// One row of the external gene calls table. Field order is column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneCall {
    pub gene_callers_id: u64,
    pub contig: String,
    /// 0-based start, converted from the GFF3 1-based coordinate.
    pub start: u64,
    /// 1-based inclusive stop, unchanged from the GFF3 coordinate.
    pub stop: u64,
    pub direction: Direction,
    pub partial: u8,
    pub call_type: CallType,
    pub source: String,
    pub version: String,
}

/// The partial-call flag: 0 when `start − stop` divides evenly by 3.
/// The quotient is negative for every well-formed record; the rule is
/// kept as-is for parity with existing tables.
fn partial_flag(start: u64, stop: u64) -> u8 {
    if (start as i64 - stop as i64) % 3 == 0 {
        0
    } else {
        1
    }
}

fn split_attribution(
    attribution: &str,
    separator: char,
    record: u64,
) -> Result<(String, String), GeneCallError> {
    match attribution.split_once(separator) {
        Some((source, version)) => Ok((source.to_string(), version.to_string())),
        None => Err(GeneCallError::MalformedAttribution {
            record,
            attribution: attribution.to_string(),
            separator,
        }),
    }
}

/// Streams gene calls into a tab-separated table.
///
/// The header line goes out on construction, so an input with no
/// features still yields a valid header-only table.
pub struct GeneCallWriter<W: Write> {
    writer: csv::Writer<W>,
    separator: char,
    next_id: u64,
    summary: RunSummary,
}

impl<W: Write> GeneCallWriter<W> {
    pub fn new(output: W, source: &Source) -> Result<Self, GeneCallError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(output);
        writer.write_record(HEADER)?;
        Ok(Self {
            writer,
            separator: source.separator(),
            next_id: 1,
            summary: RunSummary::default(),
        })
    }

    /// Derive and write the row for one feature. All fields are computed
    /// before anything is written, so a failing record never leaves a
    /// corrupt row behind.
    pub fn write_feature(&mut self, record: &GffRecord) -> Result<(), GeneCallError> {
        let (source, version) =
            split_attribution(&record.source, self.separator, self.next_id)?;

        let start = record.start.saturating_sub(1);
        let stop = record.end;
        let call_type = CallType::classify(&record.feature_type);
        let direction = Direction::from_feature(&record.feature_type, record.strand);

        let call = GeneCall {
            gene_callers_id: self.next_id,
            contig: record.seqid.clone(),
            start,
            stop,
            direction,
            partial: partial_flag(start, stop),
            call_type,
            source,
            version,
        };
        self.writer.serialize(&call)?;

        self.summary.record(&record.feature_type, call_type);
        self.next_id += 1;
        Ok(())
    }

    /// Flush the table and hand back the run counters.
    pub fn finish(mut self) -> Result<RunSummary, GeneCallError> {
        self.writer.flush()?;
        debug!(feature_types = ?self.summary.feature_types, "feature type tally");
        Ok(self.summary)
    }
}

/// Drive an ordered stream of feature records through a [`GeneCallWriter`].
pub fn convert_records<I, W>(
    records: I,
    output: W,
    source: &Source,
) -> Result<RunSummary, GeneCallError>
where
    I: IntoIterator<Item = Result<GffRecord, GeneCallError>>,
    W: Write,
{
    let mut writer = GeneCallWriter::new(output, source)?;
    for record in records {
        writer.write_feature(&record?)?;
    }
    writer.finish()
}

/// The whole pipeline, file to file.
///
/// The source name is validated before anything is opened, so a
/// configuration error leaves no output file behind. The input is opened
/// before the output is created for the same reason.
pub fn run_conversion(
    gff_path: &Path,
    out_path: &Path,
    source_name: &str,
) -> Result<RunSummary, GeneCallError> {
    let source: Source = source_name.parse()?;
    let records = GffReader::from_path(gff_path)?;
    let output = OutputStream::new(out_path).writer()?;
    convert_records(records, output, &source)
}
