// error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneCallError {
    #[error("{0} is not an available gene caller.")]
    UnsupportedSource(String),

    #[error("invalid source attribution {attribution:?} in record {record}: expected the tool name and version separated by {separator:?}")]
    MalformedAttribution {
        record: u64,
        attribution: String,
        separator: char,
    },

    #[error("malformed GFF3 line {line}: {reason}")]
    Gff { line: u64, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
