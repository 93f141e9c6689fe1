pub mod calls;
pub mod error;
pub mod gff;
pub mod io;
pub mod stats;

pub use calls::{convert_records, run_conversion, CallType, Direction, GeneCall, GeneCallWriter, Source};
pub use error::GeneCallError;
pub use gff::{GffReader, GffRecord, Strand};
pub use stats::RunSummary;
