// src/stats.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::calls::CallType;

/// Counters for one conversion run. Scoped to the run and returned by
/// the writer, never process-global.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_features: u64,
    pub coding_sequences: u64,
    pub rnas: u64,
    pub unknown_features: u64,
    /// Inert placeholder: nothing increments it, so the advisory line in
    /// [`print_summary`](Self::print_summary) never fires in practice.
    pub missing_product_or_note: u64,
    /// Raw feature-type tallies, bookkeeping only.
    pub feature_types: HashMap<String, u64>,
}

impl RunSummary {
    pub(crate) fn record(&mut self, feature_type: &str, call_type: CallType) {
        self.total_features += 1;
        *self
            .feature_types
            .entry(feature_type.to_string())
            .or_default() += 1;
        match call_type {
            CallType::Coding => self.coding_sequences += 1,
            CallType::Rna => self.rnas += 1,
            CallType::Unknown => self.unknown_features += 1,
        }
    }

    /// Print the terminal report.
    pub fn print_summary(&self) {
        println!(
            "Done. All {} have been processed successfully. There were {} coding sequences, {} RNAs, and {} unknown features.",
            self.total_features, self.coding_sequences, self.rnas, self.unknown_features
        );

        if self.missing_product_or_note > 0 {
            println!();
            println!(
                "Please note that {} features were discarded since they did not contain any products or notes.",
                self.missing_product_or_note
            );
        }
    }
}
