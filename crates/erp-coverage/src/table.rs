//! Table expectations — the fixed list of tables an extractor declares
//! it will attempt to read.

use serde::{Deserialize, Serialize};

/// A single table an extractor expects to read.
///
/// Declaring `critical: true` means the gap analyzer treats a missing
/// or failed read of this table as a severity-weighted finding rather
/// than routine incompleteness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableExpectation {
    pub name: String,
    pub description: String,
    pub critical: bool,
}

impl TableExpectation {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            critical: false,
        }
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}
