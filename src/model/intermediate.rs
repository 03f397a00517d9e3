//! The intermediate (token-level) model of a whole file.
//!
//! This is the boundary between line-level I/O and entity-level
//! semantics: the reader's top-level output and the writer's top-level
//! input.

use crate::error::{IgesError, Result};
use crate::model::directory::DirectoryEntry;
use crate::model::global::GlobalRecord;
use crate::model::parameter::RawParameterData;

/// One IGES file as sections of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntermediateModel {
    /// Start section text, lines joined by '\n'
    pub start: String,
    /// Global section
    pub global: GlobalRecord,
    /// Directory Entry records in file order
    pub directory: Vec<DirectoryEntry>,
    /// Parameter Data records in file order
    pub parameters: Vec<RawParameterData>,
    /// Terminate totals: Start, Global, DE and PD line counts
    pub terminate: [u32; 4],
}

impl IntermediateModel {
    /// Check the cross-section invariants: every DE record has exactly
    /// one PD record, their entity types agree, and the DE's PD pointer
    /// names the PD record's first line.
    pub fn check_consistency(&self) -> Result<()> {
        if self.directory.len() != self.parameters.len() {
            return Err(IgesError::DataFormat(format!(
                "{} directory entry records but {} parameter data records",
                self.directory.len(),
                self.parameters.len()
            )));
        }
        for (index, de) in self.directory.iter().enumerate() {
            let pd = self
                .parameters
                .iter()
                .find(|pd| pd.de_pointer == de.sequence_number)
                .ok_or_else(|| {
                    IgesError::DataFormat(format!(
                        "no parameter data record points back at DE sequence number {} (record {})",
                        de.sequence_number, index
                    ))
                })?;
            if pd.entity_type != de.entity_type {
                return Err(IgesError::DataFormat(format!(
                    "entity type mismatch at DE {}: directory says {}, parameter data says {}",
                    de.sequence_number, de.entity_type, pd.entity_type
                )));
            }
            if pd.sequence_number != 0 && de.parameter_data_pointer != pd.sequence_number {
                return Err(IgesError::DataFormat(format!(
                    "DE {} points at PD line {} but the record starts at line {}",
                    de.sequence_number, de.parameter_data_pointer, pd.sequence_number
                )));
            }
        }
        Ok(())
    }
}
