//! Data model: scalar values with formatting metadata, the typed
//! section records, the token-level intermediate model and the resolved
//! entity graph.

pub mod directory;
pub mod global;
pub mod intermediate;
pub mod parameter;
pub mod resolved;
pub mod scalar;

pub use directory::{
    BlankStatus, DirectoryEntry, EntityStatus, Hierarchy, SubordinateSwitch, UseFlag,
};
pub use global::{DraftingStandard, GlobalRecord, UnitFlag, VersionFlag};
pub use intermediate::IntermediateModel;
pub use parameter::RawParameterData;
pub use resolved::ResolvedModel;
pub use scalar::{ParameterType, ParameterVector, ScalarValue, ValueFormat};
