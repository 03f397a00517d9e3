//! # CADDY IGES - IGES 5.3 Codec
//!
//! A round-trip reader and writer for IGES 5.3 (Initial Graphics
//! Exchange Specification) files, the legacy interchange format still
//! spoken by virtually every CAD system.
//!
//! ## Architecture
//!
//! - `codec`: column-exact line I/O, the six scalar datatypes with
//!   formatting metadata, the free-format token stream, the DE field
//!   layout and strict validation
//! - `model`: scalar/parameter containers, the Global and Directory
//!   Entry records, the token-level intermediate model and the resolved
//!   entity graph
//! - `reader`: the stateful section reader and the read entry points
//! - `writer`: serialisation with reconstructed pointers and line counts
//! - `entities`: entity identifiers, typed payloads for the implemented
//!   entity variants, and the construction factory
//!
//! ## Quick start
//!
//! ```no_run
//! use caddy_iges::{read_iges, write_iges};
//!
//! let model = read_iges("part.igs", false).unwrap();
//! for entity in model.iter() {
//!     println!("type {} form {}", entity.entity_type(), entity.form_number());
//! }
//! write_iges(&model, "copy.igs", true).unwrap();
//! ```
//!
//! Reading stops at the first violation of the format; there is no
//! silent recovery. Passing `strict = true` additionally enforces the
//! specification's per-type Directory Entry constraints, which many
//! real-world files violate.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Low-level codecs
pub mod codec;

// Data model
pub mod model;

// Entity layer
pub mod entities;

// Error taxonomy
pub mod error;

// Reading
pub mod reader;

// Writing
pub mod writer;

// Re-export commonly used types
pub use codec::line::SectionKind;
pub use entities::{Entity, EntityData, EntityId, EntityType};
pub use error::{IgesError, Result};
pub use model::{
    DirectoryEntry, GlobalRecord, IntermediateModel, ParameterType, ParameterVector,
    RawParameterData, ResolvedModel, ScalarValue, ValueFormat,
};
pub use reader::{read_iges, read_iges_intermediate, SectionReader};
pub use writer::{write_iges, write_iges_intermediate};

/// Library name, written as the native system id (Global parameter 5)
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library version, written as the preprocessor version (Global
/// parameter 6)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
