//! Low-level codecs: the 80-column line discipline, the six scalar
//! datatypes, the free-format token stream, the two-line DE layout and
//! the strict DE validation tables.

pub mod directory;
pub mod free_format;
pub mod line;
pub mod scalar;
pub mod validation;

pub use line::{LineReader, RawLine, SectionKind};
