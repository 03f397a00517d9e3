//! Raw Parameter Data records.
//!
//! A PD record is the token list of one entity, tagged with the entity
//! type and the back-pointer to its DE record. On the wire the first
//! token repeats the entity type; in memory it is implicit. Token types
//! are provisional: a greedy classifier assigns String / Integer / Real /
//! LanguageStatement, and the typed entity layer reinterprets individual
//! tokens (an Integer re-cast as a Pointer or Logical) by re-typing the
//! stored format in place; the observed formatting flags survive.

use crate::codec::scalar::{
    is_blank, ltrim, parse_integer_with_format, parse_real_with_format, parse_string_with_format,
};
use crate::error::{IgesError, Result};
use crate::model::scalar::{ParameterType, ParameterVector, ScalarValue, ValueFormat};

/// One Parameter Data record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParameterData {
    /// Entity type number (the wire's leading token, stripped)
    pub entity_type: i32,
    /// Sequence number of the owning DE record; 0 when the record was
    /// built in memory rather than read from a file
    pub de_pointer: u32,
    /// Sequence number of the record's first PD line; 0 when built in
    /// memory
    pub sequence_number: u32,
    /// The record's tokens with their observed formats
    pub params: ParameterVector,
}

/// Greedily classify one raw lexeme.
///
/// Blank tokens are String defaults; an exact-length `NH` token is a
/// String; an integer lexeme is an Integer; a real lexeme is a Real;
/// anything else is a Language statement.
pub fn classify_token(token: &str) -> (ScalarValue, ValueFormat) {
    if is_blank(token) {
        return (
            ScalarValue::Str(String::new()),
            ValueFormat::string().defaulted(),
        );
    }
    let trimmed = ltrim(token);
    if let Ok((value, format)) = parse_string_with_format(trimmed, None) {
        return (ScalarValue::Str(value), format);
    }
    if let Ok((value, format)) = parse_integer_with_format(trimmed, None) {
        return (ScalarValue::Integer(value), format);
    }
    if let Ok((value, format)) = parse_real_with_format(trimmed, None) {
        return (ScalarValue::Real(value), format);
    }
    (
        ScalarValue::Language(trimmed.to_string()),
        ValueFormat::language(),
    )
}

impl RawParameterData {
    /// Build a record from raw free-format tokens, the first of which is
    /// the entity type number
    pub fn from_tokens(de_pointer: u32, sequence_number: u32, tokens: &[String]) -> Result<Self> {
        let first = tokens.first().ok_or_else(|| {
            IgesError::SectionFormat("a parameter data record cannot be empty".to_string())
        })?;
        let entity_type = parse_integer_with_format(first, None)
            .map_err(|_| {
                IgesError::TypeConversion(format!(
                    "invalid entity type in parameter data: '{}'",
                    first
                ))
            })?
            .0;

        let mut params = ParameterVector::with_capacity(tokens.len() - 1);
        for token in &tokens[1..] {
            let (value, format) = classify_token(token);
            params.push(value, format);
        }

        Ok(RawParameterData {
            entity_type,
            de_pointer,
            sequence_number,
            params,
        })
    }

    /// Build an in-memory record (no file positions yet)
    pub fn new(entity_type: i32, params: ParameterVector) -> Self {
        RawParameterData {
            entity_type,
            de_pointer: 0,
            sequence_number: 0,
            params,
        }
    }

    /// The provisional (or reinterpreted) type of each token
    pub fn token_types(&self) -> Vec<ParameterType> {
        (0..self.params.len())
            .map(|i| self.params.format(i).map(|f| f.parameter_type))
            .map(|t| t.unwrap_or(ParameterType::String))
            .collect()
    }
}
