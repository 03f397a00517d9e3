//! Scalar values and their formatting metadata.
//!
//! IGES parameter data mixes six datatypes (Logical, Integer, Real,
//! Pointer, String, Language Statement). Alongside each native value the
//! codec keeps a [`ValueFormat`] describing how the value was lexically
//! written in the file, so the conformance rules of IGES 5.3 §1.4.7
//! (defaulted fields stay blank, 'D' exponents stay 'D', an explicit '+'
//! stays, ...) survive a round trip.

use crate::error::{IgesError, Result};

/// The six IGES parameter datatypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// `0` / `1` (`TRUE` / `FALSE` accepted on input)
    Logical,
    /// `[+-]?[0-9]+`
    Integer,
    /// `[+-]?([0-9]+\.[0-9]*|\.[0-9]+)([DE][+-]?[0-9]+)?`
    Real,
    /// Integer syntax, |value| <= 99 999 999; negative values encode
    /// "pointer" in integer-or-pointer DE fields
    Pointer,
    /// `NH<chars>` Hollerith string
    String,
    /// Opaque ASCII, MACRO definitions only
    Language,
}

/// A parsed parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Logical value
    Logical(bool),
    /// Integer value
    Integer(i32),
    /// Real value
    Real(f64),
    /// Pointer value (signed; the sign is the caller's concern)
    Pointer(i32),
    /// Hollerith string payload
    Str(String),
    /// Language statement text, passed through unchanged
    Language(String),
}

impl ScalarValue {
    /// The parameter type naturally carried by this value variant
    pub fn natural_type(&self) -> ParameterType {
        match self {
            ScalarValue::Logical(_) => ParameterType::Logical,
            ScalarValue::Integer(_) => ParameterType::Integer,
            ScalarValue::Real(_) => ParameterType::Real,
            ScalarValue::Pointer(_) => ParameterType::Pointer,
            ScalarValue::Str(_) => ParameterType::String,
            ScalarValue::Language(_) => ParameterType::Language,
        }
    }

    /// Integer view: Integer and Pointer variants qualify
    pub fn as_int(&self) -> Option<i32> {
        match self {
            ScalarValue::Integer(v) | ScalarValue::Pointer(v) => Some(*v),
            _ => None,
        }
    }

    /// Real view: Real qualifies directly, Integer by widening
    pub fn as_real(&self) -> Option<f64> {
        match self {
            ScalarValue::Real(v) => Some(*v),
            ScalarValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// String view for Str and Language variants
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Str(s) | ScalarValue::Language(s) => Some(s),
            _ => None,
        }
    }
}

/// How a value was lexically written in the file.
///
/// Equality ignores fields irrelevant to the parameter type: Logical,
/// Pointer and String compare `is_default` only, Integer additionally
/// compares `has_plus_sign`, Real compares everything, and Language
/// statements are always equal.
#[derive(Debug, Clone, Copy)]
pub struct ValueFormat {
    /// Parameter type this format applies to
    pub parameter_type: ParameterType,
    /// The field was blank and a default applies
    pub is_default: bool,
    /// The number was written with an explicit leading '+'
    pub has_plus_sign: bool,
    /// Real only: an integer part was present
    pub has_integer: bool,
    /// Real only: a fraction part was present
    pub has_fraction: bool,
    /// Real only: an exponent part was present
    pub has_exponent: bool,
    /// Real only: 'E' exponent marker (single precision) rather than 'D'
    pub single_precision: bool,
}

impl ValueFormat {
    /// Format for a Logical value
    pub fn logical() -> Self {
        Self::of(ParameterType::Logical)
    }

    /// Format for an Integer value
    pub fn integer() -> Self {
        Self::of(ParameterType::Integer)
    }

    /// Format for a Real value written as `N.N` (integer and fraction
    /// parts, no exponent)
    pub fn real() -> Self {
        ValueFormat {
            has_integer: true,
            has_fraction: true,
            ..Self::of(ParameterType::Real)
        }
    }

    /// Format for a Pointer value
    pub fn pointer() -> Self {
        Self::of(ParameterType::Pointer)
    }

    /// Format for a String value
    pub fn string() -> Self {
        Self::of(ParameterType::String)
    }

    /// Format for a Language statement
    pub fn language() -> Self {
        Self::of(ParameterType::Language)
    }

    /// Bare format of the given type with every flag cleared
    pub fn of(parameter_type: ParameterType) -> Self {
        ValueFormat {
            parameter_type,
            is_default: false,
            has_plus_sign: false,
            has_integer: false,
            has_fraction: false,
            has_exponent: false,
            single_precision: false,
        }
    }

    /// Same format with the default-used flag set
    pub fn defaulted(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Same format with the explicit-plus flag set
    pub fn plus_signed(mut self) -> Self {
        self.has_plus_sign = true;
        self
    }

    /// A Real format must show at least one of integer or fraction part
    pub fn validate(&self) -> Result<()> {
        if self.parameter_type == ParameterType::Real
            && !self.has_integer
            && !self.has_fraction
            && !self.is_default
        {
            return Err(IgesError::DataFormat(
                "a Real format must have at least one of integer or fraction part".to_string(),
            ));
        }
        Ok(())
    }
}

impl PartialEq for ValueFormat {
    fn eq(&self, other: &Self) -> bool {
        if self.parameter_type != other.parameter_type {
            return false;
        }
        match self.parameter_type {
            ParameterType::Language => true,
            ParameterType::Logical | ParameterType::Pointer | ParameterType::String => {
                self.is_default == other.is_default
            }
            ParameterType::Integer => {
                self.is_default == other.is_default && self.has_plus_sign == other.has_plus_sign
            }
            ParameterType::Real => {
                self.is_default == other.is_default
                    && self.has_plus_sign == other.has_plus_sign
                    && self.has_integer == other.has_integer
                    && self.has_fraction == other.has_fraction
                    && self.has_exponent == other.has_exponent
                    && self.single_precision == other.single_precision
            }
        }
    }
}

impl Eq for ValueFormat {}

/// Ordered sequence of (value, format) pairs.
///
/// This is the shape of every parameter list in the file: Global
/// parameters, PD record tokens and the parameter view of resolved
/// entities. Insertion-ordered, random-access, size-stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterVector {
    values: Vec<ScalarValue>,
    formats: Vec<ValueFormat>,
}

impl ParameterVector {
    /// Empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty vector with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ParameterVector {
            values: Vec::with_capacity(capacity),
            formats: Vec::with_capacity(capacity),
        }
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no parameters are stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append a (value, format) pair
    pub fn push(&mut self, value: ScalarValue, format: ValueFormat) {
        self.values.push(value);
        self.formats.push(format);
    }

    /// Value at `index`
    pub fn value(&self, index: usize) -> Option<&ScalarValue> {
        self.values.get(index)
    }

    /// Format at `index`
    pub fn format(&self, index: usize) -> Option<ValueFormat> {
        self.formats.get(index).copied()
    }

    /// Replace the pair at `index`
    pub fn set(&mut self, index: usize, value: ScalarValue, format: ValueFormat) -> Result<()> {
        if index >= self.values.len() {
            return Err(IgesError::Implementation(format!(
                "parameter index {} out of range (len {})",
                index,
                self.values.len()
            )));
        }
        self.values[index] = value;
        self.formats[index] = format;
        Ok(())
    }

    /// Iterate over (value, format) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&ScalarValue, &ValueFormat)> {
        self.values.iter().zip(self.formats.iter())
    }

    /// Integer at `index`; Integer and Pointer variants qualify
    pub fn int_at(&self, index: usize) -> Result<i32> {
        self.value(index)
            .and_then(ScalarValue::as_int)
            .ok_or_else(|| self.type_error(index, "Integer"))
    }

    /// Real at `index`; Integer tokens widen to f64
    pub fn real_at(&self, index: usize) -> Result<f64> {
        self.value(index)
            .and_then(ScalarValue::as_real)
            .ok_or_else(|| self.type_error(index, "Real"))
    }

    /// String at `index`
    pub fn str_at(&self, index: usize) -> Result<&str> {
        self.value(index)
            .and_then(ScalarValue::as_str)
            .ok_or_else(|| self.type_error(index, "String"))
    }

    /// Logical at `index`; Integer 0/1 tokens qualify, as do `TRUE` /
    /// `FALSE` statements tolerated on input
    pub fn logical_at(&self, index: usize) -> Result<bool> {
        match self.value(index) {
            Some(ScalarValue::Logical(v)) => Ok(*v),
            Some(ScalarValue::Integer(0)) => Ok(false),
            Some(ScalarValue::Integer(1)) => Ok(true),
            Some(ScalarValue::Language(s)) if s.trim_matches(' ') == "TRUE" => Ok(true),
            Some(ScalarValue::Language(s)) if s.trim_matches(' ') == "FALSE" => Ok(false),
            _ => Err(self.type_error(index, "Logical")),
        }
    }

    /// True when the value at `index` was blank in the file
    pub fn is_default_at(&self, index: usize) -> bool {
        self.formats.get(index).map(|f| f.is_default).unwrap_or(false)
    }

    /// Reinterpret the token at `index` as a Pointer. Greedy
    /// classification types every `[+-]?[0-9]+` token as Integer; entity
    /// constructors re-cast the ones their layout declares as pointers.
    /// The stored format is re-typed in place so emission takes the
    /// Pointer path; its formatting flags (default, explicit '+')
    /// survive the reinterpretation.
    pub fn coerce_pointer(&mut self, index: usize) -> Result<i32> {
        let value = self.int_at(index)?;
        self.values[index] = ScalarValue::Pointer(value);
        self.formats[index].parameter_type = ParameterType::Pointer;
        Ok(value)
    }

    /// Reinterpret the token at `index` as a Logical. The stored format
    /// is re-typed in place, so a tolerated `TRUE`/`FALSE` spelling
    /// re-emits as the canonical `1`/`0`.
    pub fn coerce_logical(&mut self, index: usize) -> Result<bool> {
        let value = self.logical_at(index)?;
        self.values[index] = ScalarValue::Logical(value);
        self.formats[index].parameter_type = ParameterType::Logical;
        Ok(value)
    }

    fn type_error(&self, index: usize, expected: &str) -> IgesError {
        match self.value(index) {
            Some(v) => IgesError::TypeConversion(format!(
                "parameter {} is {:?}, expected {}",
                index + 1,
                v,
                expected
            )),
            None => IgesError::DataFormat(format!(
                "parameter index {} out of range (len {})",
                index,
                self.values.len()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_format_equality_ignores_irrelevant_fields() {
        let a = ValueFormat::logical();
        let mut b = ValueFormat::logical();
        b.has_plus_sign = true;
        b.has_exponent = true;
        assert_eq!(a, b);

        let a = ValueFormat::integer();
        let b = ValueFormat::integer().plus_signed();
        assert_ne!(a, b);

        let a = ValueFormat::real();
        let mut b = ValueFormat::real();
        b.single_precision = true;
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_flag_distinguishes_formats() {
        assert_ne!(ValueFormat::string(), ValueFormat::string().defaulted());
        assert_eq!(ValueFormat::language(), ValueFormat::language());
    }

    #[test]
    fn test_parameter_vector_access() {
        let mut vec = ParameterVector::new();
        vec.push(ScalarValue::Integer(3), ValueFormat::integer());
        vec.push(ScalarValue::Real(2.5), ValueFormat::real());
        vec.push(ScalarValue::Str("arc".to_string()), ValueFormat::string());

        assert_eq!(vec.len(), 3);
        assert_eq!(vec.int_at(0).unwrap(), 3);
        assert_eq!(vec.real_at(1).unwrap(), 2.5);
        // integer widening
        assert_eq!(vec.real_at(0).unwrap(), 3.0);
        assert_eq!(vec.str_at(2).unwrap(), "arc");
        assert!(vec.int_at(2).is_err());
        assert!(vec.int_at(9).is_err());
    }

    #[test]
    fn test_coercion_retypes_and_keeps_flags() {
        let mut vec = ParameterVector::new();
        vec.push(ScalarValue::Integer(7), ValueFormat::integer().plus_signed());
        let ptr = vec.coerce_pointer(0).unwrap();
        assert_eq!(ptr, 7);
        assert_eq!(vec.value(0), Some(&ScalarValue::Pointer(7)));
        let format = vec.format(0).unwrap();
        assert_eq!(format.parameter_type, ParameterType::Pointer);
        assert!(format.has_plus_sign);

        let mut vec = ParameterVector::new();
        vec.push(ScalarValue::Integer(1), ValueFormat::integer());
        vec.push(
            ScalarValue::Language("TRUE".to_string()),
            ValueFormat::language(),
        );
        assert!(vec.coerce_logical(0).unwrap());
        assert!(vec.coerce_logical(1).unwrap());
        assert_eq!(vec.value(1), Some(&ScalarValue::Logical(true)));
        assert_eq!(
            vec.format(1).unwrap().parameter_type,
            ParameterType::Logical
        );
    }

    #[test]
    fn test_real_format_needs_integer_or_fraction() {
        let mut f = ValueFormat::of(ParameterType::Real);
        assert!(f.validate().is_err());
        f.has_fraction = true;
        assert!(f.validate().is_ok());
    }
}
