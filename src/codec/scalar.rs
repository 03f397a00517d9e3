//! Conversion between IGES scalar lexemes and native values.
//!
//! Parsing returns the value together with the [`ValueFormat`] observed in
//! the lexeme; emission consumes a (value, format) pair and reproduces the
//! observed spelling wherever the conformance rules require it (blank
//! defaulted fields, 'D' vs 'E' exponents, explicit '+', trailing-dot
//! reals).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{IgesError, Result};
use crate::model::scalar::{ParameterType, ScalarValue, ValueFormat};

/// Pointer magnitude limit (IGES 5.3 §2.2.2.4)
pub const MAX_POINTER_VALUE: i32 = 99_999_999;

static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("integer pattern"));
static REAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.[0-9]*|\.[0-9]+)([DE][+-]?[0-9]+)?$").expect("real pattern")
});

/// Strip leading ASCII spaces (other whitespace is significant and will
/// fail conversion downstream)
pub fn ltrim(s: &str) -> &str {
    s.trim_start_matches(' ')
}

/// Strip trailing ASCII spaces
pub fn rtrim(s: &str) -> &str {
    s.trim_end_matches(' ')
}

/// Strip ASCII spaces on both sides
pub fn trim(s: &str) -> &str {
    rtrim(ltrim(s))
}

/// True for a string that is empty or consists of ASCII spaces only
pub fn is_blank(s: &str) -> bool {
    s.bytes().all(|b| b == b' ')
}

fn blank_check<T: Clone>(field: &str, default: Option<&T>, what: &str) -> Result<Option<T>> {
    if !is_blank(field) {
        return Ok(None);
    }
    match default {
        Some(value) => Ok(Some(value.clone())),
        None => Err(IgesError::TypeConversion(format!(
            "a value is required for a {} field that has no default",
            what
        ))),
    }
}

/// Parse an Integer lexeme, returning the value and its observed format
pub fn parse_integer_with_format(
    field: &str,
    default: Option<i32>,
) -> Result<(i32, ValueFormat)> {
    if let Some(value) = blank_check(field, default.as_ref(), "Integer")? {
        return Ok((value, ValueFormat::integer().defaulted()));
    }

    let trimmed = trim(field);
    if !INTEGER_RE.is_match(trimmed) {
        return Err(IgesError::TypeConversion(format!(
            "invalid integer value: '{}'",
            field
        )));
    }
    let value: i32 = trimmed.parse().map_err(|_| {
        IgesError::TypeConversion(format!("integer value out of range: '{}'", field))
    })?;

    let mut format = ValueFormat::integer();
    format.has_plus_sign = trimmed.starts_with('+');
    Ok((value, format))
}

/// Parse an Integer lexeme
pub fn parse_integer(field: &str, default: Option<i32>) -> Result<i32> {
    parse_integer_with_format(field, default).map(|(v, _)| v)
}

/// Parse a Real lexeme, returning the value and its observed format.
///
/// 'D' marks double precision, 'E' single. A lexeme whose magnitude lies
/// below the smallest positive normal f64 is reported as underflow rather
/// than silently read as 0.0.
pub fn parse_real_with_format(field: &str, default: Option<f64>) -> Result<(f64, ValueFormat)> {
    if let Some(value) = blank_check(field, default.as_ref(), "Real")? {
        return Ok((value, ValueFormat::real().defaulted()));
    }

    let trimmed = trim(field);
    let captures = REAL_RE.captures(trimmed).ok_or_else(|| {
        IgesError::TypeConversion(format!("invalid real value: '{}'", field))
    })?;
    let mantissa = captures.get(1).map(|m| m.as_str()).unwrap_or("");
    let has_exponent = captures.get(2).is_some();

    let value: f64 = trimmed.replace('D', "E").parse().map_err(|_| {
        IgesError::TypeConversion(format!("invalid real value: '{}'", field))
    })?;
    if value.is_infinite() {
        return Err(IgesError::TypeConversion(format!(
            "real value out of range: '{}'",
            field
        )));
    }
    if value != 0.0 && value.abs() < f64::MIN_POSITIVE {
        return Err(IgesError::TypeConversion(format!(
            "real value underflow: '{}'",
            field
        )));
    }
    // A non-zero lexeme must not collapse to zero (sub-subnormal input)
    if value == 0.0 && mantissa.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
        return Err(IgesError::TypeConversion(format!(
            "real value underflow: '{}'",
            field
        )));
    }

    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let format = ValueFormat {
        parameter_type: ParameterType::Real,
        is_default: false,
        has_plus_sign: trimmed.starts_with('+'),
        has_integer: unsigned.bytes().next().map(|b| b.is_ascii_digit()).unwrap_or(false),
        has_fraction: unsigned
            .find('.')
            .and_then(|dot| unsigned.as_bytes().get(dot + 1))
            .map(|b| b.is_ascii_digit())
            .unwrap_or(false),
        has_exponent,
        single_precision: trimmed.contains('E'),
    };
    Ok((value, format))
}

/// Parse a Real lexeme
pub fn parse_real(field: &str, default: Option<f64>) -> Result<f64> {
    parse_real_with_format(field, default).map(|(v, _)| v)
}

/// Parse a Hollerith String lexeme (`NH<chars>`), returning payload and
/// format. The payload length must match the declared count exactly.
pub fn parse_string_with_format(
    field: &str,
    default: Option<&str>,
) -> Result<(String, ValueFormat)> {
    let owned_default = default.map(|s| s.to_string());
    if let Some(value) = blank_check(field, owned_default.as_ref(), "String")? {
        return Ok((value, ValueFormat::string().defaulted()));
    }

    let malformed = || {
        IgesError::TypeConversion(format!(
            "invalid string format: '{}' (expected '<count>H<chars>', e.g. '5Hhello')",
            field
        ))
    };

    let h_pos = field.find('H').ok_or_else(malformed)?;
    let count_str = &field[..h_pos];
    if count_str.is_empty() || !count_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let count: usize = count_str.parse().map_err(|_| {
        IgesError::TypeConversion(format!("string length out of range: '{}'", field))
    })?;

    let payload = &field[h_pos + 1..];
    if payload.len() != count {
        return Err(IgesError::TypeConversion(format!(
            "string length mismatch in '{}': declared {} characters, found {}",
            field,
            count,
            payload.len()
        )));
    }
    Ok((payload.to_string(), ValueFormat::string()))
}

/// Parse a Hollerith String lexeme
pub fn parse_string(field: &str, default: Option<&str>) -> Result<String> {
    parse_string_with_format(field, default).map(|(v, _)| v)
}

/// Parse a Pointer lexeme. Negative values are allowed (integer-or-pointer
/// DE fields); the magnitude is capped at [`MAX_POINTER_VALUE`].
pub fn parse_pointer_with_format(
    field: &str,
    default: Option<i32>,
) -> Result<(i32, ValueFormat)> {
    let (value, format) = parse_integer_with_format(field, default)
        .map_err(|_| IgesError::TypeConversion(format!("invalid pointer value: '{}'", field)))?;
    if value.abs() > MAX_POINTER_VALUE {
        return Err(IgesError::TypeConversion(format!(
            "pointer value out of range: '{}'",
            field
        )));
    }
    let mut ptr_format = ValueFormat::pointer();
    ptr_format.is_default = format.is_default;
    ptr_format.has_plus_sign = format.has_plus_sign;
    Ok((value, ptr_format))
}

/// Parse a Pointer lexeme
pub fn parse_pointer(field: &str, default: Option<i32>) -> Result<i32> {
    parse_pointer_with_format(field, default).map(|(v, _)| v)
}

/// Parse a Logical lexeme. `1`/`TRUE` and `0`/`FALSE` are accepted; the
/// canonical emitted encoding is `1`/`0`.
pub fn parse_logical_with_format(
    field: &str,
    default: Option<bool>,
) -> Result<(bool, ValueFormat)> {
    match trim(field) {
        "1" | "TRUE" => Ok((true, ValueFormat::logical())),
        "0" | "FALSE" => Ok((false, ValueFormat::logical())),
        "" => match default {
            Some(value) => Ok((value, ValueFormat::logical().defaulted())),
            None => Err(IgesError::TypeConversion(
                "a value is required for a Logical field that has no default".to_string(),
            )),
        },
        other => Err(IgesError::TypeConversion(format!(
            "invalid logical value: '{}' (expected '0', '1', 'TRUE' or 'FALSE')",
            other
        ))),
    }
}

/// Parse a Logical lexeme
pub fn parse_logical(field: &str, default: Option<bool>) -> Result<bool> {
    parse_logical_with_format(field, default).map(|(v, _)| v)
}

/// Parse a Language statement: passed through unchanged
pub fn parse_language_with_format(field: &str) -> (String, ValueFormat) {
    (field.to_string(), ValueFormat::language())
}

/// Emit an Integer per its format. A defaulted zero emits as blank.
pub fn emit_integer(value: i32, format: &ValueFormat) -> String {
    if format.is_default && value == 0 {
        return String::new();
    }
    if format.has_plus_sign && value >= 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Emit a Pointer per its format: Integer spelling rules apply, so an
/// observed leading '+' survives. A defaulted zero emits as blank.
pub fn emit_pointer(value: i32, format: &ValueFormat) -> String {
    if format.is_default && value == 0 {
        return String::new();
    }
    if format.has_plus_sign && value >= 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Emit a Logical per its format; always `1`/`0`
pub fn emit_logical(value: bool, format: &ValueFormat) -> String {
    if format.is_default && !value {
        return String::new();
    }
    if value {
        "1".to_string()
    } else {
        "0".to_string()
    }
}

/// Emit a Hollerith String per its format
pub fn emit_string(value: &str, format: &ValueFormat) -> String {
    if format.is_default && value.is_empty() {
        return String::new();
    }
    format!("{}H{}", value.len(), value)
}

/// Emit a Language statement unchanged
pub fn emit_language(value: &str) -> String {
    value.to_string()
}

/// Emit a Real per its format: 'D' or 'E' exponent, `N.` for a value with
/// neither fraction nor exponent, `.NN` when no integer part was written.
pub fn emit_real(value: f64, format: &ValueFormat) -> String {
    if format.is_default && value == 0.0 {
        return String::new();
    }

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    } else if format.has_plus_sign {
        out.push('+');
    }

    let mut magnitude = value.abs();
    let mut exponent = 0i32;
    if format.has_exponent && magnitude != 0.0 {
        // normalise the mantissa to [1, 10), or to [0.1, 1) when the
        // original lexeme carried no integer part
        exponent = magnitude.log10().floor() as i32;
        if !format.has_integer {
            exponent += 1;
        }
        magnitude /= 10f64.powi(exponent);
    }

    let integer_part = magnitude.trunc();
    let fraction_part = magnitude.fract();

    if format.has_integer
        || integer_part >= 1.0
        || (integer_part == 0.0 && fraction_part == 0.0)
    {
        out.push_str(&format!("{}", integer_part as i64));
    }
    out.push('.');

    if fraction_part > 0.0 && (format.has_fraction || format.has_exponent) {
        out.push_str(&fraction_digits(fraction_part));
    } else if format.has_fraction {
        out.push('0');
    }

    if format.has_exponent {
        out.push(if format.single_precision { 'E' } else { 'D' });
        if exponent >= 0 {
            out.push('+');
        }
        out.push_str(&exponent.to_string());
    }
    out
}

/// Decimal digits of a fraction in (0, 1), trailing zeros trimmed
fn fraction_digits(fraction: f64) -> String {
    let mut digits = 15u32;
    let mut scaled = (fraction * 10f64.powi(digits as i32)).round() as i64;
    while scaled > 0 && scaled % 10 == 0 {
        scaled /= 10;
        digits -= 1;
    }
    let body = scaled.to_string();
    let mut out = String::new();
    for _ in body.len()..digits as usize {
        out.push('0');
    }
    out.push_str(&body);
    out
}

/// Emit any scalar per its format. Dispatch follows the format's declared
/// parameter type so that reinterpreted tokens keep their spelling.
pub fn emit_value(value: &ScalarValue, format: &ValueFormat) -> Result<String> {
    match format.parameter_type {
        ParameterType::Integer => value
            .as_int()
            .map(|v| emit_integer(v, format))
            .ok_or_else(|| mismatch(value, format)),
        ParameterType::Pointer => value
            .as_int()
            .map(|v| emit_pointer(v, format))
            .ok_or_else(|| mismatch(value, format)),
        ParameterType::Real => value
            .as_real()
            .map(|v| emit_real(v, format))
            .ok_or_else(|| mismatch(value, format)),
        ParameterType::Logical => match value {
            ScalarValue::Logical(v) => Ok(emit_logical(*v, format)),
            ScalarValue::Integer(0) => Ok(emit_logical(false, format)),
            ScalarValue::Integer(1) => Ok(emit_logical(true, format)),
            _ => Err(mismatch(value, format)),
        },
        ParameterType::String => value
            .as_str()
            .map(|v| emit_string(v, format))
            .ok_or_else(|| mismatch(value, format)),
        ParameterType::Language => value
            .as_str()
            .map(emit_language)
            .ok_or_else(|| mismatch(value, format)),
    }
}

fn mismatch(value: &ScalarValue, format: &ValueFormat) -> IgesError {
    IgesError::Implementation(format!(
        "value {:?} cannot be emitted as {:?}",
        value, format.parameter_type
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integer_parsing() {
        assert_eq!(parse_integer("  42 ", None).unwrap(), 42);
        assert_eq!(parse_integer("-7", None).unwrap(), -7);
        let (v, f) = parse_integer_with_format("+15", None).unwrap();
        assert_eq!(v, 15);
        assert!(f.has_plus_sign);

        // blank with default
        let (v, f) = parse_integer_with_format("   ", Some(3)).unwrap();
        assert_eq!(v, 3);
        assert!(f.is_default);
        // blank without default
        assert!(parse_integer("", None).is_err());
        // embedded non-space whitespace
        assert!(parse_integer("\t4", None).is_err());
        assert!(parse_integer("4x", None).is_err());
        assert!(parse_integer("99999999999", None).is_err());
    }

    #[test]
    fn test_real_parsing_boundaries() {
        assert_relative_eq!(parse_real("0.", None).unwrap(), 0.0);
        assert_relative_eq!(parse_real(".5", None).unwrap(), 0.5);
        assert_relative_eq!(parse_real("1.E+0", None).unwrap(), 1.0);
        assert_relative_eq!(parse_real("1.36D-2", None).unwrap(), 0.0136);
        assert_relative_eq!(parse_real("-.43E2", None).unwrap(), -43.0);
        assert!(parse_real("2.2250738585072013E-309", None).is_err());
        // integers are not reals
        assert!(parse_real("12", None).is_err());
        assert!(parse_real("abc", None).is_err());
    }

    #[test]
    fn test_real_format_capture() {
        let (_, f) = parse_real_with_format("1.36D-2", None).unwrap();
        assert!(f.has_integer && f.has_fraction && f.has_exponent);
        assert!(!f.single_precision);

        let (_, f) = parse_real_with_format("-.43E2", None).unwrap();
        assert!(!f.has_integer && f.has_fraction && f.has_exponent);
        assert!(f.single_precision);

        let (_, f) = parse_real_with_format("2.", None).unwrap();
        assert!(f.has_integer && !f.has_fraction && !f.has_exponent);
    }

    #[test]
    fn test_string_parsing() {
        assert_eq!(parse_string("0H", None).unwrap(), "");
        assert_eq!(parse_string("1H ", None).unwrap(), " ");
        assert_eq!(parse_string("5Hhello", None).unwrap(), "hello");
        // payload may contain delimiter bytes
        assert_eq!(parse_string("3H,;,", None).unwrap(), ",;,");
        assert!(parse_string("5Hello", None).is_err());
        assert!(parse_string("+2Hok", None).is_err());
        assert!(parse_string("hello", None).is_err());
    }

    #[test]
    fn test_pointer_parsing() {
        assert_eq!(parse_pointer("305", None).unwrap(), 305);
        assert_eq!(parse_pointer("-11", None).unwrap(), -11);
        assert!(parse_pointer("100000000", None).is_err());

        // pointers follow the Integer spelling rules, '+' included
        let (value, format) = parse_pointer_with_format("+305", None).unwrap();
        assert_eq!(format.parameter_type, ParameterType::Pointer);
        assert!(format.has_plus_sign);
        assert_eq!(emit_pointer(value, &format), "+305");

        let (value, format) = parse_pointer_with_format("  ", Some(0)).unwrap();
        assert_eq!(emit_pointer(value, &format), "");
    }

    #[test]
    fn test_logical_parsing() {
        assert!(parse_logical("1", None).unwrap());
        assert!(parse_logical("TRUE", None).unwrap());
        assert!(!parse_logical("0", None).unwrap());
        assert!(!parse_logical("FALSE", None).unwrap());
        assert!(!parse_logical(" ", Some(false)).unwrap());
        assert!(parse_logical("2", None).is_err());
        assert!(parse_logical("", None).is_err());
    }

    #[test]
    fn test_emit_round_trips_spelling() {
        for lexeme in ["0.", ".5", "1.E+0", "1.36D-2", "2.", "-1.5", "3.14"] {
            let (v, f) = parse_real_with_format(lexeme, None).unwrap();
            assert_eq!(emit_real(v, &f), *lexeme, "lexeme {}", lexeme);
        }
        // the exponent sign is normalised to explicit '+'
        let (v, f) = parse_real_with_format("-.43E2", None).unwrap();
        assert_eq!(emit_real(v, &f), "-.43E+2");

        let (v, f) = parse_integer_with_format("+7", None).unwrap();
        assert_eq!(emit_integer(v, &f), "+7");

        let (v, f) = parse_string_with_format("5Hhello", None).unwrap();
        assert_eq!(emit_string(&v, &f), "5Hhello");
    }

    #[test]
    fn test_emit_defaults_are_blank() {
        let (v, f) = parse_integer_with_format("  ", Some(0)).unwrap();
        assert_eq!(emit_integer(v, &f), "");
        let (v, f) = parse_real_with_format("", Some(0.0)).unwrap();
        assert_eq!(emit_real(v, &f), "");
        // a defaulted field holding a non-default value is still emitted
        assert_eq!(emit_integer(5, &ValueFormat::integer().defaulted()), "5");
    }

    #[test]
    fn test_parse_emit_format_equality() {
        for lexeme in ["0.", ".5", "1.E+0", "1.36D-2", "-.43E2", "100.25"] {
            let (v, f) = parse_real_with_format(lexeme, None).unwrap();
            let (v2, f2) = parse_real_with_format(&emit_real(v, &f), None).unwrap();
            assert_relative_eq!(v, v2);
            assert_eq!(f, f2, "format drift for {}", lexeme);
        }
    }
}
