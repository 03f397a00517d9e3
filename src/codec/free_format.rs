//! Free-format token stream folding and unfolding.
//!
//! The Global and Parameter Data sections are free-format: the data parts
//! of consecutive lines are concatenated, then split on the parameter
//! delimiter until the record delimiter is reached. Hollerith strings are
//! lexed by their length prefix, so delimiter bytes inside a string
//! payload never terminate a token. Bytes after the record delimiter on
//! the concatenated text are a permitted comment and are dropped.

use crate::codec::scalar::ltrim;
use crate::error::{IgesError, Result};
use crate::model::scalar::ParameterType;

/// Hollerith prefix at the start of `text`: the position of the 'H' and
/// the declared payload length, or `None` when the text does not start
/// with `<digits>H`
fn hollerith_prefix(text: &str) -> Option<(usize, usize)> {
    let h_pos = text.find('H').filter(|&p| p > 0)?;
    let mut length = 0usize;
    for b in text[..h_pos].bytes() {
        if !b.is_ascii_digit() {
            return None;
        }
        length = length * 10 + (b - b'0') as usize;
    }
    Some((h_pos, length))
}

/// Split one token off the front of `text`; returns the token and the
/// rest starting at the delimiter that terminated it
fn next_token<'a>(text: &'a str, p_delim: char, r_delim: char) -> Result<(&'a str, &'a str)> {
    let text = ltrim(text);

    let end = match hollerith_prefix(text) {
        None => match text.find(|c| c == p_delim || c == r_delim) {
            Some(at) => at,
            None => {
                return Err(IgesError::SectionFormat(format!(
                    "no delimiter found in free-format data: '{}'",
                    text
                )))
            }
        },
        Some((h_pos, length)) => {
            let end = h_pos + length + 1;
            if end > text.len() {
                return Err(IgesError::SectionFormat(format!(
                    "string token announces {} characters but only {} remain: '{}'",
                    length,
                    text.len() - h_pos - 1,
                    text
                )));
            }
            let after = &text[end..];
            if !after.starts_with(p_delim) && !after.starts_with(r_delim) {
                return Err(IgesError::SectionFormat(format!(
                    "no delimiter after the parameter at position {}: '{}'",
                    end + 1,
                    text
                )));
            }
            end
        }
    };

    Ok((&text[..end], &text[end..]))
}

/// Fold the data parts of a record's lines into a token list.
///
/// The returned tokens are the raw lexemes between delimiters; blank
/// tokens stand for defaulted parameters.
pub fn parse_free_format(lines: &[&str], p_delim: char, r_delim: char) -> Result<Vec<String>> {
    let connected: String = lines.concat();

    let mut tokens = Vec::new();
    let mut rest = connected.as_str();
    loop {
        let (token, after) = next_token(rest, p_delim, r_delim)?;
        tokens.push(token.to_string());

        if after.starts_with(r_delim) {
            // anything past the record delimiter is comment
            break;
        }
        rest = &after[p_delim.len_utf8()..];
        if rest.is_empty() {
            return Err(IgesError::SectionFormat(format!(
                "no record delimiter '{}' found in free-format data: '{}'",
                r_delim, connected
            )));
        }
    }
    Ok(tokens)
}

/// Append a String token to the current line, splitting only after the
/// 'H' marker; the `NH` prefix always stays on one line.
fn append_string_token(
    lines: &mut Vec<String>,
    current: &mut String,
    token: &str,
    width: usize,
) -> Result<()> {
    if token.is_empty() {
        if current.len() + 1 > width {
            lines.push(std::mem::take(current));
        }
        return Ok(());
    }

    let h_pos = token.find('H').ok_or_else(|| {
        IgesError::DataFormat(format!("invalid string parameter format: '{}'", token))
    })?;

    if !current.is_empty() && (current.len() + token.len()) % width == 0 {
        // the token would end exactly at the line boundary, leaving no
        // room for its trailing delimiter on the same line
        pad_to(current, width);
        lines.push(std::mem::take(current));
    } else if current.len() + h_pos + 1 > width {
        // not even the prefix and the 'H' fit
        pad_to(current, width);
        lines.push(std::mem::take(current));
    }

    let mut pos = 0;
    while pos < token.len() {
        if current.len() == width {
            lines.push(std::mem::take(current));
        }
        let take = (width - current.len()).min(token.len() - pos);
        current.push_str(&token[pos..pos + take]);
        pos += take;
    }
    if current.len() == width {
        lines.push(std::mem::take(current));
    }
    Ok(())
}

fn pad_to(line: &mut String, width: usize) {
    while line.len() < width {
        line.push(' ');
    }
}

/// Unfold a token list into fixed-width lines.
///
/// Lines are exactly `width` characters, right-padded with spaces; the
/// break always falls between tokens except inside a String payload,
/// which may split after its 'H'. The record delimiter is the last
/// non-pad byte of the last line.
pub fn to_free_format_lines(
    tokens: &[String],
    types: &[ParameterType],
    width: usize,
    p_delim: char,
    r_delim: char,
) -> Result<Vec<String>> {
    if tokens.len() != types.len() {
        return Err(IgesError::Implementation(format!(
            "token and type counts differ: {} != {}",
            tokens.len(),
            types.len()
        )));
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for (i, (token, ty)) in tokens.iter().zip(types.iter()).enumerate() {
        let token = ltrim(token);
        if *ty == ParameterType::String {
            append_string_token(&mut lines, &mut current, token, width)?;
        } else {
            if current.len() + token.len() + 1 > width {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(token);
        }
        if i + 1 < tokens.len() {
            current.push(p_delim);
        }
    }
    current.push(r_delim);
    lines.push(current);

    for l in &mut lines {
        pad_to(l, width);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_record() {
        let tokens = parse_free_format(&["100,0.,0.,0.,2.,0.,-2.,0.;"], ',', ';').unwrap();
        assert_eq!(
            tokens,
            vec!["100", "0.", "0.", "0.", "2.", "0.", "-2.", "0."]
        );
    }

    #[test]
    fn test_parse_across_lines() {
        let tokens =
            parse_free_format(&["126,3,3,0,0,", "0,0,1.;"], ',', ';').unwrap();
        assert_eq!(tokens.len(), 8);
        assert_eq!(tokens[7], "1.");
    }

    #[test]
    fn test_string_may_contain_delimiters() {
        let tokens = parse_free_format(&["5H,;,;,,3Hab;;"], ',', ';').unwrap();
        assert_eq!(tokens, vec!["5H,;,;,", "3Hab;"]);

        // and under alternative delimiters as well
        let tokens = parse_free_format(&["2H/%/1.5%"], '/', '%').unwrap();
        assert_eq!(tokens, vec!["2H/%", "1.5"]);
    }

    #[test]
    fn test_comment_after_record_delimiter_is_dropped() {
        let tokens = parse_free_format(&["1,2; this is a comment"], ',', ';').unwrap();
        assert_eq!(tokens, vec!["1", "2"]);
    }

    #[test]
    fn test_missing_record_delimiter_fails() {
        assert!(parse_free_format(&["1,2,3"], ',', ';').is_err());
        assert!(parse_free_format(&["1,2,"], ',', ';').is_err());
    }

    #[test]
    fn test_overlong_string_fails() {
        assert!(parse_free_format(&["10Habc;"], ',', ';').is_err());
    }

    #[test]
    fn test_blank_tokens_preserved() {
        let tokens = parse_free_format(&["1,,3,;"], ',', ';').unwrap();
        assert_eq!(tokens, vec!["1", "", "3", ""]);
    }

    #[test]
    fn test_emit_pads_to_width() {
        let tokens: Vec<String> = vec!["100".into(), "0.".into(), "2.".into()];
        let types = vec![ParameterType::Integer, ParameterType::Real, ParameterType::Real];
        let lines = to_free_format_lines(&tokens, &types, 64, ',', ';').unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 64);
        assert_eq!(lines[0].trim_end(), "100,0.,2.;");
    }

    #[test]
    fn test_emit_breaks_between_tokens() {
        let tokens: Vec<String> = (0..30).map(|i| format!("{}", 100000 + i)).collect();
        let types = vec![ParameterType::Integer; 30];
        let lines = to_free_format_lines(&tokens, &types, 20, ',', ';').unwrap();
        for l in &lines {
            assert_eq!(l.len(), 20);
        }
        // every break falls after a delimiter
        for l in &lines[..lines.len() - 1] {
            assert!(l.trim_end().ends_with(','));
        }
    }

    #[test]
    fn test_emit_splits_strings_after_h() {
        let text = "but depth of life.";
        let tokens: Vec<String> = vec!["-0.1234".into(), format!("{}H{}", text.len(), text)];
        let types = vec![ParameterType::Real, ParameterType::String];
        let lines = to_free_format_lines(&tokens, &types, 10, ',', ';').unwrap();
        // the prefix "18H" must not be separated from its digits
        assert_eq!(lines[0].trim_end(), "-0.1234,");
        assert!(lines[1].starts_with("18H"));
        let rejoined: String = lines
            .iter()
            .map(|l| l.as_str())
            .collect::<String>();
        assert!(rejoined.contains("18Hbut dep"));
    }

    #[test]
    fn test_emit_parse_round_trip() {
        let tokens: Vec<String> = vec![
            "110".into(),
            "1.5".into(),
            "".into(),
            "7Hlabel,;".into(),
            "-3".into(),
        ];
        let types = vec![
            ParameterType::Integer,
            ParameterType::Real,
            ParameterType::String,
            ParameterType::String,
            ParameterType::Integer,
        ];
        let lines = to_free_format_lines(&tokens, &types, 64, ',', ';').unwrap();
        let parts: Vec<&str> = lines.iter().map(|l| l.as_str()).collect();
        let parsed = parse_free_format(&parts, ',', ';').unwrap();
        assert_eq!(parsed, tokens);
    }
}
