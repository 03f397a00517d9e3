//! Writing IGES files.
//!
//! The writer serialises an intermediate model back to 80-column lines:
//! PD records first (which fixes their first-line numbers and line
//! counts), then the DE section with consistent pointers, the Start and
//! Global sections, and a Terminate line carrying the per-section line
//! counts. No bytes reach the file system until the whole byte image is
//! prepared.

use std::path::Path;

use crate::codec::free_format::to_free_format_lines;
use crate::codec::line::{COL_DE_POINTER, COL_IDENTIFY, FIELD_WIDTH};
use crate::codec::scalar::emit_value;
use crate::error::{IgesError, Result};
use crate::model::intermediate::IntermediateModel;
use crate::model::parameter::RawParameterData;
use crate::model::resolved::ResolvedModel;
use crate::model::scalar::ParameterType;

/// Sequence-number suffix for columns 73-80: section character plus a
/// zero-padded 7-digit number
fn sequence_suffix(section: char, sequence: u32) -> String {
    format!("{}{:07}", section, sequence)
}

/// Verify that the DE sequence numbers form the progression 1, 3, 5, ...
/// and return them in ascending order
fn sorted_de_sequence_numbers(model: &IntermediateModel) -> Result<Vec<u32>> {
    let mut numbers: Vec<u32> = model
        .directory
        .iter()
        .map(|de| de.sequence_number)
        .collect();
    numbers.sort_unstable();

    let valid = !numbers.is_empty()
        && numbers
            .iter()
            .enumerate()
            .all(|(i, &n)| n == 2 * i as u32 + 1);
    if !valid && !numbers.is_empty() {
        return Err(IgesError::DataFormat(format!(
            "directory entry sequence numbers must be the odd progression 1, 3, 5, ...; found {:?}",
            numbers
        )));
    }
    Ok(numbers)
}

/// Tokens and token types of a PD record, with the entity type prepended
fn pd_tokens(pd: &RawParameterData) -> Result<(Vec<String>, Vec<ParameterType>)> {
    let mut tokens = Vec::with_capacity(pd.params.len() + 1);
    let mut types = Vec::with_capacity(pd.params.len() + 1);
    tokens.push(pd.entity_type.to_string());
    types.push(ParameterType::Integer);
    for (value, format) in pd.params.iter() {
        tokens.push(emit_value(value, format)?);
        types.push(format.parameter_type);
    }
    Ok((tokens, types))
}

struct SerializedPd {
    lines: Vec<String>,
    first_line_numbers: Vec<u32>,
    line_counts: Vec<u32>,
}

/// Serialise the PD section in DE order, recording each record's first
/// line number and line count
fn serialize_pd_section(
    model: &IntermediateModel,
    de_sequence_numbers: &[u32],
) -> Result<SerializedPd> {
    let p_delim = model.global.param_delim;
    let r_delim = model.global.record_delim;

    let mut out = SerializedPd {
        lines: Vec::new(),
        first_line_numbers: Vec::with_capacity(de_sequence_numbers.len()),
        line_counts: Vec::with_capacity(de_sequence_numbers.len()),
    };

    let mut next_line = 1u32;
    for &de_seq in de_sequence_numbers {
        let pd = model
            .parameters
            .iter()
            .find(|pd| pd.de_pointer == de_seq)
            .ok_or_else(|| {
                IgesError::DataFormat(format!(
                    "no parameter data record for DE sequence number {}",
                    de_seq
                ))
            })?;

        let (tokens, types) = pd_tokens(pd)?;
        let lines = to_free_format_lines(&tokens, &types, COL_DE_POINTER - 1, p_delim, r_delim)?;

        out.first_line_numbers.push(next_line);
        out.line_counts.push(lines.len() as u32);
        for line in lines {
            out.lines.push(format!(
                "{}{:>width$}{}",
                line,
                de_seq,
                sequence_suffix('P', next_line),
                width = FIELD_WIDTH
            ));
            next_line += 1;
        }
    }
    Ok(out)
}

/// Serialise the DE section with the PD pointers and line counts fixed
/// by the PD pass
fn serialize_de_section(model: &IntermediateModel, pd: &SerializedPd) -> Result<Vec<String>> {
    // records are written in ascending sequence order
    let mut ordered: Vec<&crate::model::directory::DirectoryEntry> =
        model.directory.iter().collect();
    ordered.sort_by_key(|de| de.sequence_number);

    let mut lines = Vec::with_capacity(ordered.len() * 2);
    for (i, de) in ordered.iter().enumerate() {
        let (first, second) = crate::codec::directory::emit_directory_record(
            de,
            pd.first_line_numbers[i],
            2 * i as u32 + 1,
            pd.line_counts[i],
        );
        lines.push(first);
        lines.push(second);
    }
    Ok(lines)
}

/// Wrap the Start text at 72 columns; empty text still yields one line
fn serialize_start_section(start: &str) -> Vec<String> {
    let width = COL_IDENTIFY - 1;
    let mut lines = Vec::new();
    if start.is_empty() {
        lines.push(format!("{:width$}{}", "", sequence_suffix('S', 1), width = width));
        return lines;
    }

    let bytes = start.as_bytes();
    let mut at = 0usize;
    let mut seq = 1u32;
    while at < bytes.len() {
        let end = (at + width).min(bytes.len());
        let chunk = String::from_utf8_lossy(&bytes[at..end]);
        lines.push(format!(
            "{:<width$}{}",
            chunk,
            sequence_suffix('S', seq),
            width = width
        ));
        at = end;
        seq += 1;
    }
    lines
}

/// Serialise the Global section, regenerating the file name, library
/// identity and timestamps
fn serialize_global_section(model: &IntermediateModel, file_name: &str) -> Result<Vec<String>> {
    let params = model.global.to_parameters(Some(file_name));
    let mut tokens = Vec::with_capacity(params.len());
    let mut types = Vec::with_capacity(params.len());
    for (value, format) in params.iter() {
        tokens.push(emit_value(value, format)?);
        types.push(format.parameter_type);
    }

    let lines = to_free_format_lines(
        &tokens,
        &types,
        COL_IDENTIFY - 1,
        model.global.param_delim,
        model.global.record_delim,
    )?;
    Ok(lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| format!("{}{}", line, sequence_suffix('G', i as u32 + 1)))
        .collect())
}

/// The single Terminate line
fn serialize_terminate_line(start: u32, global: u32, directory: u32, parameter: u32) -> String {
    let mut line = format!(
        "S{:07}G{:07}D{:07}P{:07}",
        start, global, directory, parameter
    );
    while line.len() < COL_IDENTIFY - 1 {
        line.push(' ');
    }
    line.push_str(&sequence_suffix('T', 1));
    line
}

/// Serialise a whole intermediate model to its byte image
pub fn serialize_intermediate(model: &IntermediateModel, file_name: &str) -> Result<Vec<u8>> {
    let de_sequence_numbers = sorted_de_sequence_numbers(model)?;
    let pd = serialize_pd_section(model, &de_sequence_numbers)?;
    let de_lines = serialize_de_section(model, &pd)?;
    let start_lines = serialize_start_section(&model.start);
    let global_lines = serialize_global_section(model, file_name)?;
    let terminate = serialize_terminate_line(
        start_lines.len() as u32,
        global_lines.len() as u32,
        de_lines.len() as u32,
        pd.lines.len() as u32,
    );

    let mut out = String::new();
    for line in start_lines
        .iter()
        .chain(global_lines.iter())
        .chain(de_lines.iter())
        .chain(pd.lines.iter())
        .chain(std::iter::once(&terminate))
    {
        out.push_str(line);
        out.push('\n');
    }
    Ok(out.into_bytes())
}

/// Write an intermediate model to `path`.
///
/// Missing parent directories are created; an existing file is
/// overwritten. The byte image is fully prepared before the file is
/// opened, so no partial file is produced on serialisation errors.
pub fn write_iges_intermediate(model: &IntermediateModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            IgesError::FileOpen(format!("invalid output path: {}", path.display()))
        })?;

    let bytes = serialize_intermediate(model, file_name)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                IgesError::FileOpen(format!(
                    "error creating directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    std::fs::write(path, &bytes)
        .map_err(|e| IgesError::FileOpen(format!("failed to write {}: {}", path.display(), e)))?;
    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Write a resolved model to `path`.
///
/// With `save_unsupported` false, the presence of any entity this crate
/// could not type fails before any bytes are written.
pub fn write_iges(
    model: &ResolvedModel,
    path: impl AsRef<Path>,
    save_unsupported: bool,
) -> Result<()> {
    let intermediate = model.to_intermediate(save_unsupported)?;
    write_iges_intermediate(&intermediate, path)
}
