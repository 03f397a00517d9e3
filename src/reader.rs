//! Reading IGES files.
//!
//! [`SectionReader`] is a stateful pull parser over the line codec: one
//! call per section (or per record for the DE and PD sections), in file
//! order. Each method returns `None` once its section is exhausted or
//! when the file has not yet reached it, so section order is an
//! observable guarantee. [`read_iges_intermediate`] drives the pull
//! parser to the token-level model; [`read_iges`] resolves it into the
//! entity graph.

use std::path::Path;

use crate::codec::free_format::parse_free_format;
use crate::codec::line::{
    data_part, de_pointer_of, LineReader, RawLine, SectionKind, FIELD_WIDTH,
    TERMINATE_DATA_WIDTH,
};
use crate::codec::scalar::{parse_integer, rtrim};
use crate::codec::validation::validate_directory_entry;
use crate::error::{IgesError, Result};
use crate::model::directory::DirectoryEntry;
use crate::model::global::{is_valid_delimiter, GlobalRecord};
use crate::model::intermediate::IntermediateModel;
use crate::model::parameter::RawParameterData;
use crate::model::resolved::ResolvedModel;

/// Extract the parameter delimiter from the first Global data part
fn parameter_delimiter(line: &str) -> Result<char> {
    let bytes = line.as_bytes();
    if bytes.first() == Some(&b',') {
        return Ok(',');
    }
    if line.len() < 4 {
        return Err(IgesError::LineFormat(format!(
            "the first Global line is too short to declare delimiters: '{}'",
            line
        )));
    }
    if &line[..2] != "1H" {
        return Err(IgesError::SectionFormat(format!(
            "the Global section must start with ',' or a '1H' delimiter declaration: '{}'",
            line
        )));
    }
    if bytes[2] != bytes[3] {
        return Err(IgesError::SectionFormat(format!(
            "the declared parameter delimiter is not followed by itself: '{}'",
            line
        )));
    }
    let delim = bytes[2] as char;
    if !is_valid_delimiter(delim) {
        return Err(IgesError::SectionFormat(format!(
            "'{}' may not serve as a parameter delimiter",
            delim
        )));
    }
    Ok(delim)
}

/// Extract the record delimiter, given the parameter delimiter
fn record_delimiter(line: &str, p_delim: char) -> Result<char> {
    let malformed = || {
        IgesError::SectionFormat(format!(
            "the record delimiter is incorrectly declared on the first Global line: '{}'",
            line
        ))
    };

    // skip over a '1Hα' parameter-delimiter declaration
    let mut first = line.find(p_delim).ok_or_else(malformed)?;
    if line.starts_with("1H") && line.as_bytes()[2] as char == p_delim {
        first = line[first + 1..]
            .find(p_delim)
            .map(|at| first + 1 + at)
            .ok_or_else(malformed)?;
    }
    let second = line[first + 1..]
        .find(p_delim)
        .map(|at| first + 1 + at)
        .ok_or_else(malformed)?;

    let declaration = &line[first + 1..second];
    if declaration.is_empty() {
        return Ok(';');
    }
    let name = crate::codec::scalar::parse_string(declaration, None).map_err(|_| malformed())?;
    let delim = match (name.len(), name.chars().next()) {
        (1, Some(c)) if is_valid_delimiter(c) => c,
        _ => {
            return Err(IgesError::SectionFormat(format!(
                "'{}' may not serve as a record delimiter",
                name
            )))
        }
    };
    Ok(delim)
}

/// Drop the two delimiter declarations from the first Global data part.
/// Four spellings are possible: `,,` (both defaulted), `1Hα α 1Hβ α`,
/// `1Hα α α` (record defaulted) and `α 1Hβ α` (parameter defaulted).
fn strip_delimiter_declarations(line: &str, p_delim: char, r_delim: char) -> Result<&str> {
    if let Some(rest) = line.strip_prefix(",,") {
        return Ok(rest);
    }
    let declared_param = format!("1H{}{}", p_delim, p_delim);
    let declared_record = format!("1H{}{}", r_delim, p_delim);

    let both = format!("{}{}", declared_param, declared_record);
    if let Some(rest) = line.strip_prefix(&both) {
        return Ok(rest);
    }
    let param_only = format!("{}{}", declared_param, p_delim);
    if let Some(rest) = line.strip_prefix(&param_only) {
        return Ok(rest);
    }
    let record_only = format!("{}{}", p_delim, declared_record);
    if let Some(rest) = line.strip_prefix(&record_only) {
        return Ok(rest);
    }
    Err(IgesError::SectionFormat(format!(
        "invalid delimiter declarations on the first Global line: '{}'",
        line
    )))
}

/// Stateful pull parser over the six sections of a file
pub struct SectionReader {
    lines: LineReader,
    param_delim: char,
    record_delim: char,
}

impl SectionReader {
    /// Open a file. Compressed files (column 73 of the first line is
    /// 'C') are detected and refused.
    pub fn open(path: &Path) -> Result<Self> {
        Self::wrap(LineReader::open(path)?)
    }

    /// Read from in-memory bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::wrap(LineReader::from_bytes(bytes)?)
    }

    fn wrap(lines: LineReader) -> Result<Self> {
        if lines.is_compressed() {
            return Err(IgesError::NotImplemented(
                "compressed IGES files are not supported; use the uncompressed ASCII form"
                    .to_string(),
            ));
        }
        Ok(SectionReader {
            lines,
            param_delim: ',',
            record_delim: ';',
        })
    }

    /// The parameter delimiter (valid once the Global section is read)
    pub fn parameter_delimiter(&self) -> char {
        self.param_delim
    }

    /// The record delimiter (valid once the Global section is read)
    pub fn record_delimiter(&self) -> char {
        self.record_delim
    }

    /// Section of the next unconsumed line, `None` at end of file
    pub fn next_section(&mut self) -> Result<Option<SectionKind>> {
        Ok(self.lines.peek()?.map(|l| l.section))
    }

    /// Consume the next line only if it belongs to `section`
    fn next_of(&mut self, section: SectionKind) -> Result<Option<RawLine>> {
        match self.lines.peek()? {
            Some(line) if line.section == section => self.lines.next_line(),
            _ => Ok(None),
        }
    }

    /// Read the whole Start section. `None` when the Start section was
    /// already consumed.
    pub fn read_start_section(&mut self) -> Result<Option<String>> {
        let mut text = String::new();
        let mut any = false;
        while let Some(line) = self.next_of(SectionKind::Start)? {
            any = true;
            text.push_str(data_part(&line.text, SectionKind::Start)?);
        }
        if !any {
            return Ok(None);
        }
        Ok(Some(rtrim(&text).to_string()))
    }

    /// Read the whole Global section. `None` before the Start section
    /// has been read or once Global is consumed.
    pub fn read_global_section(&mut self) -> Result<Option<GlobalRecord>> {
        let mut parts: Vec<String> = Vec::new();
        while let Some(line) = self.next_of(SectionKind::Global)? {
            parts.push(data_part(&line.text, SectionKind::Global)?.to_string());
        }
        if parts.is_empty() {
            return Ok(None);
        }

        self.param_delim = parameter_delimiter(&parts[0])?;
        self.record_delim = record_delimiter(&parts[0], self.param_delim)?;
        parts[0] =
            strip_delimiter_declarations(&parts[0], self.param_delim, self.record_delim)?
                .to_string();
        log::debug!(
            "global section: parameter delimiter {:?}, record delimiter {:?}",
            self.param_delim,
            self.record_delim
        );

        let refs: Vec<&str> = parts.iter().map(|p| p.as_str()).collect();
        let tokens = parse_free_format(&refs, self.param_delim, self.record_delim)?;
        GlobalRecord::from_tokens(self.param_delim, self.record_delim, &tokens).map(Some)
    }

    /// Read one DE record (two physical lines). `None` before the
    /// Directory section or once it is exhausted.
    pub fn read_directory_record(&mut self) -> Result<Option<DirectoryEntry>> {
        let first = match self.next_of(SectionKind::Directory)? {
            Some(line) => line,
            None => return Ok(None),
        };
        let second = self.next_of(SectionKind::Directory)?.ok_or_else(|| {
            IgesError::SectionFormat(format!(
                "a directory entry record comprises two lines, but the line after '{}' is missing",
                first.text
            ))
        })?;
        crate::codec::directory::parse_directory_record(&first.text, &second.text).map(Some)
    }

    /// Read one PD record (one or more physical lines sharing the same
    /// DE back-pointer). `None` before the Parameter section or once it
    /// is exhausted.
    pub fn read_parameter_record(&mut self) -> Result<Option<RawParameterData>> {
        let first = match self.next_of(SectionKind::Parameter)? {
            Some(line) => line,
            None => return Ok(None),
        };
        let de_pointer = de_pointer_of(&first.text, first.line_number)?;
        let sequence_number = first.sequence;

        let mut parts = vec![data_part(&first.text, SectionKind::Parameter)?.to_string()];
        while let Some(line) = self.lines.peek()? {
            if line.section != SectionKind::Parameter
                || de_pointer_of(&line.text, line.line_number)? != de_pointer
            {
                break;
            }
            let line = self.lines.next_line()?.ok_or_else(|| {
                IgesError::Implementation("a peeked line disappeared before reading".to_string())
            })?;
            parts.push(data_part(&line.text, SectionKind::Parameter)?.to_string());
        }

        let refs: Vec<&str> = parts.iter().map(|p| p.as_str()).collect();
        let tokens = parse_free_format(&refs, self.param_delim, self.record_delim)?;
        RawParameterData::from_tokens(de_pointer, sequence_number, &tokens).map(Some)
    }

    /// Read the Terminate section: the Start, Global, DE and PD line
    /// counts.
    pub fn read_terminate_section(&mut self) -> Result<Option<[u32; 4]>> {
        let line = match self.next_of(SectionKind::Terminate)? {
            Some(line) => line,
            None => return Ok(None),
        };
        let data = data_part(&line.text, SectionKind::Terminate)?;
        let bytes = data.as_bytes();
        let w = FIELD_WIDTH;
        debug_assert_eq!(TERMINATE_DATA_WIDTH, 4 * w);

        if bytes[0] != b'S' || bytes[w] != b'G' || bytes[2 * w] != b'D' || bytes[3 * w] != b'P' {
            return Err(IgesError::SectionFormat(format!(
                "invalid terminate section layout: '{}'",
                data
            )));
        }
        let count = |at: usize| -> Result<u32> {
            parse_integer(&data[at * w + 1..(at + 1) * w], None)
                .ok()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    IgesError::SectionFormat(format!(
                        "invalid terminate section count: '{}'",
                        &data[at * w + 1..(at + 1) * w]
                    ))
                })
        };
        Ok(Some([count(0)?, count(1)?, count(2)?, count(3)?]))
    }
}

/// Read a file into the intermediate (token-level) model.
///
/// With `strict` set, every DE record is checked against the per-type
/// field constraints of the specification; files in the wild frequently
/// violate them, so tolerant mode is the default entry point for
/// interchange.
pub fn read_iges_intermediate(path: impl AsRef<Path>, strict: bool) -> Result<IntermediateModel> {
    let path = path.as_ref();
    let mut reader = SectionReader::open(path)?;
    log::debug!("reading {}", path.display());

    let start = reader.read_start_section()?.ok_or_else(|| {
        IgesError::SectionFormat(format!("no Start section in {}", path.display()))
    })?;
    let global = reader.read_global_section()?.ok_or_else(|| {
        IgesError::SectionFormat(format!("no Global section in {}", path.display()))
    })?;

    let mut directory = Vec::new();
    while let Some(de) = reader.read_directory_record()? {
        if strict {
            validate_directory_entry(&de)?;
        }
        directory.push(de);
    }

    let mut parameters = Vec::new();
    while let Some(pd) = reader.read_parameter_record()? {
        parameters.push(pd);
    }

    let terminate = reader.read_terminate_section()?.ok_or_else(|| {
        IgesError::SectionFormat(format!("no Terminate section in {}", path.display()))
    })?;

    log::debug!(
        "read {} directory entries, {} parameter data records",
        directory.len(),
        parameters.len()
    );
    Ok(IntermediateModel {
        start,
        global,
        directory,
        parameters,
        terminate,
    })
}

/// Read a file into the resolved entity graph
pub fn read_iges(path: impl AsRef<Path>, strict: bool) -> Result<ResolvedModel> {
    let intermediate = read_iges_intermediate(path, strict)?;
    ResolvedModel::from_intermediate(&intermediate)
}
