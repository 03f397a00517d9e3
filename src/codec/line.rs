//! Byte-level line codec.
//!
//! An IGES file is a sequence of 80-column lines (the compressed Data
//! section, which this crate rejects, is the single exception). Column 73
//! classifies the section and columns 74-80 carry the per-section
//! sequence number. The [`LineReader`] detects the file's line terminator
//! from the first line, enforces the column discipline, and asserts the
//! Start -> Global -> Directory -> Parameter -> Terminate ordering.

use crate::codec::scalar::{parse_integer, parse_pointer};
use crate::error::{IgesError, Result};

/// Column count of every non-compressed line
pub const MAX_COLUMN: usize = 80;
/// 1-based column of the section identification character
pub const COL_IDENTIFY: usize = 73;
/// 1-based column where the PD back-pointer to the DE section starts
pub const COL_DE_POINTER: usize = 65;
/// Width of the Terminate section data part
pub const TERMINATE_DATA_WIDTH: usize = 32;
/// Width of the fixed fields in the DE section and the PD suffix
pub const FIELD_WIDTH: usize = 8;

/// The six ordered partitions of an IGES file (plus the compressed-form
/// Data section, which the codec detects and refuses)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Flag section, first line of the compressed form ('C')
    Flag,
    /// Start section ('S')
    Start,
    /// Global section ('G')
    Global,
    /// Directory Entry section ('D')
    Directory,
    /// Parameter Data section ('P')
    Parameter,
    /// Terminate section ('T')
    Terminate,
    /// Data section of the compressed form (no identifier column)
    Data,
}

impl SectionKind {
    /// Section identification character (column 73)
    pub fn identifier(self) -> char {
        match self {
            SectionKind::Flag => 'C',
            SectionKind::Start => 'S',
            SectionKind::Global => 'G',
            SectionKind::Directory => 'D',
            SectionKind::Parameter => 'P',
            SectionKind::Terminate => 'T',
            SectionKind::Data => ' ',
        }
    }

    /// Section for an identification character
    pub fn from_identifier(c: char) -> Result<Self> {
        match c {
            'C' => Ok(SectionKind::Flag),
            'S' => Ok(SectionKind::Start),
            'G' => Ok(SectionKind::Global),
            'D' => Ok(SectionKind::Directory),
            'P' => Ok(SectionKind::Parameter),
            'T' => Ok(SectionKind::Terminate),
            other => Err(IgesError::SectionFormat(format!(
                "unknown section character: '{}'",
                other
            ))),
        }
    }

    /// Human-readable section name
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Flag => "Flag",
            SectionKind::Start => "Start",
            SectionKind::Global => "Global",
            SectionKind::Directory => "Directory Entry",
            SectionKind::Parameter => "Parameter Data",
            SectionKind::Terminate => "Terminate",
            SectionKind::Data => "Data",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One classified physical line
#[derive(Debug, Clone)]
pub struct RawLine {
    /// Full line text without the terminator
    pub text: String,
    /// Section the line belongs to
    pub section: SectionKind,
    /// Sequence number from columns 74-80 (0 for compressed Data lines)
    pub sequence: u32,
    /// 1-based physical line number in the file
    pub line_number: usize,
}

/// Assert the width rule for a single line
pub fn assert_line_width(line: &str, compressed: bool, line_number: usize) -> Result<()> {
    let len = line.len();
    if len > MAX_COLUMN {
        return Err(IgesError::LineFormat(format!(
            "line {} is {} characters long, the limit is {}: '{}'",
            line_number, len, MAX_COLUMN, line
        )));
    }
    if len < MAX_COLUMN {
        if !compressed {
            return Err(IgesError::LineFormat(format!(
                "line {} must be exactly {} characters long, found {}: '{}'",
                line_number, MAX_COLUMN, len, line
            )));
        }
        if len >= COL_IDENTIFY {
            // compressed data lines stay below the identifier column
            return Err(IgesError::LineFormat(format!(
                "line {} has {} characters; no IGES line is between {} and {} characters long",
                line_number,
                len,
                COL_IDENTIFY - 1,
                MAX_COLUMN
            )));
        }
    }
    Ok(())
}

/// Classify a line by its identifier column
pub fn section_of(line: &str, compressed: bool, line_number: usize) -> Result<SectionKind> {
    assert_line_width(line, compressed, line_number)?;
    if line.len() < COL_IDENTIFY {
        return Ok(SectionKind::Data);
    }

    let c = line.as_bytes()[COL_IDENTIFY - 1] as char;
    if compressed && (c == 'D' || c == 'P') {
        return Err(IgesError::SectionFormat(format!(
            "line {}: the compressed form has no '{}' section lines",
            line_number, c
        )));
    }
    SectionKind::from_identifier(c).map_err(|_| {
        IgesError::SectionFormat(format!(
            "line {}: unknown section character '{}' in column {}",
            line_number, c, COL_IDENTIFY
        ))
    })
}

/// Extract the sequence number from columns 74-80
pub fn sequence_of(line: &str, line_number: usize) -> Result<u32> {
    let field = &line[COL_IDENTIFY..MAX_COLUMN];
    match parse_integer(field, None) {
        Ok(v) if v > 0 => Ok(v as u32),
        Ok(v) => Err(IgesError::SectionFormat(format!(
            "line {}: sequence number must be positive, found {}",
            line_number, v
        ))),
        Err(_) => Err(IgesError::SectionFormat(format!(
            "line {}: invalid sequence number: '{}'",
            line_number, field
        ))),
    }
}

/// Data part of a line for the given section: columns 1-72 for Start and
/// Global, 1-64 for Parameter, 1-32 for Terminate
pub fn data_part(line: &str, section: SectionKind) -> Result<&str> {
    let too_short = |need: usize| {
        IgesError::LineFormat(format!(
            "line is too short for the {} section (need {} columns): '{}'",
            section, need, line
        ))
    };
    match section {
        SectionKind::Flag => Ok(""),
        SectionKind::Terminate => line
            .get(..TERMINATE_DATA_WIDTH)
            .ok_or_else(|| too_short(TERMINATE_DATA_WIDTH)),
        SectionKind::Parameter => line
            .get(..COL_DE_POINTER - 1)
            .ok_or_else(|| too_short(COL_DE_POINTER - 1)),
        SectionKind::Data => Ok(line),
        _ => line
            .get(..COL_IDENTIFY - 1)
            .ok_or_else(|| too_short(COL_IDENTIFY - 1)),
    }
}

/// DE back-pointer of a Parameter section line (columns 65-72)
pub fn de_pointer_of(line: &str, line_number: usize) -> Result<u32> {
    let field = &line[COL_DE_POINTER - 1..COL_DE_POINTER - 1 + FIELD_WIDTH];
    match parse_pointer(field, None) {
        Ok(v) if v > 0 => Ok(v as u32),
        _ => Err(IgesError::SectionFormat(format!(
            "line {}: invalid DE back-pointer: '{}'",
            line_number, field
        ))),
    }
}

/// Section ordering automaton.
///
/// The uncompressed order is Start -> Global -> Directory -> Parameter ->
/// Terminate; the compressed order is Flag -> Start -> Global -> Data ->
/// Terminate. Within a section, sequence numbers are consecutive
/// ascending from 1 (Data lines carry no sequence number).
fn order_is_valid(
    section: SectionKind,
    sequence: u32,
    prev: Option<(SectionKind, u32)>,
) -> bool {
    let (prev_section, prev_sequence) = match prev {
        None => {
            return (section == SectionKind::Flag || section == SectionKind::Start)
                && sequence == 1;
        }
        Some(p) => p,
    };

    if prev_section == section {
        if section == SectionKind::Data {
            return true;
        }
        return sequence == prev_sequence + 1;
    }
    if sequence != 1 && section != SectionKind::Data {
        return false;
    }

    match prev_section {
        SectionKind::Flag => section == SectionKind::Start,
        SectionKind::Start => section == SectionKind::Global,
        SectionKind::Global => {
            section == SectionKind::Directory || section == SectionKind::Data
        }
        SectionKind::Directory => section == SectionKind::Parameter,
        SectionKind::Parameter => section == SectionKind::Terminate,
        SectionKind::Data => section == SectionKind::Terminate,
        SectionKind::Terminate => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Terminator {
    CrLf,
    Cr,
    Lf,
}

impl Terminator {
    fn bytes(self) -> &'static [u8] {
        match self {
            Terminator::CrLf => b"\r\n",
            Terminator::Cr => b"\r",
            Terminator::Lf => b"\n",
        }
    }
}

/// Streaming reader that yields classified lines and enforces ordering.
///
/// One line of lookahead is available through [`LineReader::peek`] so the
/// section reader can switch on the next section without consuming it.
pub struct LineReader {
    data: Vec<u8>,
    pos: usize,
    terminator: Terminator,
    compressed: bool,
    prev: Option<(SectionKind, u32)>,
    line_number: usize,
    pooled: Option<RawLine>,
    finished: bool,
}

impl LineReader {
    /// Open a file, checking that the path names a regular file
    pub fn open(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Err(IgesError::FileOpen(format!(
                "the file does not exist: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(IgesError::FileOpen(format!(
                "the path is not a regular file: {}",
                path.display()
            )));
        }
        let data = std::fs::read(path)
            .map_err(|e| IgesError::FileOpen(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Wrap in-memory bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() < MAX_COLUMN {
            return Err(IgesError::LineFormat(format!(
                "the first line is shorter than {} characters; not an IGES file",
                MAX_COLUMN
            )));
        }

        let compressed = data[COL_IDENTIFY - 1] == b'C';
        let terminator = match (data.get(MAX_COLUMN), data.get(MAX_COLUMN + 1)) {
            (Some(b'\r'), Some(b'\n')) => Terminator::CrLf,
            (Some(b'\r'), _) => Terminator::Cr,
            (Some(b'\n'), _) => Terminator::Lf,
            _ => {
                return Err(IgesError::LineFormat(
                    "failed to detect the line terminator after the first line".to_string(),
                ))
            }
        };
        log::debug!(
            "line reader: terminator {:?}, compressed: {}",
            terminator,
            compressed
        );

        Ok(LineReader {
            data,
            pos: 0,
            terminator,
            compressed,
            prev: None,
            line_number: 0,
            pooled: None,
            finished: false,
        })
    }

    /// True when the first line carries the compressed-form flag
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Next classified line, or `None` past the Terminate section / EOF
    pub fn next_line(&mut self) -> Result<Option<RawLine>> {
        if let Some(line) = self.pooled.take() {
            return Ok(Some(line));
        }
        self.read_line()
    }

    /// Look at the next line without consuming it
    pub fn peek(&mut self) -> Result<Option<&RawLine>> {
        if self.pooled.is_none() {
            self.pooled = self.read_line()?;
        }
        Ok(self.pooled.as_ref())
    }

    fn read_line(&mut self) -> Result<Option<RawLine>> {
        if self.finished || self.pos >= self.data.len() {
            return Ok(None);
        }

        self.line_number += 1;
        let rest = &self.data[self.pos..];
        let term = self.terminator.bytes();
        let (raw, consumed) = match find_terminator(rest, term) {
            Some(at) => (&rest[..at], at + term.len()),
            None => (rest, rest.len()),
        };
        if raw.len() > MAX_COLUMN {
            return Err(IgesError::LineFormat(format!(
                "line {}: no line terminator within {} characters",
                self.line_number, MAX_COLUMN
            )));
        }
        self.pos += consumed;

        let text = String::from_utf8_lossy(raw).into_owned();
        let section = section_of(&text, self.compressed, self.line_number)?;
        let sequence = if section == SectionKind::Data {
            0
        } else {
            sequence_of(&text, self.line_number)?
        };

        if !order_is_valid(section, sequence, self.prev) {
            return Err(match self.prev {
                None => IgesError::SectionFormat(format!(
                    "invalid section or sequence number on the first line: {} {}",
                    section, sequence
                )),
                Some((ps, pn)) => IgesError::SectionFormat(format!(
                    "invalid section order at line {}: from ({}, {}) to ({}, {})",
                    self.line_number, ps, pn, section, sequence
                )),
            });
        }
        self.prev = Some((section, sequence));

        if section == SectionKind::Terminate {
            // the Terminate section is a single line; trailing bytes are
            // ignored
            self.finished = true;
        }

        Ok(Some(RawLine {
            text,
            section,
            sequence,
            line_number: self.line_number,
        }))
    }
}

fn find_terminator(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() == 1 {
        return haystack.iter().position(|&b| b == needle[0]);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
