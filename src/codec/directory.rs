//! Directory Entry section codec.
//!
//! Each DE record is two 80-column lines of ten 8-column fields. Fields
//! 3-8, 12, 13, 15 and 18 may be blank (defaulted); the entity type is
//! repeated on both lines and must match; columns 74-80 carry the 'D'
//! suffix with the record's sequence number.

use crate::codec::line::FIELD_WIDTH;
use crate::codec::scalar::{is_blank, ltrim, parse_integer, parse_pointer};
use crate::error::{IgesError, Result};
use crate::model::directory::{DirectoryEntry, EntityStatus};

fn field(line: &str, index: usize) -> &str {
    &line[index * FIELD_WIDTH..(index + 1) * FIELD_WIDTH]
}

fn field_name(first_line: bool, column: usize) -> &'static str {
    match (first_line, column) {
        (_, 1) => "EntityType",
        (_, 10) => "SequenceNumber",
        (true, 2) => "PDPointer",
        (true, 3) => "Structure",
        (true, 4) => "LineFontPattern",
        (true, 5) => "Level",
        (true, 6) => "View",
        (true, 7) => "TransformationMatrix",
        (true, 8) => "LabelDisplayAssociativity",
        (true, 9) => "Status",
        (false, 2) => "LineWeightNumber",
        (false, 3) => "ColorNumber",
        (false, 4) => "ParameterLineCount",
        (false, 5) => "FormNumber",
        (false, 6) | (false, 7) => "Reserved",
        (false, 8) => "EntityLabel",
        (false, 9) => "EntitySubscriptNumber",
        _ => "Unknown",
    }
}

fn locate(err: IgesError, first_line: bool, column: usize) -> IgesError {
    IgesError::TypeConversion(format!(
        "{} (on DE line {}, field {}; {})",
        err,
        if first_line { 1 } else { 2 },
        column,
        field_name(first_line, column)
    ))
}

/// Parse one DE record from its two physical lines
pub fn parse_directory_record(first: &str, second: &str) -> Result<DirectoryEntry> {
    let mut de = DirectoryEntry::default();

    // field 1/11: the entity type is written on both lines
    let type_first = parse_integer(field(first, 0), None).map_err(|e| locate(e, true, 1))?;
    let type_second = parse_integer(field(second, 0), None).map_err(|e| locate(e, false, 1))?;
    if type_first != type_second {
        return Err(IgesError::SectionFormat(format!(
            "entity type mismatch between DE lines: {} vs {}",
            type_first, type_second
        )));
    }
    de.entity_type = type_first;

    // line 1
    let pd_pointer = parse_pointer(field(first, 1), None).map_err(|e| locate(e, true, 2))?;
    de.parameter_data_pointer = u32::try_from(pd_pointer).map_err(|_| {
        locate(
            IgesError::TypeConversion(format!(
                "the parameter data pointer must not be negative, found {}",
                pd_pointer
            )),
            true,
            2,
        )
    })?;

    // fields 3-8 default to 0 when blank
    let defaultable = |col: usize| -> Result<(i32, bool)> {
        let raw = field(first, col - 1);
        let value = parse_integer(raw, Some(0)).map_err(|e| locate(e, true, col))?;
        Ok((value, is_blank(raw)))
    };
    let (value, blank) = defaultable(3)?;
    de.structure = value;
    de.set_is_default(3, blank);
    let (value, blank) = defaultable(4)?;
    de.line_font_pattern = value;
    de.set_is_default(4, blank);
    let (value, blank) = defaultable(5)?;
    de.level = value;
    de.set_is_default(5, blank);
    let (value, blank) = defaultable(6)?;
    de.view = value;
    de.set_is_default(6, blank);
    let (value, blank) = defaultable(7)?;
    de.transformation_matrix = value;
    de.set_is_default(7, blank);
    let (value, blank) = defaultable(8)?;
    de.label_display = value;
    de.set_is_default(8, blank);

    de.status = EntityStatus::parse(field(first, 8)).map_err(|e| locate(e, true, 9))?;
    de.sequence_number = parse_integer(&field(first, 9)[1..], None)
        .map_err(|e| locate(e, true, 10))? as u32;

    // line 2
    let raw = field(second, 1);
    de.line_weight = parse_integer(raw, None).map_err(|e| locate(e, false, 2))?;
    de.set_is_default(12, is_blank(raw));

    let raw = field(second, 2);
    de.color_number = parse_integer(raw, Some(0)).map_err(|e| locate(e, false, 3))?;
    de.set_is_default(13, is_blank(raw));

    de.parameter_line_count =
        parse_integer(field(second, 3), None).map_err(|e| locate(e, false, 4))?;

    let raw = field(second, 4);
    de.form_number = parse_integer(raw, Some(0)).map_err(|e| locate(e, false, 5))?;
    de.set_is_default(15, is_blank(raw));

    // fields 16-17 are reserved

    let raw = field(second, 7);
    de.entity_label = ltrim(raw).to_string();
    de.set_is_default(18, is_blank(raw));

    de.entity_subscript =
        parse_integer(field(second, 8), Some(0)).map_err(|e| locate(e, false, 9))?;

    Ok(de)
}

fn fixed(value: &str) -> String {
    format!("{:>width$}", value, width = FIELD_WIDTH)
}

fn fixed_int(value: i32) -> String {
    fixed(&value.to_string())
}

fn fixed_or_blank(value: i32, blank: bool) -> String {
    if blank {
        " ".repeat(FIELD_WIDTH)
    } else {
        fixed_int(value)
    }
}

/// Emit one DE record as its two 80-column lines.
///
/// The caller supplies the PD pointer, the sequence number of the first
/// line, and the PD line count, so they are consistent with the written
/// Parameter Data section. Defaulted fields are emitted blank.
pub fn emit_directory_record(
    de: &DirectoryEntry,
    pd_pointer: u32,
    sequence_number: u32,
    line_count: u32,
) -> (String, String) {
    let d = de.is_default();

    let mut first = String::with_capacity(80);
    first.push_str(&fixed_int(de.entity_type));
    first.push_str(&fixed(&pd_pointer.to_string()));
    first.push_str(&fixed_or_blank(de.structure, d[0]));
    first.push_str(&fixed_or_blank(de.line_font_pattern, d[1]));
    first.push_str(&fixed_or_blank(de.level, d[2]));
    first.push_str(&fixed_or_blank(de.view, d[3]));
    first.push_str(&fixed_or_blank(de.transformation_matrix, d[4]));
    first.push_str(&fixed_or_blank(de.label_display, d[5]));
    first.push_str(&de.status.pack());
    first.push('D');
    first.push_str(&format!("{:07}", sequence_number));

    let mut second = String::with_capacity(80);
    second.push_str(&fixed_int(de.entity_type));
    second.push_str(&fixed_or_blank(de.line_weight, d[6]));
    second.push_str(&fixed_or_blank(de.color_number, d[7]));
    second.push_str(&fixed(&line_count.to_string()));
    second.push_str(&fixed_or_blank(de.form_number, d[8]));
    second.push_str(&" ".repeat(FIELD_WIDTH * 2)); // reserved fields
    if d[9] {
        second.push_str(&" ".repeat(FIELD_WIDTH));
    } else {
        second.push_str(&fixed(&de.entity_label));
    }
    second.push_str(&fixed_int(de.entity_subscript));
    second.push('D');
    second.push_str(&format!("{:07}", sequence_number + 1));

    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::directory::{SubordinateSwitch, UseFlag};

    const ARC_FIRST: &str = "     100       1               1       0       0       0       000000100D0000001";
    const ARC_SECOND: &str = "     100       0       2       1                            ARC1       0D0000002";

    #[test]
    fn test_parse_directory_record() {
        let de = parse_directory_record(ARC_FIRST, ARC_SECOND).unwrap();
        assert_eq!(de.entity_type, 100);
        assert_eq!(de.parameter_data_pointer, 1);
        assert_eq!(de.line_font_pattern, 1);
        assert_eq!(de.status.subordinate, SubordinateSwitch::Independent);
        assert_eq!(de.status.use_flag, UseFlag::Annotation);
        assert_eq!(de.sequence_number, 1);
        assert_eq!(de.line_weight, 0);
        assert_eq!(de.color_number, 2);
        assert_eq!(de.parameter_line_count, 1);
        assert_eq!(de.entity_label, "ARC1");
        // blank defaultable fields are recorded
        assert!(de.field_is_default(3));
        assert!(!de.field_is_default(4));
        assert!(de.field_is_default(15));
    }

    #[test]
    fn test_entity_type_mismatch() {
        let second = ARC_SECOND.replace("     100", "     110");
        assert!(matches!(
            parse_directory_record(ARC_FIRST, &second),
            Err(IgesError::SectionFormat(_))
        ));
    }

    #[test]
    fn test_blank_pd_pointer_is_rejected() {
        let first = format!("     100        {}", &ARC_FIRST[16..]);
        assert!(parse_directory_record(&first, ARC_SECOND).is_err());
    }

    #[test]
    fn test_blank_line_count_is_rejected() {
        let second = format!("{}        {}", &ARC_SECOND[..24], &ARC_SECOND[32..]);
        assert!(parse_directory_record(ARC_FIRST, &second).is_err());
    }

    #[test]
    fn test_emit_round_trip() {
        let de = parse_directory_record(ARC_FIRST, ARC_SECOND).unwrap();
        let (first, second) = emit_directory_record(&de, 1, 1, 1);
        assert_eq!(first.len(), 80);
        assert_eq!(second.len(), 80);
        let back = parse_directory_record(&first, &second).unwrap();
        assert_eq!(back, de);
        // defaulted fields come back as spaces
        assert_eq!(&first[16..24], "        ");
    }

    #[test]
    fn test_emit_writes_supplied_pointers() {
        let de = parse_directory_record(ARC_FIRST, ARC_SECOND).unwrap();
        let (first, second) = emit_directory_record(&de, 42, 7, 3);
        assert_eq!(&first[8..16], "      42");
        assert_eq!(&first[73..80], "0000007");
        assert_eq!(&second[24..32], "       3");
        assert_eq!(&second[73..80], "0000008");
    }
}
