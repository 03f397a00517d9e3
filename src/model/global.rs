//! Global section record.
//!
//! The Global section carries 26 parameters that configure the rest of
//! the file: the two delimiter characters, identification strings, the
//! sender's numeric limits, units, line-weight scaling and timestamps.

use crate::codec::scalar::{parse_integer, parse_real, parse_string};
use crate::error::{IgesError, Result};
use crate::model::scalar::{ParameterVector, ScalarValue, ValueFormat};

/// Default parameter delimiter (Global parameter 1)
pub const DEFAULT_PARAM_DELIM: char = ',';
/// Default record delimiter (Global parameter 2)
pub const DEFAULT_RECORD_DELIM: char = ';';
/// Default model space scale (Global parameter 13)
pub const DEFAULT_MODEL_SPACE_SCALE: f64 = 1.0;
/// Default line weight gradations (Global parameter 16)
pub const DEFAULT_LINE_WEIGHT_GRADATIONS: i32 = 1;
/// Default maximum coordinate (Global parameter 20); 0.0 means
/// "unspecified"
pub const DEFAULT_MAX_COORDINATE: f64 = 0.0;

/// Platform defaults for the numeric-limit parameters 7-11. IGES 5.3
/// sets no defaults here; the sender's platform limits apply.
pub const DEFAULT_INTEGER_BITS: i32 = u32::BITS as i32;
/// Largest power of ten representable in single precision
pub const DEFAULT_SINGLE_POWER_MAX: i32 = f32::MAX_10_EXP;
/// Significant decimal digits of single precision
pub const DEFAULT_SINGLE_DIGITS: i32 = 6;
/// Largest power of ten representable in double precision
pub const DEFAULT_DOUBLE_POWER_MAX: i32 = f64::MAX_10_EXP;
/// Significant decimal digits of double precision
pub const DEFAULT_DOUBLE_DIGITS: i32 = 15;

/// Unit flag and unit name (Global parameters 14 and 15).
///
/// Unit flag 3 selects a unit by name; only the ten names enumerated by
/// IGES 5.3 are supported, anything else is rejected as unimplemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitFlag {
    /// Inches (`2HIN` or `4HINCH`)
    #[default]
    Inch,
    /// Millimeters (`2HMM`)
    Millimeter,
    /// Feet (`2HFT`)
    Foot,
    /// Miles (`2HMI`)
    Mile,
    /// Meters (`1HM`)
    Meter,
    /// Kilometers (`2HKM`)
    Kilometer,
    /// Mils, 1/1000 inch (`3HMIL`)
    Mil,
    /// Microns (`2HUM`)
    Micron,
    /// Centimeters (`2HCM`)
    Centimeter,
    /// Microinches (`3HUIN`)
    MicroInch,
}

impl UnitFlag {
    /// Numeric flag value (Global parameter 14)
    pub fn flag(self) -> i32 {
        match self {
            UnitFlag::Inch => 1,
            UnitFlag::Millimeter => 2,
            UnitFlag::Foot => 4,
            UnitFlag::Mile => 5,
            UnitFlag::Meter => 6,
            UnitFlag::Kilometer => 7,
            UnitFlag::Mil => 8,
            UnitFlag::Micron => 9,
            UnitFlag::Centimeter => 10,
            UnitFlag::MicroInch => 11,
        }
    }

    /// Unit name (Global parameter 15 payload)
    pub fn unit_name(self) -> &'static str {
        match self {
            UnitFlag::Inch => "INCH",
            UnitFlag::Millimeter => "MM",
            UnitFlag::Foot => "FT",
            UnitFlag::Mile => "MI",
            UnitFlag::Meter => "M",
            UnitFlag::Kilometer => "KM",
            UnitFlag::Mil => "MIL",
            UnitFlag::Micron => "UM",
            UnitFlag::Centimeter => "CM",
            UnitFlag::MicroInch => "UIN",
        }
    }

    /// Unit from a numeric flag (values 1-11; 3 is resolved through the
    /// unit name and invalid here)
    pub fn from_flag(flag: i32) -> Result<Option<Self>> {
        match flag {
            1 => Ok(Some(UnitFlag::Inch)),
            2 => Ok(Some(UnitFlag::Millimeter)),
            3 => Ok(None),
            4 => Ok(Some(UnitFlag::Foot)),
            5 => Ok(Some(UnitFlag::Mile)),
            6 => Ok(Some(UnitFlag::Meter)),
            7 => Ok(Some(UnitFlag::Kilometer)),
            8 => Ok(Some(UnitFlag::Mil)),
            9 => Ok(Some(UnitFlag::Micron)),
            10 => Ok(Some(UnitFlag::Centimeter)),
            11 => Ok(Some(UnitFlag::MicroInch)),
            other => Err(IgesError::TypeConversion(format!(
                "invalid unit flag value: {}",
                other
            ))),
        }
    }

    /// Unit from a unit-name payload
    pub fn from_unit_name(name: &str) -> Result<Self> {
        match name {
            "IN" | "INCH" => Ok(UnitFlag::Inch),
            "MM" => Ok(UnitFlag::Millimeter),
            "FT" => Ok(UnitFlag::Foot),
            "MI" => Ok(UnitFlag::Mile),
            "M" => Ok(UnitFlag::Meter),
            "KM" => Ok(UnitFlag::Kilometer),
            "MIL" => Ok(UnitFlag::Mil),
            "UM" => Ok(UnitFlag::Micron),
            "CM" => Ok(UnitFlag::Centimeter),
            "UIN" => Ok(UnitFlag::MicroInch),
            other => Err(IgesError::NotImplemented(format!(
                "unit flag 3 with unit name '{}' is not supported",
                other
            ))),
        }
    }
}

/// Specification version flag (Global parameter 23)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VersionFlag {
    /// IGES 1.0 (1980)
    Version1_0,
    /// ANSI Y14.26M-1981
    Ansi1981,
    /// IGES 2.0 (1982)
    Version2_0,
    /// IGES 3.0 (1986)
    Version3_0,
    /// ASME/ANSI Y14.26M-1987
    Asme1987,
    /// IGES 4.0 (1988)
    Version4_0,
    /// ASME Y14.26M-1989
    Asme1989,
    /// IGES 5.0 (1990)
    Version5_0,
    /// IGES 5.1 (1991)
    Version5_1,
    /// USPRO/IPO-100 IGES 5.2 (1993)
    Uspro1993,
    /// IGES 5.3 (1996)
    #[default]
    Version5_3,
}

impl VersionFlag {
    /// Numeric flag value
    pub fn flag(self) -> i32 {
        match self {
            VersionFlag::Version1_0 => 1,
            VersionFlag::Ansi1981 => 2,
            VersionFlag::Version2_0 => 3,
            VersionFlag::Version3_0 => 4,
            VersionFlag::Asme1987 => 5,
            VersionFlag::Version4_0 => 6,
            VersionFlag::Asme1989 => 7,
            VersionFlag::Version5_0 => 8,
            VersionFlag::Version5_1 => 9,
            VersionFlag::Uspro1993 => 10,
            VersionFlag::Version5_3 => 11,
        }
    }

    /// Tolerant mapping from a numeric flag: values below 3 clamp to
    /// IGES 2.0, values above 11 clamp to IGES 5.0
    pub fn from_flag(flag: i32) -> Self {
        match flag {
            i32::MIN..=2 => VersionFlag::Version2_0,
            3 => VersionFlag::Version2_0,
            4 => VersionFlag::Version3_0,
            5 => VersionFlag::Asme1987,
            6 => VersionFlag::Version4_0,
            7 => VersionFlag::Asme1989,
            8 => VersionFlag::Version5_0,
            9 => VersionFlag::Version5_1,
            10 => VersionFlag::Uspro1993,
            11 => VersionFlag::Version5_3,
            _ => VersionFlag::Version5_0,
        }
    }
}

/// Drafting standard flag (Global parameter 24)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DraftingStandard {
    /// No standard specified
    #[default]
    None,
    /// ISO
    Iso,
    /// AFNOR
    Afnor,
    /// ANSI
    Ansi,
    /// BSI
    Bsi,
    /// CSA
    Csa,
    /// DIN
    Din,
    /// JIS
    Jis,
}

impl DraftingStandard {
    /// Numeric flag value
    pub fn flag(self) -> i32 {
        match self {
            DraftingStandard::None => 0,
            DraftingStandard::Iso => 1,
            DraftingStandard::Afnor => 2,
            DraftingStandard::Ansi => 3,
            DraftingStandard::Bsi => 4,
            DraftingStandard::Csa => 5,
            DraftingStandard::Din => 6,
            DraftingStandard::Jis => 7,
        }
    }

    /// Standard from a numeric flag
    pub fn from_flag(flag: i32) -> Result<Self> {
        match flag {
            0 => Ok(DraftingStandard::None),
            1 => Ok(DraftingStandard::Iso),
            2 => Ok(DraftingStandard::Afnor),
            3 => Ok(DraftingStandard::Ansi),
            4 => Ok(DraftingStandard::Bsi),
            5 => Ok(DraftingStandard::Csa),
            6 => Ok(DraftingStandard::Din),
            7 => Ok(DraftingStandard::Jis),
            other => Err(IgesError::TypeConversion(format!(
                "invalid drafting standard flag value: {}",
                other
            ))),
        }
    }
}

/// Characters that may not serve as parameter or record delimiters:
/// control characters, space, digits, '+', '-', '.', 'D', 'E', 'H'
pub fn is_valid_delimiter(c: char) -> bool {
    let b = match u8::try_from(c) {
        Ok(b) => b,
        Err(_) => return false,
    };
    if b <= 0x1F || b == 0x7F || b == b' ' {
        return false;
    }
    if b.is_ascii_digit() {
        return false;
    }
    !matches!(b, b'+' | b'-' | b'.' | b'D' | b'E' | b'H')
}

/// Typed carrier for the 26 Global parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalRecord {
    /// Parameter delimiter character (1)
    pub param_delim: char,
    /// Record delimiter character (2)
    pub record_delim: char,
    /// Product identification from the sender (3)
    pub product_id: String,
    /// File name (4)
    pub file_name: String,
    /// Native system identification (5)
    pub native_system_id: String,
    /// Preprocessor version (6)
    pub preprocessor_version: String,
    /// Number of binary bits for integer representation (7)
    pub integer_bits: i32,
    /// Largest power of ten in single precision on the sender (8)
    pub single_power_max: i32,
    /// Significant digits of single precision on the sender (9)
    pub single_digits: i32,
    /// Largest power of ten in double precision on the sender (10)
    pub double_power_max: i32,
    /// Significant digits of double precision on the sender (11)
    pub double_digits: i32,
    /// Product identification for the receiver (12); defaults to the
    /// sender's product id
    pub receiving_system_id: String,
    /// Model space scale (13)
    pub model_space_scale: f64,
    /// Unit flag and name (14, 15)
    pub units_flag: UnitFlag,
    /// Number of line weight gradations (16)
    pub line_weight_gradations: i32,
    /// Width of the maximum line weight in units (17)
    pub max_line_weight: f64,
    /// Date and time of file generation, `YYYYMMDD.HHNNSS` (18)
    pub date_time_generation: String,
    /// Minimum user-intended resolution (19)
    pub min_resolution: f64,
    /// Approximate maximum coordinate value (20); 0.0 = unspecified
    pub max_coordinate: f64,
    /// Author name (21)
    pub author: String,
    /// Author's organization (22)
    pub author_organization: String,
    /// Specification version flag (23)
    pub version: VersionFlag,
    /// Drafting standard flag (24)
    pub drafting_standard: DraftingStandard,
    /// Date and time the model was created or last modified (25)
    pub date_time_modified: String,
    /// Application protocol / subset identifier (26)
    pub protocol_identifier: String,
}

impl Default for GlobalRecord {
    fn default() -> Self {
        GlobalRecord {
            param_delim: DEFAULT_PARAM_DELIM,
            record_delim: DEFAULT_RECORD_DELIM,
            product_id: String::new(),
            file_name: String::new(),
            native_system_id: String::new(),
            preprocessor_version: String::new(),
            integer_bits: DEFAULT_INTEGER_BITS,
            single_power_max: DEFAULT_SINGLE_POWER_MAX,
            single_digits: DEFAULT_SINGLE_DIGITS,
            double_power_max: DEFAULT_DOUBLE_POWER_MAX,
            double_digits: DEFAULT_DOUBLE_DIGITS,
            receiving_system_id: String::new(),
            model_space_scale: DEFAULT_MODEL_SPACE_SCALE,
            units_flag: UnitFlag::default(),
            line_weight_gradations: DEFAULT_LINE_WEIGHT_GRADATIONS,
            max_line_weight: 0.0,
            date_time_generation: String::new(),
            min_resolution: 0.0,
            max_coordinate: DEFAULT_MAX_COORDINATE,
            author: String::new(),
            author_organization: String::new(),
            version: VersionFlag::default(),
            drafting_standard: DraftingStandard::default(),
            date_time_modified: String::new(),
            protocol_identifier: String::new(),
        }
    }
}

/// Parse an integer-limit parameter, clamping oversized declarations to
/// the platform limit
fn clamped_limit(field: &str, limit: i32) -> Result<i32> {
    let value = parse_integer(field, Some(limit))?;
    Ok(value.min(limit))
}

impl GlobalRecord {
    /// Build the record from the delimiters and the token list of
    /// parameters 3 onwards.
    ///
    /// Parameters 3-20 are required (with per-parameter defaults where
    /// the specification grants one); 21-26 are optional.
    pub fn from_tokens(param_delim: char, record_delim: char, tokens: &[String]) -> Result<Self> {
        if tokens.len() < 18 {
            return Err(IgesError::SectionFormat(format!(
                "the Global section must carry at least 20 parameters, found {}",
                tokens.len() + 2
            )));
        }

        let mut gs = GlobalRecord {
            param_delim,
            record_delim,
            ..GlobalRecord::default()
        };

        fn located(n: usize, e: IgesError) -> IgesError {
            IgesError::TypeConversion(format!("{} (in Global parameter {})", e, n))
        }

        // tokens[0] is Global parameter 3
        let mut i = 0usize;
        macro_rules! take {
            () => {{
                let n = i + 3;
                let t = tokens[i].as_str();
                i += 1;
                (n, t)
            }};
        }
        macro_rules! field {
            ($parse:expr) => {{
                let (n, t) = take!();
                $parse(t).map_err(|e| located(n, e))?
            }};
        }

        gs.product_id = field!(|t| parse_string(t, None));
        gs.file_name = field!(|t| parse_string(t, None));
        gs.native_system_id = field!(|t| parse_string(t, None));
        gs.preprocessor_version = field!(|t| parse_string(t, None));
        gs.integer_bits = field!(|t| clamped_limit(t, DEFAULT_INTEGER_BITS));
        gs.single_power_max = field!(|t| clamped_limit(t, DEFAULT_SINGLE_POWER_MAX));
        gs.single_digits = field!(|t| clamped_limit(t, DEFAULT_SINGLE_DIGITS));
        gs.double_power_max = field!(|t| clamped_limit(t, DEFAULT_DOUBLE_POWER_MAX));
        gs.double_digits = field!(|t| clamped_limit(t, DEFAULT_DOUBLE_DIGITS));
        gs.receiving_system_id = field!(|t| parse_string(t, Some(gs.product_id.as_str())));
        gs.model_space_scale = field!(|t| parse_real(t, Some(DEFAULT_MODEL_SPACE_SCALE)));

        // parameters 14 and 15 resolve together
        {
            let (n, flag_token) = take!();
            let (_, name_token) = take!();
            let flag = parse_integer(flag_token, Some(UnitFlag::Inch.flag()))
                .map_err(|e| located(n, e))?;
            gs.units_flag = match UnitFlag::from_flag(flag).map_err(|e| located(n, e))? {
                Some(unit) => unit,
                None => {
                    let name = parse_string(name_token, None).map_err(|e| located(n + 1, e))?;
                    UnitFlag::from_unit_name(&name)?
                }
            };
        }

        gs.line_weight_gradations =
            field!(|t| parse_integer(t, Some(DEFAULT_LINE_WEIGHT_GRADATIONS)));
        gs.max_line_weight = field!(|t| parse_real(t, None));
        gs.date_time_generation = field!(|t| parse_string(t, None));
        gs.min_resolution = field!(|t| parse_real(t, None));
        gs.max_coordinate = field!(|t| parse_real(t, Some(DEFAULT_MAX_COORDINATE)));

        if i < tokens.len() {
            gs.author = field!(|t| parse_string(t, Some("")));
        }
        if i < tokens.len() {
            gs.author_organization = field!(|t| parse_string(t, Some("")));
        }
        if i < tokens.len() {
            gs.version = {
                let (n, t) = take!();
                VersionFlag::from_flag(
                    parse_integer(t, Some(VersionFlag::default().flag()))
                        .map_err(|e| located(n, e))?,
                )
            };
        }
        if i < tokens.len() {
            gs.drafting_standard = {
                let (n, t) = take!();
                DraftingStandard::from_flag(parse_integer(t, Some(0)).map_err(|e| located(n, e))?)
                    .map_err(|e| located(n, e))?
            };
        }
        if i < tokens.len() {
            gs.date_time_modified = field!(|t| parse_string(t, Some("")));
        }
        if i < tokens.len() {
            gs.protocol_identifier = field!(|t| parse_string(t, Some("")));
        }

        Ok(gs)
    }

    /// Emit the 26 parameters for writing.
    ///
    /// When `file_name` is given, parameter 4 takes the output file's
    /// basename; parameters 5 and 6 always take this library's identity
    /// and 18/25 the current local time. Everything else is preserved.
    pub fn to_parameters(&self, file_name: Option<&str>) -> ParameterVector {
        let now = chrono::Local::now().format("%Y%m%d.%H%M%S").to_string();

        let mut prm = ParameterVector::with_capacity(26);
        let push_str = |prm: &mut ParameterVector, s: &str| {
            let format = if s.is_empty() {
                ValueFormat::string().defaulted()
            } else {
                ValueFormat::string()
            };
            prm.push(ScalarValue::Str(s.to_string()), format);
        };

        // 1-2: delimiter characters
        push_str(&mut prm, &self.param_delim.to_string());
        push_str(&mut prm, &self.record_delim.to_string());
        // 3: product identification
        push_str(&mut prm, &self.product_id);
        // 4: file name, regenerated from the output path
        push_str(&mut prm, file_name.unwrap_or(&self.file_name));
        // 5-6: the identity of this library
        push_str(&mut prm, crate::NAME);
        push_str(&mut prm, crate::VERSION);
        // 7-11: numeric limits
        for value in [
            self.integer_bits,
            self.single_power_max,
            self.single_digits,
            self.double_power_max,
            self.double_digits,
        ] {
            prm.push(ScalarValue::Integer(value), ValueFormat::integer());
        }
        // 12: receiving system
        push_str(&mut prm, &self.receiving_system_id);
        // 13: model space scale
        prm.push(ScalarValue::Real(self.model_space_scale), ValueFormat::real());
        // 14-15: units
        prm.push(
            ScalarValue::Integer(self.units_flag.flag()),
            ValueFormat::integer(),
        );
        push_str(&mut prm, self.units_flag.unit_name());
        // 16-17: line weights
        prm.push(
            ScalarValue::Integer(self.line_weight_gradations),
            ValueFormat::integer(),
        );
        prm.push(ScalarValue::Real(self.max_line_weight), ValueFormat::real());
        // 18: generation timestamp, regenerated
        push_str(&mut prm, &now);
        // 19-20: resolution and extent
        prm.push(ScalarValue::Real(self.min_resolution), ValueFormat::real());
        prm.push(ScalarValue::Real(self.max_coordinate), ValueFormat::real());
        // 21-22: author
        push_str(&mut prm, &self.author);
        push_str(&mut prm, &self.author_organization);
        // 23-24: version and drafting standard
        prm.push(
            ScalarValue::Integer(self.version.flag()),
            ValueFormat::integer(),
        );
        prm.push(
            ScalarValue::Integer(self.drafting_standard.flag()),
            ValueFormat::integer(),
        );
        // 25: modification timestamp, regenerated
        push_str(&mut prm, &now);
        // 26: protocol identifier
        push_str(&mut prm, &self.protocol_identifier);

        prm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn minimal_tokens() -> Vec<String> {
        tokens(&[
            "8HTestCase", "8Htest.igs", "6Hnative", "4H1.00", "32", "38", "6", "308", "15", "",
            "1.", "2", "2HMM", "1", "1.", "15H20240101.120000", "1.E-6", "1000.",
        ])
    }

    #[test]
    fn test_minimal_global_parse() {
        let gs = GlobalRecord::from_tokens(',', ';', &minimal_tokens()).unwrap();
        assert_eq!(gs.product_id, "TestCase");
        assert_eq!(gs.file_name, "test.igs");
        // blank receiving system inherits the product id
        assert_eq!(gs.receiving_system_id, "TestCase");
        assert_eq!(gs.units_flag, UnitFlag::Millimeter);
        assert_eq!(gs.version, VersionFlag::Version5_3);
        assert_eq!(gs.max_coordinate, 1000.0);
    }

    #[test]
    fn test_unit_flag_by_name() {
        let mut toks = minimal_tokens();
        toks[11] = "3".to_string();
        toks[12] = "2HCM".to_string();
        let gs = GlobalRecord::from_tokens(',', ';', &toks).unwrap();
        assert_eq!(gs.units_flag, UnitFlag::Centimeter);

        toks[12] = "7HFURLONG".to_string();
        assert!(matches!(
            GlobalRecord::from_tokens(',', ';', &toks),
            Err(IgesError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_version_flag_clamping() {
        assert_eq!(VersionFlag::from_flag(0), VersionFlag::Version2_0);
        assert_eq!(VersionFlag::from_flag(12), VersionFlag::Version5_0);
        assert_eq!(VersionFlag::from_flag(11), VersionFlag::Version5_3);
    }

    #[test]
    fn test_too_few_parameters() {
        let toks = tokens(&["8HTestCase", "8Htest.igs"]);
        assert!(matches!(
            GlobalRecord::from_tokens(',', ';', &toks),
            Err(IgesError::SectionFormat(_))
        ));
    }

    #[test]
    fn test_numeric_limits_are_clamped() {
        let mut toks = minimal_tokens();
        toks[4] = "64".to_string(); // more integer bits than the platform
        toks[7] = "999".to_string(); // absurd double magnitude
        let gs = GlobalRecord::from_tokens(',', ';', &toks).unwrap();
        assert_eq!(gs.integer_bits, DEFAULT_INTEGER_BITS);
        assert_eq!(gs.double_power_max, DEFAULT_DOUBLE_POWER_MAX);
    }

    #[test]
    fn test_delimiter_validity() {
        assert!(is_valid_delimiter(','));
        assert!(is_valid_delimiter(';'));
        assert!(is_valid_delimiter('/'));
        assert!(is_valid_delimiter('%'));
        for c in ['+', '-', '.', 'D', 'E', 'H', ' ', '0', '9', '\t'] {
            assert!(!is_valid_delimiter(c), "{:?} must be invalid", c);
        }
    }

    #[test]
    fn test_emit_regenerates_identity_and_timestamps() {
        let gs = GlobalRecord::from_tokens(',', ';', &minimal_tokens()).unwrap();
        let prm = gs.to_parameters(Some("out.igs"));
        assert_eq!(prm.len(), 26);
        assert_eq!(prm.str_at(3).unwrap(), "out.igs");
        assert_eq!(prm.str_at(4).unwrap(), crate::NAME);
        assert_eq!(prm.str_at(5).unwrap(), crate::VERSION);
        // preserved parameters
        assert_eq!(prm.str_at(2).unwrap(), "TestCase");
        assert_eq!(prm.int_at(13).unwrap(), 2);
        // regenerated timestamp in YYYYMMDD.HHMMSS form
        let stamp = prm.str_at(17).unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], ".");
    }
}
