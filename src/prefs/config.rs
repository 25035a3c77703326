use serde::{Deserialize, Serialize};

use crate::error::{CsvError, CsvResult};

use super::{
    comment::{CommentMatches, CommentStartsWith},
    quote::QuoteMode,
    CsvPreference, EmptyColumnParsing,
};

/// Named starting points for a [`DialectConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Standard,
    Excel,
    ExcelNorthEurope,
    Tab,
}

impl Preset {
    pub fn preference(self) -> CsvPreference {
        match self {
            Preset::Standard => CsvPreference::standard(),
            Preset::Excel => CsvPreference::excel(),
            Preset::ExcelNorthEurope => CsvPreference::excel_north_europe(),
            Preset::Tab => CsvPreference::tab(),
        }
    }
}

/// A dialect as found in configuration files.
///
/// Every field is optional: unset fields keep the value of the preset
/// (`standard` when no preset is named).
///
/// # Examples
///
/// ```
/// use super_csv::prefs::{config::DialectConfig, CsvPreference};
///
/// let config: DialectConfig = serde_json::from_str(r##"{
///     "preset": "excel_north_europe",
///     "comment_prefix": "#",
///     "max_lines_per_record": 5
/// }"##).unwrap();
///
/// let preference = CsvPreference::try_from(config).unwrap();
/// assert_eq!(preference.delimiter(), ';');
/// assert!(preference.is_comment("# header"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialectConfig {
    pub preset: Preset,
    pub quote_char: Option<char>,
    pub delimiter: Option<char>,
    pub end_of_line_symbols: Option<String>,
    pub surrounding_spaces_need_quotes: Option<bool>,
    pub ignore_empty_lines: Option<bool>,
    pub max_lines_per_record: Option<usize>,
    pub quote_mode: Option<QuoteMode>,
    pub quote_escape_char: Option<char>,
    pub comment_prefix: Option<String>,
    pub comment_regex: Option<String>,
    pub empty_column_parsing: Option<EmptyColumnParsing>,
}

impl TryFrom<DialectConfig> for CsvPreference {
    type Error = CsvError;

    fn try_from(config: DialectConfig) -> CsvResult<Self> {
        let mut builder = config.preset.preference().to_builder();

        if let Some(quote_char) = config.quote_char {
            builder = builder.quote_char(quote_char);
        }
        if let Some(delimiter) = config.delimiter {
            builder = builder.delimiter(delimiter);
        }
        if let Some(end_of_line_symbols) = config.end_of_line_symbols {
            builder = builder.end_of_line_symbols(end_of_line_symbols);
        }
        if let Some(yes) = config.surrounding_spaces_need_quotes {
            builder = builder.surrounding_spaces_need_quotes(yes);
        }
        if let Some(yes) = config.ignore_empty_lines {
            builder = builder.ignore_empty_lines(yes);
        }
        if let Some(max_lines) = config.max_lines_per_record {
            builder = builder.max_lines_per_record(max_lines);
        }
        if let Some(quote_mode) = config.quote_mode {
            builder = builder.quote_mode(quote_mode);
        }
        if let Some(quote_escape_char) = config.quote_escape_char {
            builder = builder.quote_escape_char(quote_escape_char);
        }
        if let Some(empty_column_parsing) = config.empty_column_parsing {
            builder = builder.empty_column_parsing(empty_column_parsing);
        }

        builder = match (config.comment_prefix, config.comment_regex) {
            (Some(_), Some(_)) => {
                return Err(CsvError::Configuration(
                    "comment_prefix and comment_regex are mutually exclusive".to_string(),
                ));
            }
            (Some(prefix), None) => builder.skip_comments(CommentStartsWith::new(prefix)?),
            (None, Some(pattern)) => builder.skip_comments(CommentMatches::new(&pattern)?),
            (None, None) => builder,
        };

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_should_give_standard_preference() {
        let config: DialectConfig = serde_json::from_str("{}").unwrap();
        let preference = CsvPreference::try_from(config).unwrap();

        assert_eq!(preference.delimiter(), ',');
        assert_eq!(preference.end_of_line_symbols(), "\r\n");
        assert!(!preference.is_comment("#"));
    }

    #[test]
    fn config_should_override_preset() {
        let config: DialectConfig = serde_json::from_str(
            r#"{
                "preset": "tab",
                "quote_char": "'",
                "surrounding_spaces_need_quotes": true,
                "quote_mode": { "mode": "columns", "columns": [2] },
                "comment_regex": "--.*",
                "empty_column_parsing": "as_empty_string"
            }"#,
        )
        .unwrap();

        let preference = CsvPreference::try_from(config).unwrap();

        assert_eq!(preference.delimiter(), '\t');
        assert_eq!(preference.quote_char(), '\'');
        assert_eq!(preference.quote_escape_char(), '\'');
        assert!(preference.surrounding_spaces_need_quotes());
        assert_eq!(preference.quote_mode(), &QuoteMode::columns([2]));
        assert!(preference.is_comment("-- note"));
        assert_eq!(
            preference.empty_column_parsing(),
            EmptyColumnParsing::AsEmptyString
        );
    }

    #[test]
    fn both_comment_matchers_should_be_rejected() {
        let config = DialectConfig {
            comment_prefix: Some("#".to_string()),
            comment_regex: Some("#.*".to_string()),
            ..DialectConfig::default()
        };

        assert!(matches!(
            CsvPreference::try_from(config),
            Err(CsvError::Configuration(_))
        ));
    }

    #[test]
    fn invalid_dialect_should_be_rejected() {
        let config: DialectConfig = serde_json::from_str(r#"{ "delimiter": "\"" }"#).unwrap();
        assert!(CsvPreference::try_from(config).is_err());
    }

    #[test]
    fn unknown_fields_should_be_rejected() {
        let result = serde_json::from_str::<DialectConfig>(r#"{ "separator": ";" }"#);
        assert!(result.is_err());
    }
}
