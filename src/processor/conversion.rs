use std::collections::HashMap;

use regex::Regex;

use crate::{
    core::{
        cell::CellValue,
        context::CsvContext,
        processor::{CellProcessor, CellProcessorResult, Outcome},
    },
    error::{CsvError, CsvResult},
};

use super::text_of;

/// Ends the chain with null when the cell is null or empty.
///
/// Any other value is handed to the rest of the chain, which therefore only
/// ever sees columns that actually hold something.
#[derive(Debug, Default, Clone, Copy)]
pub struct Optional;

impl Optional {
    pub fn new() -> Self {
        Self
    }
}

impl CellProcessor for Optional {
    fn execute(&self, value: CellValue, _context: &CsvContext) -> CellProcessorResult {
        match value {
            CellValue::Null => Ok(Outcome::Finish(CellValue::Null)),
            CellValue::Text(text) if text.is_empty() => Ok(Outcome::Finish(CellValue::Null)),
            value => Ok(Outcome::Continue(value)),
        }
    }
}

/// Ends the chain with a fixed value when the cell is null.
#[derive(Debug, Clone)]
pub struct ConvertNullTo {
    replacement: CellValue,
}

impl ConvertNullTo {
    pub fn new(replacement: impl Into<CellValue>) -> Self {
        Self {
            replacement: replacement.into(),
        }
    }
}

impl CellProcessor for ConvertNullTo {
    fn execute(&self, value: CellValue, _context: &CsvContext) -> CellProcessorResult {
        match value {
            CellValue::Null => Ok(Outcome::Finish(self.replacement.clone())),
            value => Ok(Outcome::Continue(value)),
        }
    }
}

/// Removes leading and trailing whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trim;

impl Trim {
    pub fn new() -> Self {
        Self
    }
}

impl CellProcessor for Trim {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let text = text_of(&value, context)?;
        Ok(Outcome::Continue(CellValue::Text(text.trim().to_string())))
    }
}

/// Cuts text down to a maximum number of characters, appending a suffix when it does.
#[derive(Debug, Clone)]
pub struct Truncate {
    max_chars: usize,
    suffix: String,
}

impl Truncate {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            suffix: String::new(),
        }
    }

    pub fn with_suffix(max_chars: usize, suffix: impl Into<String>) -> Self {
        Self {
            max_chars,
            suffix: suffix.into(),
        }
    }
}

impl CellProcessor for Truncate {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let text = text_of(&value, context)?;
        if text.chars().count() <= self.max_chars {
            return Ok(Outcome::Continue(CellValue::Text(text)));
        }
        let mut truncated: String = text.chars().take(self.max_chars).collect();
        truncated.push_str(&self.suffix);
        Ok(Outcome::Continue(CellValue::Text(truncated)))
    }
}

/// Replaces every match of a regular expression.
///
/// The replacement may refer to capture groups (`$1`, `${name}`).
#[derive(Debug, Clone)]
pub struct StrReplace {
    pattern: Regex,
    replacement: String,
}

impl StrReplace {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> CsvResult<Self> {
        let pattern = Regex::new(pattern).map_err(|error| {
            CsvError::Configuration(format!("invalid regular expression '{}': {}", pattern, error))
        })?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
        })
    }
}

impl CellProcessor for StrReplace {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let text = text_of(&value, context)?;
        let replaced = self.pattern.replace_all(&text, self.replacement.as_str());
        Ok(Outcome::Continue(CellValue::Text(replaced.into_owned())))
    }
}

/// Maps values through a lookup table.
///
/// Values are looked up by their text. A value missing from the table maps
/// to the default, which is null unless set.
#[derive(Debug, Clone)]
pub struct HashMapper {
    mapping: HashMap<String, CellValue>,
    default: CellValue,
}

impl HashMapper {
    pub fn new(mapping: HashMap<String, CellValue>) -> Self {
        Self {
            mapping,
            default: CellValue::Null,
        }
    }

    pub fn with_default(mut self, default: impl Into<CellValue>) -> Self {
        self.default = default.into();
        self
    }
}

impl CellProcessor for HashMapper {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let key = text_of(&value, context)?;
        let mapped = self
            .mapping
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.default.clone());
        Ok(Outcome::Continue(mapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::processor::Chain;
    use crate::processor::ParseInt;

    fn context() -> CsvContext {
        CsvContext::new(3, 2, 1)
    }

    #[test]
    fn optional_should_finish_on_null_and_empty() {
        let optional = Optional::new();

        assert_eq!(
            optional.execute(CellValue::Null, &context()).unwrap(),
            Outcome::Finish(CellValue::Null)
        );
        assert_eq!(
            optional.execute("".into(), &context()).unwrap(),
            Outcome::Finish(CellValue::Null)
        );
        assert_eq!(
            optional.execute("x".into(), &context()).unwrap(),
            Outcome::Continue("x".into())
        );
    }

    #[test]
    fn optional_twice_should_stay_null_without_reaching_downstream() {
        let chain = Chain::new()
            .then(Optional::new())
            .then(Optional::new())
            .then(ParseInt::new());

        assert_eq!(chain.execute(CellValue::Null, &context()).unwrap(), CellValue::Null);
        assert_eq!(chain.execute(CellValue::Null, &context()).unwrap(), CellValue::Null);
    }

    #[test]
    fn convert_null_to_should_substitute_value() {
        let chain = Chain::new().then(ConvertNullTo::new("n/a")).then(Trim::new());

        assert_eq!(chain.execute(CellValue::Null, &context()).unwrap(), "n/a".into());
        assert_eq!(chain.execute(" x ".into(), &context()).unwrap(), "x".into());
    }

    #[test]
    fn trim_should_reject_null() {
        let error = Trim::new().execute(CellValue::Null, &context()).unwrap_err();

        assert!(matches!(error, CsvError::CellParse { .. }));
        assert!(error.to_string().contains("Optional"));
    }

    #[test]
    fn truncate_should_count_characters() {
        let truncate = Truncate::with_suffix(3, "...");

        assert_eq!(
            truncate.execute("héllo".into(), &context()).unwrap().into_value(),
            "hél...".into()
        );
        assert_eq!(
            truncate.execute("abc".into(), &context()).unwrap().into_value(),
            "abc".into()
        );
        assert_eq!(
            Truncate::new(1).execute(CellValue::Integer(42), &context()).unwrap().into_value(),
            "4".into()
        );
    }

    #[test]
    fn str_replace_should_apply_regex() {
        let replace = StrReplace::new(r"(\d+)-(\d+)", "$2/$1").unwrap();

        assert_eq!(
            replace.execute("12-34 and 5-6".into(), &context()).unwrap().into_value(),
            "34/12 and 6/5".into()
        );
        assert!(matches!(
            StrReplace::new("(", ""),
            Err(CsvError::Configuration(_))
        ));
    }

    #[test]
    fn hash_mapper_should_fall_back_to_default() {
        let mapper = HashMapper::new(HashMap::from([
            ("M".to_string(), CellValue::from("male")),
            ("F".to_string(), CellValue::from("female")),
        ]))
        .with_default("unknown");

        assert_eq!(mapper.execute("F".into(), &context()).unwrap().into_value(), "female".into());
        assert_eq!(mapper.execute("X".into(), &context()).unwrap().into_value(), "unknown".into());
        assert!(mapper.execute(CellValue::Null, &context()).is_err());
    }
}
