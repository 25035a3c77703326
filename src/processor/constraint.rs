//! Processors validating a value and passing it on unchanged.
//!
//! A failed check raises [`CsvError::Constraint`] with the offending value
//! and a description of the rule.

use std::{
    cell::RefCell,
    collections::{BTreeSet, HashSet},
};

use regex::Regex;

use crate::{
    core::{
        cell::CellValue,
        context::CsvContext,
        processor::{CellProcessor, CellProcessorResult, Outcome},
    },
    error::{CsvError, CsvResult},
};

use super::{null_input, parse_error, text_of, type_mismatch, violation};

/// Fails on null.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotNull;

impl NotNull {
    pub fn new() -> Self {
        Self
    }
}

impl CellProcessor for NotNull {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        if value.is_null() {
            return Err(violation("value must not be null", &value, context));
        }
        Ok(Outcome::Continue(value))
    }
}

/// Fails on null and on empty text.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrNotNullOrEmpty;

impl StrNotNullOrEmpty {
    pub fn new() -> Self {
        Self
    }
}

impl CellProcessor for StrNotNullOrEmpty {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        match &value {
            CellValue::Null => Err(violation("value must not be null", &value, context)),
            CellValue::Text(text) if text.is_empty() => {
                Err(violation("value must not be empty", &value, context))
            }
            CellValue::Text(_) => Ok(Outcome::Continue(value)),
            other => Err(type_mismatch("text", other, context)),
        }
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(min: T, max: T) -> CsvResult<()> {
    if min <= max {
        return Ok(());
    }
    Err(CsvError::Configuration(format!(
        "max ({}) should not be less than min ({})",
        max, min
    )))
}

/// Checks that an integer lies in an inclusive range; text is parsed first.
#[derive(Debug, Clone, Copy)]
pub struct LMinMax {
    min: i64,
    max: i64,
}

impl LMinMax {
    /// Fails with [`CsvError::Configuration`] if `max < min`.
    pub fn new(min: i64, max: i64) -> CsvResult<Self> {
        check_range(min, max)?;
        Ok(Self { min, max })
    }
}

impl CellProcessor for LMinMax {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let number = match &value {
            CellValue::Integer(number) => *number,
            CellValue::Text(text) => text
                .parse::<i64>()
                .map_err(|error| parse_error(text, format!("not a valid integer: {}", error), context))?,
            CellValue::Null => return Err(null_input(context)),
            other => return Err(type_mismatch("integer", other, context)),
        };
        if number < self.min || number > self.max {
            return Err(violation(
                format!("value must lie between {} and {}", self.min, self.max),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(CellValue::Integer(number)))
    }
}

/// Checks that a floating point number lies in an inclusive range; text is parsed first.
#[derive(Debug, Clone, Copy)]
pub struct DMinMax {
    min: f64,
    max: f64,
}

impl DMinMax {
    /// Fails with [`CsvError::Configuration`] if `max < min`.
    pub fn new(min: f64, max: f64) -> CsvResult<Self> {
        check_range(min, max)?;
        Ok(Self { min, max })
    }
}

impl CellProcessor for DMinMax {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let number = match &value {
            CellValue::Float(number) => *number,
            CellValue::Integer(number) => *number as f64,
            CellValue::Text(text) => text.parse::<f64>().map_err(|error| {
                parse_error(text, format!("not a valid floating point number: {}", error), context)
            })?,
            CellValue::Null => return Err(null_input(context)),
            other => return Err(type_mismatch("float", other, context)),
        };
        if !(self.min..=self.max).contains(&number) {
            return Err(violation(
                format!("value must lie between {} and {}", self.min, self.max),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(CellValue::Float(number)))
    }
}

/// Checks that the length of a value, in characters, lies in an inclusive range.
#[derive(Debug, Clone, Copy)]
pub struct StrMinMax {
    min: usize,
    max: usize,
}

impl StrMinMax {
    /// Fails with [`CsvError::Configuration`] if `max < min`.
    pub fn new(min: usize, max: usize) -> CsvResult<Self> {
        check_range(min, max)?;
        Ok(Self { min, max })
    }
}

impl CellProcessor for StrMinMax {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let length = text_of(&value, context)?.chars().count();
        if length < self.min || length > self.max {
            return Err(violation(
                format!(
                    "length must lie between {} and {} characters, but was {}",
                    self.min, self.max, length
                ),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(value))
    }
}

/// Checks that the length of a value, in characters, is one of the allowed lengths.
#[derive(Debug, Clone)]
pub struct Strlen {
    lengths: BTreeSet<usize>,
}

impl Strlen {
    pub fn new(lengths: impl IntoIterator<Item = usize>) -> Self {
        Self {
            lengths: lengths.into_iter().collect(),
        }
    }
}

impl CellProcessor for Strlen {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let length = text_of(&value, context)?.chars().count();
        if !self.lengths.contains(&length) {
            return Err(violation(
                format!("length must be one of {:?}, but was {}", self.lengths, length),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(value))
    }
}

/// Checks that the whole value matches a regular expression.
#[derive(Debug, Clone)]
pub struct StrRegEx {
    source: String,
    pattern: Regex,
}

impl StrRegEx {
    pub fn new(pattern: &str) -> CsvResult<Self> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern)).map_err(|error| {
            CsvError::Configuration(format!("invalid regular expression '{}': {}", pattern, error))
        })?;
        Ok(Self {
            source: pattern.to_string(),
            pattern: anchored,
        })
    }
}

impl CellProcessor for StrRegEx {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let text = text_of(&value, context)?;
        if !self.pattern.is_match(&text) {
            return Err(violation(
                format!("value must match the regular expression '{}'", self.source),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(value))
    }
}

/// Fails on the second occurrence of a value.
///
/// The values seen so far belong to this instance and live as long as it
/// does: reusing the same chain for another file keeps the history unless
/// [`Unique::reset`] is called. To check uniqueness across several columns,
/// wrap one instance in an `Rc` and put clones of it in each chain.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use super_csv::core::{context::CsvContext, processor::Chain};
/// use super_csv::processor::Unique;
///
/// let ids = Rc::new(Unique::new());
/// let primary = Chain::new().then(Rc::clone(&ids));
/// let secondary = Chain::new().then(Rc::clone(&ids));
///
/// let context = CsvContext::new(1, 1, 1);
/// assert!(primary.execute("a".into(), &context).is_ok());
/// assert!(secondary.execute("a".into(), &context).is_err());
///
/// ids.reset();
/// assert!(secondary.execute("a".into(), &context).is_ok());
/// ```
#[derive(Debug, Default)]
pub struct Unique {
    seen: RefCell<HashSet<String>>,
}

impl Unique {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every value seen so far.
    pub fn reset(&self) {
        self.seen.borrow_mut().clear();
    }
}

impl CellProcessor for Unique {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let key = text_of(&value, context)?;
        if !self.seen.borrow_mut().insert(key) {
            return Err(violation("value must be unique", &value, context));
        }
        Ok(Outcome::Continue(value))
    }
}

/// Checks that every value equals a constant, or, without one, the first value seen.
#[derive(Debug, Default)]
pub struct Equals {
    expected: RefCell<Option<CellValue>>,
}

impl Equals {
    /// All values of the column must be equal to the first one.
    pub fn new() -> Self {
        Self::default()
    }

    /// All values must be equal to `expected`.
    pub fn to(expected: impl Into<CellValue>) -> Self {
        Self {
            expected: RefCell::new(Some(expected.into())),
        }
    }
}

impl CellProcessor for Equals {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let mut expected = self.expected.borrow_mut();
        let expected = expected.get_or_insert_with(|| value.clone());
        if *expected != value {
            return Err(violation(
                format!("value must be equal to '{}'", expected),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(value))
    }
}

/// Checks that a value belongs to a fixed set.
#[derive(Debug, Clone)]
pub struct IsIncludedIn {
    allowed: Vec<CellValue>,
}

impl IsIncludedIn {
    pub fn new<I>(allowed: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CellValue>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl CellProcessor for IsIncludedIn {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        if value.is_null() {
            return Err(null_input(context));
        }
        if !self.allowed.contains(&value) {
            let allowed: Vec<String> = self.allowed.iter().map(ToString::to_string).collect();
            return Err(violation(
                format!("value must be one of [{}]", allowed.join(", ")),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(value))
    }
}

/// Checks that a value contains at least one of the given substrings.
#[derive(Debug, Clone)]
pub struct RequireSubStr {
    substrings: Vec<String>,
}

impl RequireSubStr {
    pub fn new<I>(substrings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            substrings: substrings.into_iter().map(Into::into).collect(),
        }
    }
}

impl CellProcessor for RequireSubStr {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let text = text_of(&value, context)?;
        if !self.substrings.iter().any(|s| text.contains(s.as_str())) {
            return Err(violation(
                format!("value must contain one of {:?}", self.substrings),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(value))
    }
}

/// Checks that a value contains none of the given substrings.
#[derive(Debug, Clone)]
pub struct ForbidSubStr {
    substrings: Vec<String>,
}

impl ForbidSubStr {
    pub fn new<I>(substrings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            substrings: substrings.into_iter().map(Into::into).collect(),
        }
    }
}

impl CellProcessor for ForbidSubStr {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let text = text_of(&value, context)?;
        if let Some(found) = self.substrings.iter().find(|s| text.contains(s.as_str())) {
            return Err(violation(
                format!("value must not contain '{}'", found),
                &value,
                context,
            ));
        }
        Ok(Outcome::Continue(value))
    }
}
