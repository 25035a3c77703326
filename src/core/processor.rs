use std::{fmt, rc::Rc};

use crate::error::CsvResult;

use super::{cell::CellValue, context::CsvContext};

/// What a processor hands back to its chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Pass the value on to the next processor of the chain.
    Continue(CellValue),
    /// Stop the chain here; the value is the chain's result.
    Finish(CellValue),
}

impl Outcome {
    pub fn into_value(self) -> CellValue {
        match self {
            Outcome::Continue(value) | Outcome::Finish(value) => value,
        }
    }
}

/// Result type returned by a [`CellProcessor`].
pub type CellProcessorResult = CsvResult<Outcome>;

/// A single stage of a column's processing pipeline.
///
/// Stages transform or validate one cell at a time. They take `&self`: a stage
/// that needs state across rows (such as [`crate::processor::Unique`]) keeps
/// it behind interior mutability, which makes it usable by one reader or
/// writer at a time.
pub trait CellProcessor {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult;
}

/// Lets one stage instance, and therefore its state, be shared by several chains.
impl<P: CellProcessor + ?Sized> CellProcessor for Rc<P> {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        (**self).execute(value, context)
    }
}

/// A stage backed by a closure, for one-off rules.
pub struct FnProcessor<F>(F);

/// Wraps a closure into a [`CellProcessor`].
///
/// # Examples
///
/// ```
/// use super_csv::core::{cell::CellValue, context::CsvContext, processor::{from_fn, Chain, Outcome}};
///
/// let chain = Chain::new().then(from_fn(|value: CellValue, _: &CsvContext| {
///     Ok(Outcome::Continue(CellValue::Text(value.to_string().to_uppercase())))
/// }));
///
/// let result = chain.execute("abc".into(), &CsvContext::new(1, 1, 1)).unwrap();
/// assert_eq!(result, CellValue::from("ABC"));
/// ```
pub fn from_fn<F>(f: F) -> FnProcessor<F>
where
    F: Fn(CellValue, &CsvContext) -> CellProcessorResult,
{
    FnProcessor(f)
}

impl<F> CellProcessor for FnProcessor<F>
where
    F: Fn(CellValue, &CsvContext) -> CellProcessorResult,
{
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        (self.0)(value, context)
    }
}

/// The ordered pipeline of processors bound to one column.
///
/// A chain is built once at configuration time and executed once per cell.
/// Execution is sequential and stops at the first failure or at the first
/// stage returning [`Outcome::Finish`]. An empty chain is the identity.
///
/// # Examples
///
/// ```
/// use super_csv::core::{cell::CellValue, context::CsvContext, processor::Chain};
/// use super_csv::processor::{LMinMax, Optional, ParseInt};
///
/// let age = Chain::new()
///     .then(Optional::new())
///     .then(ParseInt::new())
///     .then(LMinMax::new(0, 150).unwrap());
///
/// let context = CsvContext::new(2, 2, 3);
/// assert_eq!(age.execute("42".into(), &context).unwrap(), CellValue::Integer(42));
/// assert_eq!(age.execute(CellValue::Null, &context).unwrap(), CellValue::Null);
/// assert!(age.execute("200".into(), &context).is_err());
/// ```
#[derive(Default)]
pub struct Chain {
    stages: Vec<Box<dyn CellProcessor>>,
}

impl Chain {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage at the end of the chain.
    pub fn then(mut self, processor: impl CellProcessor + 'static) -> Self {
        self.stages.push(Box::new(processor));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the cell through every stage, in order.
    pub fn execute(&self, value: CellValue, context: &CsvContext) -> CsvResult<CellValue> {
        let mut current = value;
        for stage in &self.stages {
            match stage.execute(current, context)? {
                Outcome::Continue(value) => current = value,
                Outcome::Finish(value) => return Ok(value),
            }
        }
        Ok(current)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::CsvError;

    struct Failing;

    impl CellProcessor for Failing {
        fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
            Err(CsvError::Constraint {
                rule: "always fails".to_string(),
                value: value.to_string(),
                context: context.clone(),
            })
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: Cell<usize>,
    }

    impl CellProcessor for Counting {
        fn execute(&self, value: CellValue, _: &CsvContext) -> CellProcessorResult {
            self.calls.set(self.calls.get() + 1);
            Ok(Outcome::Continue(value))
        }
    }

    #[test]
    fn empty_chain_should_be_identity() {
        let chain = Chain::new();
        let context = CsvContext::new(1, 1, 1);

        assert!(chain.is_empty());
        assert_eq!(chain.execute("x".into(), &context).unwrap(), CellValue::from("x"));
        assert_eq!(chain.execute(CellValue::Null, &context).unwrap(), CellValue::Null);
    }

    #[test]
    fn chain_should_stop_at_first_failure() {
        let counting = Rc::new(Counting::default());
        let chain = Chain::new().then(Failing).then(Rc::clone(&counting));
        let context = CsvContext::new(9, 4, 2).with_column_name(Some("id".to_string()));

        let error = chain.execute("v".into(), &context).unwrap_err();

        assert_eq!(counting.calls.get(), 0);
        assert_eq!(error.context(), Some(&context));
    }

    #[test]
    fn finish_should_skip_remaining_stages() {
        let counting = Rc::new(Counting::default());
        let chain = Chain::new()
            .then(from_fn(|_, _| Ok(Outcome::Finish(CellValue::from(1)))))
            .then(Rc::clone(&counting));

        let result = chain.execute("v".into(), &CsvContext::default()).unwrap();

        assert_eq!(result, CellValue::Integer(1));
        assert_eq!(counting.calls.get(), 0);
        assert_eq!(chain.len(), 2);
    }
}
