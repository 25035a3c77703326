use regex::Regex;

use crate::error::{CsvError, CsvResult};

/// Decides whether a physical line is a comment.
///
/// Matchers are only consulted on the first physical line of a record, so a
/// line continuing a multi-line quoted field is never treated as a comment.
pub trait CommentMatcher: Send + Sync {
    fn is_comment(&self, line: &str) -> bool;
}

/// Lines starting with a fixed prefix are comments.
#[derive(Debug, Clone)]
pub struct CommentStartsWith {
    prefix: String,
}

impl CommentStartsWith {
    pub fn new(prefix: impl Into<String>) -> CsvResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(CsvError::Configuration(
                "comment prefix should not be empty".to_string(),
            ));
        }
        Ok(Self { prefix })
    }
}

impl CommentMatcher for CommentStartsWith {
    fn is_comment(&self, line: &str) -> bool {
        line.starts_with(&self.prefix)
    }
}

/// Lines entirely matching a regular expression are comments.
#[derive(Debug, Clone)]
pub struct CommentMatches {
    regex: Regex,
}

impl CommentMatches {
    pub fn new(pattern: &str) -> CsvResult<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|error| {
            CsvError::Configuration(format!("invalid comment pattern '{}': {}", pattern, error))
        })?;
        Ok(Self { regex })
    }
}

impl CommentMatcher for CommentMatches {
    fn is_comment(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_should_match_prefix_only() {
        let matcher = CommentStartsWith::new("#").unwrap();

        assert!(matcher.is_comment("# a comment"));
        assert!(!matcher.is_comment(" # indented"));
        assert!(!matcher.is_comment("a,#b"));
    }

    #[test]
    fn empty_prefix_should_be_rejected() {
        assert!(matches!(
            CommentStartsWith::new(""),
            Err(CsvError::Configuration(_))
        ));
    }

    #[test]
    fn matches_should_require_whole_line() {
        let matcher = CommentMatches::new(r"//.*").unwrap();

        assert!(matcher.is_comment("// note"));
        assert!(!matcher.is_comment("a // note"));
        assert!(CommentMatches::new("(").is_err());
    }
}
