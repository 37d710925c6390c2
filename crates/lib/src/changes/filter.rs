//! Ignore and affects-all pattern sets.
//!
//! Patterns are matched against repository-relative path strings with
//! full-match semantics: `.*\.md` matches `README.md` but a bare `core`
//! does not match `core/src/lib.rs`.

use regex::Regex;

use crate::manifest::{ConfigError, Settings};

/// Compiled ignore and affects-all patterns.
#[derive(Debug, Default)]
pub struct ChangeFilter {
  ignored: Vec<Regex>,
  affects_all: Vec<Regex>,
}

impl ChangeFilter {
  /// Compile both pattern sets from the settings.
  ///
  /// A pattern that fails to compile is a fatal configuration error.
  pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
    Ok(Self {
      ignored: compile("ignore", &settings.ignore)?,
      affects_all: compile("affects-all", &settings.affects_all)?,
    })
  }

  /// Whether a changed path is dropped before resolution.
  pub fn is_ignored(&self, path: &str) -> bool {
    self.ignored.iter().any(|re| re.is_match(path))
  }

  /// Whether a changed path marks every module as affected.
  pub fn affects_all(&self, path: &str) -> bool {
    self.affects_all.iter().any(|re| re.is_match(path))
  }
}

fn compile(field: &'static str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
  patterns
    .iter()
    .map(|pattern| {
      Regex::new(&format!("^(?:{pattern})$")).map_err(|err| ConfigError::InvalidPattern {
        field,
        pattern: pattern.clone(),
        message: err.to_string(),
      })
    })
    .collect()
}
