//! A single pipeline step and its options

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Value of a step option
///
/// A bare token on a configuration line is a flag and stands for the literal
/// true. `flag` and `flag=true` are deliberately kept apart: provenance is
/// compared as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    /// Bare token without `=`
    Flag,
    /// Explicit `key=value`
    Value(String),
}

impl OptionValue {
    /// String form of the value; flags read as `"true"`
    pub fn as_str(&self) -> &str {
        match self {
            OptionValue::Flag => "true",
            OptionValue::Value(value) => value,
        }
    }

    /// Whether this is a bare flag
    pub fn is_flag(&self) -> bool {
        matches!(self, OptionValue::Flag)
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Flag => serializer.serialize_bool(true),
            OptionValue::Value(value) => serializer.serialize_str(value),
        }
    }
}

/// Options of a step, ordered by key
pub type StepOptions = BTreeMap<String, OptionValue>;

/// One named step of a pipeline with its options
///
/// Equality is structural: two steps are equal when their names and full
/// option maps are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStep {
    /// Stage name (first token of the configuration line)
    pub name: String,
    /// Options from the remaining tokens
    pub options: StepOptions,
}

impl PipelineStep {
    /// Create a step without options
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: StepOptions::new(),
        }
    }

    /// Add a `key=value` option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options
            .insert(key.into(), OptionValue::Value(value.into()));
        self
    }

    /// Add a bare flag option
    pub fn with_flag(mut self, key: impl Into<String>) -> Self {
        self.options.insert(key.into(), OptionValue::Flag);
        self
    }

    /// Look up an option value
    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    /// Parse one configuration line
    ///
    /// Returns `None` for blank lines and `#` comments. Tokens after the
    /// name are split on the first `=`; tokens without `=` become flags.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let mut tokens = trimmed.split_whitespace();
        let name = tokens.next()?;
        let mut step = PipelineStep::new(name);
        for token in tokens {
            match token.split_once('=') {
                Some((key, value)) => {
                    step.options
                        .insert(key.to_string(), OptionValue::Value(value.to_string()));
                }
                None => {
                    step.options.insert(token.to_string(), OptionValue::Flag);
                }
            }
        }
        Some(step)
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.options {
            match value {
                OptionValue::Flag => write!(f, " {key}")?,
                OptionValue::Value(value) => write!(f, " {key}={value}")?,
            }
        }
        Ok(())
    }
}
