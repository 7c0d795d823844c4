//! Job parameters and per-operation parameter schemas.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OperationError;

/// A single loosely-typed scalar parameter as it arrives from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Shape name used in type-error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// Parameters attached to a job.
pub type Params = HashMap<String, ParamValue>;

/// Builds a [`Params`] map from `(name, value)` pairs.
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Declared type of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Whole number; floats are accepted and truncated toward zero
    Integer,
    /// Any numeric value
    Number,
    Text,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Text => "string",
        }
    }
}

/// One entry of an operation's parameter schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind }
    }
}

/// Parameters after schema validation; typed accessors cannot fail for
/// declared names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidParams {
    ints: HashMap<&'static str, i64>,
    numbers: HashMap<&'static str, f64>,
    texts: HashMap<&'static str, String>,
}

impl ValidParams {
    pub fn int(&self, name: &str) -> Result<i64, OperationError> {
        self.ints
            .get(name)
            .copied()
            .ok_or_else(|| OperationError::MissingParameter(name.to_string()))
    }

    pub fn number(&self, name: &str) -> Result<f64, OperationError> {
        self.numbers
            .get(name)
            .copied()
            .ok_or_else(|| OperationError::MissingParameter(name.to_string()))
    }

    pub fn text(&self, name: &str) -> Result<&str, OperationError> {
        self.texts
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| OperationError::MissingParameter(name.to_string()))
    }
}

/// Checks `params` against `schema`. Undeclared parameters are ignored.
pub fn validate(schema: &[ParamSpec], params: &Params) -> Result<ValidParams, OperationError> {
    let mut valid = ValidParams::default();

    for spec in schema {
        let value = params
            .get(spec.name)
            .ok_or_else(|| OperationError::MissingParameter(spec.name.to_string()))?;

        let type_error = || OperationError::InvalidParameterType {
            name: spec.name.to_string(),
            expected: spec.kind.as_str(),
            found: value.shape(),
        };

        match (spec.kind, value) {
            (ParamKind::Integer, ParamValue::Int(v)) => {
                valid.ints.insert(spec.name, *v);
            }
            (ParamKind::Integer, ParamValue::Float(v)) if v.is_finite() => {
                valid.ints.insert(spec.name, v.trunc() as i64);
            }
            (ParamKind::Number, ParamValue::Int(v)) => {
                valid.numbers.insert(spec.name, *v as f64);
            }
            (ParamKind::Number, ParamValue::Float(v)) => {
                valid.numbers.insert(spec.name, *v);
            }
            (ParamKind::Text, ParamValue::Str(v)) => {
                valid.texts.insert(spec.name, v.clone());
            }
            _ => return Err(type_error()),
        }
    }

    Ok(valid)
}
