//! Reference expression parser.
//!
//! Parses expressions like `${variable.prompt}`, `${json-0.output.results[0]}`
//! and `${connection.my-conn}`.

use crate::error::{PipewrightError, Result};
use serde_json::Value;
use std::fmt;

/// One step in a reference path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object field.
    Field(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{}", name),
            Self::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A parsed reference expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The full original expression (e.g., "${variable.prompt}").
    pub raw: String,
    /// The root (a reserved root or a component id).
    pub root: String,
    /// Path below the root.
    pub path: Vec<Segment>,
}

impl Reference {
    /// First path segment, when it is a field name.
    pub fn first_field(&self) -> Option<&str> {
        match self.path.first() {
            Some(Segment::Field(name)) => Some(name),
            _ => None,
        }
    }

    /// Path rendered without the root (e.g. `output.results[0]`).
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            out.push_str(&segment.to_string());
        }
        out.trim_start_matches('.').to_string()
    }

    /// Walk `value` along `path[skip..]`.
    pub fn lookup<'v>(&self, value: &'v Value, skip: usize) -> Option<&'v Value> {
        self.path.iter().skip(skip).try_fold(value, |current, segment| match segment {
            Segment::Field(name) => current.get(name.as_str()),
            Segment::Index(i) => current.get(*i),
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parser for reference expressions.
pub struct ReferenceParser;

impl ReferenceParser {
    /// Extract every reference embedded in a string.
    pub fn parse_all(input: &str) -> Result<Vec<Reference>> {
        let mut references = Vec::new();
        let mut rest = input;

        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| PipewrightError::ReferenceSyntax {
                reference: format!("${{{}", after),
                cause: "Unclosed reference expression".to_string(),
            })?;
            references.push(Self::parse_expression(&after[..end])?);
            rest = &after[end + 1..];
        }

        Ok(references)
    }

    /// Extract every reference from all strings inside a JSON value.
    pub fn collect(value: &Value) -> Result<Vec<Reference>> {
        let mut out = Vec::new();
        Self::collect_into(value, &mut out)?;
        Ok(out)
    }

    fn collect_into(value: &Value, out: &mut Vec<Reference>) -> Result<()> {
        match value {
            Value::String(s) => out.extend(Self::parse_all(s)?),
            Value::Array(items) => {
                for item in items {
                    Self::collect_into(item, out)?;
                }
            }
            Value::Object(map) => {
                for item in map.values() {
                    Self::collect_into(item, out)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Parse a single expression (without the `${}` wrapper).
    pub fn parse_expression(expr: &str) -> Result<Reference> {
        let expr = expr.trim();
        let syntax = |cause: String| PipewrightError::ReferenceSyntax {
            reference: format!("${{{}}}", expr),
            cause,
        };

        if expr.is_empty() {
            return Err(syntax("Empty reference expression".to_string()));
        }

        let bytes = expr.as_bytes();
        let mut pos = identifier_end(expr, 0);
        if pos == 0 {
            return Err(syntax(format!("Invalid root in '{}'", expr)));
        }
        let root = expr[..pos].to_string();
        let mut path = Vec::new();

        while pos < bytes.len() {
            match bytes[pos] {
                b'.' => {
                    let end = identifier_end(expr, pos + 1);
                    if end == pos + 1 {
                        return Err(syntax(format!("Expected field name at offset {}", pos + 1)));
                    }
                    path.push(Segment::Field(expr[pos + 1..end].to_string()));
                    pos = end;
                }
                b'[' => {
                    let close = expr[pos..]
                        .find(']')
                        .map(|i| pos + i)
                        .ok_or_else(|| syntax("Unclosed '['".to_string()))?;
                    let inner = expr[pos + 1..close].trim();
                    let segment = if let Some(key) = inner
                        .strip_prefix('"')
                        .and_then(|s| s.strip_suffix('"'))
                    {
                        Segment::Field(key.to_string())
                    } else {
                        let index = inner
                            .parse::<usize>()
                            .map_err(|_| syntax(format!("Invalid index '{}'", inner)))?;
                        Segment::Index(index)
                    };
                    path.push(segment);
                    pos = close + 1;
                }
                other => {
                    return Err(syntax(format!("Unexpected character '{}'", other as char)));
                }
            }
        }

        Ok(Reference {
            raw: format!("${{{}}}", expr),
            root,
            path,
        })
    }

    /// Check if a string is a valid reference identifier.
    pub fn is_valid_identifier(s: &str) -> bool {
        !s.is_empty() && identifier_end(s, 0) == s.len()
    }

    /// If `input` is exactly one reference, parse it.
    pub fn as_single(input: &str) -> Result<Option<Reference>> {
        let trimmed = input.trim();
        if let Some(inner) = trimmed.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
            if !inner.contains("${") && !inner.contains('}') {
                return Self::parse_expression(inner).map(Some);
            }
        }
        Ok(None)
    }

    /// Replace references in a JSON template with resolved values.
    ///
    /// A string that is exactly one reference is replaced by the resolved
    /// value itself; references embedded in text are rendered into the string.
    pub fn interpolate<F>(template: &Value, resolver: &F) -> Result<Value>
    where
        F: Fn(&Reference) -> Result<Value>,
    {
        match template {
            Value::String(s) => Self::interpolate_str(s, resolver),
            Value::Array(items) => items
                .iter()
                .map(|item| Self::interpolate(item, resolver))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), Self::interpolate(item, resolver)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn interpolate_str<F>(input: &str, resolver: &F) -> Result<Value>
    where
        F: Fn(&Reference) -> Result<Value>,
    {
        if let Some(reference) = Self::as_single(input)? {
            return resolver(&reference);
        }

        let mut result = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| PipewrightError::ReferenceSyntax {
                reference: format!("${{{}", after),
                cause: "Unclosed reference expression".to_string(),
            })?;
            let reference = Self::parse_expression(&after[..end])?;
            match resolver(&reference)? {
                Value::String(s) => result.push_str(&s),
                Value::Null => {}
                other => result.push_str(&other.to_string()),
            }
            rest = &after[end + 1..];
        }
        result.push_str(rest);

        Ok(Value::String(result))
    }
}

/// Byte offset where an identifier starting at `start` ends.
///
/// Identifiers start with a letter or `_` and continue with letters,
/// digits, `_` or `-`.
fn identifier_end(s: &str, start: usize) -> usize {
    let bytes = s.as_bytes();
    if start >= bytes.len() || !(bytes[start].is_ascii_alphabetic() || bytes[start] == b'_') {
        return start;
    }
    let mut end = start + 1;
    while end < bytes.len()
        && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b'-')
    {
        end += 1;
    }
    end
}
