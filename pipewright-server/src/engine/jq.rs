//! A small jq subset for the json component.
//!
//! Supported: `.`, `.field`, `."quoted field"`, `.[n]` (negative counts from
//! the end), `.["key"]`, `.[]`, chains of those, a trailing `?` on any step to
//! suppress its errors, and `|` pipes.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Field(String),
    Index(i64),
    Iterate,
}

#[derive(Debug, Clone, PartialEq)]
struct Access {
    step: Step,
    optional: bool,
}

/// A compiled filter.
#[derive(Debug, Clone, PartialEq)]
pub struct JqFilter {
    accesses: Vec<Access>,
}

impl JqFilter {
    /// Compile a filter expression.
    pub fn compile(source: &str) -> Result<Self, String> {
        let mut accesses = Vec::new();
        for stage in split_pipes(source)? {
            accesses.extend(parse_stage(stage.trim())?);
        }
        Ok(Self { accesses })
    }

    /// Run the filter, producing zero or more results.
    pub fn run(&self, input: &Value) -> Result<Vec<Value>, String> {
        let mut values = vec![input.clone()];
        for access in &self.accesses {
            let mut next = Vec::with_capacity(values.len());
            for value in &values {
                match apply(&access.step, value) {
                    Ok(results) => next.extend(results),
                    Err(_) if access.optional => {}
                    Err(e) => return Err(e),
                }
            }
            values = next;
        }
        Ok(values)
    }
}

fn split_pipes(source: &str) -> Result<Vec<&str>, String> {
    let mut stages = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in source.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '|' if !in_string => {
                stages.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_string {
        return Err("unterminated string in filter".to_string());
    }
    stages.push(&source[start..]);
    Ok(stages)
}

fn parse_stage(stage: &str) -> Result<Vec<Access>, String> {
    let chars: Vec<char> = stage.chars().collect();
    if chars.first() != Some(&'.') {
        return Err(format!("unsupported filter '{}': expected a path starting with '.'", stage));
    }

    let mut accesses = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        let step = match chars[pos] {
            '.' => {
                pos += 1;
                match chars.get(pos) {
                    None => {
                        if !accesses.is_empty() {
                            return Err(format!("dangling '.' in '{}'", stage));
                        }
                        break;
                    }
                    Some('[') => continue,
                    Some('"') => {
                        let (name, end) = parse_quoted(&chars, pos)?;
                        pos = end;
                        Step::Field(name)
                    }
                    Some(c) if c.is_ascii_alphabetic() || *c == '_' => {
                        let start = pos;
                        while pos < chars.len()
                            && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_')
                        {
                            pos += 1;
                        }
                        Step::Field(chars[start..pos].iter().collect())
                    }
                    Some(c) => return Err(format!("unexpected '{}' in '{}'", c, stage)),
                }
            }
            '[' => {
                pos += 1;
                let close = chars[pos..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|offset| pos + offset)
                    .ok_or_else(|| format!("unclosed '[' in '{}'", stage))?;
                let inner: String = chars[pos..close].iter().collect::<String>();
                let inner = inner.trim();
                let step = if inner.is_empty() {
                    Step::Iterate
                } else if inner.starts_with('"') {
                    let quoted: Vec<char> = inner.chars().collect();
                    let (name, end) = parse_quoted(&quoted, 0)?;
                    if end != quoted.len() {
                        return Err(format!("unexpected text after key in '{}'", stage));
                    }
                    Step::Field(name)
                } else {
                    Step::Index(
                        inner
                            .parse::<i64>()
                            .map_err(|_| format!("invalid index '{}' in '{}'", inner, stage))?,
                    )
                };
                pos = close + 1;
                step
            }
            c if c.is_whitespace() => {
                pos += 1;
                continue;
            }
            c => return Err(format!("unexpected '{}' in '{}'", c, stage)),
        };

        let optional = chars.get(pos) == Some(&'?');
        if optional {
            pos += 1;
        }
        accesses.push(Access { step, optional });
    }
    Ok(accesses)
}

/// Parse a double-quoted string starting at `start`; returns it and the
/// position after the closing quote.
fn parse_quoted(chars: &[char], start: usize) -> Result<(String, usize), String> {
    let mut out = String::new();
    let mut pos = start + 1;
    while pos < chars.len() {
        match chars[pos] {
            '"' => return Ok((out, pos + 1)),
            '\\' if pos + 1 < chars.len() => {
                pos += 1;
                out.push(match chars[pos] {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
            }
            c => out.push(c),
        }
        pos += 1;
    }
    Err("unterminated string in filter".to_string())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn apply(step: &Step, value: &Value) -> Result<Vec<Value>, String> {
    match (step, value) {
        (Step::Field(_) | Step::Index(_), Value::Null) => Ok(vec![Value::Null]),
        (Step::Field(name), Value::Object(map)) => {
            Ok(vec![map.get(name).cloned().unwrap_or(Value::Null)])
        }
        (Step::Field(name), other) => Err(format!(
            "Cannot index {} with \"{}\"",
            type_name(other),
            name
        )),
        (Step::Index(i), Value::Array(items)) => {
            let len = items.len() as i64;
            let idx = if *i < 0 { len + i } else { *i };
            let item = if (0..len).contains(&idx) {
                items[idx as usize].clone()
            } else {
                Value::Null
            };
            Ok(vec![item])
        }
        (Step::Index(_), other) => Err(format!("Cannot index {} with number", type_name(other))),
        (Step::Iterate, Value::Array(items)) => Ok(items.clone()),
        (Step::Iterate, Value::Object(map)) => Ok(map.values().cloned().collect()),
        (Step::Iterate, other) => Err(format!("Cannot iterate over {}", type_name(other))),
    }
}
