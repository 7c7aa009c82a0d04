//! Filter expression parser.

use super::{Comparator, FilterValue, Term};
use crate::error::{PipewrightError, Result};
use crate::naming::to_snake_case;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(f64),
    Op(Comparator),
    LParen,
    RParen,
}

pub(super) fn parse_terms(input: &str) -> Result<Vec<Term>> {
    let tokens = tokenize(input)?;
    let mut terms = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        if !terms.is_empty() {
            match tokens.get(pos) {
                Some(Token::Ident(kw)) if kw == "AND" => pos += 1,
                other => return Err(error(input, format!("expected AND, found {:?}", other))),
            }
        }

        let field = match tokens.get(pos) {
            Some(Token::Ident(name)) if name != "AND" => to_snake_case(name),
            other => return Err(error(input, format!("expected field name, found {:?}", other))),
        };
        pos += 1;

        let comparator = match tokens.get(pos) {
            Some(Token::Op(op)) => *op,
            other => return Err(error(input, format!("expected comparator, found {:?}", other))),
        };
        pos += 1;

        let (value, consumed) = parse_value(input, &tokens[pos..])?;
        pos += consumed;

        terms.push(Term {
            field,
            comparator,
            value,
        });
    }

    Ok(terms)
}

fn parse_value(input: &str, tokens: &[Token]) -> Result<(FilterValue, usize)> {
    match tokens {
        [Token::Ident(func), Token::LParen, Token::Str(raw), Token::RParen, ..]
            if func == "timestamp" =>
        {
            let ts = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| error(input, format!("invalid timestamp '{}': {}", raw, e)))?;
            Ok((FilterValue::Timestamp(ts.with_timezone(&Utc)), 4))
        }
        [Token::Str(s), ..] => Ok((FilterValue::Text(s.clone()), 1)),
        [Token::Number(n), ..] => Ok((FilterValue::Number(*n), 1)),
        [Token::Ident(word), ..] if word == "true" => Ok((FilterValue::Bool(true), 1)),
        [Token::Ident(word), ..] if word == "false" => Ok((FilterValue::Bool(false), 1)),
        [Token::Ident(word), next, ..] if *next == Token::LParen => {
            Err(error(input, format!("unknown function '{}'", word)))
        }
        [Token::Ident(word), ..] if word != "AND" => Ok((FilterValue::Text(word.clone()), 1)),
        other => Err(error(
            input,
            format!("expected value, found {:?}", other.first()),
        )),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '"' => {
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(error(input, "unterminated string".to_string())),
                        Some('\\') => {
                            if let Some(escaped) = chars.get(i + 1) {
                                value.push(*escaped);
                            }
                            i += 2;
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some(ch) => {
                            value.push(*ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            '=' => {
                tokens.push(Token::Op(Comparator::Eq));
                i += 1;
            }
            ':' => {
                tokens.push(Token::Op(Comparator::Has));
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op(Comparator::Ne));
                i += 2;
            }
            '<' | '>' => {
                let or_equal = chars.get(i + 1) == Some(&'=');
                let op = match (c, or_equal) {
                    ('<', true) => Comparator::Le,
                    ('<', false) => Comparator::Lt,
                    ('>', true) => Comparator::Ge,
                    _ => Comparator::Gt,
                };
                tokens.push(Token::Op(op));
                i += if or_equal { 2 } else { 1 };
            }
            c if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| error(input, format!("invalid number '{}'", text)))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.' || chars[i] == '-')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(error(input, format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

fn error(filter: &str, cause: String) -> PipewrightError {
    PipewrightError::InvalidFilter {
        filter: filter.to_string(),
        cause,
    }
}
