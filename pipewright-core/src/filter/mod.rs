//! List filtering.
//!
//! Supports a subset of AIP-160: conjunctions of `field op value` terms where
//! `op` is one of `= != < <= > >= :` and values are strings, numbers,
//! booleans, bare enum words or `timestamp("RFC3339")`. The `:` operator and
//! the `q`, `q_title` fields match case-insensitive substrings.

mod parser;

use crate::error::{PipewrightError, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Comparison operator of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `:` (contains)
    Has,
}

/// A literal in a filter, or a field value exposed by a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Text or enum value.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Point in time.
    Timestamp(DateTime<Utc>),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// One `field op value` term.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    /// Field name in snake_case.
    pub field: String,
    /// Operator.
    pub comparator: Comparator,
    /// Literal to compare against.
    pub value: FilterValue,
}

/// Fields every resource answers with fuzzy text search.
pub const TEXT_SEARCH_FIELDS: [&str; 2] = ["q", "q_title"];

/// A resource that can be filtered.
pub trait Filterable {
    /// Names (snake_case) of the fields this resource exposes.
    fn filter_fields() -> &'static [&'static str];

    /// Value of a field, `None` when unset.
    fn filter_value(&self, field: &str) -> Option<FilterValue>;

    /// Text matched by `q_title`.
    fn title_text(&self) -> String;

    /// Text matched by `q`.
    fn search_text(&self) -> String {
        self.title_text()
    }
}

/// A parsed filter: a conjunction of terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<Term>,
}

impl Filter {
    /// Parse a filter expression. An empty expression matches everything.
    pub fn parse(expr: &str) -> Result<Self> {
        Ok(Self {
            terms: parser::parse_terms(expr)?,
        })
    }

    /// Parse an optional expression and check its fields against `T`.
    pub fn parse_for<T: Filterable>(expr: Option<&str>) -> Result<Self> {
        let filter = match expr {
            Some(expr) => Self::parse(expr)?,
            None => Self::default(),
        };
        filter.check_fields::<T>(expr.unwrap_or_default())?;
        Ok(filter)
    }

    fn check_fields<T: Filterable>(&self, expr: &str) -> Result<()> {
        for term in &self.terms {
            let known = TEXT_SEARCH_FIELDS.contains(&term.field.as_str())
                || T::filter_fields().contains(&term.field.as_str());
            if !known {
                return Err(PipewrightError::InvalidFilter {
                    filter: expr.to_string(),
                    cause: format!("unknown field '{}'", term.field),
                });
            }
        }
        Ok(())
    }

    /// The parsed terms.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Whether the filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Check whether `item` satisfies every term.
    pub fn matches<T: Filterable>(&self, item: &T) -> bool {
        self.terms.iter().all(|term| term_matches(term, item))
    }

    /// Keep the items that match.
    pub fn apply<T: Filterable>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

fn term_matches<T: Filterable>(term: &Term, item: &T) -> bool {
    match term.field.as_str() {
        "q" => return fuzzy(&item.search_text(), &term.value),
        "q_title" => return fuzzy(&item.title_text(), &term.value),
        _ => {}
    }

    let Some(actual) = item.filter_value(&term.field) else {
        return term.comparator == Comparator::Ne;
    };

    if term.comparator == Comparator::Has {
        return match &actual {
            FilterValue::Text(text) => fuzzy(text, &term.value),
            _ => compare(&actual, &term.value) == Some(Ordering::Equal),
        };
    }

    let Some(ordering) = compare(&actual, &term.value) else {
        return term.comparator == Comparator::Ne;
    };
    match term.comparator {
        Comparator::Eq => ordering == Ordering::Equal,
        Comparator::Ne => ordering != Ordering::Equal,
        Comparator::Lt => ordering == Ordering::Less,
        Comparator::Le => ordering != Ordering::Greater,
        Comparator::Gt => ordering == Ordering::Greater,
        Comparator::Ge => ordering != Ordering::Less,
        Comparator::Has => ordering == Ordering::Equal,
    }
}

fn fuzzy(haystack: &str, needle: &FilterValue) -> bool {
    let needle = match needle {
        FilterValue::Text(s) => s.to_lowercase(),
        FilterValue::Number(n) => n.to_string(),
        FilterValue::Bool(b) => b.to_string(),
        FilterValue::Timestamp(ts) => ts.to_rfc3339(),
    };
    haystack.to_lowercase().contains(&needle)
}

/// Compare a field value with a literal, coercing text literals to the
/// field's type. `None` when the two cannot be compared.
fn compare(actual: &FilterValue, literal: &FilterValue) -> Option<Ordering> {
    match (actual, literal) {
        (FilterValue::Text(a), FilterValue::Text(b)) => Some(a.cmp(b)),
        (FilterValue::Number(a), FilterValue::Number(b)) => a.partial_cmp(b),
        (FilterValue::Number(a), FilterValue::Text(b)) => a.partial_cmp(&b.parse::<f64>().ok()?),
        (FilterValue::Bool(a), FilterValue::Bool(b)) => Some(a.cmp(b)),
        (FilterValue::Bool(a), FilterValue::Text(b)) => Some(a.cmp(&b.parse::<bool>().ok()?)),
        (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => Some(a.cmp(b)),
        (FilterValue::Timestamp(a), FilterValue::Text(b)) => {
            let b = DateTime::parse_from_rfc3339(b).ok()?.with_timezone(&Utc);
            Some(a.cmp(&b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Item {
        id: &'static str,
        title: &'static str,
        kind: &'static str,
        public: bool,
        created: DateTime<Utc>,
    }

    impl Filterable for Item {
        fn filter_fields() -> &'static [&'static str] {
            &["id", "title", "component_type", "public", "create_time"]
        }

        fn filter_value(&self, field: &str) -> Option<FilterValue> {
            match field {
                "id" => Some(self.id.into()),
                "title" => Some(self.title.into()),
                "component_type" => Some(self.kind.into()),
                "public" => Some(self.public.into()),
                "create_time" => Some(self.created.into()),
                _ => None,
            }
        }

        fn title_text(&self) -> String {
            self.title.to_string()
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: "json",
                title: "JSON",
                kind: "COMPONENT_TYPE_OPERATOR",
                public: true,
                created: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            },
            Item {
                id: "openai",
                title: "OpenAI",
                kind: "COMPONENT_TYPE_AI",
                public: true,
                created: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            },
            Item {
                id: "http",
                title: "HTTP",
                kind: "COMPONENT_TYPE_APPLICATION",
                public: false,
                created: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            },
        ]
    }

    fn ids(filter: &str) -> Vec<&'static str> {
        let filter = Filter::parse_for::<Item>(Some(filter)).unwrap();
        filter.apply(items()).into_iter().map(|i| i.id).collect()
    }

    #[test]
    fn empty_matches_all() {
        assert_eq!(ids("").len(), 3);
        let filter = Filter::parse_for::<Item>(None).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn fuzzy_title() {
        assert_eq!(ids("q_title=\"open\""), vec!["openai"]);
        assert_eq!(ids("qTitle=\"JS\""), vec!["json"]);
        assert_eq!(ids("title:\"tt\""), vec!["http"]);
        assert_eq!(ids("q=\"a\""), vec!["openai"]);
    }

    #[test]
    fn enum_and_bool_equality() {
        assert_eq!(ids("component_type=COMPONENT_TYPE_AI"), vec!["openai"]);
        assert_eq!(ids("component_type!=COMPONENT_TYPE_AI"), vec!["json", "http"]);
        assert_eq!(ids("public=false"), vec!["http"]);
    }

    #[test]
    fn timestamp_comparisons() {
        assert_eq!(
            ids("create_time>timestamp(\"2024-01-01T00:00:00Z\")"),
            vec!["openai", "http"]
        );
        assert_eq!(
            ids("createTime<=timestamp(\"2024-06-01T00:00:00Z\") AND public=true"),
            vec!["json", "openai"]
        );
        assert_eq!(ids("create_time>\"2025-01-01T00:00:00Z\""), vec!["http"]);
    }

    #[test]
    fn filter_never_grows_results() {
        for expr in ["", "public=true", "public=true AND q_title=\"o\""] {
            assert!(ids(expr).len() <= items().len());
        }
        assert!(ids("public=true AND q_title=\"o\"").len() <= ids("public=true").len());
    }

    #[test]
    fn unknown_field_rejected() {
        let err = Filter::parse_for::<Item>(Some("color=\"red\"")).unwrap_err();
        assert_eq!(err.code(), "E108");
    }
}
