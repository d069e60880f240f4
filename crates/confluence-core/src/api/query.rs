//! Query strings and CQL expressions for content endpoints.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use super::ApiError;

/// Ordered query string whose values are percent-encoded on render.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub fn push_opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    /// Adds `expand=<a,b,c>`; an empty list adds nothing.
    pub fn expand(self, fields: &[String]) -> Self {
        if fields.is_empty() {
            self
        } else {
            self.push("expand", fields.join(","))
        }
    }

    /// `path?k=v&...`
    pub fn to_path(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            return path.to_string();
        }
        let query: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        format!("{}?{}", path, query.join("&"))
    }
}

/// Direction of the `lastmodified` comparison in update-date searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    After,
    OnOrAfter,
    Before,
    OnOrBefore,
}

impl Comparison {
    pub fn operator(self) -> &'static str {
        match self {
            Comparison::After => ">",
            Comparison::OnOrAfter => ">=",
            Comparison::Before => "<",
            Comparison::OnOrBefore => "<=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operator())
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" | "gt" => Ok(Comparison::After),
            ">=" | "ge" => Ok(Comparison::OnOrAfter),
            "<" | "lt" => Ok(Comparison::Before),
            "<=" | "le" => Ok(Comparison::OnOrBefore),
            other => Err(format!("unknown comparison '{}', expected one of gt, ge, lt, le", other)),
        }
    }
}

/// CQL filter selecting pages by last-modified date.
///
/// Accepts `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`, the forms CQL understands.
pub fn lastmodified_cql(date: &str, comparison: Comparison) -> Result<String, ApiError> {
    let date = date.trim();
    let valid = NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M").is_ok();
    if !valid {
        return Err(ApiError::InvalidRequest(format!(
            "invalid date '{}', expected YYYY-MM-DD or YYYY-MM-DD HH:MM",
            date
        )));
    }
    Ok(format!(
        "type = \"page\" AND lastmodified {} \"{}\"",
        comparison.operator(),
        date
    ))
}
