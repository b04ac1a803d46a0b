use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

/// Raw query parameters for a lead search, as received from the query string.
///
/// Keys are kept in a sorted map so nothing downstream depends on the
/// order the client sent them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    params: BTreeMap<String, String>,
}

impl FilterRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Value for `key`, treating an empty string as absent
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl From<HashMap<String, String>> for FilterRequest {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Lead columns that accept a structured predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeadField {
    Status,
    Source,
    Score,
    LeadValue,
    CreatedAt,
    LastActivityAt,
    IsQualified,
}

impl LeadField {
    /// Fields compared as numbers
    pub const NUMERIC: [LeadField; 2] = [LeadField::Score, LeadField::LeadValue];

    /// Fields compared as timestamps
    pub const TIMESTAMP: [LeadField; 2] = [LeadField::CreatedAt, LeadField::LastActivityAt];

    /// Column name; also the query parameter prefix
    pub fn column(&self) -> &'static str {
        match self {
            LeadField::Status => "status",
            LeadField::Source => "source",
            LeadField::Score => "score",
            LeadField::LeadValue => "lead_value",
            LeadField::CreatedAt => "created_at",
            LeadField::LastActivityAt => "last_activity_at",
            LeadField::IsQualified => "is_qualified",
        }
    }
}

/// Columns matched by the free-text `search` parameter
pub const SEARCH_COLUMNS: [&str; 5] = ["first_name", "last_name", "email", "company", "city"];

/// A comparison against a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPredicate<T> {
    Equals(T),
    GreaterThan(T),
    LessThan(T),
    /// `gt < value < lt`, produced when both bounds are supplied separately
    Interval { gt: T, lt: T },
    /// `min <= value <= max`; always `min <= max`
    Range { min: T, max: T },
}

impl<T: PartialOrd> FieldPredicate<T> {
    pub fn test(&self, value: &T) -> bool {
        match self {
            FieldPredicate::Equals(v) => value == v,
            FieldPredicate::GreaterThan(v) => value > v,
            FieldPredicate::LessThan(v) => value < v,
            FieldPredicate::Interval { gt, lt } => value > gt && value < lt,
            FieldPredicate::Range { min, max } => value >= min && value <= max,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Plain string equality (status, source)
    Text(String),
    Flag(bool),
    Number(FieldPredicate<f64>),
    Timestamp(FieldPredicate<DateTime<Utc>>),
}

/// Case-insensitive substring match across [`SEARCH_COLUMNS`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    term: String,
}

impl TextSearch {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &SEARCH_COLUMNS
    }
}

/// Finalized lead query: one condition per field, an optional text search
/// (ANDed with the conditions) and a result cap.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub(crate) conditions: BTreeMap<LeadField, Condition>,
    pub(crate) search: Option<TextSearch>,
    pub(crate) limit: u32,
}

impl CompiledFilter {
    pub fn conditions(&self) -> &BTreeMap<LeadField, Condition> {
        &self.conditions
    }

    pub fn condition(&self, field: LeadField) -> Option<&Condition> {
        self.conditions.get(&field)
    }

    pub fn search(&self) -> Option<&TextSearch> {
        self.search.as_ref()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// True when the filter matches every record
    pub fn is_unconstrained(&self) -> bool {
        self.conditions.is_empty() && self.search.is_none()
    }
}

/// Typed bind parameter for generated SQL
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
