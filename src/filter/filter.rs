use std::collections::BTreeMap;
use std::num::IntErrorKind;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::error::ValidationError;
use super::types::{CompiledFilter, Condition, FieldPredicate, FilterRequest, LeadField, TextSearch};
use crate::config::FilterConfig;

/// Comparison operators accepted for numeric and timestamp fields, in
/// evaluation order. Later operators merge into (or replace) the predicate
/// built by earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equals,
    Gt,
    Lt,
    Between,
}

impl Operator {
    const ORDER: [Operator; 4] = [Operator::Equals, Operator::Gt, Operator::Lt, Operator::Between];

    /// Query parameter suffixes. Timestamp fields also accept the
    /// calendar-style spellings `on`, `after` and `before`.
    fn suffixes(self, timestamp: bool) -> &'static [&'static str] {
        match (self, timestamp) {
            (Operator::Equals, false) => &["equals"],
            (Operator::Equals, true) => &["equals", "on"],
            (Operator::Gt, false) => &["gt"],
            (Operator::Gt, true) => &["gt", "after"],
            (Operator::Lt, false) => &["lt"],
            (Operator::Lt, true) => &["lt", "before"],
            (Operator::Between, _) => &["between"],
        }
    }
}

/// Compiles a [`FilterRequest`] into a [`CompiledFilter`].
///
/// Stateless apart from its limits, so one instance can be shared by every
/// request handler.
#[derive(Debug, Clone, Copy)]
pub struct FilterBuilder {
    default_limit: u32,
    max_limit: u32,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::DEFAULT_LIMIT)
    }
}

impl FilterBuilder {
    pub const DEFAULT_LIMIT: u32 = 1000;

    pub fn new(default_limit: u32, max_limit: u32) -> Self {
        Self {
            default_limit: default_limit.min(max_limit),
            max_limit,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.default_limit, config.max_limit)
    }

    pub fn build(&self, request: &FilterRequest) -> Result<CompiledFilter, ValidationError> {
        let mut conditions = BTreeMap::new();

        if let Some(status) = request.non_empty("status_equals") {
            conditions.insert(LeadField::Status, Condition::Text(status.to_string()));
        }
        if let Some(source) = request.non_empty("source_equals") {
            conditions.insert(LeadField::Source, Condition::Text(source.to_string()));
        }

        for field in LeadField::NUMERIC {
            if let Some(predicate) = compile_field(request, field, false, parse_number)? {
                conditions.insert(field, Condition::Number(predicate));
            }
        }
        for field in LeadField::TIMESTAMP {
            if let Some(predicate) = compile_field(request, field, true, parse_timestamp)? {
                conditions.insert(field, Condition::Timestamp(predicate));
            }
        }

        // Only the literal "true" is true; an empty value still counts as present
        if let Some(flag) = request.get("is_qualified_equals") {
            conditions.insert(LeadField::IsQualified, Condition::Flag(flag == "true"));
        }

        let search = request.non_empty("search").map(TextSearch::new);
        let limit = self.resolve_limit(request.get("limit"))?;

        Ok(CompiledFilter { conditions, search, limit })
    }

    fn resolve_limit(&self, raw: Option<&str>) -> Result<u32, ValidationError> {
        let Some(raw) = raw.map(str::trim) else {
            return Ok(self.default_limit);
        };
        let requested = match raw.parse::<i64>() {
            Ok(n) => n,
            Err(e) => {
                // Digits too large for i64 are still numeric; saturate instead of defaulting
                return match e.kind() {
                    IntErrorKind::PosOverflow => {
                        Err(ValidationError::LimitExceeded { requested: i64::MAX, max: self.max_limit })
                    }
                    IntErrorKind::NegOverflow => {
                        Err(ValidationError::InvalidLimit(format!("limit must be at least 1, got {}", raw)))
                    }
                    _ => Ok(self.default_limit),
                };
            }
        };
        if requested < 1 {
            return Err(ValidationError::InvalidLimit(format!("limit must be at least 1, got {}", requested)));
        }
        if requested > i64::from(self.max_limit) {
            return Err(ValidationError::LimitExceeded { requested, max: self.max_limit });
        }
        Ok(requested as u32)
    }
}

type Parser<T> = fn(&str, &str) -> Result<T, ValidationError>;

fn compile_field<T: PartialOrd + Copy>(
    request: &FilterRequest,
    field: LeadField,
    timestamp: bool,
    parse: Parser<T>,
) -> Result<Option<FieldPredicate<T>>, ValidationError> {
    let mut predicate: Option<FieldPredicate<T>> = None;

    for op in Operator::ORDER {
        let Some((key, raw)) = lookup(request, field, op.suffixes(timestamp)) else {
            continue;
        };

        predicate = Some(match op {
            Operator::Equals => FieldPredicate::Equals(parse(&key, raw)?),
            Operator::Gt => {
                let value = parse(&key, raw)?;
                match predicate {
                    Some(FieldPredicate::LessThan(lt)) | Some(FieldPredicate::Interval { lt, .. }) => {
                        FieldPredicate::Interval { gt: value, lt }
                    }
                    _ => FieldPredicate::GreaterThan(value),
                }
            }
            Operator::Lt => {
                let value = parse(&key, raw)?;
                match predicate {
                    Some(FieldPredicate::GreaterThan(gt)) | Some(FieldPredicate::Interval { gt, .. }) => {
                        FieldPredicate::Interval { gt, lt: value }
                    }
                    _ => FieldPredicate::LessThan(value),
                }
            }
            Operator::Between => parse_range(&key, raw, parse)?,
        });
    }

    Ok(predicate)
}

/// First non-empty parameter among `<column>_<suffix>` for the given suffixes
fn lookup<'a>(request: &'a FilterRequest, field: LeadField, suffixes: &[&str]) -> Option<(String, &'a str)> {
    suffixes.iter().find_map(|suffix| {
        let key = format!("{}_{}", field.column(), suffix);
        request.non_empty(&key).map(|value| (key, value))
    })
}

fn parse_range<T: PartialOrd + Copy>(key: &str, raw: &str, parse: Parser<T>) -> Result<FieldPredicate<T>, ValidationError> {
    let invalid = || ValidationError::InvalidRange { field: key.to_string(), value: raw.to_string() };

    let parts: Vec<&str> = raw.split(',').collect();
    let [min, max] = parts.as_slice() else {
        return Err(invalid());
    };
    let min = parse(key, min).map_err(|_| invalid())?;
    let max = parse(key, max).map_err(|_| invalid())?;
    if min > max {
        return Err(invalid());
    }
    Ok(FieldPredicate::Range { min, max })
}

fn parse_number(key: &str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber { field: key.to_string(), value: raw.to_string() })
}

/// Accepts RFC 3339, a naive date-time (taken as UTC) or a bare date (UTC midnight)
pub(crate) fn parse_timestamp(key: &str, raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)) {
        return Ok(midnight.and_utc());
    }

    Err(ValidationError::InvalidDate { field: key.to_string(), value: raw.to_string() })
}
