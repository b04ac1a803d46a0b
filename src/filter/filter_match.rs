use chrono::{DateTime, Utc};

use super::types::{CompiledFilter, Condition, LeadField};

/// Record view used to evaluate a [`CompiledFilter`] in process.
///
/// A field that is absent (e.g. a null `last_activity_at`) never satisfies a
/// predicate on that field.
pub trait FilterTarget {
    fn text_field(&self, field: LeadField) -> Option<&str>;
    fn number_field(&self, field: LeadField) -> Option<f64>;
    fn timestamp_field(&self, field: LeadField) -> Option<DateTime<Utc>>;
    fn flag_field(&self, field: LeadField) -> Option<bool>;
    /// Value of one of the free-text search columns
    fn search_column(&self, column: &str) -> Option<&str>;
}

impl CompiledFilter {
    pub fn matches<T: FilterTarget + ?Sized>(&self, target: &T) -> bool {
        let fields_match = self.conditions().iter().all(|(field, condition)| match condition {
            Condition::Text(expected) => target.text_field(*field) == Some(expected.as_str()),
            Condition::Flag(expected) => target.flag_field(*field) == Some(*expected),
            Condition::Number(predicate) => target.number_field(*field).is_some_and(|v| predicate.test(&v)),
            Condition::Timestamp(predicate) => target.timestamp_field(*field).is_some_and(|v| predicate.test(&v)),
        });
        if !fields_match {
            return false;
        }

        match self.search() {
            None => true,
            Some(search) => {
                let needle = search.term().to_lowercase();
                search.columns().iter().any(|column| {
                    target
                        .search_column(column)
                        .is_some_and(|value| value.to_lowercase().contains(&needle))
                })
            }
        }
    }
}
