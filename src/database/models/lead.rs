use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::{FilterTarget, LeadField};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: String,
    pub status: String,
    pub score: f64,
    pub lead_value: f64,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub is_qualified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new lead
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: f64,
    pub lead_value: f64,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub is_qualified: bool,
}

impl NewLead {
    pub fn into_lead(self, id: Uuid, now: DateTime<Utc>) -> Lead {
        Lead {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            city: self.city,
            state: self.state,
            source: self.source.as_str().to_string(),
            status: self.status.as_str().to_string(),
            score: self.score,
            lead_value: self.lead_value,
            last_activity_at: self.last_activity_at,
            is_qualified: self.is_qualified,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update; `None` leaves the column unchanged.
/// Nullable columns take `Some(None)` to clear them.
/// There is no `email`: it is immutable after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub score: Option<f64>,
    pub lead_value: Option<f64>,
    pub last_activity_at: Option<Option<DateTime<Utc>>>,
    pub is_qualified: Option<bool>,
}

impl LeadChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, lead: &mut Lead, now: DateTime<Utc>) {
        if let Some(v) = self.first_name { lead.first_name = v; }
        if let Some(v) = self.last_name { lead.last_name = v; }
        if let Some(v) = self.phone { lead.phone = v; }
        if let Some(v) = self.company { lead.company = v; }
        if let Some(v) = self.city { lead.city = v; }
        if let Some(v) = self.state { lead.state = v; }
        if let Some(v) = self.source { lead.source = v.as_str().to_string(); }
        if let Some(v) = self.status { lead.status = v.as_str().to_string(); }
        if let Some(v) = self.score { lead.score = v; }
        if let Some(v) = self.lead_value { lead.lead_value = v; }
        if let Some(v) = self.last_activity_at { lead.last_activity_at = v; }
        if let Some(v) = self.is_qualified { lead.is_qualified = v; }
        lead.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    FacebookAds,
    GoogleAds,
    Referral,
    Events,
    Other,
}

impl LeadSource {
    pub const ALL: [LeadSource; 6] = [
        LeadSource::Website,
        LeadSource::FacebookAds,
        LeadSource::GoogleAds,
        LeadSource::Referral,
        LeadSource::Events,
        LeadSource::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Website => "website",
            LeadSource::FacebookAds => "facebook_ads",
            LeadSource::GoogleAds => "google_ads",
            LeadSource::Referral => "referral",
            LeadSource::Events => "events",
            LeadSource::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
    Won,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Lost,
        LeadStatus::Won,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Lost => "lost",
            LeadStatus::Won => "won",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl FilterTarget for Lead {
    fn text_field(&self, field: LeadField) -> Option<&str> {
        match field {
            LeadField::Status => Some(&self.status),
            LeadField::Source => Some(&self.source),
            _ => None,
        }
    }

    fn number_field(&self, field: LeadField) -> Option<f64> {
        match field {
            LeadField::Score => Some(self.score),
            LeadField::LeadValue => Some(self.lead_value),
            _ => None,
        }
    }

    fn timestamp_field(&self, field: LeadField) -> Option<DateTime<Utc>> {
        match field {
            LeadField::CreatedAt => Some(self.created_at),
            LeadField::LastActivityAt => self.last_activity_at,
            _ => None,
        }
    }

    fn flag_field(&self, field: LeadField) -> Option<bool> {
        match field {
            LeadField::IsQualified => Some(self.is_qualified),
            _ => None,
        }
    }

    fn search_column(&self, column: &str) -> Option<&str> {
        match column {
            "first_name" => Some(&self.first_name),
            "last_name" => Some(&self.last_name),
            "email" => Some(&self.email),
            "company" => self.company.as_deref(),
            "city" => self.city.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_values_round_trip_through_strings() {
        for source in LeadSource::ALL {
            assert_eq!(LeadSource::parse(source.as_str()), Some(source));
        }
        for status in LeadStatus::ALL {
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LeadSource::parse("Website"), None);
        assert_eq!(LeadStatus::default(), LeadStatus::New);
    }

    #[test]
    fn changes_touch_only_supplied_fields() {
        let now = Utc::now();
        let mut lead = NewLead {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "5550100".into(),
            company: None,
            city: Some("London".into()),
            state: None,
            source: LeadSource::Referral,
            status: LeadStatus::New,
            score: 10.0,
            lead_value: 0.0,
            last_activity_at: None,
            is_qualified: false,
        }
        .into_lead(Uuid::new_v4(), now);

        let changes = LeadChanges {
            status: Some(LeadStatus::Won),
            score: Some(90.0),
            ..Default::default()
        };
        assert!(!changes.is_empty());
        changes.apply(&mut lead, now);

        assert_eq!(lead.status, "won");
        assert_eq!(lead.score, 90.0);
        assert_eq!(lead.city.as_deref(), Some("London"));
        assert_eq!(lead.source, "referral");

        let clear = LeadChanges { city: Some(None), ..Default::default() };
        assert!(!clear.is_empty());
        clear.apply(&mut lead, now);
        assert_eq!(lead.city, None);
        assert_eq!(lead.status, "won");
        assert!(LeadChanges::default().is_empty());
    }
}
