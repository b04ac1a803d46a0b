use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{LeadChanges, LeadSource, LeadStatus, NewLead};
use crate::error::ApiError;
use crate::filter::filter::parse_timestamp;

const FIRST_NAME_MAX: usize = 50;
const LAST_NAME_MAX: usize = 100;
const COMPANY_MAX: usize = 255;
const CITY_MAX: usize = 100;
const STATE_MAX: usize = 100;
const SCORE_MAX: f64 = 100.0;

/// A JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumberInput::Number(n) => Some(*n),
            NumberInput::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|n| n.is_finite())
    }
}

/// Phone numbers arrive either as JSON numbers or strings; both are stored as text.
/// Numeric phones must be whole numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PhoneInput {
    Number(serde_json::Number),
    Text(String),
}

impl PhoneInput {
    fn into_text(self) -> Result<String, ApiError> {
        match self {
            PhoneInput::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
            PhoneInput::Number(_) => Err(ApiError::field_error("phone", "Invalid phone number")),
            PhoneInput::Text(s) => Ok(s.trim().to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    #[serde(alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(alias = "last_name")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<PhoneInput>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub score: Option<NumberInput>,
    #[serde(alias = "lead_value")]
    pub lead_value: Option<NumberInput>,
    #[serde(alias = "is_qualified")]
    pub is_qualified: Option<bool>,
    #[serde(alias = "last_activity_at")]
    pub last_activity_at: Option<String>,
}

/// Updatable fields; anything else in the body, `email` included, is ignored
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLeadRequest {
    #[serde(alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(alias = "lastName")]
    pub last_name: Option<String>,
    pub phone: Option<PhoneInput>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub score: Option<NumberInput>,
    #[serde(alias = "leadValue")]
    pub lead_value: Option<NumberInput>,
    #[serde(alias = "lastActivityAt")]
    pub last_activity_at: Option<String>,
    #[serde(alias = "isQualified")]
    pub is_qualified: Option<bool>,
}

impl CreateLeadRequest {
    pub fn validate(self) -> Result<NewLead, ApiError> {
        let missing = || ApiError::validation_error("Missing fields", None);

        let first_name = non_blank(self.first_name).ok_or_else(missing)?;
        let last_name = non_blank(self.last_name).ok_or_else(missing)?;
        let email = non_blank(self.email).ok_or_else(missing)?;
        let phone = self
            .phone
            .map(PhoneInput::into_text)
            .transpose()?
            .filter(|p| !p.is_empty())
            .ok_or_else(missing)?;
        let source = non_blank(self.source).ok_or_else(missing)?;
        let status = non_blank(self.status).ok_or_else(missing)?;

        Ok(NewLead {
            first_name: bounded("first_name", first_name, FIRST_NAME_MAX, "First name too long")?,
            last_name: bounded("last_name", last_name, LAST_NAME_MAX, "Last name too long")?,
            email,
            phone,
            company: optional_bounded("company", self.company, COMPANY_MAX, "Company name too long")?,
            city: optional_bounded("city", self.city, CITY_MAX, "City name too long")?,
            state: optional_bounded("state", self.state, STATE_MAX, "State name too long")?,
            source: parse_source(&source)?,
            status: parse_status(&status)?,
            score: self.score.as_ref().map(parse_score).transpose()?.unwrap_or(0.0),
            lead_value: self.lead_value.as_ref().map(parse_lead_value).transpose()?.unwrap_or(0.0),
            last_activity_at: self.last_activity_at.as_deref().map(parse_activity).transpose()?.flatten(),
            is_qualified: self.is_qualified.unwrap_or(false),
        })
    }
}

impl UpdateLeadRequest {
    pub fn validate(self) -> Result<LeadChanges, ApiError> {
        let required_text = |field: &'static str, value: Option<String>, max: usize, too_long: &str| {
            value
                .map(|v| {
                    let v = v.trim().to_string();
                    if v.is_empty() {
                        return Err(ApiError::field_error(field, format!("{} cannot be empty", field)));
                    }
                    bounded(field, v, max, too_long)
                })
                .transpose()
        };

        let phone = match self.phone.map(PhoneInput::into_text).transpose()? {
            Some(p) if p.is_empty() => return Err(ApiError::field_error("phone", "phone cannot be empty")),
            other => other,
        };

        Ok(LeadChanges {
            first_name: required_text("first_name", self.first_name, FIRST_NAME_MAX, "First name too long")?,
            last_name: required_text("last_name", self.last_name, LAST_NAME_MAX, "Last name too long")?,
            phone,
            company: clearable("company", self.company, COMPANY_MAX, "Company name too long")?,
            city: clearable("city", self.city, CITY_MAX, "City name too long")?,
            state: clearable("state", self.state, STATE_MAX, "State name too long")?,
            source: self.source.as_deref().map(parse_source).transpose()?,
            status: self.status.as_deref().map(parse_status).transpose()?,
            score: self.score.as_ref().map(parse_score).transpose()?,
            lead_value: self.lead_value.as_ref().map(parse_lead_value).transpose()?,
            last_activity_at: self.last_activity_at.as_deref().map(parse_activity).transpose()?,
            is_qualified: self.is_qualified,
        })
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid lead id: {}", raw)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn bounded(field: &str, value: String, max: usize, too_long: &str) -> Result<String, ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::field_error(field, too_long));
    }
    Ok(value)
}

/// Blank optional text is treated as absent
fn optional_bounded(field: &str, value: Option<String>, max: usize, too_long: &str) -> Result<Option<String>, ApiError> {
    non_blank(value).map(|v| bounded(field, v, max, too_long)).transpose()
}

/// On update a supplied blank value clears the column
fn clearable(field: &str, value: Option<String>, max: usize, too_long: &str) -> Result<Option<Option<String>>, ApiError> {
    value.map(|v| optional_bounded(field, Some(v), max, too_long)).transpose()
}

fn parse_source(raw: &str) -> Result<LeadSource, ApiError> {
    LeadSource::parse(raw.trim()).ok_or_else(|| ApiError::field_error("source", "Invalid source value"))
}

fn parse_status(raw: &str) -> Result<LeadStatus, ApiError> {
    LeadStatus::parse(raw.trim()).ok_or_else(|| ApiError::field_error("status", "Invalid status value"))
}

fn parse_score(input: &NumberInput) -> Result<f64, ApiError> {
    input
        .as_f64()
        .filter(|n| (0.0..=SCORE_MAX).contains(n))
        .ok_or_else(|| ApiError::field_error("score", "Score must be a number between 0 and 100"))
}

fn parse_lead_value(input: &NumberInput) -> Result<f64, ApiError> {
    input
        .as_f64()
        .filter(|n| *n >= 0.0)
        .ok_or_else(|| ApiError::field_error("lead_value", "Lead value must be a non-negative number"))
}

/// Blank means "no activity recorded"
fn parse_activity(raw: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_timestamp("last_activity_at", raw)
        .map(Some)
        .map_err(|_| ApiError::field_error("last_activity_at", "Invalid last activity date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(body: serde_json::Value) -> Result<NewLead, ApiError> {
        serde_json::from_value::<CreateLeadRequest>(body).unwrap().validate()
    }

    fn minimal() -> serde_json::Value {
        json!({
            "firstName": "  Ada ",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "phone": 5551234,
            "source": "website",
            "status": "new"
        })
    }

    #[test]
    fn create_applies_defaults_and_trims() {
        let lead = create(minimal()).unwrap();
        assert_eq!(lead.first_name, "Ada");
        assert_eq!(lead.phone, "5551234");
        assert_eq!(lead.score, 0.0);
        assert_eq!(lead.lead_value, 0.0);
        assert!(!lead.is_qualified);
        assert_eq!(lead.last_activity_at, None);
    }

    #[test]
    fn create_accepts_snake_case_and_numeric_strings() {
        let lead = create(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "phone": "555-1234",
            "source": "referral",
            "status": "contacted",
            "score": "42.5",
            "lead_value": 1000,
            "last_activity_at": "2024-03-01"
        }))
        .unwrap();
        assert_eq!(lead.score, 42.5);
        assert_eq!(lead.lead_value, 1000.0);
        assert_eq!(lead.source, LeadSource::Referral);
        assert!(lead.last_activity_at.is_some());
    }

    #[test]
    fn create_rejects_missing_and_invalid_fields() {
        let mut body = minimal();
        body.as_object_mut().unwrap().remove("phone");
        assert_eq!(create(body).unwrap_err().message(), "Missing fields");

        let mut body = minimal();
        body["score"] = json!(101);
        assert_eq!(create(body).unwrap_err().status_code(), 400);

        let mut body = minimal();
        body["leadValue"] = json!(-1);
        assert_eq!(create(body).unwrap_err().message(), "Lead value must be a non-negative number");

        let mut body = minimal();
        body["source"] = json!("billboard");
        assert_eq!(create(body).unwrap_err().message(), "Invalid source value");

        let mut body = minimal();
        body["company"] = json!("x".repeat(256));
        assert_eq!(create(body).unwrap_err().message(), "Company name too long");
    }

    #[test]
    fn update_ignores_email_and_validates_supplied_fields() {
        let changes = serde_json::from_value::<UpdateLeadRequest>(json!({
            "email": "new@example.com",
            "status": "won",
            "score": 90
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(changes.status, Some(LeadStatus::Won));
        assert_eq!(changes.score, Some(90.0));
        assert_eq!(changes.first_name, None);

        let err = serde_json::from_value::<UpdateLeadRequest>(json!({ "first_name": "  " }))
            .unwrap()
            .validate()
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let only_email = serde_json::from_value::<UpdateLeadRequest>(json!({ "email": "x@y.z" }))
            .unwrap()
            .validate()
            .unwrap();
        assert!(only_email.is_empty());
    }

    #[test]
    fn update_blank_nullable_fields_clear_them() {
        let changes = serde_json::from_value::<UpdateLeadRequest>(json!({
            "company": "",
            "city": " Paris ",
            "lastActivityAt": ""
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(changes.company, Some(None));
        assert_eq!(changes.city, Some(Some("Paris".to_string())));
        assert_eq!(changes.state, None);
        assert_eq!(changes.last_activity_at, Some(None));
        assert!(!changes.is_empty());
    }

    #[test]
    fn numeric_phones_must_be_whole_numbers() {
        let mut body = minimal();
        body["phone"] = json!(5551234.5);
        assert_eq!(create(body).unwrap_err().message(), "Invalid phone number");

        let err = serde_json::from_value::<UpdateLeadRequest>(json!({ "phone": 5551234.0 }))
            .unwrap()
            .validate()
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn ids_must_be_uuids() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
