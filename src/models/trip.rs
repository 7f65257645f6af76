//! Trip form input and the validated trip request

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{PlannerError, Result};

pub const MIN_TRIP_DAYS: u8 = 1;
pub const MAX_TRIP_DAYS: u8 = 30;

const MAX_DESTINATION_LEN: usize = 100;
const MAX_PURPOSE_LEN: usize = 1000;
const MAX_PREFERENCE_TAGS: usize = 20;
const MAX_TAG_LEN: usize = 60;

/// Budget tier for a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Budget {
    Low,
    Moderate,
    High,
}

impl Budget {
    pub const ALL: [Budget; 3] = [Budget::Low, Budget::Moderate, Budget::High];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::Low => "Low",
            Budget::Moderate => "Moderate",
            Budget::High => "High",
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Budget {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Budget::Low),
            "moderate" => Ok(Budget::Moderate),
            "high" => Ok(Budget::High),
            _ => Err(PlannerError::validation(
                "budget",
                "Budget must be one of: Low, Moderate, High",
            )),
        }
    }
}

/// Raw form values exactly as submitted
///
/// Every field is kept as text so an invalid submission can be rendered back
/// to the user unchanged next to its error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripForm {
    pub destination: String,
    pub days: String,
    pub budget: String,
    pub start_location: String,
    pub purpose: String,
    pub preferences: String,
    pub start_date: String,
}

impl Default for TripForm {
    fn default() -> Self {
        Self {
            destination: "Kerala".to_string(),
            days: "4".to_string(),
            budget: Budget::Moderate.to_string(),
            start_location: "Hyderabad".to_string(),
            purpose: "Cultural exploration, historical sites, and local food.".to_string(),
            preferences: "Hidden gems, food recommendations, budget-friendly public transport"
                .to_string(),
            start_date: String::new(),
        }
    }
}

impl TripForm {
    /// An all-empty form, used as the base when reading submitted key/value pairs
    #[must_use]
    pub fn empty() -> Self {
        Self {
            destination: String::new(),
            days: String::new(),
            budget: String::new(),
            start_location: String::new(),
            purpose: String::new(),
            preferences: String::new(),
            start_date: String::new(),
        }
    }

    /// Build a form from url-encoded key/value pairs; unknown keys are ignored
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut form = Self::empty();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "destination" => &mut form.destination,
                "days" => &mut form.days,
                "budget" => &mut form.budget,
                "start_location" => &mut form.start_location,
                "purpose" => &mut form.purpose,
                "preferences" => &mut form.preferences,
                "start_date" => &mut form.start_date,
                _ => continue,
            };
            *slot = value.clone();
        }
        form
    }

    /// Validate the form into an immutable trip request
    pub fn validate(&self) -> Result<TripRequest> {
        let destination = self.destination.trim();
        if destination.is_empty() {
            return Err(PlannerError::validation(
                "destination",
                "Destination cannot be empty",
            ));
        }
        if destination.chars().count() > MAX_DESTINATION_LEN {
            return Err(PlannerError::validation(
                "destination",
                format!("Destination cannot exceed {MAX_DESTINATION_LEN} characters"),
            ));
        }

        let days = parse_days(&self.days)?;
        let budget: Budget = self.budget.parse()?;

        let start_location = optional_text(&self.start_location);
        if start_location
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_DESTINATION_LEN)
        {
            return Err(PlannerError::validation(
                "start_location",
                format!("Starting location cannot exceed {MAX_DESTINATION_LEN} characters"),
            ));
        }

        let purpose = optional_text(&self.purpose);
        if purpose
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_PURPOSE_LEN)
        {
            return Err(PlannerError::validation(
                "purpose",
                format!("Purpose cannot exceed {MAX_PURPOSE_LEN} characters"),
            ));
        }

        let preferences = parse_preferences(&self.preferences)?;

        let start_date = match optional_text(&self.start_date) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                PlannerError::validation("start_date", "Start date must be in YYYY-MM-DD format")
            })?),
            None => None,
        };

        Ok(TripRequest {
            destination: destination.to_string(),
            days,
            budget,
            preferences,
            start_location,
            purpose,
            start_date,
        })
    }
}

/// JSON body accepted by the API endpoints
///
/// Fields are taken loosely so that a wrong `days` type or a missing field
/// fails validation with a field name instead of a decode error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPayload {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub days: serde_json::Value,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    pub start_location: Option<String>,
    pub purpose: Option<String>,
    pub start_date: Option<String>,
}

impl From<TripPayload> for TripForm {
    fn from(payload: TripPayload) -> Self {
        let days = match payload.days {
            serde_json::Value::String(days) => days,
            serde_json::Value::Number(days) => days.to_string(),
            _ => String::new(),
        };

        Self {
            destination: payload.destination,
            days,
            budget: payload.budget,
            start_location: payload.start_location.unwrap_or_default(),
            purpose: payload.purpose.unwrap_or_default(),
            preferences: payload.preferences.join(", "),
            start_date: payload.start_date.unwrap_or_default(),
        }
    }
}

/// A validated trip request; only obtainable through [`TripForm::validate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRequest {
    destination: String,
    days: u8,
    budget: Budget,
    preferences: BTreeSet<String>,
    start_location: Option<String>,
    purpose: Option<String>,
    start_date: Option<NaiveDate>,
}

impl TripRequest {
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn days(&self) -> u8 {
        self.days
    }

    #[must_use]
    pub fn budget(&self) -> Budget {
        self.budget
    }

    #[must_use]
    pub fn preferences(&self) -> &BTreeSet<String> {
        &self.preferences
    }

    #[must_use]
    pub fn start_location(&self) -> Option<&str> {
        self.start_location.as_deref()
    }

    #[must_use]
    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Preferences joined for display and prompting, "none" when empty
    #[must_use]
    pub fn preferences_label(&self) -> String {
        if self.preferences.is_empty() {
            "none".to_string()
        } else {
            self.preferences
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    /// Calendar date of a 1-based trip day, when a start date was given
    #[must_use]
    pub fn date_of_day(&self, day_index: u8) -> Option<NaiveDate> {
        let offset = u64::from(day_index.checked_sub(1)?);
        self.start_date?.checked_add_days(Days::new(offset))
    }
}

fn parse_days(raw: &str) -> Result<u8> {
    let days: i64 = raw.trim().parse().map_err(|_| {
        PlannerError::validation("days", "Trip duration must be a whole number of days")
    })?;

    if days < i64::from(MIN_TRIP_DAYS) || days > i64::from(MAX_TRIP_DAYS) {
        return Err(PlannerError::validation(
            "days",
            format!("Trip duration must be between {MIN_TRIP_DAYS} and {MAX_TRIP_DAYS} days"),
        ));
    }

    // range checked above
    Ok(days as u8)
}

fn parse_preferences(raw: &str) -> Result<BTreeSet<String>> {
    let mut seen = BTreeSet::new();
    let mut tags = BTreeSet::new();

    for tag in raw.split([',', '\n']).map(str::trim).filter(|t| !t.is_empty()) {
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(PlannerError::validation(
                "preferences",
                format!("Each preference cannot exceed {MAX_TAG_LEN} characters"),
            ));
        }
        if seen.insert(tag.to_lowercase()) {
            tags.insert(tag.to_string());
        }
    }

    if tags.len() > MAX_PREFERENCE_TAGS {
        return Err(PlannerError::validation(
            "preferences",
            format!("At most {MAX_PREFERENCE_TAGS} preferences are allowed"),
        ));
    }

    Ok(tags)
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn form_with_days(days: &str) -> TripForm {
        TripForm {
            days: days.to_string(),
            ..TripForm::default()
        }
    }

    #[test]
    fn test_default_form_is_valid() {
        let request = TripForm::default().validate().unwrap();
        assert_eq!(request.destination(), "Kerala");
        assert_eq!(request.days(), 4);
        assert_eq!(request.budget(), Budget::Moderate);
        assert_eq!(request.start_location(), Some("Hyderabad"));
        assert_eq!(request.preferences().len(), 3);
        assert!(request.start_date().is_none());
    }

    #[rstest]
    #[case("1", 1)]
    #[case("15", 15)]
    #[case(" 30 ", 30)]
    fn test_days_in_range(#[case] raw: &str, #[case] expected: u8) {
        let request = form_with_days(raw).validate().unwrap();
        assert_eq!(request.days(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("31")]
    #[case("-3")]
    #[case("4.5")]
    #[case("four")]
    #[case("")]
    fn test_days_rejected(#[case] raw: &str) {
        let err = form_with_days(raw).validate().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("days"));
    }

    #[test]
    fn test_empty_destination_rejected() {
        let form = TripForm {
            destination: "   ".to_string(),
            ..TripForm::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.field(), Some("destination"));
        assert!(err.to_string().contains("Destination cannot be empty"));
    }

    #[rstest]
    #[case("low", Budget::Low)]
    #[case("Moderate", Budget::Moderate)]
    #[case(" HIGH ", Budget::High)]
    fn test_budget_parsing(#[case] raw: &str, #[case] expected: Budget) {
        assert_eq!(raw.parse::<Budget>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_budget_rejected() {
        let form = TripForm {
            budget: "luxury".to_string(),
            ..TripForm::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.field(), Some("budget"));
    }

    #[test]
    fn test_preferences_are_deduplicated() {
        let form = TripForm {
            preferences: "Food, museums,\nfood ,  , Beaches".to_string(),
            ..TripForm::default()
        };
        let request = form.validate().unwrap();
        let tags: Vec<&str> = request.preferences().iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["Beaches", "Food", "museums"]);
        assert_eq!(request.preferences_label(), "Beaches, Food, museums");
    }

    #[test]
    fn test_empty_preferences_label() {
        let form = TripForm {
            preferences: String::new(),
            ..TripForm::default()
        };
        assert_eq!(form.validate().unwrap().preferences_label(), "none");
    }

    #[test]
    fn test_start_date() {
        let form = TripForm {
            start_date: "2026-12-30".to_string(),
            ..TripForm::default()
        };
        let request = form.validate().unwrap();
        assert_eq!(
            request.date_of_day(1),
            NaiveDate::from_ymd_opt(2026, 12, 30)
        );
        assert_eq!(request.date_of_day(3), NaiveDate::from_ymd_opt(2027, 1, 1));
        assert_eq!(request.date_of_day(0), None);

        let bad = TripForm {
            start_date: "30/12/2026".to_string(),
            ..TripForm::default()
        };
        assert_eq!(bad.validate().unwrap_err().field(), Some("start_date"));
    }

    #[test]
    fn test_from_pairs() {
        let pairs = vec![
            ("destination".to_string(), "Lisbon".to_string()),
            ("days".to_string(), "3".to_string()),
            ("budget".to_string(), "High".to_string()),
            ("attraction".to_string(), "Belem Tower".to_string()),
        ];
        let form = TripForm::from_pairs(&pairs);
        assert_eq!(form.destination, "Lisbon");
        assert_eq!(form.days, "3");
        assert!(form.purpose.is_empty());

        let request = form.validate().unwrap();
        assert_eq!(request.budget(), Budget::High);
        assert!(request.start_location().is_none());
    }

    #[test]
    fn test_payload_conversion() {
        let payload: TripPayload = serde_json::from_str(
            r#"{"destination":"Kyoto","days":5,"budget":"low","preferences":["temples","tea"]}"#,
        )
        .unwrap();
        let request = TripForm::from(payload).validate().unwrap();
        assert_eq!(request.destination(), "Kyoto");
        assert_eq!(request.days(), 5);
        assert_eq!(request.preferences().len(), 2);
    }

    #[rstest]
    #[case(r#"{"destination":"Kyoto","days":"four","budget":"low"}"#, "days")]
    #[case(r#"{"destination":"Kyoto","days":4.5,"budget":"low"}"#, "days")]
    #[case(r#"{"destination":"Kyoto","days":[4],"budget":"low"}"#, "days")]
    #[case(r#"{"destination":"Kyoto","budget":"low"}"#, "days")]
    #[case(r#"{"destination":"Kyoto","days":4}"#, "budget")]
    #[case(r#"{"days":4,"budget":"low"}"#, "destination")]
    fn test_loose_payload_fails_on_field(#[case] body: &str, #[case] field: &str) {
        let payload: TripPayload = serde_json::from_str(body).unwrap();
        let err = TripForm::from(payload).validate().unwrap_err();
        assert_eq!(err.field(), Some(field));
    }

    #[test]
    fn test_payload_days_as_string() {
        let payload: TripPayload =
            serde_json::from_str(r#"{"destination":"Kyoto","days":" 7 ","budget":"High"}"#).unwrap();
        assert_eq!(TripForm::from(payload).validate().unwrap().days(), 7);
    }
}
