//! Cached search preferences, one snapshot per session.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;
use crate::session::SessionId;
use crate::validate;

pub const MAX_LOCATION_LEN: usize = 255;
pub const MAX_ROOM_TYPE_LEN: usize = 50;

/// Open-ended bag of extra preferences (e.g. `"pets": true`).
pub type ExtraPreferences = BTreeMap<String, serde_json::Value>;

/// The stored preference snapshot for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSearchPreference {
    pub id: i64,
    pub session_id: SessionId,
    pub location: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: u32,
    pub budget_min: Option<Money>,
    pub budget_max: Option<Money>,
    pub room_type: String,
    pub extra: ExtraPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for UserSearchPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.check_in {
            Some(date) => write!(f, "{} - {}", self.location, date),
            None => write!(f, "{} - None", self.location),
        }
    }
}

/// Input for an upsert. Every field of the existing snapshot is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPreferenceInput {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    #[serde(default = "default_guests")]
    pub guests: u32,
    #[serde(default)]
    pub budget_min: Option<Money>,
    #[serde(default)]
    pub budget_max: Option<Money>,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub extra: ExtraPreferences,
}

fn default_guests() -> u32 {
    1
}

impl Default for SearchPreferenceInput {
    fn default() -> Self {
        Self {
            location: String::new(),
            check_in: None,
            check_out: None,
            guests: default_guests(),
            budget_min: None,
            budget_max: None,
            room_type: String::new(),
            extra: ExtraPreferences::new(),
        }
    }
}

impl SearchPreferenceInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::max_len("location", &self.location, MAX_LOCATION_LEN)?;
        validate::max_len("room_type", &self.room_type, MAX_ROOM_TYPE_LEN)?;

        if self.guests == 0 {
            return Err(ValidationError::new("guests", "must be at least 1"));
        }
        if i32::try_from(self.guests).is_err() {
            return Err(ValidationError::new("guests", "is too large"));
        }
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            if check_out < check_in {
                return Err(ValidationError::new(
                    "check_out",
                    format!("{check_out} is before check-in {check_in}"),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.budget_min, self.budget_max) {
            if min > max {
                return Err(ValidationError::new(
                    "budget_min",
                    format!("{min} exceeds budget_max {max}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let input = SearchPreferenceInput::default();
        assert_eq!(input.guests, 1);
        assert!(input.extra.is_empty());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let input: SearchPreferenceInput =
            serde_json::from_str(r#"{"location": "Paris", "budget_max": "250.00"}"#).unwrap();
        assert_eq!(input.location, "Paris");
        assert_eq!(input.guests, 1);
        assert_eq!(input.budget_max.unwrap().cents(), 25_000);
    }

    #[test]
    fn test_rejects_inverted_dates() {
        let input = SearchPreferenceInput {
            check_in: NaiveDate::from_ymd_opt(2026, 5, 10),
            check_out: NaiveDate::from_ymd_opt(2026, 5, 8),
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().field, "check_out");
    }

    #[test]
    fn test_rejects_inverted_budget() {
        let input = SearchPreferenceInput {
            budget_min: Some("300".parse().unwrap()),
            budget_max: Some("100".parse().unwrap()),
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().field, "budget_min");
    }

    #[test]
    fn test_rejects_zero_guests() {
        let input = SearchPreferenceInput {
            guests: 0,
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().field, "guests");
    }

    #[test]
    fn test_display() {
        let now = Utc::now();
        let pref = UserSearchPreference {
            id: 1,
            session_id: SessionId::new(),
            location: "Lisbon".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 6, 1),
            check_out: None,
            guests: 2,
            budget_min: None,
            budget_max: None,
            room_type: String::new(),
            extra: ExtraPreferences::new(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(pref.to_string(), "Lisbon - 2026-06-01");
    }
}
