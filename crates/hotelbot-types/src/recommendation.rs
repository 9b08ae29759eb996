//! Hotel recommendations surfaced to a session and the clicks they receive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;
use crate::session::SessionId;
use crate::validate;

pub const MAX_BOOKING_ID_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_LOCATION_LEN: usize = 255;
/// Ratings are accepted on a 0-10 scale (covers both 5- and 10-point providers).
pub const MAX_RATING: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecommendationId(pub i64);

impl fmt::Display for RecommendationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hotel shown to the user. Immutable once sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecommendation {
    pub id: RecommendationId,
    pub session_id: SessionId,
    /// Identifier of the hotel at the external booking provider.
    pub booking_id: String,
    pub name: String,
    pub location: String,
    pub price_per_night: Money,
    pub rating: Option<f64>,
    pub total_rating_count: u32,
    pub image_url: Option<String>,
    pub affiliate_url: String,
    pub description: String,
    pub amenities: Vec<String>,
    pub score: f64,
    pub sent_at: DateTime<Utc>,
}

impl fmt::Display for HotelRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.location)
    }
}

/// Input for storing a recommendation; id and `sent_at` come from the store.
///
/// `affiliate_url` is required: an empty string fails validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHotelRecommendation {
    pub session_id: SessionId,
    pub booking_id: String,
    pub name: String,
    pub location: String,
    pub price_per_night: Money,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_rating_count: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub affiliate_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub score: f64,
}

impl NewHotelRecommendation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::required("booking_id", &self.booking_id, MAX_BOOKING_ID_LEN)?;
        validate::required("name", &self.name, MAX_NAME_LEN)?;
        validate::max_len("location", &self.location, MAX_LOCATION_LEN)?;
        validate::http_url("affiliate_url", &self.affiliate_url)?;
        if let Some(image_url) = &self.image_url {
            validate::http_url("image_url", image_url)?;
        }
        if let Some(rating) = self.rating {
            if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
                return Err(ValidationError::new(
                    "rating",
                    format!("must be between 0 and {MAX_RATING}"),
                ));
            }
        }
        if i32::try_from(self.total_rating_count).is_err() {
            return Err(ValidationError::new("total_rating_count", "is too large"));
        }
        if !self.score.is_finite() {
            return Err(ValidationError::new("score", "must be a finite number"));
        }
        if self.amenities.iter().any(|a| a.trim().is_empty()) {
            return Err(ValidationError::new("amenities", "must not contain blank entries"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClickId(pub i64);

/// Analytics event: `session_id` clicked `recommendation_id`.
///
/// At most one click exists per (recommendation, session) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationClick {
    pub id: ClickId,
    pub recommendation_id: RecommendationId,
    pub session_id: SessionId,
    pub clicked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(session_id: SessionId) -> NewHotelRecommendation {
        NewHotelRecommendation {
            session_id,
            booking_id: "BK-1001".to_string(),
            name: "Hotel Lutetia".to_string(),
            location: "Paris".to_string(),
            price_per_night: "189.00".parse().unwrap(),
            rating: Some(8.9),
            total_rating_count: 1204,
            image_url: None,
            affiliate_url: "https://book.example.com/h/1001?aid=42".to_string(),
            description: String::new(),
            amenities: vec!["wifi".to_string(), "spa".to_string()],
            score: 0.87,
        }
    }

    #[test]
    fn test_valid_recommendation() {
        assert!(sample(SessionId::new()).validate().is_ok());
    }

    #[test]
    fn test_missing_affiliate_url() {
        let rec = NewHotelRecommendation {
            affiliate_url: String::new(),
            ..sample(SessionId::new())
        };
        let err = rec.validate().unwrap_err();
        assert_eq!(err.field, "affiliate_url");
        assert_eq!(err.reason, "is required");
    }

    #[test]
    fn test_affiliate_url_defaults_to_empty_when_omitted() {
        let json = serde_json::json!({
            "session_id": SessionId::new(),
            "booking_id": "BK-1",
            "name": "Somewhere",
            "location": "Rome",
            "price_per_night": "99.00"
        });
        let rec: NewHotelRecommendation = serde_json::from_value(json).unwrap();
        assert!(rec.affiliate_url.is_empty());
        assert_eq!(rec.validate().unwrap_err().field, "affiliate_url");
    }

    #[test]
    fn test_rejects_bad_rating_and_score() {
        let sid = SessionId::new();
        let rec = NewHotelRecommendation {
            rating: Some(11.0),
            ..sample(sid)
        };
        assert_eq!(rec.validate().unwrap_err().field, "rating");

        let rec = NewHotelRecommendation {
            score: f64::NAN,
            ..sample(sid)
        };
        assert_eq!(rec.validate().unwrap_err().field, "score");
    }

    #[test]
    fn test_rejects_bad_image_url() {
        let rec = NewHotelRecommendation {
            image_url: Some("javascript:alert(1)".to_string()),
            ..sample(SessionId::new())
        };
        assert_eq!(rec.validate().unwrap_err().field, "image_url");
    }
}
