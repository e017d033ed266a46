use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::Ascent;
use crate::services::working_grade::PromotionOutcome;

/// An ascent with the points it earned
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AscentResponse {
    pub ascent_id: Uuid,
    pub climber_id: Uuid,
    pub name: String,
    pub description: String,
    pub absolute_grade: i32,
    pub working_grade_when_sent: i32,
    pub is_flash: bool,
    pub points: i64,
    pub sent_date: NaiveDate,
    pub create_date: NaiveDateTime,
}

impl From<Ascent> for AscentResponse {
    fn from(ascent: Ascent) -> Self {
        Self {
            points: ascent.points(),
            ascent_id: ascent.ascent_id,
            climber_id: ascent.climber_id,
            name: ascent.name,
            description: ascent.description,
            absolute_grade: ascent.absolute_grade,
            working_grade_when_sent: ascent.working_grade_when_sent,
            is_flash: ascent.is_flash,
            sent_date: ascent.sent_date,
            create_date: ascent.create_date,
        }
    }
}

/// Request payload for logging a send
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LogAscentRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Climb name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,

    #[validate(range(min = 0, max = 17, message = "Absolute grade must be between 0 and 17"))]
    pub absolute_grade: i32,

    #[serde(default)]
    pub is_flash: bool,

    /// Defaults to today
    pub sent_date: Option<NaiveDate>,
}

/// Result of logging a send
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoggedAscentResponse {
    pub ascent: AscentResponse,
    pub running_score: i64,
    pub promotion: PromotionOutcome,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PointsQuery {
    pub working_grade: i32,
    pub absolute_grade: i32,
    #[serde(default)]
    pub is_flash: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointsResponse {
    pub points: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, absolute_grade: i32) -> LogAscentRequest {
        LogAscentRequest {
            name: name.to_string(),
            description: String::new(),
            absolute_grade,
            is_flash: false,
            sent_date: None,
        }
    }

    #[test]
    fn test_log_request_bounds() {
        assert!(request("Midnight Lightning", 8).validate().is_ok());
        assert!(request("", 8).validate().is_err());
        assert!(request("Off the scale", 18).validate().is_err());
        assert!(request("Negative", -1).validate().is_err());
    }

    #[test]
    fn test_logged_response_reads_back() {
        let body = serde_json::json!({
            "ascent": {
                "ascent_id": Uuid::nil(),
                "climber_id": Uuid::nil(),
                "name": "Roof",
                "description": "",
                "absolute_grade": 5,
                "working_grade_when_sent": 4,
                "is_flash": false,
                "points": 125,
                "sent_date": "2025-06-14",
                "create_date": "2025-06-14T18:30:00"
            },
            "running_score": 125,
            "promotion": { "promoted": true, "new_tier": 5 }
        });

        let logged: LoggedAscentResponse = serde_json::from_value(body).unwrap();
        assert_eq!(logged.promotion, PromotionOutcome::promoted_to(5));
        assert_eq!(logged.ascent.points, 125);
    }
}
