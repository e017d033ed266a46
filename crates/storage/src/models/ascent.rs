use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::points::compute_points;

/// A logged send.
///
/// `working_grade_when_sent` is written once at insert time and never updated,
/// so the points of an ascent stay fixed when its climber is later promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Ascent {
    pub ascent_id: Uuid,
    pub climber_id: Uuid,
    pub name: String,
    pub description: String,
    pub absolute_grade: i32,
    pub working_grade_when_sent: i32,
    pub is_flash: bool,
    pub sent_date: NaiveDate,
    pub create_date: NaiveDateTime,
}

impl Ascent {
    /// Points earned by this ascent, priced against its own tier snapshot.
    pub fn points(&self) -> i64 {
        compute_points(
            self.working_grade_when_sent,
            self.absolute_grade,
            self.is_flash,
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewAscent {
    pub climber_id: Uuid,
    pub name: String,
    pub description: String,
    pub absolute_grade: i32,
    pub working_grade_when_sent: i32,
    pub is_flash: bool,
    pub sent_date: NaiveDate,
}
