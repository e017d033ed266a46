use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// What a candidate proposes for its target climber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subject_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Nickname,
    ProfilePhoto,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Nickname => "nickname",
            SubjectKind::ProfilePhoto => "profile_photo",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "nickname" | "nicknames" => Ok(SubjectKind::Nickname),
            "profile_photo" | "profile_photos" | "photo" | "photos" => {
                Ok(SubjectKind::ProfilePhoto)
            }
            other => Err(format!("Unknown subject kind: {}", other)),
        }
    }
}

/// One mini-election: the nickname or the profile photo of one climber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Subject {
    pub kind: SubjectKind,
    pub target_climber_id: Uuid,
}

impl Subject {
    pub fn new(kind: SubjectKind, target_climber_id: Uuid) -> Self {
        Self {
            kind,
            target_climber_id,
        }
    }

    pub fn nickname(target_climber_id: Uuid) -> Self {
        Self::new(SubjectKind::Nickname, target_climber_id)
    }

    pub fn profile_photo(target_climber_id: Uuid) -> Self {
        Self::new(SubjectKind::ProfilePhoto, target_climber_id)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.target_climber_id)
    }
}
