use serde::{Deserialize, Serialize};

pub type PlayerId = i64;
pub type CategoryId = i64;

/// Profile record as the portal exposes it. Every field besides the id may
/// be missing for students that were never assigned a semester.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerProfile {
    pub id: PlayerId,
    #[serde(default)]
    pub current_semester_id: Option<CategoryId>,
    #[serde(default)]
    pub assigned_semester_id: Option<CategoryId>,
    #[serde(default)]
    pub high_score: Option<u32>,
}

impl PlayerProfile {
    pub fn category(&self) -> Option<CategoryId> {
        self.current_semester_id.or(self.assigned_semester_id)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.unwrap_or(0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateScoreRequest {
    pub score: u32,
}
