use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    api::portal_client::{Portal, PortalError, ProfileService, QuestionService, ScoreService},
    models::{
        player::{CategoryId, PlayerId, PlayerProfile},
        question::QuestionDto,
    },
};

pub const CORRECT: &str = "right";
pub const WRONG: &str = "wrong";

/// In-memory portal recording every call it receives. Every question it
/// serves has `CORRECT` as the right option.
pub struct MockPortal {
    profile: Option<PlayerProfile>,
    questions: Result<Vec<QuestionDto>, StatusCode>,
    score_status: Option<StatusCode>,
    score_delay: Option<Duration>,
    question_requests: Mutex<Vec<CategoryId>>,
    score_updates: Mutex<Vec<(PlayerId, u32)>>,
}

pub fn question_dto(id: i64) -> QuestionDto {
    QuestionDto {
        id,
        question_text: format!("Question {}", id),
        options: vec![CORRECT.into(), WRONG.into(), "maybe".into(), "never".into()],
        correct_answer: CORRECT.into(),
    }
}

impl MockPortal {
    pub fn with_questions(semester: CategoryId, count: i64) -> Self {
        Self {
            profile: Some(PlayerProfile {
                id: 0,
                current_semester_id: Some(semester),
                assigned_semester_id: None,
                high_score: None,
            }),
            questions: Ok((1..=count).map(question_dto).collect()),
            score_status: None,
            score_delay: None,
            question_requests: Mutex::new(Vec::new()),
            score_updates: Mutex::new(Vec::new()),
        }
    }

    pub fn high_score(mut self, high_score: u32) -> Self {
        if let Some(profile) = self.profile.as_mut() {
            profile.high_score = Some(high_score);
        }
        self
    }

    pub fn no_semester(mut self) -> Self {
        if let Some(profile) = self.profile.as_mut() {
            profile.current_semester_id = None;
            profile.assigned_semester_id = None;
        }
        self
    }

    pub fn failing_profile(mut self) -> Self {
        self.profile = None;
        self
    }

    pub fn failing_questions(mut self, status: StatusCode) -> Self {
        self.questions = Err(status);
        self
    }

    pub fn failing_scores(mut self) -> Self {
        self.score_status = Some(StatusCode::INTERNAL_SERVER_ERROR);
        self
    }

    /// Score updates are recorded on arrival and answered after `delay`.
    pub fn slow_scores(mut self, delay: Duration) -> Self {
        self.score_delay = Some(delay);
        self
    }

    pub fn portal(self: &Arc<Self>) -> Portal {
        Portal {
            profiles: self.clone(),
            questions: self.clone(),
            scores: self.clone(),
        }
    }

    pub fn question_requests(&self) -> Vec<CategoryId> {
        self.question_requests.lock().unwrap().clone()
    }

    pub fn score_updates(&self) -> Vec<(PlayerId, u32)> {
        self.score_updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileService for MockPortal {
    async fn fetch_profile(&self, player_id: PlayerId) -> Result<PlayerProfile, PortalError> {
        match &self.profile {
            Some(profile) => Ok(PlayerProfile {
                id: player_id,
                ..profile.clone()
            }),
            None => Err(PortalError::Api(
                StatusCode::INTERNAL_SERVER_ERROR,
                "profile unavailable".into(),
            )),
        }
    }
}

#[async_trait]
impl QuestionService for MockPortal {
    async fn fetch_questions(&self, category: CategoryId) -> Result<Vec<QuestionDto>, PortalError> {
        self.question_requests.lock().unwrap().push(category);

        match &self.questions {
            Ok(questions) => Ok(questions.clone()),
            Err(status) => Err(PortalError::Api(*status, "questions unavailable".into())),
        }
    }
}

#[async_trait]
impl ScoreService for MockPortal {
    async fn update_score(&self, player_id: PlayerId, score: u32) -> Result<(), PortalError> {
        self.score_updates.lock().unwrap().push((player_id, score));

        if let Some(delay) = self.score_delay {
            tokio::time::sleep(delay).await;
        }

        match self.score_status {
            Some(status) => Err(PortalError::Api(status, "score rejected".into())),
            None => Ok(()),
        }
    }
}
