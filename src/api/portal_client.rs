use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::error;

use crate::models::{
    player::{CategoryId, PlayerId, PlayerProfile, UpdateScoreRequest},
    question::QuestionDto,
};

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Api error: {0} - {1}")]
    Api(StatusCode, String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn fetch_profile(&self, player_id: PlayerId) -> Result<PlayerProfile, PortalError>;
}

#[async_trait]
pub trait QuestionService: Send + Sync {
    async fn fetch_questions(&self, category: CategoryId) -> Result<Vec<QuestionDto>, PortalError>;
}

#[async_trait]
pub trait ScoreService: Send + Sync {
    async fn update_score(&self, player_id: PlayerId, score: u32) -> Result<(), PortalError>;
}

/// The three portal collaborators a quiz session talks to.
#[derive(Clone)]
pub struct Portal {
    pub profiles: Arc<dyn ProfileService>,
    pub questions: Arc<dyn QuestionService>,
    pub scores: Arc<dyn ScoreService>,
}

impl Portal {
    pub fn from_client(client: PortalClient) -> Self {
        let client = Arc::new(client);
        Self {
            profiles: client.clone(),
            questions: client.clone(),
            scores: client,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    domain: String,
}

impl PortalClient {
    pub fn new(domain: impl Into<String>, timeout: Duration) -> Result<Self, PortalError> {
        let client = Client::builder().timeout(timeout).build()?;
        let domain = domain.into().trim_end_matches('/').to_string();
        Ok(Self { client, domain })
    }

    pub async fn health_check(&self) -> Result<(), PortalError> {
        let response = self
            .client
            .get(format!("{}/health", self.domain))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PortalError::Api(
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to reach the portal".into(),
            ));
        }

        Ok(())
    }

    async fn get_json<T>(&self, uri: &str) -> Result<T, PortalError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.domain, uri);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Portal request failed: {} - {}", status, body);
            return Err(PortalError::Api(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ProfileService for PortalClient {
    async fn fetch_profile(&self, player_id: PlayerId) -> Result<PlayerProfile, PortalError> {
        self.get_json(&format!("users/{}", player_id)).await
    }
}

#[async_trait]
impl QuestionService for PortalClient {
    async fn fetch_questions(&self, category: CategoryId) -> Result<Vec<QuestionDto>, PortalError> {
        self.get_json(&format!("questions/semester/{}", category))
            .await
    }
}

#[async_trait]
impl ScoreService for PortalClient {
    async fn update_score(&self, player_id: PlayerId, score: u32) -> Result<(), PortalError> {
        let url = format!("{}/users/{}/score", self.domain, player_id);
        let payload = UpdateScoreRequest { score };

        let response = self.client.put(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or("No body".into());
            error!("Score update failed: {} - {}", status, body);
            return Err(PortalError::Api(status, body));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> PortalClient {
        PortalClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetches_profile() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 12,
                "current_semester_id": 4,
                "high_score": 7
            })))
            .mount(&server)
            .await;

        let profile = client(&server).fetch_profile(12).await.unwrap();
        assert_eq!(profile.category(), Some(4));
        assert_eq!(profile.high_score(), 7);
    }

    #[tokio::test]
    async fn fetches_questions_for_semester() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/questions/semester/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1,
                    "question_text": "Capital of Venezuela?",
                    "options": ["Caracas", "Maracaibo", "Valencia", "Mérida"],
                    "correct_answer": "Caracas"
                }
            ])))
            .mount(&server)
            .await;

        let questions = client(&server).fetch_questions(4).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "Capital of Venezuela?");
        assert_eq!(questions[0].correct_answer, "Caracas");
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/questions/semester/9"))
            .respond_with(ResponseTemplate::new(404).set_body_string("unknown semester"))
            .mount(&server)
            .await;

        let result = client(&server).fetch_questions(9).await;
        match result {
            Err(PortalError::Api(status, body)) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "unknown semester");
            }
            other => panic!("Expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/3"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = client(&server).fetch_profile(3).await;
        assert!(matches!(result, Err(PortalError::Decode(_))));
    }

    #[tokio::test]
    async fn puts_new_score() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/users/12/score"))
            .and(body_json(json!({ "score": 9 })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).update_score(12, 9).await.unwrap();
    }

    #[tokio::test]
    async fn health_check_reports_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(client(&server).health_check().await.is_err());
    }
}
