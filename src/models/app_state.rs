use std::sync::Arc;

use crate::{
    api::portal_client::{Portal, PortalClient},
    config::app_config::AppConfig,
    models::{error::ServerError, quiz_game::RoundSettings, player::PlayerId},
    service::{
        quiz_runner::{QuizRunner, QuizTiming},
        session_registry::SessionRegistry,
    },
};

pub struct AppState {
    portal_client: Option<PortalClient>,
    portal: Portal,
    sessions: SessionRegistry,
    settings: RoundSettings,
    timing: QuizTiming,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Arc<Self>, ServerError> {
        let client = PortalClient::new(&config.portal.base_url, config.portal.request_timeout())?;

        Ok(Arc::new(Self {
            portal: Portal::from_client(client.clone()),
            portal_client: Some(client),
            sessions: SessionRegistry::from_retention(config.server.session_retention_minutes),
            settings: config.quiz.round_settings(),
            timing: config.quiz.timing(),
        }))
    }

    /// State over arbitrary collaborators, without a portal health check.
    #[cfg(test)]
    pub fn from_portal(
        portal: Portal,
        settings: RoundSettings,
        timing: QuizTiming,
        retention_minutes: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            portal_client: None,
            portal,
            sessions: SessionRegistry::from_retention(retention_minutes),
            settings,
            timing,
        })
    }

    pub fn get_portal_client(&self) -> Option<&PortalClient> {
        self.portal_client.as_ref()
    }

    pub fn get_sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn new_runner(&self, player_id: PlayerId) -> QuizRunner {
        QuizRunner::new(player_id, self.portal.clone(), self.settings, self.timing)
    }
}
