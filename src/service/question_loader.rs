use tracing::{info, warn};

use crate::{
    api::portal_client::Portal,
    models::{
        player::{CategoryId, PlayerId},
        question::{Question, into_pool},
    },
};

#[derive(Debug, Default)]
pub struct LoadedPool {
    pub category: Option<CategoryId>,
    pub questions: Vec<Question>,
    pub high_score: u32,
}

/// Reads the player's profile and the question pool of their semester.
/// Never fails: any missing piece or transport error yields an empty pool,
/// which the game reports as having no questions.
pub async fn load_pool(portal: &Portal, player_id: PlayerId) -> LoadedPool {
    let profile = match portal.profiles.fetch_profile(player_id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Failed to fetch profile for player {}: {}", player_id, e);
            return LoadedPool::default();
        }
    };

    let high_score = profile.high_score();
    let Some(category) = profile.category() else {
        warn!("Player {} has no semester assigned", player_id);
        return LoadedPool {
            category: None,
            questions: Vec::new(),
            high_score,
        };
    };

    let questions = match portal.questions.fetch_questions(category).await {
        Ok(dtos) => into_pool(dtos),
        Err(e) => {
            warn!("Failed to fetch questions for semester {}: {}", category, e);
            Vec::new()
        }
    };

    info!(
        "Loaded {} questions for player {} in semester {}",
        questions.len(),
        player_id,
        category
    );

    LoadedPool {
        category: Some(category),
        questions,
        high_score,
    }
}
