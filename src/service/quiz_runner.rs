use std::{
    ops::ControlFlow,
    sync::{Arc, Weak},
    time::Duration,
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::{
    api::portal_client::Portal,
    models::{
        player::PlayerId,
        quiz_game::{
            AdvanceOutcome, GameError, GameSnapshot, QuizGame, RoundSettings, TickOutcome,
        },
    },
    service::{question_loader::load_pool, quiz_timer::TimerHandle},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTiming {
    pub tick: Duration,
    pub feedback: Duration,
}

impl Default for QuizTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            feedback: Duration::from_secs(2),
        }
    }
}

struct RunnerState {
    game: QuizGame,
    rng: ChaCha8Rng,
    // Bumped whenever a question lifecycle ends; timers carry the value
    // they were armed with.
    generation: u64,
    countdown: Option<TimerHandle>,
    feedback: Option<TimerHandle>,
    closed: bool,
}

struct Shared {
    player_id: PlayerId,
    portal: Portal,
    timing: QuizTiming,
    state: Mutex<RunnerState>,
}

/// Drives one player's quiz: owns the state machine, its two timers and the
/// calls out to the portal. Timer tasks only keep a weak reference, so
/// dropping the runner cancels everything still scheduled.
pub struct QuizRunner {
    shared: Arc<Shared>,
}

impl QuizRunner {
    pub fn new(
        player_id: PlayerId,
        portal: Portal,
        settings: RoundSettings,
        timing: QuizTiming,
    ) -> Self {
        let state = RunnerState {
            game: QuizGame::new(settings),
            rng: ChaCha8Rng::from_os_rng(),
            generation: 0,
            countdown: None,
            feedback: None,
            closed: false,
        };

        Self {
            shared: Arc::new(Shared {
                player_id,
                portal,
                timing,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.shared.player_id
    }

    /// Fetches the pool once. Ends in START, or NO_QUESTIONS when nothing
    /// could be loaded.
    pub async fn load(&self) -> Result<GameSnapshot, GameError> {
        let loaded = load_pool(&self.shared.portal, self.shared.player_id).await;
        if let Some(category) = loaded.category {
            debug!(
                "Loaded {} questions from category {} for player {}",
                loaded.questions.len(),
                category,
                self.shared.player_id
            );
        }

        let mut state = self.shared.state.lock().await;
        state.game.load(loaded.questions, loaded.high_score)?;

        let snapshot = state.game.snapshot();
        if let GameSnapshot::NoQuestions = snapshot {
            info!("No questions available for player {}", self.shared.player_id);
        }

        Ok(snapshot)
    }

    /// Begins a round from START, or plays again from RESULT.
    pub async fn begin(&self) -> Result<GameSnapshot, GameError> {
        let mut state = self.shared.state.lock().await;
        if state.closed {
            return Err(GameError::Closed);
        }

        let RunnerState { game, rng, .. } = &mut *state;
        game.begin_round(rng)?;

        state.feedback = None;
        start_question(&self.shared, &mut state);

        info!("Player {} started a round", self.shared.player_id);
        Ok(state.game.snapshot())
    }

    pub async fn answer(&self, option: String) -> Result<GameSnapshot, GameError> {
        let mut state = self.shared.state.lock().await;
        if state.closed {
            return Err(GameError::Closed);
        }

        let outcome = state.game.submit(Some(option))?;
        debug!(
            "Player {} answered, correct: {}, score: {}",
            self.shared.player_id, outcome.correct, outcome.score
        );

        state.countdown = None;
        arm_feedback(&self.shared, &mut state);

        Ok(state.game.snapshot())
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.shared.state.lock().await.game.snapshot()
    }

    #[cfg(test)]
    pub async fn high_score(&self) -> u32 {
        self.shared.state.lock().await.game.high_score()
    }

    /// Cancels both timers. Any further action on the session is rejected.
    pub async fn shutdown(&self) {
        let mut state = self.shared.state.lock().await;
        state.closed = true;
        state.generation += 1;

        for timer in [state.countdown.take(), state.feedback.take()]
            .into_iter()
            .flatten()
        {
            timer.cancel();
        }

        debug!("Quiz session for player {} shut down", self.shared.player_id);
    }
}

fn start_question(shared: &Arc<Shared>, state: &mut RunnerState) {
    state.generation += 1;
    let generation = state.generation;
    let weak = Arc::downgrade(shared);

    state.countdown = Some(TimerHandle::every(shared.timing.tick, move || {
        on_tick(weak.clone(), generation)
    }));
}

async fn on_tick(weak: Weak<Shared>, generation: u64) -> ControlFlow<()> {
    let Some(shared) = weak.upgrade() else {
        return ControlFlow::Break(());
    };

    let mut state = shared.state.lock().await;
    if state.closed || state.generation != generation {
        debug!("Dropping stale countdown tick");
        return ControlFlow::Break(());
    }

    match state.game.tick() {
        Ok(TickOutcome::Counting(remaining)) => {
            trace!("Player {} has {}s left", shared.player_id, remaining);
            ControlFlow::Continue(())
        }
        Ok(TickOutcome::Expired(outcome)) => {
            debug!(
                "Player {} ran out of time, score: {}",
                shared.player_id, outcome.score
            );
            arm_feedback(&shared, &mut state);
            ControlFlow::Break(())
        }
        Ok(TickOutcome::Ignored) => ControlFlow::Break(()),
        Err(e) => {
            warn!("Countdown ticked outside of a round: {}", e);
            ControlFlow::Break(())
        }
    }
}

fn arm_feedback(shared: &Arc<Shared>, state: &mut RunnerState) {
    let generation = state.generation;
    let weak = Arc::downgrade(shared);

    state.feedback = Some(TimerHandle::after(shared.timing.feedback, async move {
        if let Some(shared) = weak.upgrade() {
            on_feedback_elapsed(shared, generation).await;
        }
    }));
}

async fn on_feedback_elapsed(shared: Arc<Shared>, generation: u64) {
    let mut state = shared.state.lock().await;
    if state.closed || state.generation != generation {
        debug!("Dropping stale feedback timer");
        return;
    }

    match state.game.advance() {
        Ok(AdvanceOutcome::NextQuestion(index)) => {
            debug!("Player {} moved to question {}", shared.player_id, index + 1);
            start_question(&shared, &mut state);
        }
        Ok(AdvanceOutcome::Finished(result)) => {
            state.generation += 1;
            state.countdown = None;

            info!(
                "Player {} finished a round with {}/{}",
                shared.player_id, result.score, result.total_questions
            );

            if result.new_high_score {
                persist_high_score(&shared, result.score);
            }
        }
        Err(e) => warn!("Feedback delay elapsed without a locked question: {}", e),
    }
}

fn persist_high_score(shared: &Arc<Shared>, score: u32) {
    let weak = Arc::downgrade(shared);
    let scores = shared.portal.scores.clone();
    let player_id = shared.player_id;

    tokio::spawn(async move {
        match scores.update_score(player_id, score).await {
            Ok(()) => {
                info!("Stored new high score {} for player {}", score, player_id);
                if let Some(shared) = weak.upgrade() {
                    shared.state.lock().await.game.record_high_score(score);
                }
            }
            Err(e) => {
                error!(
                    "Failed to store high score {} for player {}: {}",
                    score, player_id, e
                );
                if let Some(shared) = weak.upgrade() {
                    shared.state.lock().await.game.release_high_score(score);
                }
            }
        }
    });
}
