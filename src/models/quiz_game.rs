use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{models::question::Question, service::sampler::sample_round};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Question pool was already loaded")]
    AlreadyLoaded,

    #[error("A round can only begin from the start or result screen")]
    CannotBegin,

    #[error("No round is being played")]
    NotPlaying,

    #[error("Current question is already answered")]
    AnswerLocked,

    #[error("Current question has not been answered yet")]
    NotLocked,

    #[error("Quiz session was closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSettings {
    pub round_size: usize,
    pub question_seconds: u32,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            round_size: 10,
            question_seconds: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoundState {
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    time_remaining: u32,
    locked: bool,
    selected_option: Option<String>,
}

impl RoundState {
    fn new(questions: Vec<Question>, question_seconds: u32) -> Self {
        Self {
            questions,
            current_index: 0,
            score: 0,
            time_remaining: question_seconds,
            locked: false,
            selected_option: None,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    fn is_last(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    /// Shared by explicit answers and timeouts, `None` being the timeout.
    fn resolve(&mut self, option: Option<String>) -> AnswerOutcome {
        let correct = self.current().is_correct(option.as_deref());
        if correct {
            self.score += 1;
        }

        self.locked = true;
        self.selected_option = option;

        AnswerOutcome {
            correct,
            score: self.score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundResult {
    pub score: u32,
    pub total_questions: usize,
    pub high_score: u32,
    pub new_high_score: bool,
}

#[derive(Debug, Clone)]
pub enum GamePhase {
    Loading,
    NoQuestions,
    Start,
    Playing(RoundState),
    Result(RoundResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting(u32),
    Expired(AnswerOutcome),
    /// The question was answered before the tick landed.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NextQuestion(usize),
    Finished(RoundResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GameSnapshot {
    Loading,
    NoQuestions,
    Start {
        pool_size: usize,
        high_score: u32,
    },
    Playing {
        question_number: usize,
        total_questions: usize,
        question_id: i64,
        text: String,
        options: Vec<String>,
        time_remaining: u32,
        locked: bool,
        selected_option: Option<String>,
        correct_answer: Option<String>,
        score: u32,
    },
    Result(RoundResult),
}

/// Round state machine for a single player. Holds no timers; the caller
/// drives `tick` and `advance` on its own schedule.
#[derive(Debug)]
pub struct QuizGame {
    pool: Vec<Question>,
    high_score: u32,
    // Best score handed to the player record but not yet confirmed.
    pending_high_score: u32,
    settings: RoundSettings,
    phase: GamePhase,
}

impl QuizGame {
    pub fn new(settings: RoundSettings) -> Self {
        Self {
            pool: Vec::new(),
            high_score: 0,
            pending_high_score: 0,
            settings,
            phase: GamePhase::Loading,
        }
    }

    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn load(&mut self, pool: Vec<Question>, high_score: u32) -> Result<&GamePhase, GameError> {
        let GamePhase::Loading = self.phase else {
            return Err(GameError::AlreadyLoaded);
        };

        self.high_score = high_score;
        self.phase = if pool.is_empty() {
            GamePhase::NoQuestions
        } else {
            GamePhase::Start
        };
        self.pool = pool;

        debug!("Quiz loaded with {} questions", self.pool.len());
        Ok(&self.phase)
    }

    /// Starts a fresh round from START or, as "play again", from RESULT.
    /// The pool is reused as loaded.
    pub fn begin_round<R>(&mut self, rng: &mut R) -> Result<(), GameError>
    where
        R: Rng + ?Sized,
    {
        match self.phase {
            GamePhase::Start | GamePhase::Result(_) => {}
            _ => return Err(GameError::CannotBegin),
        }

        let questions = sample_round(&self.pool, self.settings.round_size, rng);
        if questions.is_empty() {
            return Err(GameError::CannotBegin);
        }

        debug!("Round started with {} questions", questions.len());
        self.phase = GamePhase::Playing(RoundState::new(questions, self.settings.question_seconds));
        Ok(())
    }

    pub fn submit(&mut self, option: Option<String>) -> Result<AnswerOutcome, GameError> {
        let GamePhase::Playing(round) = &mut self.phase else {
            return Err(GameError::NotPlaying);
        };

        if round.locked {
            return Err(GameError::AnswerLocked);
        }

        Ok(round.resolve(option))
    }

    /// One second of the countdown. Reaching zero resolves the question
    /// with no answer.
    pub fn tick(&mut self) -> Result<TickOutcome, GameError> {
        let GamePhase::Playing(round) = &mut self.phase else {
            return Err(GameError::NotPlaying);
        };

        if round.locked {
            return Ok(TickOutcome::Ignored);
        }

        round.time_remaining = round.time_remaining.saturating_sub(1);
        if round.time_remaining > 0 {
            return Ok(TickOutcome::Counting(round.time_remaining));
        }

        debug!("Question {} timed out", round.current().id());
        Ok(TickOutcome::Expired(round.resolve(None)))
    }

    pub fn advance(&mut self) -> Result<AdvanceOutcome, GameError> {
        let GamePhase::Playing(round) = &mut self.phase else {
            return Err(GameError::NotPlaying);
        };

        if !round.locked {
            return Err(GameError::NotLocked);
        }

        if !round.is_last() {
            round.current_index += 1;
            round.time_remaining = self.settings.question_seconds;
            round.locked = false;
            round.selected_option = None;
            return Ok(AdvanceOutcome::NextQuestion(round.current_index));
        }

        let best = self.high_score.max(self.pending_high_score);
        let result = RoundResult {
            score: round.score,
            total_questions: round.questions.len(),
            high_score: self.high_score,
            new_high_score: round.score > best,
        };

        if result.new_high_score {
            self.pending_high_score = result.score;
        }

        self.phase = GamePhase::Result(result);
        Ok(AdvanceOutcome::Finished(result))
    }

    /// Forgets a pending score the player record refused, so a later round
    /// with the same or a lower score can try again.
    pub fn release_high_score(&mut self, score: u32) {
        if self.pending_high_score == score {
            self.pending_high_score = 0;
        }
    }

    /// Applied once the player record accepted the new score.
    pub fn record_high_score(&mut self, score: u32) {
        if score <= self.high_score {
            return;
        }

        self.high_score = score;
        if let GamePhase::Result(result) = &mut self.phase {
            result.high_score = result.high_score.max(score);
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        match &self.phase {
            GamePhase::Loading => GameSnapshot::Loading,
            GamePhase::NoQuestions => GameSnapshot::NoQuestions,
            GamePhase::Start => GameSnapshot::Start {
                pool_size: self.pool_size(),
                high_score: self.high_score(),
            },
            GamePhase::Playing(round) => {
                let question = round.current();
                GameSnapshot::Playing {
                    question_number: round.current_index() + 1,
                    total_questions: round.questions().len(),
                    question_id: question.id(),
                    text: question.text().to_string(),
                    options: question.options().to_vec(),
                    time_remaining: round.time_remaining(),
                    locked: round.locked(),
                    selected_option: round.selected_option().map(str::to_string),
                    correct_answer: round.locked().then(|| question.answer().to_string()),
                    score: round.score(),
                }
            }
            GamePhase::Result(result) => GameSnapshot::Result(*result),
        }
    }
}
