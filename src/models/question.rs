use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::{Validate, ValidationError};

/// Question as the pool service returns it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_correct_answer"))]
pub struct QuestionDto {
    pub id: i64,
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: String,
    #[validate(length(min = 2, max = 4, message = "A question needs between 2 and 4 options"))]
    pub options: Vec<String>,
    pub correct_answer: String,
}

fn validate_correct_answer(dto: &QuestionDto) -> Result<(), ValidationError> {
    if dto.options.iter().any(|o| o == &dto.correct_answer) {
        return Ok(());
    }

    Err(ValidationError::new("correct_answer_missing")
        .with_message("Correct answer must be one of the options".into()))
}

/// A validated question. Only built through `TryFrom<QuestionDto>`, so the
/// correct answer is always one of the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: i64,
    text: String,
    options: Vec<String>,
    answer: String,
}

impl Question {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn is_correct(&self, option: Option<&str>) -> bool {
        option == Some(self.answer.as_str())
    }

    pub(crate) fn options_mut(&mut self) -> &mut Vec<String> {
        &mut self.options
    }
}

impl TryFrom<QuestionDto> for Question {
    type Error = validator::ValidationErrors;

    fn try_from(dto: QuestionDto) -> Result<Self, Self::Error> {
        dto.validate()?;

        Ok(Self {
            id: dto.id,
            text: dto.question_text,
            options: dto.options,
            answer: dto.correct_answer,
        })
    }
}

/// Maps wire questions into the pool, dropping the ones that break the
/// option invariants.
pub fn into_pool(dtos: Vec<QuestionDto>) -> Vec<Question> {
    dtos.into_iter()
        .filter_map(|dto| {
            let id = dto.id;
            match Question::try_from(dto) {
                Ok(question) => Some(question),
                Err(e) => {
                    warn!("Dropping invalid question {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}
