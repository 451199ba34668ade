use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub static QUIZ_COLLECTION_NAME: &str = "quiz";
pub static SUMMARY_COLLECTION_NAME: &str = "quiz.summaries";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionOption {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Question {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Quiz {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn question(&self, id: Uuid) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// One answer of a submitted attempt.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct AnswerSelection {
    pub question: Uuid,
    pub selected_option: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionSummary {
    pub question: Uuid,
    pub selected_option: usize,
    pub correct: bool,
}

/// Immutable record of one grading event. Never mutated after persistence;
/// repeat attempts append new records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizSummary {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    #[serde(with = "bson::serde_helpers::uuid_1_as_binary")]
    pub user: Uuid,
    #[serde(with = "bson::serde_helpers::uuid_1_as_binary")]
    pub quiz: Uuid,

    #[serde(default)]
    pub question_summaries: Vec<QuestionSummary>,
    /// Percentage in [0, 100].
    pub score: u8,

    #[serde(default = "Utc::now")]
    pub taken_on: DateTime<Utc>,
}

impl QuizSummary {
    pub fn new(user: Uuid, quiz: Uuid, question_summaries: Vec<QuestionSummary>, score: u8) -> Self {
        QuizSummary {
            id: Uuid::new_v4(),
            user,
            quiz,
            question_summaries,
            score,
            taken_on: Utc::now(),
        }
    }
}
