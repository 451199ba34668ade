use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::DifficultyLevel;
use crate::data::quiz::{Question, Quiz};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuizDraft {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuizDraft {
    /// Materializes the draft under the given identity. Aggregate writers
    /// pick the ID so replacements can overwrite in place.
    pub fn into_quiz(self, id: Uuid) -> Quiz {
        Quiz {
            id,
            name: self.name,
            questions: self.questions,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LessonDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub quiz: Option<QuizDraft>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CourseDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonDraft>,
    #[serde(default)]
    pub intro_quiz: Option<QuizDraft>,
    #[serde(default)]
    pub final_quiz: Option<QuizDraft>,
}

/// One entry of an updated lesson list. An entry with an `id` keeps that
/// existing lesson (fields overwritten, identity retained); an entry
/// without one creates a new lesson.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LessonEntry {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub quiz: Option<QuizDraft>,
}

/// Partial course update. `lessons` is a full replacement list: existing
/// lessons missing from it are deleted together with their quizzes.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CoursePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub intro_quiz: Option<QuizDraft>,
    #[serde(default)]
    pub final_quiz: Option<QuizDraft>,
    #[serde(default)]
    pub lessons: Option<Vec<LessonEntry>>,
}
