use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

pub static COURSE_COLLECTION_NAME: &str = "course";
pub static LESSON_COLLECTION_NAME: &str = "course.lessons";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel::Easy
    }
}

/// Aggregate root. Lessons and quizzes are referenced by ID and owned
/// exclusively; their lifecycle follows the course's.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Course {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub lessons: Vec<Uuid>,
    #[serde(default)]
    pub intro_quiz: Option<Uuid>,
    #[serde(default)]
    pub final_quiz: Option<Uuid>,
}

impl Course {
    pub fn contains_lesson(&self, lesson: Uuid) -> bool {
        self.lessons.contains(&lesson)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lesson {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    /// Owning course, by ID only.
    #[serde(with = "bson::serde_helpers::uuid_1_as_binary")]
    pub course: Uuid,

    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub difficulty: DifficultyLevel,

    #[serde(default)]
    pub quiz: Option<Uuid>,
}
