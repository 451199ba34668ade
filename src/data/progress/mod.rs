use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub static PROGRESS_COLLECTION_NAME: &str = "progress";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum ProgressStatus {
    Enrolled,
    InProgress,
    Completed,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        ProgressStatus::Enrolled
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Enrolled => write!(f, "Enrolled"),
            ProgressStatus::InProgress => write!(f, "In Progress"),
            ProgressStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Per-(user, course) enrollment record. One row per pair; status never
/// regresses out of `Completed` and the lesson set freezes with it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Progress {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    #[serde(with = "bson::serde_helpers::uuid_1_as_binary")]
    pub user: Uuid,
    #[serde(with = "bson::serde_helpers::uuid_1_as_binary")]
    pub course: Uuid,

    #[serde(default)]
    pub completed_lessons: Vec<Uuid>,
    #[serde(default)]
    pub status: ProgressStatus,
}

impl Progress {
    pub fn new(user: Uuid, course: Uuid) -> Progress {
        Progress {
            id: Uuid::new_v4(),
            user,
            course,
            completed_lessons: vec![],
            status: ProgressStatus::Enrolled,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }

    pub fn has_completed(&self, lesson: Uuid) -> bool {
        self.completed_lessons.contains(&lesson)
    }

    pub fn mark_in_progress(&mut self) {
        if self.status != ProgressStatus::Completed {
            self.status = ProgressStatus::InProgress;
        }
    }

    pub fn mark_completed(&mut self) {
        self.status = ProgressStatus::Completed;
    }

    /// Records a lesson as completed. Returns whether the row changed:
    /// duplicates and completed rows are no-ops. The first recorded lesson
    /// moves an `Enrolled` row to `InProgress`.
    pub fn record_lesson(&mut self, lesson: Uuid) -> bool {
        if self.is_completed() || self.has_completed(lesson) {
            return false;
        }

        self.completed_lessons.push(lesson);
        self.mark_in_progress();
        true
    }
}
