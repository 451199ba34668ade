use uuid::Uuid;

use super::course::{Course, Lesson};
use super::progress::Progress;
use super::quiz::{Quiz, QuizSummary};
use super::user::User;
use crate::error::StoreError;

/// Narrow persistence contract the engines are written against. Entities
/// arrive with their IDs already assigned; `save_*` upserts by ID.
///
/// Implemented for [`mongodb::Database`] in [`super::db`] and by the
/// in-memory [`MemoryCatalog`](super::memory::MemoryCatalog).
#[allow(async_fn_in_trait)]
pub trait CatalogStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_mail(&self, mail_id: &str) -> Result<Option<User>, StoreError>;
    async fn save_user(&self, user: &User) -> Result<(), StoreError>;

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;
    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, StoreError>;
    async fn save_course(&self, course: &Course) -> Result<(), StoreError>;
    async fn delete_course(&self, id: Uuid) -> Result<(), StoreError>;

    async fn get_lesson(&self, id: Uuid) -> Result<Option<Lesson>, StoreError>;
    async fn save_lesson(&self, lesson: &Lesson) -> Result<(), StoreError>;
    async fn delete_lesson(&self, id: Uuid) -> Result<(), StoreError>;

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, StoreError>;
    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StoreError>;
    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError>;

    async fn get_progress(&self, id: Uuid) -> Result<Option<Progress>, StoreError>;
    async fn save_progress(&self, progress: &Progress) -> Result<(), StoreError>;
    async fn find_progress(&self, user: Uuid, course: Uuid)
        -> Result<Option<Progress>, StoreError>;
    async fn find_progress_by_user(&self, user: Uuid) -> Result<Vec<Progress>, StoreError>;
    async fn delete_progress_by_course(&self, course: Uuid) -> Result<(), StoreError>;

    async fn get_summary(&self, id: Uuid) -> Result<Option<QuizSummary>, StoreError>;
    async fn save_summary(&self, summary: &QuizSummary) -> Result<(), StoreError>;
    async fn find_summaries(&self, user: Uuid, quiz: Uuid)
        -> Result<Vec<QuizSummary>, StoreError>;
}
