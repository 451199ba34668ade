use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use super::course::{Course, Lesson};
use super::progress::Progress;
use super::quiz::{Quiz, QuizSummary};
use super::store::CatalogStore;
use super::user::User;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Shelves {
    users: HashMap<Uuid, User>,
    courses: HashMap<Uuid, Course>,
    lessons: HashMap<Uuid, Lesson>,
    quizzes: HashMap<Uuid, Quiz>,
    progress: HashMap<Uuid, Progress>,
    summaries: HashMap<Uuid, QuizSummary>,
}

/// Process-local [`CatalogStore`]. Backs the engine tests and ephemeral
/// deployments that don't want a database.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    shelves: Mutex<Shelves>,
}

impl MemoryCatalog {
    pub fn new() -> MemoryCatalog {
        MemoryCatalog::default()
    }

    fn with<T>(&self, read: impl FnOnce(&mut Shelves) -> T) -> T {
        let mut shelves = self.shelves.lock().expect("memory catalog poisoned");
        read(&mut shelves)
    }

    pub fn lesson_count(&self) -> usize {
        self.with(|s| s.lessons.len())
    }

    pub fn quiz_count(&self) -> usize {
        self.with(|s| s.quizzes.len())
    }

    pub fn progress_count(&self) -> usize {
        self.with(|s| s.progress.len())
    }
}

impl CatalogStore for MemoryCatalog {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.with(|s| s.users.get(&id).cloned()))
    }

    async fn find_user_by_mail(&self, mail_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.with(|s| s.users.values().find(|u| u.mail_id == mail_id).cloned()))
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.with(|s| s.users.insert(user.id, user.clone()));
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.with(|s| s.courses.values().cloned().collect()))
    }

    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        Ok(self.with(|s| s.courses.get(&id).cloned()))
    }

    async fn save_course(&self, course: &Course) -> Result<(), StoreError> {
        self.with(|s| s.courses.insert(course.id, course.clone()));
        Ok(())
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), StoreError> {
        self.with(|s| s.courses.remove(&id));
        Ok(())
    }

    async fn get_lesson(&self, id: Uuid) -> Result<Option<Lesson>, StoreError> {
        Ok(self.with(|s| s.lessons.get(&id).cloned()))
    }

    async fn save_lesson(&self, lesson: &Lesson) -> Result<(), StoreError> {
        self.with(|s| s.lessons.insert(lesson.id, lesson.clone()));
        Ok(())
    }

    async fn delete_lesson(&self, id: Uuid) -> Result<(), StoreError> {
        self.with(|s| s.lessons.remove(&id));
        Ok(())
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, StoreError> {
        Ok(self.with(|s| s.quizzes.get(&id).cloned()))
    }

    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StoreError> {
        self.with(|s| s.quizzes.insert(quiz.id, quiz.clone()));
        Ok(())
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError> {
        self.with(|s| s.quizzes.remove(&id));
        Ok(())
    }

    async fn get_progress(&self, id: Uuid) -> Result<Option<Progress>, StoreError> {
        Ok(self.with(|s| s.progress.get(&id).cloned()))
    }

    async fn save_progress(&self, progress: &Progress) -> Result<(), StoreError> {
        self.with(|s| s.progress.insert(progress.id, progress.clone()));
        Ok(())
    }

    async fn find_progress(
        &self,
        user: Uuid,
        course: Uuid,
    ) -> Result<Option<Progress>, StoreError> {
        Ok(self.with(|s| {
            s.progress
                .values()
                .find(|p| p.user == user && p.course == course)
                .cloned()
        }))
    }

    async fn find_progress_by_user(&self, user: Uuid) -> Result<Vec<Progress>, StoreError> {
        Ok(self.with(|s| {
            s.progress
                .values()
                .filter(|p| p.user == user)
                .cloned()
                .collect()
        }))
    }

    async fn delete_progress_by_course(&self, course: Uuid) -> Result<(), StoreError> {
        self.with(|s| s.progress.retain(|_, p| p.course != course));
        Ok(())
    }

    async fn get_summary(&self, id: Uuid) -> Result<Option<QuizSummary>, StoreError> {
        Ok(self.with(|s| s.summaries.get(&id).cloned()))
    }

    async fn save_summary(&self, summary: &QuizSummary) -> Result<(), StoreError> {
        self.with(|s| s.summaries.insert(summary.id, summary.clone()));
        Ok(())
    }

    async fn find_summaries(
        &self,
        user: Uuid,
        quiz: Uuid,
    ) -> Result<Vec<QuizSummary>, StoreError> {
        Ok(self.with(|s| {
            let mut summaries: Vec<QuizSummary> = s
                .summaries
                .values()
                .filter(|r| r.user == user && r.quiz == quiz)
                .cloned()
                .collect();
            summaries.sort_by_key(|r| r.taken_on);
            summaries
        }))
    }
}
