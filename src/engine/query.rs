use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::course::{Course, Lesson};
use crate::data::quiz::{Quiz, QuizSummary};
use crate::data::store::CatalogStore;
use crate::error::CoreError;

use super::Engine;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, ToSchema)]
pub enum LessonStatus {
    Completed,
    InProgress,
}

impl std::fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LessonStatus::Completed => write!(f, "Completed"),
            LessonStatus::InProgress => write!(f, "In Progress"),
        }
    }
}

/// Read projections. None of these mutate, and absent optional relations
/// come back empty instead of failing.
impl<S: CatalogStore> Engine<S> {
    pub async fn courses(&self) -> Result<Vec<Course>, CoreError> {
        Ok(self.store().list_courses().await?)
    }

    pub async fn course_details(&self, course_id: Uuid) -> Result<Option<Course>, CoreError> {
        Ok(self.store().get_course(course_id).await?)
    }

    pub async fn enrolled_courses(&self, user_id: Uuid) -> Result<Vec<Course>, CoreError> {
        let user = self.require_user(user_id).await?;
        self.resolve_courses(&user.enrolled_courses).await
    }

    /// Courses whose progress row is completed; derived by scanning the
    /// user's progress rows rather than a stored list.
    pub async fn completed_courses(&self, user_id: Uuid) -> Result<Vec<Course>, CoreError> {
        self.require_user(user_id).await?;

        let rows = self.store().find_progress_by_user(user_id).await?;
        let completed: Vec<Uuid> = rows
            .into_iter()
            .filter(|p| p.is_completed())
            .map(|p| p.course)
            .collect();

        self.resolve_courses(&completed).await
    }

    pub async fn recommended_courses(&self, user_id: Uuid) -> Result<Vec<Course>, CoreError> {
        let user = self.require_user(user_id).await?;
        self.resolve_courses(&user.recommended_courses).await
    }

    pub async fn course_lessons(&self, course_id: Uuid) -> Result<Vec<Lesson>, CoreError> {
        let course = self.require_course(course_id).await?;

        let mut lessons = Vec::with_capacity(course.lessons.len());
        for lesson_id in &course.lessons {
            if let Some(lesson) = self.store().get_lesson(*lesson_id).await? {
                lessons.push(lesson);
            }
        }
        Ok(lessons)
    }

    pub async fn lesson(&self, course_id: Uuid, lesson_id: Uuid) -> Result<Lesson, CoreError> {
        let course = self.require_course(course_id).await?;
        if !course.contains_lesson(lesson_id) {
            return Err(CoreError::not_found("lesson", lesson_id));
        }

        self.store()
            .get_lesson(lesson_id)
            .await?
            .ok_or_else(|| CoreError::not_found("lesson", lesson_id))
    }

    pub async fn intro_quiz(&self, course_id: Uuid) -> Result<Option<Quiz>, CoreError> {
        let course = self.require_course(course_id).await?;
        self.optional_quiz(course.intro_quiz).await
    }

    pub async fn final_quiz(&self, course_id: Uuid) -> Result<Option<Quiz>, CoreError> {
        let course = self.require_course(course_id).await?;
        self.optional_quiz(course.final_quiz).await
    }

    pub async fn lesson_quiz(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<Quiz>, CoreError> {
        let lesson = self.lesson(course_id, lesson_id).await?;
        self.optional_quiz(lesson.quiz).await
    }

    pub async fn completed_lessons(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<Lesson>, CoreError> {
        let progress = self.require_progress(user_id, course_id).await?;

        let mut lessons = Vec::with_capacity(progress.completed_lessons.len());
        for lesson_id in &progress.completed_lessons {
            if let Some(lesson) = self.store().get_lesson(*lesson_id).await? {
                lessons.push(lesson);
            }
        }
        Ok(lessons)
    }

    pub async fn lesson_status(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<LessonStatus, CoreError> {
        let progress = self.require_progress(user_id, course_id).await?;

        Ok(if progress.has_completed(lesson_id) {
            LessonStatus::Completed
        } else {
            LessonStatus::InProgress
        })
    }

    /// All of the user's graded attempts for one quiz, any slot.
    pub async fn quiz_results(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Vec<QuizSummary>, CoreError> {
        self.require_user(user_id).await?;
        Ok(self.store().find_summaries(user_id, quiz_id).await?)
    }

    async fn resolve_courses(&self, ids: &[Uuid]) -> Result<Vec<Course>, CoreError> {
        let mut courses = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(course) = self.store().get_course(*id).await? {
                courses.push(course);
            }
        }
        Ok(courses)
    }

    async fn optional_quiz(&self, id: Option<Uuid>) -> Result<Option<Quiz>, CoreError> {
        Ok(match id {
            Some(id) => self.store().get_quiz(id).await?,
            None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{course, engine, student};

    #[rocket::async_test]
    async fn course_lists_follow_progress_state() {
        let engine = engine();
        let user = student(&engine, "query_lists").await;
        let finished = course(&engine, "rust", 1).await;
        let ongoing = course(&engine, "go", 1).await;

        engine.enroll(user.id, finished.id).await.unwrap();
        engine.enroll(user.id, ongoing.id).await.unwrap();
        engine.complete_course(user.id, finished.id).await.unwrap();

        let enrolled = engine.enrolled_courses(user.id).await.unwrap();
        assert_eq!(enrolled.len(), 1);
        assert_eq!(enrolled[0].id, ongoing.id);

        let completed = engine.completed_courses(user.id).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, finished.id);
    }

    #[rocket::async_test]
    async fn dangling_enrolled_refs_are_skipped() {
        let engine = engine();
        let user = student(&engine, "dangler").await;
        let doomed = course(&engine, "rust", 0).await;

        engine.enroll(user.id, doomed.id).await.unwrap();
        // deleting the course cascades the progress row but leaves the
        // enrolled ref behind; reads must tolerate it
        engine.delete_course(doomed.id).await.unwrap();

        assert!(engine.enrolled_courses(user.id).await.unwrap().is_empty());
        assert!(engine.in_progress_courses(user.id).await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn missing_quiz_slots_read_as_none() {
        let engine = engine();
        let course = {
            use crate::data::course::db::CourseDraft;
            use crate::engine::testutil::lesson_draft;
            engine
                .create_course(CourseDraft {
                    name: "quizless".into(),
                    description: String::new(),
                    image_url: None,
                    lessons: vec![lesson_draft("plain", false)],
                    intro_quiz: None,
                    final_quiz: None,
                })
                .await
                .unwrap()
        };

        assert!(engine.intro_quiz(course.id).await.unwrap().is_none());
        assert!(engine.final_quiz(course.id).await.unwrap().is_none());
        assert!(engine
            .lesson_quiz(course.id, course.lessons[0])
            .await
            .unwrap()
            .is_none());
    }

    #[rocket::async_test]
    async fn lesson_status_tracks_completion() {
        let engine = engine();
        let user = student(&engine, "status").await;
        let course = course(&engine, "rust", 2).await;
        engine.enroll(user.id, course.id).await.unwrap();
        engine
            .mark_lesson_complete(user.id, course.id, course.lessons[0])
            .await
            .unwrap();

        let done = engine
            .lesson_status(user.id, course.id, course.lessons[0])
            .await
            .unwrap();
        let pending = engine
            .lesson_status(user.id, course.id, course.lessons[1])
            .await
            .unwrap();

        assert_eq!(done, LessonStatus::Completed);
        assert_eq!(pending, LessonStatus::InProgress);
        assert_eq!(done.to_string(), "Completed");
        assert_eq!(pending.to_string(), "In Progress");

        let completed = engine.completed_lessons(user.id, course.id).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, course.lessons[0]);
    }
}
