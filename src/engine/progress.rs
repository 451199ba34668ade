use uuid::Uuid;

use crate::data::course::Course;
use crate::data::progress::{Progress, ProgressStatus};
use crate::data::store::CatalogStore;
use crate::error::CoreError;

use super::Engine;

impl<S: CatalogStore> Engine<S> {
    /// Enrolls a user in a course: creates the (user, course) progress row
    /// and adds the course to the user's enrolled set. A second enrollment
    /// for the same pair fails with [`CoreError::AlreadyEnrolled`].
    pub async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> Result<Progress, CoreError> {
        let _guard = self.locks.acquire(user_id, course_id).await;

        let mut user = self.require_user(user_id).await?;
        let course = self.require_course(course_id).await?;

        if self.store().find_progress(user_id, course_id).await?.is_some() {
            return Err(CoreError::AlreadyEnrolled {
                user: user_id,
                course: course_id,
            });
        }

        let progress = Progress::new(user_id, course_id);
        self.store().save_progress(&progress).await?;

        if user.enroll(course.id) {
            self.store().save_user(&user).await?;
        }

        tracing::debug!(user = %user_id, course = %course_id, "enrolled");
        Ok(progress)
    }

    /// Records a lesson as completed for the pair. The lesson must belong
    /// to the course; repeats and completed rows are unchanged successes.
    pub async fn mark_lesson_complete(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Progress, CoreError> {
        let _guard = self.locks.acquire(user_id, course_id).await;

        let course = self.require_course(course_id).await?;
        if !course.contains_lesson(lesson_id) {
            return Err(CoreError::not_found("lesson", lesson_id));
        }

        let mut progress = self.require_progress(user_id, course_id).await?;
        if progress.record_lesson(lesson_id) {
            self.store().save_progress(&progress).await?;
        }

        Ok(progress)
    }

    /// Percentage of the course's lessons the user has completed. A course
    /// without lessons counts as 0, not a division fault.
    pub async fn completion_percentage(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<f64, CoreError> {
        let course = self.require_course(course_id).await?;
        let progress = self.require_progress(user_id, course_id).await?;

        let total = course.lessons.len();
        if total == 0 {
            return Ok(0.0);
        }

        Ok(progress.completed_lessons.len() as f64 / total as f64 * 100.0)
    }

    /// Force-completes the course for the user and drops it from the
    /// enrolled set. Completed courses are derived from progress rows.
    pub async fn complete_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Progress, CoreError> {
        let _guard = self.locks.acquire(user_id, course_id).await;

        let mut user = self.require_user(user_id).await?;
        let mut progress = self.require_progress(user_id, course_id).await?;

        progress.mark_completed();
        self.store().save_progress(&progress).await?;

        if user.unenroll(course_id) {
            self.store().save_user(&user).await?;
        }

        tracing::debug!(user = %user_id, course = %course_id, "course completed");
        Ok(progress)
    }

    /// Enrolled courses whose progress is `InProgress`. Courses with a
    /// missing progress row or a dangling ref are excluded, not errors.
    pub async fn in_progress_courses(&self, user_id: Uuid) -> Result<Vec<Course>, CoreError> {
        let user = self.require_user(user_id).await?;

        let mut courses = vec![];
        for course_id in &user.enrolled_courses {
            let in_progress = self
                .store()
                .find_progress(user_id, *course_id)
                .await?
                .map(|p| p.status == ProgressStatus::InProgress)
                .unwrap_or(false);

            if !in_progress {
                continue;
            }
            if let Some(course) = self.store().get_course(*course_id).await? {
                courses.push(course);
            }
        }

        tracing::debug!(user = %user_id, count = courses.len(), "in-progress courses");
        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{course, engine, student};

    #[rocket::async_test]
    async fn enroll_creates_a_single_enrolled_row() {
        let engine = engine();
        let user = student(&engine, "enroll_once").await;
        let course = course(&engine, "rust", 2).await;

        let progress = engine.enroll(user.id, course.id).await.unwrap();
        assert_eq!(progress.status, ProgressStatus::Enrolled);
        assert!(progress.completed_lessons.is_empty());

        let stored = engine.store().get_user(user.id).await.unwrap().unwrap();
        assert!(stored.enrolled_courses.contains(&course.id));
        assert_eq!(engine.store().progress_count(), 1);
    }

    #[rocket::async_test]
    async fn double_enroll_is_a_conflict() {
        let engine = engine();
        let user = student(&engine, "enroll_twice").await;
        let course = course(&engine, "rust", 1).await;

        engine.enroll(user.id, course.id).await.unwrap();
        let err = engine.enroll(user.id, course.id).await.unwrap_err();

        assert!(matches!(err, CoreError::AlreadyEnrolled { .. }));
        assert_eq!(engine.store().progress_count(), 1, "no duplicate row");
    }

    #[rocket::async_test]
    async fn enrolling_in_missing_course_fails() {
        let engine = engine();
        let user = student(&engine, "no_course").await;

        let err = engine.enroll(user.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "course", .. }));
    }

    #[rocket::async_test]
    async fn first_lesson_completion_starts_progress() {
        let engine = engine();
        let user = student(&engine, "starter").await;
        let course = course(&engine, "rust", 3).await;
        engine.enroll(user.id, course.id).await.unwrap();

        let lesson = course.lessons[0];
        let progress = engine
            .mark_lesson_complete(user.id, course.id, lesson)
            .await
            .unwrap();

        assert_eq!(progress.status, ProgressStatus::InProgress);
        assert_eq!(progress.completed_lessons, vec![lesson]);

        // repeating is a no-op success
        let again = engine
            .mark_lesson_complete(user.id, course.id, lesson)
            .await
            .unwrap();
        assert_eq!(again.completed_lessons.len(), 1);
    }

    #[rocket::async_test]
    async fn foreign_lesson_is_rejected() {
        let engine = engine();
        let user = student(&engine, "foreign").await;
        let ours = course(&engine, "rust", 1).await;
        let theirs = course(&engine, "go", 1).await;
        engine.enroll(user.id, ours.id).await.unwrap();

        let err = engine
            .mark_lesson_complete(user.id, ours.id, theirs.lessons[0])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "lesson", .. }));
    }

    #[rocket::async_test]
    async fn percentage_counts_completed_lessons() {
        let engine = engine();
        let user = student(&engine, "halfway").await;
        let course = course(&engine, "rust", 4).await;
        engine.enroll(user.id, course.id).await.unwrap();

        engine
            .mark_lesson_complete(user.id, course.id, course.lessons[0])
            .await
            .unwrap();

        let pct = engine
            .completion_percentage(user.id, course.id)
            .await
            .unwrap();
        assert_eq!(pct, 25.0);
    }

    #[rocket::async_test]
    async fn percentage_of_lessonless_course_is_zero() {
        let engine = engine();
        let user = student(&engine, "empty").await;
        let course = course(&engine, "rust", 0).await;
        engine.enroll(user.id, course.id).await.unwrap();

        let pct = engine
            .completion_percentage(user.id, course.id)
            .await
            .unwrap();
        assert_eq!(pct, 0.0);
    }

    #[rocket::async_test]
    async fn complete_course_unenrolls_and_freezes() {
        let engine = engine();
        let user = student(&engine, "finisher").await;
        let course = course(&engine, "rust", 2).await;
        engine.enroll(user.id, course.id).await.unwrap();

        let progress = engine.complete_course(user.id, course.id).await.unwrap();
        assert!(progress.is_completed());

        let stored = engine.store().get_user(user.id).await.unwrap().unwrap();
        assert!(!stored.enrolled_courses.contains(&course.id));

        // frozen afterwards
        let after = engine
            .mark_lesson_complete(user.id, course.id, course.lessons[0])
            .await
            .unwrap();
        assert!(after.completed_lessons.is_empty());
    }

    #[rocket::async_test]
    async fn in_progress_courses_skip_missing_rows() {
        let engine = engine();
        let mut user = student(&engine, "lists").await;
        let started = course(&engine, "rust", 1).await;
        let untouched = course(&engine, "go", 1).await;

        engine.enroll(user.id, started.id).await.unwrap();
        engine.enroll(user.id, untouched.id).await.unwrap();
        engine
            .mark_lesson_complete(user.id, started.id, started.lessons[0])
            .await
            .unwrap();

        // enrolled ref without any progress row must not fail the query
        user = engine.store().get_user(user.id).await.unwrap().unwrap();
        user.enrolled_courses.push(Uuid::new_v4());
        engine.store().save_user(&user).await.unwrap();

        let listed = engine.in_progress_courses(user.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, started.id);
    }
}
