use bson::doc;
use mongodb::options::{IndexOptions, ReplaceOptions};
use mongodb::{Database, IndexModel};
use rocket::futures::StreamExt;
use uuid::Uuid;

use super::course::{Course, Lesson, COURSE_COLLECTION_NAME, LESSON_COLLECTION_NAME};
use super::filter;
use super::progress::{Progress, PROGRESS_COLLECTION_NAME};
use super::quiz::{Quiz, QuizSummary, QUIZ_COLLECTION_NAME, SUMMARY_COLLECTION_NAME};
use super::store::CatalogStore;
use super::user::{User, USER_COLLECTION_NAME};
use crate::error::StoreError;

#[inline]
fn upsert() -> ReplaceOptions {
    ReplaceOptions::builder().upsert(true).build()
}

/// Creates the unique (user, course) index backing the one-progress-per-pair
/// invariant. Called once at startup.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let index = IndexModel::builder()
        .keys(doc! { "user": 1, "course": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    db.collection::<Progress>(PROGRESS_COLLECTION_NAME)
        .create_index(index, None)
        .await?;

    Ok(())
}

impl CatalogStore for Database {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(StoreError::from)
    }

    async fn find_user_by_mail(&self, mail_id: &str) -> Result<Option<User>, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .find_one(filter::by_mail(mail_id), None)
            .await
            .map_err(StoreError::from)
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.collection::<User>(USER_COLLECTION_NAME)
            .replace_one(filter::by_id(user.id), user, upsert())
            .await?;
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let mut cursor = self
            .collection::<Course>(COURSE_COLLECTION_NAME)
            .find(None, None)
            .await?;

        let mut courses = vec![];
        while let Some(course) = cursor.next().await {
            match course {
                Ok(course) => courses.push(course),
                Err(_) => tracing::warn!("Unable to deserialize Course document."),
            }
        }

        Ok(courses)
    }

    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        self.collection(COURSE_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(StoreError::from)
    }

    async fn save_course(&self, course: &Course) -> Result<(), StoreError> {
        self.collection::<Course>(COURSE_COLLECTION_NAME)
            .replace_one(filter::by_id(course.id), course, upsert())
            .await?;
        Ok(())
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), StoreError> {
        self.collection::<Course>(COURSE_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await?;
        Ok(())
    }

    async fn get_lesson(&self, id: Uuid) -> Result<Option<Lesson>, StoreError> {
        self.collection(LESSON_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(StoreError::from)
    }

    async fn save_lesson(&self, lesson: &Lesson) -> Result<(), StoreError> {
        self.collection::<Lesson>(LESSON_COLLECTION_NAME)
            .replace_one(filter::by_id(lesson.id), lesson, upsert())
            .await?;
        Ok(())
    }

    async fn delete_lesson(&self, id: Uuid) -> Result<(), StoreError> {
        self.collection::<Lesson>(LESSON_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await?;
        Ok(())
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, StoreError> {
        self.collection(QUIZ_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(StoreError::from)
    }

    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StoreError> {
        self.collection::<Quiz>(QUIZ_COLLECTION_NAME)
            .replace_one(filter::by_id(quiz.id), quiz, upsert())
            .await?;
        Ok(())
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError> {
        self.collection::<Quiz>(QUIZ_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await?;
        Ok(())
    }

    async fn get_progress(&self, id: Uuid) -> Result<Option<Progress>, StoreError> {
        self.collection(PROGRESS_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(StoreError::from)
    }

    async fn save_progress(&self, progress: &Progress) -> Result<(), StoreError> {
        self.collection::<Progress>(PROGRESS_COLLECTION_NAME)
            .replace_one(filter::by_id(progress.id), progress, upsert())
            .await?;
        Ok(())
    }

    async fn find_progress(
        &self,
        user: Uuid,
        course: Uuid,
    ) -> Result<Option<Progress>, StoreError> {
        self.collection(PROGRESS_COLLECTION_NAME)
            .find_one(filter::by_user_and_course(user, course), None)
            .await
            .map_err(StoreError::from)
    }

    async fn find_progress_by_user(&self, user: Uuid) -> Result<Vec<Progress>, StoreError> {
        let mut cursor = self
            .collection::<Progress>(PROGRESS_COLLECTION_NAME)
            .find(filter::by_user(user), None)
            .await?;

        let mut rows = vec![];
        while let Some(row) = cursor.next().await {
            match row {
                Ok(row) => rows.push(row),
                Err(_) => tracing::warn!("Unable to deserialize Progress document."),
            }
        }

        Ok(rows)
    }

    async fn delete_progress_by_course(&self, course: Uuid) -> Result<(), StoreError> {
        self.collection::<Progress>(PROGRESS_COLLECTION_NAME)
            .delete_many(filter::by_course(course), None)
            .await?;
        Ok(())
    }

    async fn get_summary(&self, id: Uuid) -> Result<Option<QuizSummary>, StoreError> {
        self.collection(SUMMARY_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(StoreError::from)
    }

    async fn save_summary(&self, summary: &QuizSummary) -> Result<(), StoreError> {
        self.collection::<QuizSummary>(SUMMARY_COLLECTION_NAME)
            .replace_one(filter::by_id(summary.id), summary, upsert())
            .await?;
        Ok(())
    }

    async fn find_summaries(
        &self,
        user: Uuid,
        quiz: Uuid,
    ) -> Result<Vec<QuizSummary>, StoreError> {
        let mut cursor = self
            .collection::<QuizSummary>(SUMMARY_COLLECTION_NAME)
            .find(filter::by_user_and_quiz(user, quiz), None)
            .await?;

        let mut summaries = vec![];
        while let Some(summary) = cursor.next().await {
            match summary {
                Ok(summary) => summaries.push(summary),
                Err(_) => tracing::warn!("Unable to deserialize QuizSummary document."),
            }
        }

        Ok(summaries)
    }
}
