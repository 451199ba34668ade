use uuid::Uuid;

use crate::data::course::db::{CourseDraft, CoursePatch, LessonDraft, QuizDraft};
use crate::data::course::{Course, Lesson};
use crate::data::store::CatalogStore;
use crate::error::CoreError;

use super::Engine;

/// A child row created while writing an aggregate, so a failed write can be
/// compensated by deleting what was already persisted.
enum Written {
    Quiz(Uuid),
    Lesson(Uuid),
}

impl<S: CatalogStore> Engine<S> {
    /// Persists a new course aggregate: quizzes first, then lessons, then
    /// the course row, so every child has its identity before the parent
    /// references it. Any child-write failure rolls the created rows back.
    pub async fn create_course(&self, draft: CourseDraft) -> Result<Course, CoreError> {
        let mut created = vec![];
        match self.write_course_tree(draft, &mut created).await {
            Ok(course) => {
                tracing::info!(course = %course.id, "course created");
                Ok(course)
            }
            Err(e) => {
                self.undo_writes(&created).await;
                Err(e)
            }
        }
    }

    /// Applies a partial update. Name, description and image change only
    /// when supplied non-empty. A supplied quiz overwrites the slot's
    /// existing quiz in place, keeping its identity. A supplied lesson
    /// list is a destructive reconciliation: existing lessons absent from
    /// it are deleted together with their quizzes; entries carrying an ID
    /// keep it, entries without one become new lessons.
    pub async fn update_course(
        &self,
        course_id: Uuid,
        patch: CoursePatch,
    ) -> Result<Course, CoreError> {
        let mut course = self.require_course(course_id).await?;

        let mut created = vec![];
        let removed = match self.apply_course_patch(&mut course, patch, &mut created).await {
            Ok(removed) => removed,
            Err(e) => {
                self.undo_writes(&created).await;
                return Err(e);
            }
        };

        // Destructive removals only after every save has succeeded.
        for lesson_id in removed {
            self.remove_lesson(lesson_id).await?;
        }

        tracing::info!(course = %course.id, "course updated");
        Ok(course)
    }

    /// Deletes the aggregate: intro/final quizzes, then each lesson and
    /// its quiz, then the course's progress rows, then the course itself.
    /// The course row goes last so no surviving child references a
    /// deleted course.
    pub async fn delete_course(&self, course_id: Uuid) -> Result<(), CoreError> {
        let course = self.require_course(course_id).await?;

        if let Some(quiz) = course.intro_quiz {
            self.store().delete_quiz(quiz).await?;
        }
        if let Some(quiz) = course.final_quiz {
            self.store().delete_quiz(quiz).await?;
        }

        for lesson_id in &course.lessons {
            self.remove_lesson(*lesson_id).await?;
        }

        self.store().delete_progress_by_course(course_id).await?;
        self.store().delete_course(course_id).await?;

        tracing::info!(course = %course_id, "course deleted");
        Ok(())
    }

    async fn write_course_tree(
        &self,
        draft: CourseDraft,
        created: &mut Vec<Written>,
    ) -> Result<Course, CoreError> {
        let course_id = Uuid::new_v4();

        let mut intro_quiz = None;
        if let Some(quiz) = draft.intro_quiz {
            intro_quiz = Some(self.write_quiz(quiz, Uuid::new_v4(), created).await?);
        }
        let mut final_quiz = None;
        if let Some(quiz) = draft.final_quiz {
            final_quiz = Some(self.write_quiz(quiz, Uuid::new_v4(), created).await?);
        }

        let mut lessons = Vec::with_capacity(draft.lessons.len());
        for lesson in draft.lessons {
            lessons.push(self.write_lesson(course_id, lesson, created).await?);
        }

        let course = Course {
            id: course_id,
            name: draft.name,
            description: draft.description,
            image_url: draft.image_url,
            lessons,
            intro_quiz,
            final_quiz,
        };
        self.store().save_course(&course).await?;

        Ok(course)
    }

    async fn write_quiz(
        &self,
        draft: QuizDraft,
        id: Uuid,
        created: &mut Vec<Written>,
    ) -> Result<Uuid, CoreError> {
        self.store().save_quiz(&draft.into_quiz(id)).await?;
        created.push(Written::Quiz(id));
        Ok(id)
    }

    async fn write_lesson(
        &self,
        course_id: Uuid,
        draft: LessonDraft,
        created: &mut Vec<Written>,
    ) -> Result<Uuid, CoreError> {
        let mut quiz = None;
        if let Some(quiz_draft) = draft.quiz {
            quiz = Some(self.write_quiz(quiz_draft, Uuid::new_v4(), created).await?);
        }

        let lesson = Lesson {
            id: Uuid::new_v4(),
            course: course_id,
            name: draft.name,
            description: draft.description,
            video_url: draft.video_url,
            difficulty: draft.difficulty,
            quiz,
        };
        self.store().save_lesson(&lesson).await?;
        created.push(Written::Lesson(lesson.id));

        Ok(lesson.id)
    }

    async fn apply_course_patch(
        &self,
        course: &mut Course,
        patch: CoursePatch,
        created: &mut Vec<Written>,
    ) -> Result<Vec<Uuid>, CoreError> {
        if let Some(name) = patch.name {
            if !name.is_empty() {
                course.name = name;
            }
        }
        if let Some(description) = patch.description {
            if !description.is_empty() {
                course.description = description;
            }
        }
        if let Some(image_url) = patch.image_url {
            if !image_url.is_empty() {
                course.image_url = Some(image_url);
            }
        }

        if let Some(draft) = patch.intro_quiz {
            let fresh = course.intro_quiz.is_none();
            let id = course.intro_quiz.unwrap_or_else(Uuid::new_v4);
            self.store().save_quiz(&draft.into_quiz(id)).await?;
            if fresh {
                created.push(Written::Quiz(id));
            }
            course.intro_quiz = Some(id);
        }
        if let Some(draft) = patch.final_quiz {
            let fresh = course.final_quiz.is_none();
            let id = course.final_quiz.unwrap_or_else(Uuid::new_v4);
            self.store().save_quiz(&draft.into_quiz(id)).await?;
            if fresh {
                created.push(Written::Quiz(id));
            }
            course.final_quiz = Some(id);
        }

        let mut removed = vec![];
        if let Some(specs) = patch.lessons {
            let existing = course.lessons.clone();
            let mut replacement = Vec::with_capacity(specs.len());

            for spec in specs {
                match spec.id {
                    Some(id) => {
                        if !existing.contains(&id) {
                            return Err(CoreError::not_found("lesson", id));
                        }
                        let mut lesson = self
                            .store()
                            .get_lesson(id)
                            .await?
                            .ok_or_else(|| CoreError::not_found("lesson", id))?;

                        lesson.name = spec.name;
                        lesson.description = spec.description;
                        lesson.video_url = spec.video_url;
                        lesson.difficulty = spec.difficulty;

                        if let Some(quiz_draft) = spec.quiz {
                            let fresh = lesson.quiz.is_none();
                            let quiz_id = lesson.quiz.unwrap_or_else(Uuid::new_v4);
                            self.store().save_quiz(&quiz_draft.into_quiz(quiz_id)).await?;
                            if fresh {
                                created.push(Written::Quiz(quiz_id));
                            }
                            lesson.quiz = Some(quiz_id);
                        }

                        self.store().save_lesson(&lesson).await?;
                        replacement.push(id);
                    }
                    None => {
                        let draft = LessonDraft {
                            name: spec.name,
                            description: spec.description,
                            video_url: spec.video_url,
                            difficulty: spec.difficulty,
                            quiz: spec.quiz,
                        };
                        replacement.push(self.write_lesson(course.id, draft, created).await?);
                    }
                }
            }

            removed = existing
                .into_iter()
                .filter(|id| !replacement.contains(id))
                .collect();
            course.lessons = replacement;
        }

        self.store().save_course(course).await?;
        Ok(removed)
    }

    async fn remove_lesson(&self, lesson_id: Uuid) -> Result<(), CoreError> {
        if let Some(lesson) = self.store().get_lesson(lesson_id).await? {
            if let Some(quiz) = lesson.quiz {
                self.store().delete_quiz(quiz).await?;
            }
            self.store().delete_lesson(lesson_id).await?;
        }
        Ok(())
    }

    async fn undo_writes(&self, created: &[Written]) {
        for write in created {
            let result = match write {
                Written::Quiz(id) => self.store().delete_quiz(*id).await,
                Written::Lesson(id) => self.store().delete_lesson(*id).await,
            };
            if result.is_err() {
                tracing::warn!("Unable to roll back a partially written course aggregate.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::course::db::LessonEntry;
    use crate::engine::testutil::{course, engine, lesson_draft, quiz_draft, student};

    #[rocket::async_test]
    async fn create_persists_children_before_parent_references_them() {
        let engine = engine();
        let course = course(&engine, "rust", 3).await;

        assert_eq!(course.lessons.len(), 3);
        assert_eq!(engine.store().lesson_count(), 3);
        // intro + final + one per lesson
        assert_eq!(engine.store().quiz_count(), 5);

        for lesson_id in &course.lessons {
            let lesson = engine.store().get_lesson(*lesson_id).await.unwrap().unwrap();
            assert_eq!(lesson.course, course.id);
            let quiz_id = lesson.quiz.unwrap();
            assert!(engine.store().get_quiz(quiz_id).await.unwrap().is_some());
        }
    }

    #[rocket::async_test]
    async fn delete_leaves_no_orphans() {
        let engine = engine();
        let user = student(&engine, "orphan_check").await;
        let course = course(&engine, "rust", 3).await;
        engine.enroll(user.id, course.id).await.unwrap();

        engine.delete_course(course.id).await.unwrap();

        assert!(engine.store().get_course(course.id).await.unwrap().is_none());
        assert_eq!(engine.store().lesson_count(), 0);
        assert_eq!(engine.store().quiz_count(), 0);
        assert_eq!(engine.store().progress_count(), 0);
    }

    #[rocket::async_test]
    async fn delete_of_missing_course_fails() {
        let engine = engine();
        let err = engine.delete_course(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "course", .. }));
    }

    #[rocket::async_test]
    async fn update_applies_non_empty_fields_only() {
        let engine = engine();
        let course = course(&engine, "rust", 1).await;

        let updated = engine
            .update_course(
                course.id,
                CoursePatch {
                    name: Some(String::new()),
                    description: Some("rewritten".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "rust", "empty name ignored");
        assert_eq!(updated.description, "rewritten");
    }

    #[rocket::async_test]
    async fn update_overwrites_quiz_in_place() {
        let engine = engine();
        let course = course(&engine, "rust", 0).await;
        let old_quiz_id = course.intro_quiz.unwrap();

        let updated = engine
            .update_course(
                course.id,
                CoursePatch {
                    intro_quiz: Some(quiz_draft("fresh intro", 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.intro_quiz, Some(old_quiz_id), "identity reused");
        let quiz = engine.store().get_quiz(old_quiz_id).await.unwrap().unwrap();
        assert_eq!(quiz.name, "fresh intro");
        assert_eq!(quiz.questions.len(), 2);
    }

    #[rocket::async_test]
    async fn lesson_list_replacement_is_a_set_difference() {
        let engine = engine();
        let course = course(&engine, "rust", 3).await;
        let kept = course.lessons[1];
        let quizzes_before = engine.store().quiz_count();

        let updated = engine
            .update_course(
                course.id,
                CoursePatch {
                    lessons: Some(vec![
                        LessonEntry {
                            id: Some(kept),
                            name: "kept, renamed".into(),
                            description: String::new(),
                            video_url: None,
                            difficulty: Default::default(),
                            quiz: None,
                        },
                        LessonEntry {
                            id: None,
                            name: "brand new".into(),
                            description: String::new(),
                            video_url: None,
                            difficulty: Default::default(),
                            quiz: Some(quiz_draft("new lesson quiz", 1)),
                        },
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.lessons.len(), 2);
        assert_eq!(updated.lessons[0], kept, "retained lesson keeps its ID");

        let renamed = engine.store().get_lesson(kept).await.unwrap().unwrap();
        assert_eq!(renamed.name, "kept, renamed");
        assert!(renamed.quiz.is_some(), "absent quiz field leaves quiz alone");

        // two lessons dropped with their quizzes, one new lesson quiz added
        assert_eq!(engine.store().lesson_count(), 2);
        assert_eq!(engine.store().quiz_count(), quizzes_before - 2 + 1);

        for dropped in course.lessons.iter().filter(|id| **id != kept) {
            assert!(engine.store().get_lesson(*dropped).await.unwrap().is_none());
        }
    }

    #[rocket::async_test]
    async fn unknown_lesson_id_in_update_is_rejected() {
        let engine = engine();
        let course = course(&engine, "rust", 1).await;

        let err = engine
            .update_course(
                course.id,
                CoursePatch {
                    lessons: Some(vec![LessonEntry {
                        id: Some(Uuid::new_v4()),
                        name: "imposter".into(),
                        description: String::new(),
                        video_url: None,
                        difficulty: Default::default(),
                        quiz: None,
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound { kind: "lesson", .. }));

        let unchanged = engine.store().get_course(course.id).await.unwrap().unwrap();
        assert_eq!(unchanged.lessons, course.lessons);
    }

    #[rocket::async_test]
    async fn draft_helpers_cover_unquizzed_lessons() {
        let engine = engine();
        let draft = CourseDraft {
            name: "plain".into(),
            description: String::new(),
            image_url: None,
            lessons: vec![lesson_draft("reading", false)],
            intro_quiz: None,
            final_quiz: None,
        };

        let course = engine.create_course(draft).await.unwrap();
        let lesson = engine
            .store()
            .get_lesson(course.lessons[0])
            .await
            .unwrap()
            .unwrap();
        assert!(lesson.quiz.is_none());
        assert_eq!(engine.store().quiz_count(), 0);
    }
}
