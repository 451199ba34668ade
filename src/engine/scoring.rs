use uuid::Uuid;

use crate::data::course::Course;
use crate::data::quiz::{AnswerSelection, QuestionSummary, Quiz, QuizSummary};
use crate::data::store::CatalogStore;
use crate::error::CoreError;

use super::Engine;

/// Score a final or lesson quiz attempt needs to advance progress state.
pub const COMPLETION_THRESHOLD: u8 = 80;

/// Which of a course's quiz slots an attempt targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizSlot {
    Introductory,
    Final,
    Lesson(Uuid),
}

/// Grades an attempt against a quiz. Pure: no store access, safe to run
/// concurrently for independent attempts.
pub fn grade(
    quiz: &Quiz,
    answers: &[AnswerSelection],
) -> Result<(Vec<QuestionSummary>, u8), CoreError> {
    if answers.is_empty() {
        return Err(CoreError::EmptyAttempt);
    }

    let mut summaries = Vec::with_capacity(answers.len());
    for answer in answers {
        let question = quiz
            .question(answer.question)
            .ok_or_else(|| CoreError::not_found("question", answer.question))?;

        let option = question.options.get(answer.selected_option).ok_or_else(|| {
            CoreError::OptionOutOfRange {
                question: question.id,
                selected: answer.selected_option,
                options: question.options.len(),
            }
        })?;

        summaries.push(QuestionSummary {
            question: question.id,
            selected_option: answer.selected_option,
            correct: option.correct,
        });
    }

    let correct = summaries.iter().filter(|s| s.correct).count();
    let score = (correct as f64 / summaries.len() as f64 * 100.0).round() as u8;

    Ok((summaries, score))
}

impl<S: CatalogStore> Engine<S> {
    async fn slot_quiz_id(&self, course: &Course, slot: QuizSlot) -> Result<Uuid, CoreError> {
        match slot {
            QuizSlot::Introductory => course
                .intro_quiz
                .ok_or_else(|| CoreError::not_found("introductory quiz", course.id)),
            QuizSlot::Final => course
                .final_quiz
                .ok_or_else(|| CoreError::not_found("final quiz", course.id)),
            QuizSlot::Lesson(lesson_id) => {
                if !course.contains_lesson(lesson_id) {
                    return Err(CoreError::not_found("lesson", lesson_id));
                }
                let lesson = self
                    .store()
                    .get_lesson(lesson_id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("lesson", lesson_id))?;
                lesson
                    .quiz
                    .ok_or_else(|| CoreError::not_found("lesson quiz", lesson_id))
            }
        }
    }

    /// Grades an attempt against the slot's quiz, persists the summary, and
    /// applies the slot's completion effect when the attempt passes:
    /// nothing for introductory quizzes, course completion for finals,
    /// lesson completion for lesson quizzes. Attempts are always
    /// re-gradable; each submission appends a new summary.
    pub async fn submit_attempt(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        slot: QuizSlot,
        answers: &[AnswerSelection],
    ) -> Result<QuizSummary, CoreError> {
        self.require_user(user_id).await?;
        let course = self.require_course(course_id).await?;

        let quiz_id = self.slot_quiz_id(&course, slot).await?;
        let quiz = self.require_quiz(quiz_id).await?;

        let (question_summaries, score) = grade(&quiz, answers)?;
        let summary = QuizSummary::new(user_id, quiz_id, question_summaries, score);
        self.store().save_summary(&summary).await?;

        tracing::debug!(user = %user_id, quiz = %quiz_id, score, "attempt graded");

        if score >= COMPLETION_THRESHOLD {
            match slot {
                QuizSlot::Introductory => {}
                QuizSlot::Final => {
                    let _guard = self.locks.acquire(user_id, course_id).await;

                    let mut user = self.require_user(user_id).await?;
                    let mut progress = self.require_progress(user_id, course_id).await?;

                    progress.mark_completed();
                    self.store().save_progress(&progress).await?;

                    if user.unenroll(course_id) {
                        self.store().save_user(&user).await?;
                    }
                }
                QuizSlot::Lesson(lesson_id) => {
                    let _guard = self.locks.acquire(user_id, course_id).await;

                    let mut progress = self.require_progress(user_id, course_id).await?;
                    if progress.record_lesson(lesson_id) {
                        self.store().save_progress(&progress).await?;
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Fetches one summary, verifying it belongs to both the user and the
    /// slot's quiz. Mismatches fail with the same `NotFound` as an absent
    /// row so summary existence never leaks across users.
    pub async fn attempt_summary(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        slot: QuizSlot,
        summary_id: Uuid,
    ) -> Result<QuizSummary, CoreError> {
        self.require_user(user_id).await?;
        let course = self.require_course(course_id).await?;
        let quiz_id = self.slot_quiz_id(&course, slot).await?;

        let summary = self
            .store()
            .get_summary(summary_id)
            .await?
            .ok_or_else(|| CoreError::not_found("quiz summary", summary_id))?;

        if summary.user != user_id || summary.quiz != quiz_id {
            return Err(CoreError::not_found("quiz summary", summary_id));
        }

        Ok(summary)
    }

    /// All of the user's summaries for the slot's quiz, oldest first.
    pub async fn attempt_summaries(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        slot: QuizSlot,
    ) -> Result<Vec<QuizSummary>, CoreError> {
        self.require_user(user_id).await?;
        let course = self.require_course(course_id).await?;
        let quiz_id = self.slot_quiz_id(&course, slot).await?;

        Ok(self.store().find_summaries(user_id, quiz_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::progress::ProgressStatus;
    use crate::engine::testutil::{answers, course, engine, quiz_draft, student};

    #[test]
    fn eight_of_ten_scores_eighty() {
        let quiz = quiz_draft("q", 10).into_quiz(Uuid::new_v4());
        let (summaries, score) = grade(&quiz, &answers(&quiz, 8)).unwrap();

        assert_eq!(score, 80);
        assert_eq!(summaries.iter().filter(|s| s.correct).count(), 8);
    }

    #[test]
    fn score_is_rounded() {
        let quiz = quiz_draft("q", 3).into_quiz(Uuid::new_v4());
        let (_, score) = grade(&quiz, &answers(&quiz, 2)).unwrap();

        // 2/3 → 66.66… rounds to 67
        assert_eq!(score, 67);
    }

    #[test]
    fn empty_attempt_is_invalid() {
        let quiz = quiz_draft("q", 3).into_quiz(Uuid::new_v4());
        assert!(matches!(grade(&quiz, &[]), Err(CoreError::EmptyAttempt)));
    }

    #[test]
    fn out_of_range_option_is_invalid() {
        let quiz = quiz_draft("q", 1).into_quiz(Uuid::new_v4());
        let bad = vec![AnswerSelection {
            question: quiz.questions[0].id,
            selected_option: 9,
        }];

        assert!(matches!(
            grade(&quiz, &bad),
            Err(CoreError::OptionOutOfRange { selected: 9, .. })
        ));
    }

    #[test]
    fn unknown_question_is_not_found() {
        let quiz = quiz_draft("q", 1).into_quiz(Uuid::new_v4());
        let bad = vec![AnswerSelection {
            question: Uuid::new_v4(),
            selected_option: 0,
        }];

        assert!(matches!(
            grade(&quiz, &bad),
            Err(CoreError::NotFound { kind: "question", .. })
        ));
    }

    #[rocket::async_test]
    async fn intro_attempt_never_touches_progress() {
        let engine = engine();
        let user = student(&engine, "intro").await;
        let course = course(&engine, "rust", 1).await;
        engine.enroll(user.id, course.id).await.unwrap();

        let quiz = engine.require_quiz(course.intro_quiz.unwrap()).await.unwrap();
        let summary = engine
            .submit_attempt(user.id, course.id, QuizSlot::Introductory, &answers(&quiz, 5))
            .await
            .unwrap();

        assert_eq!(summary.score, 100);
        let progress = engine.require_progress(user.id, course.id).await.unwrap();
        assert_eq!(progress.status, ProgressStatus::Enrolled);
    }

    #[rocket::async_test]
    async fn passing_final_completes_the_course() {
        let engine = engine();
        let user = student(&engine, "graduate").await;
        let course = course(&engine, "rust", 1).await;
        engine.enroll(user.id, course.id).await.unwrap();

        let quiz = engine.require_quiz(course.final_quiz.unwrap()).await.unwrap();
        let summary = engine
            .submit_attempt(user.id, course.id, QuizSlot::Final, &answers(&quiz, 4))
            .await
            .unwrap();

        assert_eq!(summary.score, 80);
        let progress = engine.require_progress(user.id, course.id).await.unwrap();
        assert!(progress.is_completed());

        let stored = engine.store().get_user(user.id).await.unwrap().unwrap();
        assert!(!stored.enrolled_courses.contains(&course.id));
    }

    #[rocket::async_test]
    async fn failing_final_leaves_progress_alone() {
        let engine = engine();
        let user = student(&engine, "retaker").await;
        let course = course(&engine, "rust", 1).await;
        engine.enroll(user.id, course.id).await.unwrap();

        let quiz = engine.require_quiz(course.final_quiz.unwrap()).await.unwrap();
        // 3/5 = 60, and even 79 must not complete: 5-question quiz can't
        // hit 79, so check the boundary below the threshold.
        let summary = engine
            .submit_attempt(user.id, course.id, QuizSlot::Final, &answers(&quiz, 3))
            .await
            .unwrap();

        assert_eq!(summary.score, 60);
        let progress = engine.require_progress(user.id, course.id).await.unwrap();
        assert_eq!(progress.status, ProgressStatus::Enrolled);

        let stored = engine.store().get_user(user.id).await.unwrap().unwrap();
        assert!(stored.enrolled_courses.contains(&course.id));
    }

    #[rocket::async_test]
    async fn passing_lesson_quiz_records_the_lesson() {
        let engine = engine();
        let user = student(&engine, "lesson_pass").await;
        let course = course(&engine, "rust", 2).await;
        engine.enroll(user.id, course.id).await.unwrap();

        let lesson_id = course.lessons[0];
        let lesson = engine.store().get_lesson(lesson_id).await.unwrap().unwrap();
        let quiz = engine.require_quiz(lesson.quiz.unwrap()).await.unwrap();

        engine
            .submit_attempt(user.id, course.id, QuizSlot::Lesson(lesson_id), &answers(&quiz, 2))
            .await
            .unwrap();

        let progress = engine.require_progress(user.id, course.id).await.unwrap();
        assert_eq!(progress.status, ProgressStatus::InProgress);
        assert!(progress.has_completed(lesson_id));

        // a repeat pass appends a summary without duplicating the lesson
        engine
            .submit_attempt(user.id, course.id, QuizSlot::Lesson(lesson_id), &answers(&quiz, 2))
            .await
            .unwrap();
        let progress = engine.require_progress(user.id, course.id).await.unwrap();
        assert_eq!(progress.completed_lessons.len(), 1);

        let summaries = engine
            .attempt_summaries(user.id, course.id, QuizSlot::Lesson(lesson_id))
            .await
            .unwrap();
        assert_eq!(summaries.len(), 2);
    }

    #[rocket::async_test]
    async fn failing_lesson_quiz_records_nothing() {
        let engine = engine();
        let user = student(&engine, "lesson_fail").await;
        let course = course(&engine, "rust", 1).await;
        engine.enroll(user.id, course.id).await.unwrap();

        let lesson_id = course.lessons[0];
        let lesson = engine.store().get_lesson(lesson_id).await.unwrap().unwrap();
        let quiz = engine.require_quiz(lesson.quiz.unwrap()).await.unwrap();

        engine
            .submit_attempt(user.id, course.id, QuizSlot::Lesson(lesson_id), &answers(&quiz, 1))
            .await
            .unwrap();

        let progress = engine.require_progress(user.id, course.id).await.unwrap();
        assert!(progress.completed_lessons.is_empty());
    }

    #[rocket::async_test]
    async fn summaries_are_scoped_to_their_owner() {
        let engine = engine();
        let owner = student(&engine, "owner").await;
        let other = student(&engine, "other").await;
        let course = course(&engine, "rust", 0).await;
        engine.enroll(owner.id, course.id).await.unwrap();
        engine.enroll(other.id, course.id).await.unwrap();

        let quiz = engine.require_quiz(course.intro_quiz.unwrap()).await.unwrap();
        let summary = engine
            .submit_attempt(owner.id, course.id, QuizSlot::Introductory, &answers(&quiz, 5))
            .await
            .unwrap();

        let fetched = engine
            .attempt_summary(owner.id, course.id, QuizSlot::Introductory, summary.id)
            .await
            .unwrap();
        assert_eq!(fetched.id, summary.id);

        let err = engine
            .attempt_summary(other.id, course.id, QuizSlot::Introductory, summary.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "quiz summary", .. }));

        // same owner, wrong slot: also invisible
        let err = engine
            .attempt_summary(owner.id, course.id, QuizSlot::Final, summary.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "quiz summary", .. }));
    }

    #[rocket::async_test]
    async fn attempt_against_missing_slot_fails() {
        let engine = engine();
        let user = student(&engine, "slotless").await;
        let course = {
            use crate::data::course::db::CourseDraft;
            let draft = CourseDraft {
                name: "bare".into(),
                description: String::new(),
                image_url: None,
                lessons: vec![],
                intro_quiz: None,
                final_quiz: None,
            };
            engine.create_course(draft).await.unwrap()
        };
        engine.enroll(user.id, course.id).await.unwrap();

        let err = engine
            .submit_attempt(user.id, course.id, QuizSlot::Final, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "final quiz", .. }));
    }
}
