use std::collections::BTreeMap;

use rocket::{Build, Rocket, Route};
use uuid::Uuid;

pub mod course;
pub mod progress;
pub mod quiz;
pub mod users;

use course::*;
use progress::*;
use quiz::*;
use users::*;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    data::{course as cd, progress as pd, quiz as qd},
    data::user::db::{UserLoginData, UserPatch, UserSignupData},
    data::user::UserResponse,
    engine::query::LessonStatus,
    resp::jwt::doc::JWTAuth,
    resp::jwt::{auth_problem, UserRoleToken},
    resp::problem::Problem,
    role::Role,
};

/// Users may only act on their own records; admins on anyone's.
pub(crate) fn require_self_or_admin(auth: &UserRoleToken, user_id: Uuid) -> Result<(), Problem> {
    if auth.user != user_id && auth.role < Role::Admin {
        return Err(auth_problem("Not allowed to act for another user."));
    }
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        user_register,
        login_submit,
        user_get,
        user_update,
        enrolled_courses,
        completed_courses,
        in_progress_courses,
        recommended_courses,
        set_recommended_courses,
        quiz_results,
        course_list,
        course_create,
        course_info,
        course_update,
        course_delete,
        lesson_list,
        lesson_info,
        introductory_quiz,
        final_quiz,
        lesson_quiz,
        enroll,
        complete_course,
        complete_lesson,
        completion_percentage,
        completed_lessons,
        lesson_status,
        submit_introductory_attempt,
        submit_final_attempt,
        submit_lesson_attempt,
        introductory_summaries,
        final_summaries,
        lesson_summaries,
        introductory_summary,
        final_summary,
        lesson_summary
    ),
    components(schemas(
        Role,
        cd::Course,
        cd::Lesson,
        cd::DifficultyLevel,
        cd::db::CourseDraft,
        cd::db::CoursePatch,
        cd::db::LessonDraft,
        cd::db::LessonEntry,
        cd::db::QuizDraft,
        qd::Quiz,
        qd::Question,
        qd::QuestionOption,
        qd::AnswerSelection,
        qd::QuizSummary,
        qd::QuestionSummary,
        pd::Progress,
        pd::ProgressStatus,
        LessonStatus,
        UserResponse,
        UserSignupData,
        UserLoginData,
        UserPatch,
        Problem
    )),
    modifiers(&JWTAuth, &V1_PREFIX)
)]
pub struct ApiDocV1;

pub struct PathPrefix(pub &'static str);
static V1_PREFIX: PathPrefix = PathPrefix("/api/v1");

impl utoipa::Modify for PathPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut new_paths = BTreeMap::new();

        for (path, item) in std::mem::take(&mut openapi.paths.paths) {
            new_paths.insert(self.0.to_string() + path.as_ref(), item);
        }

        openapi.paths.paths = new_paths;
    }
}

pub fn api_v1() -> Vec<Route> {
    routes![
        user_register,
        login_submit,
        user_get,
        user_update,
        enrolled_courses,
        completed_courses,
        in_progress_courses,
        recommended_courses,
        set_recommended_courses,
        quiz_results,
        course_list,
        course_create,
        course_info,
        course_update,
        course_delete,
        lesson_list,
        lesson_info,
        introductory_quiz,
        final_quiz,
        lesson_quiz,
        enroll,
        complete_course,
        complete_lesson,
        completion_percentage,
        completed_lessons,
        lesson_status,
        submit_introductory_attempt,
        submit_final_attempt,
        submit_lesson_attempt,
        introductory_summaries,
        final_summaries,
        lesson_summaries,
        introductory_summary,
        final_summary,
        lesson_summary
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api/v1", api_v1()).mount(
        "/",
        SwaggerUi::new("/swagger/<_..>").url("/api/v1/openapi.json", ApiDocV1::openapi()),
    )
}
