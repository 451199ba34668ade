use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::course::db::{CourseDraft, CoursePatch};
use crate::data::course::{Course, Lesson};
use crate::data::quiz::Quiz;
use crate::engine::Engine;
use crate::resp::jwt::{auth_problem, UserRoleToken};
use crate::resp::problem::Problem;

#[inline]
fn require_course_manager(auth: &UserRoleToken) -> Result<(), Problem> {
    if !auth.role.can_manage_courses() {
        return Err(auth_problem("Permission level too low."));
    }
    Ok(())
}

/// List all courses
#[utoipa::path(
    responses(
        (status = 200, description = "List of courses", body = Vec<Course>),
    )
)]
#[get("/course")]
#[tracing::instrument(skip(engine))]
pub async fn course_list(
    engine: &State<Engine<Database>>,
    user: Option<UserRoleToken>,
) -> Result<Json<Vec<Course>>, Problem> {
    Ok(Json(engine.courses().await?))
}

/// Create a course with its lessons and quizzes
#[utoipa::path(request_body = CourseDraft, security(("jwt" = [])))]
#[post("/course", format = "application/json", data = "<draft>")]
#[tracing::instrument(skip(engine))]
pub async fn course_create(
    draft: Json<CourseDraft>,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Course>, Problem> {
    require_course_manager(&auth)?;
    Ok(Json(engine.create_course(draft.into_inner()).await?))
}

/// Get course information
#[utoipa::path(
    params(("id", description = "course ID")),
    responses(
        (status = 200, description = "Information about the course", body = Option<Course>),
        (status = 404, description = "Queried course doesn't exist"),
    )
)]
#[get("/course/<id>")]
#[tracing::instrument(skip(engine))]
pub async fn course_info(
    id: Uuid,
    engine: &State<Engine<Database>>,
) -> Result<Option<Json<Course>>, Problem> {
    Ok(engine.course_details(id).await?.map(Json))
}

/// Update course fields, quizzes and the lesson list
///
/// Lessons absent from a supplied lesson list are deleted together with
/// their quizzes.
#[utoipa::path(request_body = CoursePatch, security(("jwt" = [])))]
#[put("/course/<id>", format = "application/json", data = "<patch>")]
#[tracing::instrument(skip(engine))]
pub async fn course_update(
    id: Uuid,
    patch: Json<CoursePatch>,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Course>, Problem> {
    require_course_manager(&auth)?;
    Ok(Json(engine.update_course(id, patch.into_inner()).await?))
}

/// Delete a course and everything it owns
#[utoipa::path(
    params(("id", description = "course ID")),
    responses(
        (status = 200, description = "Deleted course ID"),
        (status = 401, description = "Missing/expired token or insufficient privileges", body = Problem),
        (status = 404, description = "Queried course doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/course/<id>")]
#[tracing::instrument(skip(engine))]
pub async fn course_delete(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<String, Problem> {
    require_course_manager(&auth)?;
    engine.delete_course(id).await?;
    Ok(id.to_string())
}

/// List a course's lessons
#[utoipa::path(
    responses((status = 200, description = "The course's lessons, in order", body = Vec<Lesson>))
)]
#[get("/course/<id>/lessons")]
#[tracing::instrument(skip(engine))]
pub async fn lesson_list(
    id: Uuid,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<Lesson>>, Problem> {
    Ok(Json(engine.course_lessons(id).await?))
}

/// Get one of a course's lessons
#[utoipa::path(
    responses(
        (status = 200, description = "The lesson", body = Lesson),
        (status = 404, description = "Lesson doesn't belong to the course", body = Problem),
    )
)]
#[get("/course/<id>/lesson/<lesson_id>")]
#[tracing::instrument(skip(engine))]
pub async fn lesson_info(
    id: Uuid,
    lesson_id: Uuid,
    engine: &State<Engine<Database>>,
) -> Result<Json<Lesson>, Problem> {
    Ok(Json(engine.lesson(id, lesson_id).await?))
}

/// Get a course's introductory quiz, if it has one
#[utoipa::path(
    responses((status = 200, description = "The quiz, or null", body = Option<Quiz>))
)]
#[get("/course/<id>/quiz/introductory")]
#[tracing::instrument(skip(engine))]
pub async fn introductory_quiz(
    id: Uuid,
    engine: &State<Engine<Database>>,
) -> Result<Json<Option<Quiz>>, Problem> {
    Ok(Json(engine.intro_quiz(id).await?))
}

/// Get a course's final quiz, if it has one
#[utoipa::path(
    responses((status = 200, description = "The quiz, or null", body = Option<Quiz>))
)]
#[get("/course/<id>/quiz/final")]
#[tracing::instrument(skip(engine))]
pub async fn final_quiz(
    id: Uuid,
    engine: &State<Engine<Database>>,
) -> Result<Json<Option<Quiz>>, Problem> {
    Ok(Json(engine.final_quiz(id).await?))
}

/// Get a lesson's quiz, if it has one
#[utoipa::path(
    responses((status = 200, description = "The quiz, or null", body = Option<Quiz>))
)]
#[get("/course/<id>/lesson/<lesson_id>/quiz")]
#[tracing::instrument(skip(engine))]
pub async fn lesson_quiz(
    id: Uuid,
    lesson_id: Uuid,
    engine: &State<Engine<Database>>,
) -> Result<Json<Option<Quiz>>, Problem> {
    Ok(Json(engine.lesson_quiz(id, lesson_id).await?))
}
