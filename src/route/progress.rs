use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::course::Lesson;
use crate::data::progress::Progress;
use crate::engine::query::LessonStatus;
use crate::engine::Engine;
use crate::resp::jwt::UserRoleToken;
use crate::resp::problem::Problem;

/// Enroll the authenticated user in a course
#[utoipa::path(
    params(("id", description = "course ID")),
    responses(
        (status = 200, description = "Created progress row", body = Progress),
        (status = 404, description = "Course doesn't exist", body = Problem),
        (status = 409, description = "Already enrolled", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/course/<id>/enroll")]
#[tracing::instrument(skip(engine))]
pub async fn enroll(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Progress>, Problem> {
    Ok(Json(engine.enroll(auth.user, id).await?))
}

/// Force-complete a course for the authenticated user
#[utoipa::path(
    params(("id", description = "course ID")),
    responses((status = 200, description = "Completed progress row", body = Progress)),
    security(("jwt" = []))
)]
#[post("/course/<id>/complete")]
#[tracing::instrument(skip(engine))]
pub async fn complete_course(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Progress>, Problem> {
    Ok(Json(engine.complete_course(auth.user, id).await?))
}

/// Record a lesson as completed for the authenticated user
#[utoipa::path(
    params(("id", description = "course ID"), ("lesson_id", description = "lesson ID")),
    responses((status = 200, description = "Updated progress row", body = Progress)),
    security(("jwt" = []))
)]
#[post("/course/<id>/lesson/<lesson_id>/complete")]
#[tracing::instrument(skip(engine))]
pub async fn complete_lesson(
    id: Uuid,
    lesson_id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Progress>, Problem> {
    Ok(Json(engine.mark_lesson_complete(auth.user, id, lesson_id).await?))
}

/// Completion percentage of a course for the authenticated user
#[utoipa::path(
    params(("id", description = "course ID")),
    responses((status = 200, description = "Percentage in [0, 100]", body = f64)),
    security(("jwt" = []))
)]
#[get("/course/<id>/completion")]
#[tracing::instrument(skip(engine))]
pub async fn completion_percentage(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<f64>, Problem> {
    Ok(Json(engine.completion_percentage(auth.user, id).await?))
}

/// Lessons the authenticated user has completed in a course
#[utoipa::path(
    params(("id", description = "course ID")),
    responses((status = 200, description = "Completed lessons", body = Vec<Lesson>)),
    security(("jwt" = []))
)]
#[get("/course/<id>/lessons/completed")]
#[tracing::instrument(skip(engine))]
pub async fn completed_lessons(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<Lesson>>, Problem> {
    Ok(Json(engine.completed_lessons(auth.user, id).await?))
}

/// Whether the authenticated user has completed a lesson
#[utoipa::path(
    params(("id", description = "course ID"), ("lesson_id", description = "lesson ID")),
    responses((status = 200, description = "Lesson status", body = LessonStatus)),
    security(("jwt" = []))
)]
#[get("/course/<id>/lesson/<lesson_id>/status")]
#[tracing::instrument(skip(engine))]
pub async fn lesson_status(
    id: Uuid,
    lesson_id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<LessonStatus>, Problem> {
    Ok(Json(engine.lesson_status(auth.user, id, lesson_id).await?))
}
