use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::quiz::{AnswerSelection, QuizSummary};
use crate::engine::scoring::QuizSlot;
use crate::engine::Engine;
use crate::resp::jwt::UserRoleToken;
use crate::resp::problem::Problem;

/// Submit an introductory quiz attempt
#[utoipa::path(
    request_body = Vec<AnswerSelection>,
    responses(
        (status = 200, description = "Graded attempt", body = QuizSummary),
        (status = 400, description = "Empty attempt or option out of range", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/course/<id>/quiz/introductory", format = "application/json", data = "<answers>")]
#[tracing::instrument(skip(engine))]
pub async fn submit_introductory_attempt(
    id: Uuid,
    answers: Json<Vec<AnswerSelection>>,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<QuizSummary>, Problem> {
    let summary = engine
        .submit_attempt(auth.user, id, QuizSlot::Introductory, &answers)
        .await?;
    Ok(Json(summary))
}

/// Submit a final quiz attempt
///
/// A passing score completes the course for the authenticated user.
#[utoipa::path(
    request_body = Vec<AnswerSelection>,
    responses(
        (status = 200, description = "Graded attempt", body = QuizSummary),
        (status = 400, description = "Empty attempt or option out of range", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/course/<id>/quiz/final", format = "application/json", data = "<answers>")]
#[tracing::instrument(skip(engine))]
pub async fn submit_final_attempt(
    id: Uuid,
    answers: Json<Vec<AnswerSelection>>,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<QuizSummary>, Problem> {
    let summary = engine
        .submit_attempt(auth.user, id, QuizSlot::Final, &answers)
        .await?;
    Ok(Json(summary))
}

/// Submit a lesson quiz attempt
///
/// A passing score records the lesson as completed.
#[utoipa::path(
    request_body = Vec<AnswerSelection>,
    responses(
        (status = 200, description = "Graded attempt", body = QuizSummary),
        (status = 400, description = "Empty attempt or option out of range", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/course/<id>/lesson/<lesson_id>/quiz", format = "application/json", data = "<answers>")]
#[tracing::instrument(skip(engine))]
pub async fn submit_lesson_attempt(
    id: Uuid,
    lesson_id: Uuid,
    answers: Json<Vec<AnswerSelection>>,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<QuizSummary>, Problem> {
    let summary = engine
        .submit_attempt(auth.user, id, QuizSlot::Lesson(lesson_id), &answers)
        .await?;
    Ok(Json(summary))
}

/// List the authenticated user's introductory quiz attempts
#[utoipa::path(
    responses((status = 200, description = "Graded attempts, oldest first", body = Vec<QuizSummary>)),
    security(("jwt" = []))
)]
#[get("/course/<id>/quiz/introductory/summaries")]
#[tracing::instrument(skip(engine))]
pub async fn introductory_summaries(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<QuizSummary>>, Problem> {
    let summaries = engine
        .attempt_summaries(auth.user, id, QuizSlot::Introductory)
        .await?;
    Ok(Json(summaries))
}

/// List the authenticated user's final quiz attempts
#[utoipa::path(
    responses((status = 200, description = "Graded attempts, oldest first", body = Vec<QuizSummary>)),
    security(("jwt" = []))
)]
#[get("/course/<id>/quiz/final/summaries")]
#[tracing::instrument(skip(engine))]
pub async fn final_summaries(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<QuizSummary>>, Problem> {
    let summaries = engine
        .attempt_summaries(auth.user, id, QuizSlot::Final)
        .await?;
    Ok(Json(summaries))
}

/// List the authenticated user's attempts for a lesson quiz
#[utoipa::path(
    responses((status = 200, description = "Graded attempts, oldest first", body = Vec<QuizSummary>)),
    security(("jwt" = []))
)]
#[get("/course/<id>/lesson/<lesson_id>/quiz/summaries")]
#[tracing::instrument(skip(engine))]
pub async fn lesson_summaries(
    id: Uuid,
    lesson_id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<QuizSummary>>, Problem> {
    let summaries = engine
        .attempt_summaries(auth.user, id, QuizSlot::Lesson(lesson_id))
        .await?;
    Ok(Json(summaries))
}

/// Get one introductory quiz attempt of the authenticated user
#[utoipa::path(
    responses(
        (status = 200, description = "Graded attempt", body = QuizSummary),
        (status = 404, description = "No such summary for this user and quiz", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/course/<id>/quiz/introductory/summary/<summary_id>")]
#[tracing::instrument(skip(engine))]
pub async fn introductory_summary(
    id: Uuid,
    summary_id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<QuizSummary>, Problem> {
    let summary = engine
        .attempt_summary(auth.user, id, QuizSlot::Introductory, summary_id)
        .await?;
    Ok(Json(summary))
}

/// Get one final quiz attempt of the authenticated user
#[utoipa::path(
    responses(
        (status = 200, description = "Graded attempt", body = QuizSummary),
        (status = 404, description = "No such summary for this user and quiz", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/course/<id>/quiz/final/summary/<summary_id>")]
#[tracing::instrument(skip(engine))]
pub async fn final_summary(
    id: Uuid,
    summary_id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<QuizSummary>, Problem> {
    let summary = engine
        .attempt_summary(auth.user, id, QuizSlot::Final, summary_id)
        .await?;
    Ok(Json(summary))
}

/// Get one lesson quiz attempt of the authenticated user
#[utoipa::path(
    responses(
        (status = 200, description = "Graded attempt", body = QuizSummary),
        (status = 404, description = "No such summary for this user and quiz", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/course/<id>/lesson/<lesson_id>/quiz/summary/<summary_id>")]
#[tracing::instrument(skip(engine))]
pub async fn lesson_summary(
    id: Uuid,
    lesson_id: Uuid,
    summary_id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<QuizSummary>, Problem> {
    let summary = engine
        .attempt_summary(auth.user, id, QuizSlot::Lesson(lesson_id), summary_id)
        .await?;
    Ok(Json(summary))
}
