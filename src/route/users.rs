use mongodb::Database;
use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::config::Config;
use crate::data::course::Course;
use crate::data::quiz::QuizSummary;
use crate::data::user::db::{UserLoginData, UserPatch, UserSignupData};
use crate::data::user::UserResponse;
use crate::engine::Engine;
use crate::resp::jwt::UserRoleToken;
use crate::resp::problem::Problem;
use crate::route::require_self_or_admin;
use crate::security::{CredentialVerifier, Security};

/// Register a new user
#[utoipa::path(
    request_body = UserSignupData,
    responses(
        (status = 200, description = "Created user", body = UserResponse),
        (status = 409, description = "Mail address already registered", body = Problem),
    )
)]
#[post("/user", format = "application/json", data = "<signup>")]
#[tracing::instrument(skip(cookies, engine, verifier, security))]
pub async fn user_register<'a>(
    signup: Json<UserSignupData>,
    cookies: &'a CookieJar<'_>,
    engine: &State<Engine<Database>>,
    verifier: &State<Box<dyn CredentialVerifier>>,
    security: &State<Security>,
    c: &State<Config>,
) -> Result<Json<UserResponse>, Problem> {
    let user = engine
        .register(signup.into_inner(), verifier.as_ref(), &c.admin_mail_ids)
        .await?;

    let urt = UserRoleToken::new(&user);
    cookies.add(urt.cookie(&security.jwt_secret)?);

    Ok(Json(UserResponse::from(user)))
}

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn bad_login() -> Problem {
        Problem::new_untyped(Status::Unauthorized, "Bad mail address or password.")
    }
}

/// Log in with mail address and password
#[utoipa::path(
    request_body = UserLoginData,
    responses(
        (status = 200, description = "Logged in user", body = UserResponse),
        (status = 401, description = "Bad mail address or password", body = Problem),
    )
)]
#[post("/login", format = "application/json", data = "<login>")]
#[tracing::instrument(skip(cookies, engine, verifier, security))]
pub async fn login_submit<'a>(
    login: Json<UserLoginData>,
    cookies: &'a CookieJar<'_>,
    engine: &State<Engine<Database>>,
    verifier: &State<Box<dyn CredentialVerifier>>,
    security: &State<Security>,
) -> Result<Json<UserResponse>, Problem> {
    let user = engine
        .login(&login, verifier.as_ref())
        .await?
        .ok_or_else(problem::bad_login)?;

    let urt = UserRoleToken::new(&user);
    cookies.add(urt.cookie(&security.jwt_secret)?);

    Ok(Json(UserResponse::from(user)))
}

/// Get user information
#[utoipa::path(
    responses(
        (status = 200, description = "Information about the user", body = Option<UserResponse>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/user/<id>")]
#[tracing::instrument(skip(engine))]
pub async fn user_get(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Option<Json<UserResponse>>, Problem> {
    let user = engine.user_details(id).await?;
    Ok(user.map(|u| Json(UserResponse::from(u))))
}

/// Update user profile fields
#[utoipa::path(request_body = UserPatch, security(("jwt" = [])))]
#[put("/user/<id>", format = "application/json", data = "<patch>")]
#[tracing::instrument(skip(engine, verifier))]
pub async fn user_update(
    id: Uuid,
    patch: Json<UserPatch>,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
    verifier: &State<Box<dyn CredentialVerifier>>,
) -> Result<Json<UserResponse>, Problem> {
    require_self_or_admin(&auth, id)?;

    let user = engine
        .update_user_details(id, patch.into_inner(), verifier.as_ref())
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// List courses the user is enrolled in
#[utoipa::path(security(("jwt" = [])))]
#[get("/user/<id>/courses/enrolled")]
#[tracing::instrument(skip(engine))]
pub async fn enrolled_courses(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<Course>>, Problem> {
    require_self_or_admin(&auth, id)?;
    Ok(Json(engine.enrolled_courses(id).await?))
}

/// List courses the user has completed
#[utoipa::path(security(("jwt" = [])))]
#[get("/user/<id>/courses/completed")]
#[tracing::instrument(skip(engine))]
pub async fn completed_courses(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<Course>>, Problem> {
    require_self_or_admin(&auth, id)?;
    Ok(Json(engine.completed_courses(id).await?))
}

/// List courses the user has started but not finished
#[utoipa::path(security(("jwt" = [])))]
#[get("/user/<id>/courses/in-progress")]
#[tracing::instrument(skip(engine))]
pub async fn in_progress_courses(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<Course>>, Problem> {
    require_self_or_admin(&auth, id)?;
    Ok(Json(engine.in_progress_courses(id).await?))
}

/// List courses recommended to the user
#[utoipa::path(security(("jwt" = [])))]
#[get("/user/<id>/courses/recommended")]
#[tracing::instrument(skip(engine))]
pub async fn recommended_courses(
    id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<Course>>, Problem> {
    require_self_or_admin(&auth, id)?;
    Ok(Json(engine.recommended_courses(id).await?))
}

/// Replace the user's recommended course list
#[utoipa::path(request_body = Vec<Uuid>, security(("jwt" = [])))]
#[put("/user/<id>/courses/recommended", format = "application/json", data = "<courses>")]
#[tracing::instrument(skip(engine))]
pub async fn set_recommended_courses(
    id: Uuid,
    courses: Json<Vec<Uuid>>,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<UserResponse>, Problem> {
    require_self_or_admin(&auth, id)?;

    let user = engine
        .set_recommended_courses(id, courses.into_inner())
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// List the user's graded attempts for a quiz
#[utoipa::path(security(("jwt" = [])))]
#[get("/user/<id>/quiz/<quiz_id>/results")]
#[tracing::instrument(skip(engine))]
pub async fn quiz_results(
    id: Uuid,
    quiz_id: Uuid,
    auth: UserRoleToken,
    engine: &State<Engine<Database>>,
) -> Result<Json<Vec<QuizSummary>>, Problem> {
    require_self_or_admin(&auth, id)?;
    Ok(Json(engine.quiz_results(id, quiz_id).await?))
}
