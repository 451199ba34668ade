use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::{Cookie, CookieJar, Status};
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use rocket::time::OffsetDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::util::date_time_as_unix_seconds;
use crate::data::user::User;
use crate::resp::problem::Problem;
use crate::role::Role;
use crate::security::Security;

pub static AUTH_COOKIE_NAME: &str = "jwt_auth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleToken {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    pub user: Uuid,
    pub role: Role,
}

impl UserRoleToken {
    pub fn new(user: &User) -> UserRoleToken {
        let now = Utc::now();
        UserRoleToken {
            iat: now,
            exp: now + Duration::weeks(1),
            user: user.id,
            role: user.role,
        }
    }

    pub fn encode_jwt(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, &self, &EncodingKey::from_secret(secret.as_ref()))
    }

    pub fn cookie(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        Ok(Cookie::build((AUTH_COOKIE_NAME, self.encode_jwt(secret)?))
            .secure(true)
            .expires(OffsetDateTime::from_unix_timestamp(self.exp.timestamp()).ok())
            .path("/")
            .http_only(true)
            .build())
    }
}

pub fn auth_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Unauthorized, "Unable to authorize user.")
        .detail(detail)
        .clone()
}

pub fn extract_claims(
    cookies: &CookieJar,
    secret: impl AsRef<[u8]>,
) -> Result<UserRoleToken, Problem> {
    let token = match cookies.get(AUTH_COOKIE_NAME) {
        Some(jwt) => jwt.value().to_owned(),
        None => {
            return Err(auth_problem("No JWT auth cookie."));
        }
    };
    tracing::debug!("extracted jwt auth from cookie");

    match decode::<UserRoleToken>(
        &token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    {
        Ok(it) => {
            tracing::debug!("decoded user role token for user: {}", it.user);
            Ok(it)
        }
        Err(_) => Err(auth_problem("JWT cookie was malformed.")),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserRoleToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let security: &Security = req
            .rocket()
            .state()
            .expect("security state must be managed");

        tracing::trace!("extracting user role token from request cookies");
        match extract_claims(req.cookies(), &security.jwt_secret) {
            Ok(it) => Outcome::Success(it),
            Err(e) => {
                tracing::debug!("unable to extract claims from cookies");
                Outcome::Error((Status::Unauthorized, e))
            }
        }
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> SecurityScheme {
            let mut http = Http::new(HttpAuthScheme::Bearer);
            http.bearer_format = Some("JWT".to_string());
            SecurityScheme::Http(http)
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let c = openapi.components.as_mut().unwrap();
            c.add_security_scheme("jwt", *self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    #[test]
    fn jwt_round_trips_through_hs256() {
        let now = Utc::now().round_subsecs(0);
        let user = Uuid::new_v4();
        let secret = b"test-secret-material";

        let urt = UserRoleToken {
            iat: now,
            exp: now + Duration::weeks(1),
            user,
            role: Role::Admin,
        };

        let token = urt.encode_jwt(secret).expect("encoding should work");

        let decoded: UserRoleToken = decode(
            &token,
            &DecodingKey::from_secret(secret),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .expect("unable to decode encoded token");

        assert_eq!(now, decoded.iat);
        assert_eq!(now + Duration::weeks(1), decoded.exp);
        assert_eq!(user, decoded.user);
        assert_eq!(decoded.role, Role::Admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let user = User {
            id: Uuid::new_v4(),
            name: "t".into(),
            mail_id: "t@example.com".into(),
            pw_hash: crate::data::user::PasswordHash::new("t#secret12", &[0u8; 16]),
            dob: None,
            interests: vec![],
            enrolled_courses: vec![],
            recommended_courses: vec![],
            role: Role::Student,
        };

        let token = UserRoleToken::new(&user).encode_jwt(b"secret-a").unwrap();

        let decoded = decode::<UserRoleToken>(
            &token,
            &DecodingKey::from_secret(b"secret-b"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(decoded.is_err());
    }
}
