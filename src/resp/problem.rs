use std::fmt::{Display, Formatter};
use std::io::Cursor;

use rocket::http::hyper::header::CONTENT_LANGUAGE;
use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::{CoreError, StoreError};

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,
    pub instance_uri: Option<String>,

    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            instance_uri: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: "about:blank".to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut body = self.body.clone();

        // Following are required by rfc7807
        body.insert(String::from("type"), Value::from(self.type_uri));
        body.insert(String::from("title"), Value::from(self.title));
        body.insert(String::from("status"), Value::from(self.status.code));

        // Optional parameters as specified by rfc7807
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }
        if let Some(instance) = self.instance_uri {
            body.insert(String::from("instance"), Value::from(instance));
        }

        let body_string = serde_json::to_string(&body)
            .expect("JSON map keys and values must be JSON serializable");

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header(CONTENT_LANGUAGE.as_str(), "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

impl From<CoreError> for Problem {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound { kind, id } => {
                Problem::new_untyped(Status::NotFound, format!("Referenced {kind} doesn't exist."))
                    .insert_str("id", id)
                    .to_owned()
            }
            CoreError::AlreadyEnrolled { user, course } => {
                Problem::new_untyped(Status::Conflict, "User is already enrolled in course.")
                    .insert_str("user", user)
                    .insert_str("course", course)
                    .to_owned()
            }
            CoreError::MailRegistered(mail_id) => {
                Problem::new_untyped(Status::Conflict, "Mail address already registered.")
                    .insert_str("mail_id", mail_id)
                    .to_owned()
            }
            CoreError::EmptyAttempt => Problem::new_untyped(
                Status::BadRequest,
                "A quiz attempt must contain at least one answer.",
            ),
            CoreError::OptionOutOfRange {
                question, selected, ..
            } => Problem::new_untyped(Status::BadRequest, "Selected option is out of range.")
                .insert_str("question", question)
                .insert_str("selected_option", selected)
                .to_owned(),
            CoreError::Store(e) => Problem::from(e),
        }
    }
}

impl From<StoreError> for Problem {
    fn from(e: StoreError) -> Self {
        let mut problem = Problem::new_untyped(
            Status::InternalServerError,
            "Catalog store failed while processing request.",
        );

        match e {
            StoreError::Database(_) => problem
                .detail("Submitted data might not be properly stored.")
                .to_owned(),
            StoreError::Serialize(_) | StoreError::Deserialize(_) => problem
                .detail("There was a problem with handling stored BSON data.")
                .to_owned(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => {
                Problem::new_untyped(Status::Unauthorized, "Expired JWT signature.")
            }
            _ => Problem::new_untyped(Status::Unauthorized, "Error while handling JWT."),
        }
    }
}
