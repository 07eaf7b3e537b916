use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
    pub field: Option<String>,
}

const COLLABORATOR_UNAVAILABLE: i32 = 6;
const INVALID_STATE: i32 = 100;
const INVALID_INPUT: i32 = 101;
const VALIDATION: i32 = 102;
const AVAILABILITY_CONFLICT: i32 = 103;
const RACE_LOST: i32 = 104;
const SUBMISSION_IN_FLIGHT: i32 = 105;

impl Error {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn is_invalid_state_error(&self) -> bool {
        self.code == INVALID_STATE
    }

    pub fn is_invalid_input_error(&self) -> bool {
        self.code == INVALID_INPUT
    }

    pub fn is_validation_error(&self) -> bool {
        self.code == VALIDATION
    }

    pub fn is_availability_conflict(&self) -> bool {
        self.code == AVAILABILITY_CONFLICT
    }

    pub fn is_race_lost_error(&self) -> bool {
        self.code == RACE_LOST
    }

    pub fn is_collaborator_unavailable(&self) -> bool {
        self.code == COLLABORATOR_UNAVAILABLE
    }

    pub fn is_submission_in_flight(&self) -> bool {
        self.code == SUBMISSION_IN_FLIGHT
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {}: {}", self.code, field, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        collaborator_unavailable_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            COLLABORATOR_UNAVAILABLE => (
                StatusCode::SERVICE_UNAVAILABLE,
                "network error, please retry",
            ),
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            AVAILABILITY_CONFLICT | RACE_LOST => (StatusCode::CONFLICT, self.message.as_str()),
            SUBMISSION_IN_FLIGHT => (StatusCode::TOO_MANY_REQUESTS, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
            "field": self.field,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_state_error() -> Error {
    Error::new(INVALID_STATE, "invalid state")
}

pub fn invalid_input_error() -> Error {
    Error::new(INVALID_INPUT, "invalid input")
}

pub fn not_found_error(what: &str) -> Error {
    Error::new(INVALID_INPUT, format!("{} not found", what))
}

pub fn validation_error(field: &str, message: impl Into<String>) -> Error {
    Error {
        field: Some(field.into()),
        ..Error::new(VALIDATION, message)
    }
}

pub fn availability_conflict_error(message: impl Into<String>) -> Error {
    Error::new(AVAILABILITY_CONFLICT, message)
}

pub fn race_lost_error() -> Error {
    Error::new(
        RACE_LOST,
        "booking was already taken by another driver, refresh the list",
    )
}

pub fn submission_in_flight_error() -> Error {
    Error::new(SUBMISSION_IN_FLIGHT, "an identical booking is being submitted")
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error::new(1, "environment variable error")
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!("database error: {:?}", err);
    Error::new(2, "database error")
}

pub fn reqwest_error(_: reqwest::Error) -> Error {
    Error::new(3, "reqwest error")
}

pub fn upstream_error() -> Error {
    Error::new(4, "upstream error")
}

pub fn unexpected_error() -> Error {
    Error::new(5, "unexpected error")
}

pub fn collaborator_unavailable_error() -> Error {
    Error::new(COLLABORATOR_UNAVAILABLE, "collaborator unavailable")
}

#[test]
fn validation_error_carries_field() {
    let err = validation_error("email", "invalid email");

    assert!(err.is_validation_error());
    assert_eq!(err.field.as_deref(), Some("email"));
    assert_eq!(err.to_string(), "[102] email: invalid email");
}

#[tokio::test]
async fn elapsed_maps_to_collaborator_unavailable() {
    let err: Error = tokio::time::timeout(
        std::time::Duration::from_millis(1),
        futures::future::pending::<()>(),
    )
    .await
    .map_err(Error::from)
    .unwrap_err();

    assert!(err.is_collaborator_unavailable());
}
