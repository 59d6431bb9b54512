use rocket::serde::json::{self, Json};
use uuid::Uuid;

use crate::error::ApiError;

pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Unwraps a JSON body, reporting parse failures as a client error instead of
/// Rocket's default 422.
pub fn parse_body<T>(body: Result<Json<T>, json::Error<'_>>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(json::Error::Io(e)) => Err(ApiError::MalformedBody(e.to_string())),
        Err(json::Error::Parse(_, e)) => Err(ApiError::MalformedBody(e.to_string())),
    }
}
