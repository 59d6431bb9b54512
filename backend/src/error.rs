use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{ErrorCode, ErrorResponse, ValidationError};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Malformed JSON body: {0}")]
    MalformedBody(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("Storage error: {0}")]
    Storage(StoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) | ApiError::BadRequest(_) => {
                Status::BadRequest
            }
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::RateLimited(_) => Status::TooManyRequests,
            ApiError::Storage(_) | ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    fn code(&self) -> ErrorCode {
        match self.status().code {
            400 => ErrorCode::InvalidInput,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            429 => ErrorCode::RateLimited,
            _ => ErrorCode::SystemError,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::PollNotFound(id) => ApiError::NotFound(format!("Poll {id}")),
            StoreError::DuplicateId(id) => ApiError::Conflict(format!("Poll {id} already exists")),
            StoreError::BallotsNotEmpty => ApiError::BadRequest(error.to_string()),
            other => ApiError::Storage(other),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let message = if status == Status::InternalServerError {
            error!("{} {} failed: {}", req.method(), req.uri(), self);
            "An internal server error occurred.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse::new(self.code(), message));
        rocket::Response::build_from(body.respond_to(req)?)
            .status(status)
            .ok()
    }
}
