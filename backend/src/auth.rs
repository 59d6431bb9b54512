use ring::constant_time::verify_slices_are_equal;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use tracing::{debug, warn};

use crate::routes::AppState;

/// Bearer tokens allowed to write. An empty list admits every request.
pub struct TokenVerifier {
    tokens: Vec<String>,
}

impl TokenVerifier {
    pub fn new(tokens: Vec<String>) -> Self {
        let tokens: Vec<String> = tokens.into_iter().filter(|t| !t.trim().is_empty()).collect();
        if tokens.is_empty() {
            warn!("No API_TOKENS configured - write endpoints are open to every client");
        }
        Self { tokens }
    }

    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn verify(&self, presented: &str) -> bool {
        self.tokens
            .iter()
            .any(|token| verify_slices_are_equal(token.as_bytes(), presented.as_bytes()).is_ok())
    }
}

/// An authenticated caller. Every write route requires one.
#[derive(Debug)]
pub struct Session {
    pub authenticated: bool,
}

#[derive(Debug)]
pub enum SessionError {
    Missing,
    Invalid,
    Unconfigured,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = SessionError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((Status::InternalServerError, SessionError::Unconfigured));
        };

        if !state.tokens.is_enabled() {
            return Outcome::Success(Session { authenticated: false });
        }

        let token = req
            .headers()
            .get_one("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match token {
            None => {
                debug!("Rejected {} {}: no bearer token", req.method(), req.uri());
                Outcome::Error((Status::Unauthorized, SessionError::Missing))
            }
            Some(token) if state.tokens.verify(token) => Outcome::Success(Session { authenticated: true }),
            Some(_) => {
                warn!("Rejected {} {}: invalid bearer token", req.method(), req.uri());
                Outcome::Error((Status::Unauthorized, SessionError::Invalid))
            }
        }
    }
}
