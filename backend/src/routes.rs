use rocket::{State, get, post, patch, delete, http::Status, serde::json::{self, Json}};
use serde_json::{json, Value};
use shared::models::*;
use shared::validation::{validate_cast_ballot, validate_employee_patch};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::{Session, TokenVerifier},
    config::Config,
    error::ApiError,
    processor::{EmployeeProcessor, VoteProcessor},
    rate_limiter::RateLimiter,
    repository::{EmployeeRepository, JsonEmployeeStore, JsonPollStore, PollRepository},
    utils::parse_body,
};

pub struct AppState {
    pub employees: Box<dyn EmployeeRepository>,
    pub polls: Box<dyn PollRepository>,
    pub ballot_limiter: RateLimiter,
    pub tokens: TokenVerifier,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_repositories(
            config,
            Box::new(JsonEmployeeStore::new(&config.data_dir, config.read_policy)),
            Box::new(JsonPollStore::new(&config.data_dir, config.read_policy)),
        )
    }

    pub fn with_repositories(
        config: &Config,
        employees: Box<dyn EmployeeRepository>,
        polls: Box<dyn PollRepository>,
    ) -> Self {
        Self {
            employees,
            polls,
            ballot_limiter: RateLimiter::new(config.ballot_rate_limit, config.ballot_rate_window_minutes),
            tokens: TokenVerifier::new(config.api_tokens.clone()),
        }
    }
}

#[get("/health")]
pub fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

#[get("/employees")]
pub async fn list_employees(state: &State<AppState>) -> Result<Json<Vec<Employee>>, ApiError> {
    Ok(Json(state.employees.list().await?))
}

#[instrument(skip(state, session, body), fields(authenticated = session.authenticated))]
#[post("/employees", data = "<body>")]
pub async fn create_employee(
    state: &State<AppState>,
    session: Session,
    body: Result<Json<CreateEmployeeRequest>, json::Error<'_>>,
) -> Result<(Status, Json<Employee>), ApiError> {
    let request = parse_body(body)?;
    let employee = EmployeeProcessor::build_employee(request, OffsetDateTime::now_utc())?;
    let stored = state.employees.upsert(employee).await?;
    info!("Stored employee {}", stored.id);
    Ok((Status::Created, Json(stored)))
}

#[get("/employees/<id>")]
pub async fn get_employee(state: &State<AppState>, id: &str) -> Result<Json<Employee>, ApiError> {
    state
        .employees
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Employee {id}")))
}

#[instrument(skip(state, session, body), fields(authenticated = session.authenticated))]
#[patch("/employees/<id>", data = "<body>")]
pub async fn update_employee(
    state: &State<AppState>,
    session: Session,
    id: &str,
    body: Result<Json<EmployeePatch>, json::Error<'_>>,
) -> Result<Json<Employee>, ApiError> {
    let patch = parse_body(body)?;
    validate_employee_patch(&patch)?;
    state
        .employees
        .patch(id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Employee {id}")))
}

#[instrument(skip(state, session), fields(authenticated = session.authenticated))]
#[delete("/employees/<id>")]
pub async fn delete_employee(
    state: &State<AppState>,
    session: Session,
    id: &str,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.employees.delete(id).await?;
    if deleted > 0 {
        info!("Deleted employee {}", id);
    }
    Ok(Json(DeleteResponse { deleted }))
}

#[get("/votes")]
pub async fn list_votes(state: &State<AppState>) -> Result<Json<Vec<VotePoll>>, ApiError> {
    Ok(Json(state.polls.list().await?))
}

#[instrument(skip(state, session, body), fields(authenticated = session.authenticated))]
#[post("/votes", data = "<body>")]
pub async fn create_vote(
    state: &State<AppState>,
    session: Session,
    body: Result<Json<CreatePollRequest>, json::Error<'_>>,
) -> Result<(Status, Json<VotePoll>), ApiError> {
    let request = parse_body(body)?;
    let poll = VoteProcessor::build_poll(request, OffsetDateTime::now_utc())?;
    let stored = state.polls.create(poll).await?;
    info!("Created poll {} with {} candidates", stored.id, stored.candidates.len());
    Ok((Status::Created, Json(stored)))
}

#[get("/votes/<id>")]
pub async fn get_vote(state: &State<AppState>, id: &str) -> Result<Json<VotePoll>, ApiError> {
    state
        .polls
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Poll {id}")))
}

#[instrument(skip(state, session, body), fields(authenticated = session.authenticated))]
#[patch("/votes/<id>", data = "<body>")]
pub async fn cast_ballot(
    state: &State<AppState>,
    session: Session,
    id: &str,
    body: Result<Json<CastBallotRequest>, json::Error<'_>>,
) -> Result<Json<VotePoll>, ApiError> {
    let request = parse_body(body)?;
    let (employee_id, choice) = validate_cast_ballot(&request)?;

    if state.polls.get(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Poll {id}")));
    }
    state.ballot_limiter.check(&format!("cast_ballot:{}:{}", id, employee_id))?;

    let poll = state.polls.cast_ballot(id, employee_id, choice).await?;
    info!("Ballot cast in poll {} ({} ballots)", poll.id, poll.total_votes());
    Ok(Json(poll))
}

#[get("/votes/<id>/results")]
pub async fn get_results(state: &State<AppState>, id: &str) -> Result<Json<PollResults>, ApiError> {
    let poll = state
        .polls
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Poll {id}")))?;
    Ok(Json(VoteProcessor::calculate_results(&poll, OffsetDateTime::now_utc())))
}
