use std::collections::HashSet;
use time::format_description::well_known::Iso8601;
use time::{Date, OffsetDateTime};
use crate::models::{CastBallotRequest, CreateEmployeeRequest, CreatePollRequest, EmployeePatch};

pub const MAX_NAME_LENGTH: usize = 120;
pub const MAX_FIELD_LENGTH: usize = 120;
pub const MAX_ID_LENGTH: usize = 64;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CANDIDATES: usize = 100;
pub const MIN_CANDIDATES: usize = 1;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Field {0} must not be blank")]
    BlankField(&'static str),
    #[error("Field {field} exceeds maximum length of {max}")]
    TooLong { field: &'static str, max: usize },
    #[error("Invalid ISO-8601 timestamp in {0}")]
    InvalidTimestamp(&'static str),
    #[error("Score must be a finite number")]
    InvalidScore,
    #[error("Too few candidates (minimum {MIN_CANDIDATES})")]
    TooFewCandidates,
    #[error("Too many candidates (maximum {MAX_CANDIDATES})")]
    TooManyCandidates,
    #[error("Duplicate candidate: {0}")]
    DuplicateCandidate(String),
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() { return Err(ValidationError::BlankField(field)); }
    if value.chars().count() > max { return Err(ValidationError::TooLong { field, max }); }
    Ok(())
}

fn required<'a>(field: &'static str, value: &'a Option<String>, max: usize) -> Result<&'a str, ValidationError> {
    let value = value.as_deref().ok_or(ValidationError::MissingField(field))?;
    check_text(field, value, max)?;
    Ok(value)
}

fn optional(field: &'static str, value: &Option<String>, max: usize) -> Result<(), ValidationError> {
    match value {
        Some(value) => check_text(field, value, max),
        None => Ok(()),
    }
}

fn check_hired_at(value: &Option<String>) -> Result<(), ValidationError> {
    if let Some(raw) = value {
        let parsed = OffsetDateTime::parse(raw, &Iso8601::DEFAULT).is_ok()
            || Date::parse(raw, &Iso8601::DEFAULT).is_ok();
        if !parsed { return Err(ValidationError::InvalidTimestamp("hiredAt")); }
    }
    Ok(())
}

fn check_score(score: Option<f64>) -> Result<(), ValidationError> {
    match score {
        Some(s) if !s.is_finite() => Err(ValidationError::InvalidScore),
        _ => Ok(()),
    }
}

pub fn validate_create_employee(request: &CreateEmployeeRequest) -> Result<(), ValidationError> {
    required("name", &request.name, MAX_NAME_LENGTH)?;
    required("department", &request.department, MAX_FIELD_LENGTH)?;
    required("role", &request.role, MAX_FIELD_LENGTH)?;
    optional("id", &request.id, MAX_ID_LENGTH)?;
    check_hired_at(&request.hired_at)?;
    check_score(request.score)
}

pub fn validate_employee_patch(patch: &EmployeePatch) -> Result<(), ValidationError> {
    optional("name", &patch.name, MAX_NAME_LENGTH)?;
    optional("department", &patch.department, MAX_FIELD_LENGTH)?;
    optional("role", &patch.role, MAX_FIELD_LENGTH)?;
    check_hired_at(&patch.hired_at)?;
    check_score(patch.score)
}

pub fn validate_create_poll(request: &CreatePollRequest) -> Result<(), ValidationError> {
    required("title", &request.title, MAX_TITLE_LENGTH)?;
    optional("id", &request.id, MAX_ID_LENGTH)?;

    let candidates = request.candidates.as_ref().ok_or(ValidationError::MissingField("candidates"))?;
    if candidates.len() < MIN_CANDIDATES { return Err(ValidationError::TooFewCandidates); }
    if candidates.len() > MAX_CANDIDATES { return Err(ValidationError::TooManyCandidates); }

    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        check_text("candidates.id", &candidate.id, MAX_ID_LENGTH)?;
        check_text("candidates.name", &candidate.name, MAX_NAME_LENGTH)?;
        if !seen.insert(candidate.id.as_str()) {
            return Err(ValidationError::DuplicateCandidate(candidate.id.clone()));
        }
    }

    Ok(())
}

/// Returns the voter and the chosen candidate. Only presence is checked;
/// `choice` is not matched against the poll's candidates.
pub fn validate_cast_ballot(request: &CastBallotRequest) -> Result<(&str, &str), ValidationError> {
    let employee_id = required("employeeId", &request.employee_id, MAX_ID_LENGTH)?;
    let choice = required("choice", &request.choice, MAX_ID_LENGTH)?;
    Ok((employee_id, choice))
}
