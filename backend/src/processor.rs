use shared::models::*;
use shared::validation::{validate_create_employee, validate_create_poll, ValidationError};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::utils::new_record_id;

pub struct EmployeeProcessor;

impl EmployeeProcessor {
    /// Turns a create request into a storable employee, generating the id and
    /// hire timestamp when the caller left them out.
    pub fn build_employee(request: CreateEmployeeRequest, now: OffsetDateTime) -> Result<Employee, ValidationError> {
        validate_create_employee(&request)?;

        let hired_at = match request.hired_at {
            Some(hired_at) => hired_at,
            None => now
                .format(&Rfc3339)
                .map_err(|_| ValidationError::InvalidTimestamp("hiredAt"))?,
        };

        Ok(Employee {
            id: request.id.unwrap_or_else(new_record_id),
            name: request.name.unwrap_or_default(),
            department: request.department.unwrap_or_default(),
            role: request.role.unwrap_or_default(),
            hired_at,
            score: request.score,
        })
    }
}

pub struct VoteProcessor;

impl VoteProcessor {
    pub fn build_poll(request: CreatePollRequest, now: OffsetDateTime) -> Result<VotePoll, ValidationError> {
        validate_create_poll(&request)?;

        Ok(VotePoll {
            id: request.id.unwrap_or_else(new_record_id),
            title: request.title.unwrap_or_default(),
            created_at: now,
            deadline: request.deadline,
            candidates: request.candidates.unwrap_or_default(),
            ballots: Vec::new(),
        })
    }

    /// Counts ballots per candidate, in candidate order. Ballots naming an
    /// unknown candidate only count towards `total_ballots`.
    pub fn calculate_results(poll: &VotePoll, now: OffsetDateTime) -> PollResults {
        let tallies: Vec<CandidateTally> = poll
            .candidates
            .iter()
            .map(|candidate| CandidateTally {
                candidate_id: candidate.id.clone(),
                name: candidate.name.clone(),
                votes: poll.ballots.iter().filter(|b| b.choice == candidate.id).count(),
            })
            .collect();

        let top = tallies.iter().map(|t| t.votes).max().unwrap_or(0);
        let leaders = if top == 0 {
            Vec::new()
        } else {
            tallies
                .iter()
                .filter(|t| t.votes == top)
                .map(|t| t.candidate_id.clone())
                .collect()
        };

        PollResults {
            poll_id: poll.id.clone(),
            title: poll.title.clone(),
            total_ballots: poll.total_votes(),
            closed: poll.is_closed(now),
            tallies,
            leaders,
        }
    }
}
