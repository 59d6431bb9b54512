use serde::{Serialize, Deserialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub department: String,
    pub role: String,
    /// ISO-8601 timestamp, kept verbatim as supplied.
    pub hired_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Partial update of an [`Employee`]. There is no `id` field, so a patch can
/// never change the identifier of the record it is applied to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub hired_at: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub hired_at: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub employee_id: String,
    pub choice: String,
    #[serde(with = "time::serde::rfc3339")]
    pub cast_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VotePoll {
    pub id: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<OffsetDateTime>,
    pub candidates: Vec<VoteCandidate>,
    #[serde(default)]
    pub ballots: Vec<Ballot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub candidates: Option<Vec<VoteCandidate>>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastBallotRequest {
    pub employee_id: Option<String>,
    pub choice: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub deleted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotOutcome {
    Inserted,
    Replaced,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTally {
    pub candidate_id: String,
    pub name: String,
    pub votes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: String,
    pub title: String,
    pub total_ballots: usize,
    pub closed: bool,
    pub tallies: Vec<CandidateTally>,
    pub leaders: Vec<String>,
}

impl Employee {
    pub fn apply_patch(&mut self, patch: EmployeePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(department) = patch.department {
            self.department = department;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(hired_at) = patch.hired_at {
            self.hired_at = hired_at;
        }
        if patch.score.is_some() {
            self.score = patch.score;
        }
    }
}

impl Ballot {
    pub fn new(employee_id: impl Into<String>, choice: impl Into<String>, cast_at: OffsetDateTime) -> Self {
        Self {
            employee_id: employee_id.into(),
            choice: choice.into(),
            cast_at,
        }
    }
}

impl VotePoll {
    /// Records `ballot` as the only ballot of its voter.
    ///
    /// An earlier ballot by the same voter is overwritten at its existing
    /// position, so the order of every other voter's ballot is untouched.
    /// A first-time voter is appended to the end.
    pub fn upsert_ballot(&mut self, ballot: Ballot) -> BallotOutcome {
        match self.ballots.iter_mut().find(|b| b.employee_id == ballot.employee_id) {
            Some(existing) => {
                *existing = ballot;
                BallotOutcome::Replaced
            }
            None => {
                self.ballots.push(ballot);
                BallotOutcome::Inserted
            }
        }
    }

    pub fn ballot_for(&self, employee_id: &str) -> Option<&Ballot> {
        self.ballots.iter().find(|b| b.employee_id == employee_id)
    }

    pub fn has_candidate(&self, candidate_id: &str) -> bool {
        self.candidates.iter().any(|c| c.id == candidate_id)
    }

    /// Deadline check for display purposes; ballots are accepted either way.
    pub fn is_closed(&self, now: OffsetDateTime) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    pub fn total_votes(&self) -> usize {
        self.ballots.len()
    }
}
