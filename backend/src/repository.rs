use std::path::Path;

use shared::models::{Ballot, BallotOutcome, Employee, EmployeePatch, VotePoll};
use time::OffsetDateTime;
use tracing::debug;

use crate::store::{JsonCollection, ReadPolicy, StoreError};

pub const EMPLOYEES_FILE: &str = "employees.json";
pub const POLLS_FILE: &str = "polls.json";

#[rocket::async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// All employees in storage order.
    async fn list(&self) -> Result<Vec<Employee>, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<Employee>, StoreError>;
    /// Replaces the employee with the same id, or appends a new one.
    async fn upsert(&self, employee: Employee) -> Result<Employee, StoreError>;
    /// Merges `patch` into the stored employee. `None` if there is no such id.
    async fn patch(&self, id: &str, patch: EmployeePatch) -> Result<Option<Employee>, StoreError>;
    /// Number of removed records, 0 or 1.
    async fn delete(&self, id: &str) -> Result<usize, StoreError>;
}

#[rocket::async_trait]
pub trait PollRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<VotePoll>, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<VotePoll>, StoreError>;
    async fn create(&self, poll: VotePoll) -> Result<VotePoll, StoreError>;
    /// Records the voter's choice in the poll, replacing their earlier ballot
    /// if they already voted. The cast timestamp is taken at call time.
    async fn cast_ballot(&self, poll_id: &str, employee_id: &str, choice: &str) -> Result<VotePoll, StoreError>;
}

pub struct JsonEmployeeStore {
    collection: JsonCollection<Employee>,
}

impl JsonEmployeeStore {
    pub fn new(data_dir: &Path, policy: ReadPolicy) -> Self {
        Self {
            collection: JsonCollection::new(data_dir.join(EMPLOYEES_FILE), policy),
        }
    }
}

#[rocket::async_trait]
impl EmployeeRepository for JsonEmployeeStore {
    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        self.collection.read().await
    }

    async fn get(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        let employees = self.collection.read().await?;
        Ok(employees.into_iter().find(|e| e.id == id))
    }

    async fn upsert(&self, employee: Employee) -> Result<Employee, StoreError> {
        self.collection
            .update(|employees| {
                match employees.iter_mut().find(|e| e.id == employee.id) {
                    Some(existing) => {
                        debug!(employee_id = %employee.id, "Replacing employee");
                        *existing = employee.clone();
                    }
                    None => {
                        debug!(employee_id = %employee.id, "Appending employee");
                        employees.push(employee.clone());
                    }
                }
                Ok(employee)
            })
            .await
    }

    async fn patch(&self, id: &str, patch: EmployeePatch) -> Result<Option<Employee>, StoreError> {
        self.collection
            .update(|employees| {
                Ok(employees.iter_mut().find(|e| e.id == id).map(|existing| {
                    existing.apply_patch(patch);
                    existing.clone()
                }))
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<usize, StoreError> {
        self.collection
            .update(|employees| {
                let before = employees.len();
                employees.retain(|e| e.id != id);
                Ok(before - employees.len())
            })
            .await
    }
}

pub struct JsonPollStore {
    collection: JsonCollection<VotePoll>,
}

impl JsonPollStore {
    pub fn new(data_dir: &Path, policy: ReadPolicy) -> Self {
        Self {
            collection: JsonCollection::new(data_dir.join(POLLS_FILE), policy),
        }
    }
}

#[rocket::async_trait]
impl PollRepository for JsonPollStore {
    async fn list(&self) -> Result<Vec<VotePoll>, StoreError> {
        self.collection.read().await
    }

    async fn get(&self, id: &str) -> Result<Option<VotePoll>, StoreError> {
        let polls = self.collection.read().await?;
        Ok(polls.into_iter().find(|p| p.id == id))
    }

    async fn create(&self, poll: VotePoll) -> Result<VotePoll, StoreError> {
        if !poll.ballots.is_empty() {
            return Err(StoreError::BallotsNotEmpty);
        }
        self.collection
            .update(|polls| {
                if polls.iter().any(|p| p.id == poll.id) {
                    return Err(StoreError::DuplicateId(poll.id.clone()));
                }
                polls.push(poll.clone());
                Ok(poll)
            })
            .await
    }

    async fn cast_ballot(&self, poll_id: &str, employee_id: &str, choice: &str) -> Result<VotePoll, StoreError> {
        self.collection
            .update(|polls| {
                let poll = polls
                    .iter_mut()
                    .find(|p| p.id == poll_id)
                    .ok_or_else(|| StoreError::PollNotFound(poll_id.to_string()))?;

                let ballot = Ballot::new(employee_id, choice, OffsetDateTime::now_utc());
                let outcome = poll.upsert_ballot(ballot);
                match outcome {
                    BallotOutcome::Inserted => debug!(poll_id, employee_id, "Ballot added"),
                    BallotOutcome::Replaced => debug!(poll_id, employee_id, "Ballot replaced"),
                }
                Ok(poll.clone())
            })
            .await
    }
}
