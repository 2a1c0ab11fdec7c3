// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage status
//!
//! The `(document_id, stage_name, state)` triple (§3 `StageStatus`, §4.B).
//! Exactly one row exists per `(document_id, stage_name)` - enforced by the
//! store, not by this type - and `in_progress` is only valid while a lease
//! is held.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::DomainError;
use crate::value_objects::{DocumentId, ErrorRecordId, LeaseToken, StageName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageStatus {
    pub document_id: DocumentId,
    pub stage: StageName,
    pub state: StageState,
    pub attempt_count: u32,
    pub first_attempt_at: Option<DateTime<Utc>>,
    pub last_transition_at: DateTime<Utc>,
    pub last_error_ref: Option<ErrorRecordId>,
    pub lease_token: Option<LeaseToken>,
    pub leased_until: Option<DateTime<Utc>>,
    /// The `metadata` half of the last successful `ProcessingResult` for
    /// this stage, so a later stage can read an earlier one's output (e.g.
    /// `link_extraction` reading `text_extraction`'s `pages`) without the
    /// persistence gateway growing a getter for every stage's scratch
    /// output (§4.D `ProcessingContext.prior_results_by_stage`).
    pub result_metadata: Option<Json>,
}

impl StageStatus {
    pub fn pending(document_id: DocumentId, stage: StageName, now: DateTime<Utc>) -> Self {
        Self {
            document_id,
            stage,
            state: StageState::Pending,
            attempt_count: 0,
            first_attempt_at: None,
            last_transition_at: now,
            last_error_ref: None,
            lease_token: None,
            leased_until: None,
            result_metadata: None,
        }
    }

    /// Whether this row's lease, if any, has expired as of `now` - the
    /// condition the store's `begin` uses to lazily reclaim a stale lease
    /// (§4.B invariant 2) before granting a new one.
    pub fn lease_expired(&self, now: DateTime<Utc>) -> bool {
        match self.leased_until {
            Some(expiry) => now >= expiry,
            None => true,
        }
    }

    /// `pending -> in_progress`, incrementing `attempt_count` and minting a
    /// fresh lease. Fails with `AlreadyInProgress` if an unexpired lease is
    /// already held (§4.B, §8 property 3).
    pub fn begin(&mut self, visibility_timeout: chrono::Duration, now: DateTime<Utc>) -> Result<LeaseToken, DomainError> {
        if self.state == StageState::InProgress && !self.lease_expired(now) {
            return Err(DomainError::AlreadyInProgress(format!(
                "{} is already in progress for document {}",
                self.stage, self.document_id
            )));
        }

        let token = LeaseToken::new();
        self.state = StageState::InProgress;
        self.attempt_count += 1;
        self.first_attempt_at.get_or_insert(now);
        self.last_transition_at = now;
        self.lease_token = Some(token);
        self.leased_until = Some(now + visibility_timeout);
        Ok(token)
    }

    fn require_lease(&self, token: LeaseToken) -> Result<(), DomainError> {
        match self.lease_token {
            Some(held) if held == token => Ok(()),
            _ => Err(DomainError::LeaseLost(format!(
                "presented lease does not match the active lease for {}",
                self.stage
            ))),
        }
    }

    pub fn complete(&mut self, token: LeaseToken, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_lease(token)?;
        self.state = StageState::Completed;
        self.last_transition_at = now;
        self.lease_token = None;
        self.leased_until = None;
        Ok(())
    }

    pub fn fail(&mut self, token: LeaseToken, error_ref: ErrorRecordId, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_lease(token)?;
        self.state = StageState::Failed;
        self.last_transition_at = now;
        self.last_error_ref = Some(error_ref);
        self.lease_token = None;
        self.leased_until = None;
        Ok(())
    }

    pub fn extend_lease(&mut self, token: LeaseToken, additional: chrono::Duration, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_lease(token)?;
        self.leased_until = Some(self.leased_until.unwrap_or(now) + additional);
        Ok(())
    }

    /// Records a completed stage's result metadata for later stages to
    /// read back out of `ProcessingContext.prior_results_by_stage`. Not
    /// part of the lease state machine - set alongside `complete`, not a
    /// transition of its own.
    pub fn set_result_metadata(&mut self, metadata: Json) {
        self.result_metadata = Some(metadata);
    }

    /// Administrative reset: any state back to `pending`, attempt count
    /// preserved (§4.B `reset`).
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.state = StageState::Pending;
        self.lease_token = None;
        self.leased_until = None;
        self.last_transition_at = now;
    }

    /// Whether this stage's dependencies being `completed`/`skipped` is
    /// enough to let it run, given the states of its direct predecessors.
    pub fn dependencies_satisfied(dependency_states: &[StageState]) -> bool {
        dependency_states
            .iter()
            .all(|state| matches!(state, StageState::Completed | StageState::Skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn begin_grants_a_lease_and_increments_attempt() {
        let mut status = StageStatus::pending(DocumentId::new(), StageName::Upload, now());
        let token = status.begin(Duration::minutes(10), now()).unwrap();
        assert_eq!(status.state, StageState::InProgress);
        assert_eq!(status.attempt_count, 1);
        assert_eq!(status.lease_token, Some(token));
    }

    #[test]
    fn begin_rejects_a_still_active_lease() {
        let mut status = StageStatus::pending(DocumentId::new(), StageName::Upload, now());
        status.begin(Duration::minutes(10), now()).unwrap();
        let second = status.begin(Duration::minutes(10), now());
        assert!(matches!(second, Err(DomainError::AlreadyInProgress(_))));
    }

    #[test]
    fn begin_reclaims_an_expired_lease() {
        let mut status = StageStatus::pending(DocumentId::new(), StageName::Upload, now());
        status.begin(Duration::seconds(1), now()).unwrap();
        let later = now() + Duration::seconds(5);
        assert!(status.begin(Duration::minutes(10), later).is_ok());
        assert_eq!(status.attempt_count, 2);
    }

    #[test]
    fn complete_requires_the_matching_lease() {
        let mut status = StageStatus::pending(DocumentId::new(), StageName::Upload, now());
        let token = status.begin(Duration::minutes(10), now()).unwrap();
        let wrong = LeaseToken::new();
        assert!(status.complete(wrong, now()).is_err());
        assert!(status.complete(token, now()).is_ok());
        assert_eq!(status.state, StageState::Completed);
    }

    #[test]
    fn completed_is_terminal_unless_explicitly_reset() {
        let mut status = StageStatus::pending(DocumentId::new(), StageName::Upload, now());
        let token = status.begin(Duration::minutes(10), now()).unwrap();
        status.complete(token, now()).unwrap();
        status.reset(now());
        assert_eq!(status.state, StageState::Pending);
    }

    #[test]
    fn dependencies_satisfied_accepts_completed_and_skipped_only() {
        assert!(StageStatus::dependencies_satisfied(&[StageState::Completed, StageState::Skipped]));
        assert!(!StageStatus::dependencies_satisfied(&[StageState::Completed, StageState::Pending]));
    }
}
