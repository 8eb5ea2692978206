pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{ApplicationStatus, JobApplication, TransitionRecord};
use crate::models::interview::InterviewDetail;

/// Interview mutation riding along with an application transition. There is
/// no independent interview write path; rows are only ever created or
/// updated as part of a [`TransitionCommit`].
#[derive(Debug, Clone)]
pub enum InterviewWrite {
    Create(InterviewDetail),
    Update(InterviewDetail),
}

/// One atomic unit of work: append a history record, move the status, and
/// optionally touch the linked interview record. Guarded by a
/// compare-and-swap on the expected current status so concurrent staff
/// actions cannot both land.
#[derive(Debug, Clone)]
pub struct TransitionCommit {
    pub application_id: Uuid,
    pub expected_status: ApplicationStatus,
    pub record: TransitionRecord,
    pub interview: Option<InterviewWrite>,
}

#[derive(Debug, Clone)]
pub struct ApplicationPage {
    pub page: i64,
    pub limit: i64,
    pub status: Option<ApplicationStatus>,
    pub ascending: bool,
}

impl ApplicationPage {
    pub const MAX_LIMIT: i64 = 100;

    /// Limit as actually applied: always between 1 and [`Self::MAX_LIMIT`],
    /// whatever the caller put in the struct.
    pub fn capped_limit(&self) -> i64 {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }

    /// Row offset for the requested page; pages below 1 read the first page.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.capped_limit()
    }
}

impl Default for ApplicationPage {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            status: None,
            ascending: false,
        }
    }
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Persists a freshly created aggregate. Fails with
    /// `DuplicateApplication` when the (candidate, posting) pair is already
    /// taken, withdrawn applications included.
    async fn insert(&self, application: &JobApplication) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>>;

    async fn find_by_pair(
        &self,
        candidate_id: Uuid,
        job_posting_id: Uuid,
    ) -> Result<Option<JobApplication>>;

    async fn list_by_candidate(
        &self,
        candidate_id: Uuid,
        page: &ApplicationPage,
    ) -> Result<(Vec<JobApplication>, i64)>;

    /// Applies one transition atomically. Fails with `StaleStatus` when the
    /// stored status no longer matches `expected_status`. The store layer
    /// deliberately does not know about terminal states; that rule belongs
    /// to the engine so the correction channel can bypass it.
    async fn commit(&self, commit: TransitionCommit) -> Result<JobApplication>;
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn get_interview(&self, id: Uuid) -> Result<Option<InterviewDetail>>;

    /// The at-most-one live/most-recent record for an application.
    async fn find_latest_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewDetail>>;

    async fn list_for_posting(&self, job_posting_id: Uuid) -> Result<Vec<InterviewDetail>>;

    async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<InterviewDetail>>;
}
