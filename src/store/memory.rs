use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::JobApplication;
use crate::models::interview::InterviewDetail;
use crate::store::{
    ApplicationPage, ApplicationStore, InterviewStore, InterviewWrite, TransitionCommit,
};

#[derive(Default)]
struct Inner {
    applications: HashMap<Uuid, JobApplication>,
    // (candidate_id, job_posting_id) -> application id, withdrawn included.
    pair_index: HashMap<(Uuid, Uuid), Uuid>,
    interviews: HashMap<Uuid, InterviewDetail>,
}

/// In-process store with the same commit semantics as the Postgres backend.
/// Backs the engine test suites and local demos.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert(&self, application: &JobApplication) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let pair = (application.candidate_id, application.job_posting_id);
        if inner.pair_index.contains_key(&pair) {
            return Err(Error::DuplicateApplication);
        }
        inner.pair_index.insert(pair, application.id);
        inner
            .applications
            .insert(application.id, application.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.applications.get(&id).cloned())
    }

    async fn find_by_pair(
        &self,
        candidate_id: Uuid,
        job_posting_id: Uuid,
    ) -> Result<Option<JobApplication>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .pair_index
            .get(&(candidate_id, job_posting_id))
            .and_then(|id| inner.applications.get(id))
            .cloned())
    }

    async fn list_by_candidate(
        &self,
        candidate_id: Uuid,
        page: &ApplicationPage,
    ) -> Result<(Vec<JobApplication>, i64)> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut matching: Vec<JobApplication> = inner
            .applications
            .values()
            .filter(|app| app.candidate_id == candidate_id)
            .filter(|app| page.status.map_or(true, |status| app.status == status))
            .cloned()
            .collect();
        matching.sort_by_key(|app| (app.created_at, app.id));
        if !page.ascending {
            matching.reverse();
        }

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.capped_limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn commit(&self, commit: TransitionCommit) -> Result<JobApplication> {
        let mut inner = self.inner.lock().expect("store lock poisoned");

        // Validate the interview leg before touching anything; the whole
        // commit has to stand or fall as one unit.
        if let Some(InterviewWrite::Update(interview)) = &commit.interview {
            if !inner.interviews.contains_key(&interview.id) {
                return Err(Error::InterviewNotFound);
            }
        }

        let application = inner
            .applications
            .get_mut(&commit.application_id)
            .ok_or(Error::ApplicationNotFound)?;
        if application.status != commit.expected_status {
            return Err(Error::StaleStatus(commit.expected_status));
        }

        application.apply_transition(commit.record);
        let updated = application.clone();

        if let Some(write) = commit.interview {
            let interview = match write {
                InterviewWrite::Create(interview) | InterviewWrite::Update(interview) => interview,
            };
            inner.interviews.insert(interview.id, interview);
        }

        Ok(updated)
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn get_interview(&self, id: Uuid) -> Result<Option<InterviewDetail>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.interviews.get(&id).cloned())
    }

    async fn find_latest_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewDetail>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut owned: Vec<&InterviewDetail> = inner
            .interviews
            .values()
            .filter(|interview| interview.job_application_id == application_id)
            .collect();
        owned.sort_by_key(|interview| interview.created_at);
        Ok(owned.last().map(|interview| (*interview).clone()))
    }

    async fn list_for_posting(&self, job_posting_id: Uuid) -> Result<Vec<InterviewDetail>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut rows: Vec<InterviewDetail> = inner
            .interviews
            .values()
            .filter(|interview| interview.job_posting_id == job_posting_id)
            .cloned()
            .collect();
        rows.sort_by_key(|interview| (interview.interview_date, interview.interview_time));
        Ok(rows)
    }

    async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<InterviewDetail>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut rows: Vec<InterviewDetail> = inner
            .interviews
            .values()
            .filter(|interview| interview.candidate_id == candidate_id)
            .cloned()
            .collect();
        rows.sort_by_key(|interview| (interview.interview_date, interview.interview_time));
        Ok(rows)
    }
}
