#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use placement_backend::error::Result;
use placement_backend::models::activity::ActivityEvent;
use placement_backend::services::application_service::ApplicationService;
use placement_backend::services::audit_service::AuditSink;
use placement_backend::services::interview_service::InterviewService;
use placement_backend::services::posting_service::PostingDirectory;
use placement_backend::store::memory::MemoryStore;
use placement_backend::utils::clock::FixedClock;

/// Posting directory where every posting is active unless deactivated and
/// every position belongs to its posting.
#[derive(Default)]
pub struct StubPostings {
    inactive: Mutex<HashSet<Uuid>>,
}

impl StubPostings {
    pub fn deactivate(&self, job_posting_id: Uuid) {
        self.inactive.lock().unwrap().insert(job_posting_id);
    }
}

#[async_trait]
impl PostingDirectory for StubPostings {
    async fn is_posting_active(&self, job_posting_id: Uuid) -> Result<bool> {
        Ok(!self.inactive.lock().unwrap().contains(&job_posting_id))
    }

    async fn position_belongs_to_posting(&self, _position_id: Uuid, _: Uuid) -> Result<bool> {
        Ok(true)
    }
}

/// Audit sink that keeps every emitted event for assertions.
#[derive(Default)]
pub struct RecordingSink(pub Mutex<Vec<ActivityEvent>>);

impl RecordingSink {
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingSink {
    async fn record(&self, event: ActivityEvent) -> Result<()> {
        self.0.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct Harness {
    pub applications: ApplicationService,
    pub interviews: InterviewService,
    pub store: Arc<MemoryStore>,
    pub postings: Arc<StubPostings>,
    pub sink: Arc<RecordingSink>,
    pub now: DateTime<Utc>,
}

pub fn harness() -> Harness {
    harness_at(Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap())
}

pub fn harness_at(now: DateTime<Utc>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let postings = Arc::new(StubPostings::default());
    let sink = Arc::new(RecordingSink::default());
    let clock = Arc::new(FixedClock(now));

    let applications = ApplicationService::new(
        store.clone(),
        store.clone(),
        postings.clone(),
        sink.clone(),
        clock.clone(),
    );
    let interviews = InterviewService::new(store.clone(), clock);

    Harness {
        applications,
        interviews,
        store,
        postings,
        sink,
        now,
    }
}
