pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::application_service::ApplicationService;
use crate::services::audit_service::{AuditSink, PgAuditSink};
use crate::services::interview_service::InterviewService;
use crate::services::posting_service::{PgPostingDirectory, PostingDirectory};
use crate::store::postgres::PgStore;
use crate::store::{ApplicationStore, InterviewStore};
use crate::utils::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub application_service: ApplicationService,
    pub interview_service: InterviewService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        let postings = Arc::new(PgPostingDirectory::new(pool.clone()));
        let audit = Arc::new(PgAuditSink::new(pool.clone()));
        let clock = Arc::new(SystemClock);
        Self::with_parts(pool, store.clone(), store, postings, audit, clock)
    }

    /// Wiring seam for alternative backends (in-memory store, fixed clock).
    pub fn with_parts(
        pool: PgPool,
        store: Arc<dyn ApplicationStore>,
        interviews: Arc<dyn InterviewStore>,
        postings: Arc<dyn PostingDirectory>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let application_service = ApplicationService::new(
            store,
            interviews.clone(),
            postings,
            audit,
            clock.clone(),
        );
        let interview_service = InterviewService::new(interviews, clock);
        Self {
            pool,
            application_service,
            interview_service,
        }
    }
}
