use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::activity::{ActivityCategory, ActivityEvent, StateChange};
use crate::models::application::{
    ApplicationStatus, JobApplication, TransitionLog, TransitionRecord,
};
use crate::models::interview::{
    InterviewDetail, InterviewOutcome, InterviewSchedule, InterviewStatus, SchedulePatch,
};
use crate::services::audit_service::AuditSink;
use crate::services::posting_service::PostingDirectory;
use crate::store::{
    ApplicationPage, ApplicationStore, InterviewStore, InterviewWrite, TransitionCommit,
};
use crate::utils::clock::Clock;

/// Optional annotation carried into the history record of one transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionMeta {
    pub note: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewVerdict {
    Passed,
    Failed,
}

impl InterviewVerdict {
    fn application_status(self) -> ApplicationStatus {
        match self {
            InterviewVerdict::Passed => ApplicationStatus::InterviewPassed,
            InterviewVerdict::Failed => ApplicationStatus::InterviewFailed,
        }
    }

    fn interview_result(self) -> InterviewOutcome {
        match self {
            InterviewVerdict::Passed => InterviewOutcome::Pass,
            InterviewVerdict::Failed => InterviewOutcome::Fail,
        }
    }
}

pub struct ApplicationList {
    pub items: Vec<JobApplication>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// The transition engine. Owns every status change of a job application,
/// and the interview record writes that ride along with them. All rules
/// live here; the stores only guarantee atomicity and the status
/// compare-and-swap.
#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
    interviews: Arc<dyn InterviewStore>,
    postings: Arc<dyn PostingDirectory>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl ApplicationService {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        interviews: Arc<dyn InterviewStore>,
        postings: Arc<dyn PostingDirectory>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            interviews,
            postings,
            audit,
            clock,
        }
    }

    /// Creates a new application for a candidate against an active posting.
    pub async fn apply(
        &self,
        candidate_id: Uuid,
        job_posting_id: Uuid,
        position_id: Option<Uuid>,
        meta: TransitionMeta,
    ) -> Result<JobApplication> {
        if !self.postings.is_posting_active(job_posting_id).await? {
            return Err(self
                .deny(
                    "apply_job",
                    ActivityCategory::Application,
                    "job_posting",
                    job_posting_id,
                    meta.updated_by.clone(),
                    Error::PostingNotActive,
                )
                .await);
        }

        if let Some(position_id) = position_id {
            if !self
                .postings
                .position_belongs_to_posting(position_id, job_posting_id)
                .await?
            {
                return Err(self
                    .deny(
                        "apply_job",
                        ActivityCategory::Application,
                        "job_posting",
                        job_posting_id,
                        meta.updated_by.clone(),
                        Error::BadRequest(
                            "Position does not belong to the job posting".to_string(),
                        ),
                    )
                    .await);
            }
        }

        if self
            .store
            .find_by_pair(candidate_id, job_posting_id)
            .await?
            .is_some()
        {
            return Err(self
                .deny(
                    "apply_job",
                    ActivityCategory::Application,
                    "job_posting",
                    job_posting_id,
                    meta.updated_by.clone(),
                    Error::DuplicateApplication,
                )
                .await);
        }

        let now = self.clock.now();
        let first = TransitionRecord {
            prev_status: None,
            next_status: ApplicationStatus::Applied,
            timestamp: now,
            updated_by: meta.updated_by.clone(),
            note: meta.note,
            corrected: false,
        };
        let application = JobApplication {
            id: Uuid::new_v4(),
            candidate_id,
            job_posting_id,
            position_id,
            status: ApplicationStatus::Applied,
            history: TransitionLog::seeded(first),
            withdrawn_at: None,
            created_at: now,
            updated_at: now,
        };

        // A concurrent apply for the same pair loses here on the unique
        // pair constraint, not on the read above.
        self.store.insert(&application).await?;

        info!(
            application_id = %application.id,
            candidate_id = %candidate_id,
            job_posting_id = %job_posting_id,
            "application created"
        );
        self.emit(ActivityEvent {
            action: "apply_job".to_string(),
            category: ActivityCategory::Application,
            resource_type: "job_application".to_string(),
            resource_id: application.id,
            state_change: Some(StateChange::new("status", None, "applied")),
            actor: meta.updated_by,
            outcome: "success".to_string(),
        })
        .await;

        Ok(application)
    }

    /// Ordinary transition along the adjacency table (currently the
    /// shortlist step). Withdrawal and corrections have their own entry
    /// points; interview stages carry an interview write and are only
    /// reachable through the interview operations, so the application and
    /// its interview record can never drift apart.
    pub async fn update_status(
        &self,
        application_id: Uuid,
        next_status: ApplicationStatus,
        meta: TransitionMeta,
    ) -> Result<JobApplication> {
        let application = self.load(application_id).await?;
        let current = application.status;

        let gate = check_ordinary(current, next_status).err().or_else(|| {
            next_status.is_interview_stage().then(|| {
                Error::BadRequest(
                    "Interview stages are managed through the interview operations".to_string(),
                )
            })
        });
        if let Some(err) = gate {
            return Err(self
                .deny(
                    "update_status",
                    ActivityCategory::Application,
                    "job_application",
                    application_id,
                    meta.updated_by.clone(),
                    err,
                )
                .await);
        }

        let now = self.clock.now();
        let updated = self
            .store
            .commit(TransitionCommit {
                application_id,
                expected_status: current,
                record: self.record_at(now, current, next_status, &meta, false),
                interview: None,
            })
            .await?;

        info!(
            application_id = %application_id,
            from = %current,
            to = %next_status,
            "application status updated"
        );
        self.emit(self.status_event(
            "update_status",
            ActivityCategory::Application,
            &updated,
            current,
            meta.updated_by,
        ))
        .await;

        Ok(updated)
    }

    /// Creates the interview record and moves the application to
    /// `interview_scheduled`, atomically.
    pub async fn schedule_interview(
        &self,
        application_id: Uuid,
        schedule: InterviewSchedule,
        meta: TransitionMeta,
    ) -> Result<JobApplication> {
        let application = self.load(application_id).await?;
        let current = application.status;

        if let Err(err) = check_ordinary(current, ApplicationStatus::InterviewScheduled) {
            return Err(self
                .deny(
                    "schedule_interview",
                    ActivityCategory::Interview,
                    "job_application",
                    application_id,
                    meta.updated_by.clone(),
                    err,
                )
                .await);
        }

        let now = self.clock.now();
        let interview = InterviewDetail {
            id: Uuid::new_v4(),
            job_application_id: application.id,
            job_posting_id: application.job_posting_id,
            candidate_id: application.candidate_id,
            status: InterviewStatus::Scheduled,
            result: None,
            interview_date: schedule.interview_date,
            interview_time: schedule.interview_time,
            duration_minutes: schedule.duration_minutes,
            location: schedule.location,
            contact_person: schedule.contact_person,
            required_documents: schedule.required_documents,
            notes: schedule.notes,
            rescheduled_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        let interview_id = interview.id;

        let updated = self
            .store
            .commit(TransitionCommit {
                application_id,
                expected_status: current,
                record: self.record_at(
                    now,
                    current,
                    ApplicationStatus::InterviewScheduled,
                    &meta,
                    false,
                ),
                interview: Some(InterviewWrite::Create(interview)),
            })
            .await?;

        info!(
            application_id = %application_id,
            interview_id = %interview_id,
            "interview scheduled"
        );
        self.emit(ActivityEvent {
            action: "schedule_interview".to_string(),
            category: ActivityCategory::Interview,
            resource_type: "interview_detail".to_string(),
            resource_id: interview_id,
            state_change: Some(StateChange::new(
                "status",
                Some(current.to_string()),
                ApplicationStatus::InterviewScheduled.to_string(),
            )),
            actor: meta.updated_by,
            outcome: "success".to_string(),
        })
        .await;

        Ok(updated)
    }

    /// Moves the existing interview record in place; no second row is ever
    /// created for the same application.
    pub async fn reschedule_interview(
        &self,
        application_id: Uuid,
        interview_id: Uuid,
        patch: SchedulePatch,
        meta: TransitionMeta,
    ) -> Result<JobApplication> {
        let application = self.load(application_id).await?;
        let current = application.status;
        let mut interview = self
            .interviews
            .get_interview(interview_id)
            .await?
            .ok_or(Error::InterviewNotFound)?;

        let precondition = if interview.job_application_id != application_id {
            Some(Error::InterviewOwnershipMismatch)
        } else if let Err(err) = check_ordinary(current, ApplicationStatus::InterviewRescheduled) {
            Some(err)
        } else if interview.status != InterviewStatus::Scheduled {
            Some(Error::BadRequest(
                "Only a scheduled interview can be rescheduled".to_string(),
            ))
        } else {
            None
        };
        if let Some(err) = precondition {
            return Err(self
                .deny(
                    "reschedule_interview",
                    ActivityCategory::Interview,
                    "interview_detail",
                    interview_id,
                    meta.updated_by.clone(),
                    err,
                )
                .await);
        }

        let now = self.clock.now();
        interview.merge_patch(patch);
        interview.rescheduled_at = Some(now);
        interview.updated_at = now;

        let updated = self
            .store
            .commit(TransitionCommit {
                application_id,
                expected_status: current,
                record: self.record_at(
                    now,
                    current,
                    ApplicationStatus::InterviewRescheduled,
                    &meta,
                    false,
                ),
                interview: Some(InterviewWrite::Update(interview)),
            })
            .await?;

        info!(
            application_id = %application_id,
            interview_id = %interview_id,
            "interview rescheduled"
        );
        self.emit(ActivityEvent {
            action: "reschedule_interview".to_string(),
            category: ActivityCategory::Interview,
            resource_type: "interview_detail".to_string(),
            resource_id: interview_id,
            state_change: Some(StateChange::new(
                "status",
                Some(current.to_string()),
                ApplicationStatus::InterviewRescheduled.to_string(),
            )),
            actor: meta.updated_by,
            outcome: "success".to_string(),
        })
        .await;

        Ok(updated)
    }

    /// Records the interview outcome and moves the application to its
    /// terminal `interview_passed`/`interview_failed` status.
    pub async fn complete_interview(
        &self,
        application_id: Uuid,
        verdict: InterviewVerdict,
        meta: TransitionMeta,
    ) -> Result<JobApplication> {
        let application = self.load(application_id).await?;
        let current = application.status;
        let target = verdict.application_status();

        if let Err(err) = check_ordinary(current, target) {
            return Err(self
                .deny(
                    "complete_interview",
                    ActivityCategory::Interview,
                    "job_application",
                    application_id,
                    meta.updated_by.clone(),
                    err,
                )
                .await);
        }

        let mut interview = self
            .interviews
            .find_latest_for_application(application_id)
            .await?
            .ok_or(Error::InterviewNotFound)?;
        if interview.status != InterviewStatus::Scheduled {
            return Err(self
                .deny(
                    "complete_interview",
                    ActivityCategory::Interview,
                    "interview_detail",
                    interview.id,
                    meta.updated_by.clone(),
                    Error::BadRequest("Interview is not awaiting completion".to_string()),
                )
                .await);
        }

        let now = self.clock.now();
        let interview_id = interview.id;
        interview.status = InterviewStatus::Completed;
        interview.result = Some(verdict.interview_result());
        interview.completed_at = Some(now);
        interview.updated_at = now;

        let updated = self
            .store
            .commit(TransitionCommit {
                application_id,
                expected_status: current,
                record: self.record_at(now, current, target, &meta, false),
                interview: Some(InterviewWrite::Update(interview)),
            })
            .await?;

        info!(
            application_id = %application_id,
            interview_id = %interview_id,
            result = ?verdict,
            "interview completed"
        );
        self.emit(ActivityEvent {
            action: "complete_interview".to_string(),
            category: ActivityCategory::Interview,
            resource_type: "interview_detail".to_string(),
            resource_id: interview_id,
            state_change: Some(StateChange::new(
                "status",
                Some(current.to_string()),
                target.to_string(),
            )),
            actor: meta.updated_by,
            outcome: "success".to_string(),
        })
        .await;

        Ok(updated)
    }

    /// Candidate-facing withdrawal, looked up by (candidate, posting).
    /// Idempotent when the application is already withdrawn; rejected after
    /// a final interview outcome. Cancels a still-scheduled interview in
    /// the same commit.
    pub async fn withdraw(
        &self,
        candidate_id: Uuid,
        job_posting_id: Uuid,
        meta: TransitionMeta,
    ) -> Result<JobApplication> {
        let application = self
            .store
            .find_by_pair(candidate_id, job_posting_id)
            .await?
            .ok_or(Error::ApplicationNotFound)?;
        let current = application.status;

        if current == ApplicationStatus::Withdrawn {
            // Nothing mutates, so neither history nor the activity log grows.
            return Ok(application);
        }
        if current.is_terminal() {
            return Err(self
                .deny(
                    "withdraw_application",
                    ActivityCategory::Application,
                    "job_application",
                    application.id,
                    meta.updated_by.clone(),
                    Error::TerminalState(current),
                )
                .await);
        }

        let now = self.clock.now();
        let interview = match self
            .interviews
            .find_latest_for_application(application.id)
            .await?
        {
            Some(mut interview) if interview.status == InterviewStatus::Scheduled => {
                interview.status = InterviewStatus::Cancelled;
                interview.result = Some(InterviewOutcome::Rejected);
                interview.cancelled_at = Some(now);
                interview.updated_at = now;
                Some(InterviewWrite::Update(interview))
            }
            _ => None,
        };

        let updated = self
            .store
            .commit(TransitionCommit {
                application_id: application.id,
                expected_status: current,
                record: self.record_at(now, current, ApplicationStatus::Withdrawn, &meta, false),
                interview,
            })
            .await?;

        info!(
            application_id = %application.id,
            candidate_id = %candidate_id,
            "application withdrawn"
        );
        self.emit(self.status_event(
            "withdraw_application",
            ActivityCategory::Application,
            &updated,
            current,
            meta.updated_by,
        ))
        .await;

        Ok(updated)
    }

    /// Privileged override: forces any status from any status, terminal
    /// included. Skips the adjacency table but funnels through the same
    /// commit primitive, so the history stays append-only and the record is
    /// flagged and marked with the correction note.
    pub async fn make_correction(
        &self,
        application_id: Uuid,
        forced_status: ApplicationStatus,
        reason: String,
        updated_by: Option<String>,
    ) -> Result<JobApplication> {
        let application = self.load(application_id).await?;
        let current = application.status;
        let now = self.clock.now();

        let record = TransitionRecord {
            prev_status: Some(current),
            next_status: forced_status,
            timestamp: now,
            updated_by: updated_by.clone(),
            // The engine builds the marker itself instead of trusting
            // callers to remember it.
            note: Some(format!("correction: {}", reason)),
            corrected: true,
        };

        let updated = self
            .store
            .commit(TransitionCommit {
                application_id,
                expected_status: current,
                record,
                interview: None,
            })
            .await?;

        warn!(
            application_id = %application_id,
            from = %current,
            to = %forced_status,
            "status correction applied"
        );
        self.emit(self.status_event(
            "make_correction",
            ActivityCategory::Application,
            &updated,
            current,
            updated_by,
        ))
        .await;

        Ok(updated)
    }

    pub async fn list_applied(
        &self,
        candidate_id: Uuid,
        page: ApplicationPage,
    ) -> Result<ApplicationList> {
        let (items, total) = self.store.list_by_candidate(candidate_id, &page).await?;
        Ok(ApplicationList {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    pub async fn get(&self, application_id: Uuid) -> Result<JobApplication> {
        self.load(application_id).await
    }

    async fn load(&self, application_id: Uuid) -> Result<JobApplication> {
        self.store
            .get(application_id)
            .await?
            .ok_or(Error::ApplicationNotFound)
    }

    fn record_at(
        &self,
        now: DateTime<Utc>,
        prev: ApplicationStatus,
        next: ApplicationStatus,
        meta: &TransitionMeta,
        corrected: bool,
    ) -> TransitionRecord {
        TransitionRecord {
            prev_status: Some(prev),
            next_status: next,
            timestamp: now,
            updated_by: meta.updated_by.clone(),
            note: meta.note.clone(),
            corrected,
        }
    }

    fn status_event(
        &self,
        action: &str,
        category: ActivityCategory,
        application: &JobApplication,
        previous: ApplicationStatus,
        actor: Option<String>,
    ) -> ActivityEvent {
        ActivityEvent {
            action: action.to_string(),
            category,
            resource_type: "job_application".to_string(),
            resource_id: application.id,
            state_change: Some(StateChange::new(
                "status",
                Some(previous.to_string()),
                application.status.to_string(),
            )),
            actor,
            outcome: "success".to_string(),
        }
    }

    async fn deny(
        &self,
        action: &str,
        category: ActivityCategory,
        resource_type: &str,
        resource_id: Uuid,
        actor: Option<String>,
        err: Error,
    ) -> Error {
        if err.is_denial() {
            self.emit(ActivityEvent {
                action: action.to_string(),
                category,
                resource_type: resource_type.to_string(),
                resource_id,
                state_change: None,
                actor,
                outcome: "denied".to_string(),
            })
            .await;
        }
        err
    }

    async fn emit(&self, event: ActivityEvent) {
        if let Err(err) = self.audit.record(event).await {
            // Audit emission is fire-and-forget relative to the mutation.
            warn!(error = ?err, "failed to record activity event");
        }
    }
}

/// Ordinary-transition gate: terminal statuses reject everything, everything
/// else is answered by the adjacency table.
fn check_ordinary(current: ApplicationStatus, next: ApplicationStatus) -> Result<()> {
    if current.is_terminal() {
        return Err(Error::TerminalState(current));
    }
    if !current.can_transition_to(next) {
        return Err(Error::InvalidTransition {
            from: current,
            to: next,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::posting_service::MockPostingDirectory;
    use crate::store::memory::MemoryStore;
    use crate::utils::clock::FixedClock;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Sink that keeps every event for assertions.
    #[derive(Default)]
    pub struct RecordingSink(pub Mutex<Vec<ActivityEvent>>);

    #[async_trait::async_trait]
    impl AuditSink for RecordingSink {
        async fn record(&self, event: ActivityEvent) -> Result<()> {
            self.0.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn service_with(
        postings: MockPostingDirectory,
    ) -> (ApplicationService, Arc<RecordingSink>) {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()));
        let service = ApplicationService::new(
            store.clone(),
            store,
            Arc::new(postings),
            sink.clone(),
            clock,
        );
        (service, sink)
    }

    fn active_postings() -> MockPostingDirectory {
        let mut postings = MockPostingDirectory::new();
        postings.expect_is_posting_active().returning(|_| Ok(true));
        postings
            .expect_position_belongs_to_posting()
            .returning(|_, _| Ok(true));
        postings
    }

    #[tokio::test]
    async fn apply_to_inactive_posting_is_rejected_and_audited() {
        let mut postings = MockPostingDirectory::new();
        postings.expect_is_posting_active().returning(|_| Ok(false));
        let (service, sink) = service_with(postings);

        let err = service
            .apply(Uuid::new_v4(), Uuid::new_v4(), None, TransitionMeta::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PostingNotActive));

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "apply_job");
        assert_eq!(events[0].outcome, "denied");
    }

    #[tokio::test]
    async fn apply_rejects_foreign_position() {
        let mut postings = MockPostingDirectory::new();
        postings.expect_is_posting_active().returning(|_| Ok(true));
        postings
            .expect_position_belongs_to_posting()
            .returning(|_, _| Ok(false));
        let (service, _sink) = service_with(postings);

        let err = service
            .apply(
                Uuid::new_v4(),
                Uuid::new_v4(),
                Some(Uuid::new_v4()),
                TransitionMeta::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn second_apply_for_same_pair_is_a_duplicate() {
        let (service, sink) = service_with(active_postings());
        let candidate = Uuid::new_v4();
        let posting = Uuid::new_v4();

        service
            .apply(candidate, posting, None, TransitionMeta::default())
            .await
            .unwrap();
        let err = service
            .apply(candidate, posting, None, TransitionMeta::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateApplication));

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].outcome, "success");
        assert_eq!(events[1].outcome, "denied");
    }

    #[tokio::test]
    async fn update_status_rejects_non_adjacent_target() {
        let (service, _sink) = service_with(active_postings());
        let application = service
            .apply(Uuid::new_v4(), Uuid::new_v4(), None, TransitionMeta::default())
            .await
            .unwrap();

        let err = service
            .update_status(
                application.id,
                ApplicationStatus::InterviewPassed,
                TransitionMeta::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ApplicationStatus::Applied,
                to: ApplicationStatus::InterviewPassed,
            }
        ));
    }

    #[tokio::test]
    async fn missing_application_is_not_logged_as_a_denial() {
        let (service, sink) = service_with(active_postings());

        let err = service
            .update_status(
                Uuid::new_v4(),
                ApplicationStatus::Shortlisted,
                TransitionMeta::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ApplicationNotFound));
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_status_never_reaches_withdrawn() {
        let (service, _sink) = service_with(active_postings());
        let application = service
            .apply(Uuid::new_v4(), Uuid::new_v4(), None, TransitionMeta::default())
            .await
            .unwrap();

        let err = service
            .update_status(
                application.id,
                ApplicationStatus::Withdrawn,
                TransitionMeta::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn correction_builds_marker_note_and_flags_record() {
        let (service, sink) = service_with(active_postings());
        let application = service
            .apply(Uuid::new_v4(), Uuid::new_v4(), None, TransitionMeta::default())
            .await
            .unwrap();

        let corrected = service
            .make_correction(
                application.id,
                ApplicationStatus::InterviewPassed,
                "final outcome recorded against the wrong candidate".to_string(),
                Some("admin@agency".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(corrected.status, ApplicationStatus::InterviewPassed);
        let last = corrected.history.last();
        assert!(last.corrected);
        assert!(last.note.as_deref().unwrap().contains("correction"));

        let events = sink.0.lock().unwrap();
        assert_eq!(events.last().unwrap().action, "make_correction");
        assert_eq!(events.last().unwrap().outcome, "success");
    }
}
