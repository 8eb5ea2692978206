use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::interview::{InterviewDetail, InterviewOutcome, InterviewStatus};
use crate::store::InterviewStore;
use crate::utils::clock::Clock;

/// Optional inclusive `interview_date` window for stats queries.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterviewStats {
    pub total_scheduled: i64,
    pub today: i64,
    pub tomorrow: i64,
    pub unattended: i64,
    pub completed: i64,
    pub passed: i64,
    pub failed: i64,
    pub cancelled: i64,
}

/// Read-side helpers over interview records. Never mutates: a stale
/// interview stays `scheduled` until staff complete or cancel it.
#[derive(Clone)]
pub struct InterviewService {
    interviews: Arc<dyn InterviewStore>,
    clock: Arc<dyn Clock>,
}

impl InterviewService {
    pub fn new(interviews: Arc<dyn InterviewStore>, clock: Arc<dyn Clock>) -> Self {
        Self { interviews, clock }
    }

    /// The at-most-one live/most-recent interview for an application.
    pub async fn find_latest_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewDetail>> {
        self.interviews
            .find_latest_for_application(application_id)
            .await
    }

    pub async fn stats_for_posting(
        &self,
        job_posting_id: Uuid,
        window: DateWindow,
    ) -> Result<InterviewStats> {
        let rows = self.interviews.list_for_posting(job_posting_id).await?;
        Ok(compute_stats(&rows, window, self.clock.now()))
    }

    /// Candidate-facing list: still scheduled, not yet past, soonest first.
    pub async fn upcoming_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<InterviewDetail>> {
        let now = self.clock.now();
        let mut upcoming: Vec<InterviewDetail> = self
            .interviews
            .list_for_candidate(candidate_id)
            .await?
            .into_iter()
            .filter(|interview| {
                interview.status == InterviewStatus::Scheduled && interview.starts_at() >= now
            })
            .collect();
        upcoming.sort_by_key(|interview| interview.starts_at());
        Ok(upcoming)
    }
}

/// Pure aggregation over one posting's interview rows. `today`, `tomorrow`
/// and `unattended` are relative to the supplied evaluation time.
fn compute_stats(
    rows: &[InterviewDetail],
    window: DateWindow,
    now: DateTime<Utc>,
) -> InterviewStats {
    let today = now.date_naive();
    let tomorrow = today + Days::new(1);

    let mut stats = InterviewStats::default();
    for interview in rows {
        if !window.contains(interview.interview_date) {
            continue;
        }
        match interview.status {
            InterviewStatus::Scheduled => {
                stats.total_scheduled += 1;
                if interview.interview_date == today {
                    stats.today += 1;
                }
                if interview.interview_date == tomorrow {
                    stats.tomorrow += 1;
                }
                if interview.is_unattended(now) {
                    stats.unattended += 1;
                }
            }
            InterviewStatus::Completed => {
                stats.completed += 1;
                match interview.result {
                    Some(InterviewOutcome::Pass) => stats.passed += 1,
                    Some(InterviewOutcome::Fail) => stats.failed += 1,
                    _ => {}
                }
            }
            InterviewStatus::Cancelled => stats.cancelled += 1,
        }
    }
    stats
}
