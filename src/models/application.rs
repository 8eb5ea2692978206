use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed status set for a job application. The lifecycle is driven by the
/// adjacency table in [`ApplicationStatus::allowed_next`]; `withdrawn` is only
/// reachable through the dedicated withdraw path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    InterviewScheduled,
    InterviewRescheduled,
    InterviewPassed,
    InterviewFailed,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::InterviewRescheduled,
        ApplicationStatus::InterviewPassed,
        ApplicationStatus::InterviewFailed,
        ApplicationStatus::Withdrawn,
    ];

    /// Terminal statuses accept no ordinary transition. The correction
    /// channel is the single path out of them.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::InterviewPassed
                | ApplicationStatus::InterviewFailed
                | ApplicationStatus::Withdrawn
        )
    }

    /// Statuses whose transitions carry an interview write. Entering one of
    /// these must go through the dedicated interview operations so the
    /// application and its interview record move together.
    pub fn is_interview_stage(self) -> bool {
        matches!(
            self,
            ApplicationStatus::InterviewScheduled
                | ApplicationStatus::InterviewRescheduled
                | ApplicationStatus::InterviewPassed
                | ApplicationStatus::InterviewFailed
        )
    }

    /// Ordinary-transition adjacency. `Withdrawn` never appears as a target
    /// here: withdrawal has its own entry point and its own rules.
    pub fn allowed_next(self) -> &'static [ApplicationStatus] {
        match self {
            ApplicationStatus::Applied => &[ApplicationStatus::Shortlisted],
            ApplicationStatus::Shortlisted => &[ApplicationStatus::InterviewScheduled],
            ApplicationStatus::InterviewScheduled => &[
                ApplicationStatus::InterviewRescheduled,
                ApplicationStatus::InterviewPassed,
                ApplicationStatus::InterviewFailed,
            ],
            ApplicationStatus::InterviewRescheduled => &[
                ApplicationStatus::InterviewPassed,
                ApplicationStatus::InterviewFailed,
            ],
            ApplicationStatus::InterviewPassed
            | ApplicationStatus::InterviewFailed
            | ApplicationStatus::Withdrawn => &[],
        }
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::InterviewRescheduled => "interview_rescheduled",
            ApplicationStatus::InterviewPassed => "interview_passed",
            ApplicationStatus::InterviewFailed => "interview_failed",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an application's transition history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub prev_status: Option<ApplicationStatus>,
    pub next_status: ApplicationStatus,
    pub timestamp: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub corrected: bool,
}

/// Append-only transition history. Insertion order is the order of truth;
/// there is no API to reorder, replace or prune entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionLog(Vec<TransitionRecord>);

impl TransitionLog {
    /// A log always starts with the record that created the application.
    pub fn seeded(first: TransitionRecord) -> Self {
        Self(vec![first])
    }

    pub fn append(&mut self, record: TransitionRecord) {
        self.0.push(record);
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.0
    }

    /// Non-empty by construction, see [`TransitionLog::seeded`].
    pub fn last(&self) -> &TransitionRecord {
        self.0.last().expect("transition log is never empty")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A candidate's claim against a job posting, tracked through the status
/// lifecycle. Never physically deleted; `withdrawn` is the soft-terminal end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
    pub position_id: Option<Uuid>,
    pub status: ApplicationStatus,
    pub history: TransitionLog,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    /// Mutates the aggregate according to one committed transition record.
    /// Both store backends funnel through this so status, history and
    /// `withdrawn_at` can never drift apart.
    pub fn apply_transition(&mut self, record: TransitionRecord) {
        if record.next_status == ApplicationStatus::Withdrawn {
            self.withdrawn_at.get_or_insert(record.timestamp);
        } else if self.status == ApplicationStatus::Withdrawn {
            // Leaving `withdrawn` only happens through a correction.
            self.withdrawn_at = None;
        }
        self.status = record.next_status;
        self.updated_at = record.timestamp;
        self.history.append(record);
    }
}
