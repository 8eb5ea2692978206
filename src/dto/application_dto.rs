use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{ApplicationStatus, JobApplication, TransitionRecord};
use crate::models::interview::{
    InterviewDetail, InterviewOutcome, InterviewSchedule, InterviewStatus, SchedulePatch,
};
use crate::services::application_service::{ApplicationList, InterviewVerdict, TransitionMeta};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyPayload {
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
    pub position_id: Option<Uuid>,
    #[validate(length(min = 1, max = 1000))]
    pub note: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WithdrawPayload {
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
    #[validate(length(min = 1, max = 1000))]
    pub note: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStatusPayload {
    pub status: ApplicationStatus,
    #[validate(length(min = 1, max = 1000))]
    pub note: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleInterviewPayload {
    pub interview_date: NaiveDate,
    pub interview_time: Option<NaiveTime>,
    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[validate(length(min = 1, max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub note: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub updated_by: Option<String>,
}

impl ScheduleInterviewPayload {
    pub fn into_parts(self) -> (InterviewSchedule, TransitionMeta) {
        (
            InterviewSchedule {
                interview_date: self.interview_date,
                interview_time: self.interview_time,
                duration_minutes: self.duration_minutes,
                location: self.location,
                contact_person: self.contact_person,
                required_documents: self.required_documents,
                notes: self.notes,
            },
            TransitionMeta {
                note: self.note,
                updated_by: self.updated_by,
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RescheduleInterviewPayload {
    pub interview_date: Option<NaiveDate>,
    pub interview_time: Option<NaiveTime>,
    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub contact_person: Option<String>,
    pub required_documents: Option<Vec<String>>,
    #[validate(length(min = 1, max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub note: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub updated_by: Option<String>,
}

impl RescheduleInterviewPayload {
    pub fn into_parts(self) -> (SchedulePatch, TransitionMeta) {
        (
            SchedulePatch {
                interview_date: self.interview_date,
                interview_time: self.interview_time,
                duration_minutes: self.duration_minutes,
                location: self.location,
                contact_person: self.contact_person,
                required_documents: self.required_documents,
                notes: self.notes,
            },
            TransitionMeta {
                note: self.note,
                updated_by: self.updated_by,
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompleteInterviewPayload {
    pub result: InterviewVerdict,
    #[validate(length(min = 1, max = 1000))]
    pub note: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CorrectionPayload {
    pub status: ApplicationStatus,
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
    #[validate(length(min = 1, max = 255))]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<ApplicationStatus>,
    /// `asc` or `desc` (default) by creation time.
    pub order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
    pub position_id: Option<Uuid>,
    pub status: ApplicationStatus,
    pub history: Vec<TransitionRecord>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobApplication> for ApplicationResponse {
    fn from(application: JobApplication) -> Self {
        Self {
            id: application.id,
            candidate_id: application.candidate_id,
            job_posting_id: application.job_posting_id,
            position_id: application.position_id,
            status: application.status,
            history: application.history.records().to_vec(),
            withdrawn_at: application.withdrawn_at,
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl From<ApplicationList> for ApplicationListResponse {
    fn from(list: ApplicationList) -> Self {
        Self {
            items: list
                .items
                .into_iter()
                .map(ApplicationResponse::from)
                .collect(),
            total: list.total,
            page: list.page,
            limit: list.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub id: Uuid,
    pub job_application_id: Uuid,
    pub job_posting_id: Uuid,
    pub candidate_id: Uuid,
    pub status: InterviewStatus,
    pub result: Option<InterviewOutcome>,
    pub interview_date: NaiveDate,
    pub interview_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub contact_person: Option<String>,
    pub required_documents: Vec<String>,
    pub notes: Option<String>,
    pub rescheduled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InterviewDetail> for InterviewResponse {
    fn from(interview: InterviewDetail) -> Self {
        Self {
            id: interview.id,
            job_application_id: interview.job_application_id,
            job_posting_id: interview.job_posting_id,
            candidate_id: interview.candidate_id,
            status: interview.status,
            result: interview.result,
            interview_date: interview.interview_date,
            interview_time: interview.interview_time,
            duration_minutes: interview.duration_minutes,
            location: interview.location,
            contact_person: interview.contact_person,
            required_documents: interview.required_documents,
            notes: interview.notes,
            rescheduled_at: interview.rescheduled_at,
            completed_at: interview.completed_at,
            cancelled_at: interview.cancelled_at,
            created_at: interview.created_at,
            updated_at: interview.updated_at,
        }
    }
}
