use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_result", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InterviewOutcome {
    Pass,
    Fail,
    /// Set when a withdrawal cancels a still-scheduled interview.
    Rejected,
}

/// The single interview record an application can own. Rescheduling mutates
/// this row in place; a new row is never created for the same application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewDetail {
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

/// Full schedule supplied when an interview is first created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSchedule {
    pub interview_date: NaiveDate,
    pub interview_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub contact_person: Option<String>,
    #[serde(default)]
    pub required_documents: Vec<String>,
    pub notes: Option<String>,
}

/// Partial schedule for a reschedule: only the provided fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulePatch {
    pub interview_date: Option<NaiveDate>,
    pub interview_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub contact_person: Option<String>,
    pub required_documents: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl InterviewDetail {
    /// Merges a reschedule patch, field by field, leaving absent fields
    /// untouched. Status and timestamps are handled by the engine.
    pub fn merge_patch(&mut self, patch: SchedulePatch) {
        if let Some(date) = patch.interview_date {
            self.interview_date = date;
        }
        if let Some(time) = patch.interview_time {
            self.interview_time = Some(time);
        }
        if let Some(duration) = patch.duration_minutes {
            self.duration_minutes = Some(duration);
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(contact) = patch.contact_person {
            self.contact_person = Some(contact);
        }
        if let Some(documents) = patch.required_documents {
            self.required_documents = documents;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
    }

    /// Scheduled start as a UTC instant. A missing time means the slot is
    /// only known to the day and counts from end of that day.
    pub fn starts_at(&self) -> DateTime<Utc> {
        let time = self
            .interview_time
            .unwrap_or_else(|| NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        self.interview_date.and_time(time).and_utc()
    }

    /// True when the slot has passed without the interview being completed
    /// or cancelled. Reporting only; nothing transitions stale interviews
    /// automatically, staff have to complete or cancel them explicitly.
    pub fn is_unattended(&self, now: DateTime<Utc>) -> bool {
        self.status == InterviewStatus::Scheduled && self.starts_at() < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> InterviewDetail {
        InterviewDetail {
            id: Uuid::new_v4(),
            job_application_id: Uuid::new_v4(),
            job_posting_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            status: InterviewStatus::Scheduled,
            result: None,
            interview_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            interview_time: Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            duration_minutes: Some(45),
            location: Some("Kathmandu office".to_string()),
            contact_person: Some("R. Shrestha".to_string()),
            required_documents: vec!["passport".to_string()],
            notes: None,
            rescheduled_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn merge_patch_only_touches_provided_fields() {
        let mut interview = sample();
        interview.merge_patch(SchedulePatch {
            interview_date: Some(NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()),
            location: Some("Pokhara branch".to_string()),
            ..Default::default()
        });
        assert_eq!(
            interview.interview_date,
            NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()
        );
        assert_eq!(interview.location.as_deref(), Some("Pokhara branch"));
        // Untouched fields survive.
        assert_eq!(interview.duration_minutes, Some(45));
        assert_eq!(interview.contact_person.as_deref(), Some("R. Shrestha"));
        assert_eq!(interview.required_documents, vec!["passport".to_string()]);
    }

    #[test]
    fn unattended_only_when_scheduled_and_past() {
        let mut interview = sample();
        let before = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 9, 1, 11, 0, 0).unwrap();

        assert!(!interview.is_unattended(before));
        assert!(interview.is_unattended(after));

        interview.status = InterviewStatus::Completed;
        assert!(!interview.is_unattended(after));

        interview.status = InterviewStatus::Cancelled;
        assert!(!interview.is_unattended(after));
    }

    #[test]
    fn date_only_slot_counts_from_end_of_day() {
        let mut interview = sample();
        interview.interview_time = None;
        let same_day_evening = Utc.with_ymd_and_hms(2025, 9, 1, 20, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2025, 9, 2, 0, 30, 0).unwrap();
        assert!(!interview.is_unattended(same_day_evening));
        assert!(interview.is_unattended(next_day));
    }
}
