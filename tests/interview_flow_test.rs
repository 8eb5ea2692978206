mod common;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use placement_backend::error::Error;
use placement_backend::models::application::ApplicationStatus;
use placement_backend::models::interview::{
    InterviewOutcome, InterviewSchedule, InterviewStatus, SchedulePatch,
};
use placement_backend::services::application_service::{InterviewVerdict, TransitionMeta};
use placement_backend::services::interview_service::{DateWindow, InterviewStats};

use common::{harness, Harness};

fn meta(updated_by: &str) -> TransitionMeta {
    TransitionMeta {
        note: None,
        updated_by: Some(updated_by.to_string()),
    }
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn schedule(interview_date: &str, interview_time: Option<&str>) -> InterviewSchedule {
    InterviewSchedule {
        interview_date: date(interview_date),
        interview_time: interview_time
            .map(|value| NaiveTime::parse_from_str(value, "%H:%M").unwrap()),
        duration_minutes: Some(45),
        location: Some("Room 2, agency office".to_string()),
        contact_person: Some("Front desk".to_string()),
        required_documents: vec!["passport".to_string()],
        notes: Some("bring originals".to_string()),
    }
}

/// Runs a candidate up to `interview_scheduled` and returns the application id.
async fn scheduled_application(h: &Harness, posting: Uuid, slot: InterviewSchedule) -> Uuid {
    let candidate = Uuid::new_v4();
    let application = h
        .applications
        .apply(candidate, posting, None, meta("candidate"))
        .await
        .unwrap();
    h.applications
        .update_status(application.id, ApplicationStatus::Shortlisted, meta("agency"))
        .await
        .unwrap();
    h.applications
        .schedule_interview(application.id, slot, meta("agency"))
        .await
        .unwrap();
    application.id
}

#[tokio::test]
async fn scheduling_persists_the_slot_against_the_application() {
    let h = harness();
    let posting = Uuid::new_v4();
    let application_id =
        scheduled_application(&h, posting, schedule("2025-09-01", Some("10:30"))).await;

    let interview = h
        .interviews
        .find_latest_for_application(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(interview.job_application_id, application_id);
    assert_eq!(interview.job_posting_id, posting);
    assert_eq!(interview.status, InterviewStatus::Scheduled);
    assert_eq!(interview.result, None);
    assert_eq!(interview.interview_date, date("2025-09-01"));
    assert_eq!(
        interview.interview_time,
        Some(NaiveTime::parse_from_str("10:30", "%H:%M").unwrap())
    );
    assert_eq!(interview.required_documents, vec!["passport".to_string()]);
    assert_eq!(interview.rescheduled_at, None);
}

#[tokio::test]
async fn reschedule_moves_the_same_record_in_place() {
    let h = harness();
    let application_id =
        scheduled_application(&h, Uuid::new_v4(), schedule("2025-09-01", Some("10:30"))).await;
    let interview = h
        .interviews
        .find_latest_for_application(application_id)
        .await
        .unwrap()
        .unwrap();

    let application = h
        .applications
        .reschedule_interview(
            application_id,
            interview.id,
            SchedulePatch {
                interview_date: Some(date("2025-09-03")),
                location: Some("Room 5".to_string()),
                ..Default::default()
            },
            meta("agency"),
        )
        .await
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::InterviewRescheduled);

    let moved = h
        .interviews
        .find_latest_for_application(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.id, interview.id);
    assert_eq!(moved.status, InterviewStatus::Scheduled);
    assert_eq!(moved.interview_date, date("2025-09-03"));
    assert_eq!(moved.location.as_deref(), Some("Room 5"));
    // Untouched fields survive the patch.
    assert_eq!(moved.interview_time, interview.interview_time);
    assert_eq!(moved.contact_person, interview.contact_person);
    assert_eq!(moved.rescheduled_at, Some(h.now));
}

#[tokio::test]
async fn second_reschedule_is_rejected() {
    let h = harness();
    let application_id =
        scheduled_application(&h, Uuid::new_v4(), schedule("2025-09-01", None)).await;
    let interview = h
        .interviews
        .find_latest_for_application(application_id)
        .await
        .unwrap()
        .unwrap();

    h.applications
        .reschedule_interview(
            application_id,
            interview.id,
            SchedulePatch {
                interview_date: Some(date("2025-09-03")),
                ..Default::default()
            },
            meta("agency"),
        )
        .await
        .unwrap();

    let err = h
        .applications
        .reschedule_interview(
            application_id,
            interview.id,
            SchedulePatch {
                interview_date: Some(date("2025-09-05")),
                ..Default::default()
            },
            meta("agency"),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: ApplicationStatus::InterviewRescheduled,
            to: ApplicationStatus::InterviewRescheduled,
        }
    ));
}

#[tokio::test]
async fn reschedule_rejects_a_foreign_interview() {
    let h = harness();
    let first = scheduled_application(&h, Uuid::new_v4(), schedule("2025-09-01", None)).await;
    let second = scheduled_application(&h, Uuid::new_v4(), schedule("2025-09-02", None)).await;
    let foreign = h
        .interviews
        .find_latest_for_application(second)
        .await
        .unwrap()
        .unwrap();

    let err = h
        .applications
        .reschedule_interview(first, foreign.id, SchedulePatch::default(), meta("agency"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InterviewOwnershipMismatch));
}

#[tokio::test]
async fn withdrawal_cancels_the_scheduled_interview() {
    let h = harness();
    let posting = Uuid::new_v4();
    let application_id = scheduled_application(&h, posting, schedule("2025-09-01", None)).await;
    let application = h.applications.get(application_id).await.unwrap();

    let withdrawn = h
        .applications
        .withdraw(application.candidate_id, posting, meta("candidate"))
        .await
        .unwrap();
    assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);

    let interview = h
        .interviews
        .find_latest_for_application(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(interview.status, InterviewStatus::Cancelled);
    assert_eq!(interview.result, Some(InterviewOutcome::Rejected));
    assert_eq!(interview.cancelled_at, Some(h.now));
}

#[tokio::test]
async fn completion_after_reschedule_records_a_failed_outcome() {
    let h = harness();
    let application_id =
        scheduled_application(&h, Uuid::new_v4(), schedule("2025-09-01", None)).await;
    let interview = h
        .interviews
        .find_latest_for_application(application_id)
        .await
        .unwrap()
        .unwrap();
    h.applications
        .reschedule_interview(
            application_id,
            interview.id,
            SchedulePatch {
                interview_date: Some(date("2025-09-04")),
                ..Default::default()
            },
            meta("agency"),
        )
        .await
        .unwrap();

    let application = h
        .applications
        .complete_interview(application_id, InterviewVerdict::Failed, meta("agency"))
        .await
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::InterviewFailed);

    let completed = h
        .interviews
        .find_latest_for_application(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.id, interview.id);
    assert_eq!(completed.status, InterviewStatus::Completed);
    assert_eq!(completed.result, Some(InterviewOutcome::Fail));
}

#[tokio::test]
async fn upcoming_skips_past_and_cancelled_slots() {
    // Clock pinned at 2025-08-20 09:00 UTC by the harness.
    let h = harness();
    let posting_a = Uuid::new_v4();
    let posting_b = Uuid::new_v4();
    let posting_c = Uuid::new_v4();
    let candidate = Uuid::new_v4();

    // One per posting so the pair constraint does not interfere.
    for (posting, slot) in [
        // This morning, already past.
        (posting_a, schedule("2025-08-20", Some("08:00"))),
        // Later the same day, date-only so it counts until midnight.
        (posting_b, schedule("2025-08-20", None)),
        (posting_c, schedule("2025-08-25", Some("14:00"))),
    ] {
        let application = h
            .applications
            .apply(candidate, posting, None, meta("candidate"))
            .await
            .unwrap();
        h.applications
            .update_status(application.id, ApplicationStatus::Shortlisted, meta("agency"))
            .await
            .unwrap();
        h.applications
            .schedule_interview(application.id, slot, meta("agency"))
            .await
            .unwrap();
    }
    // Cancel the latest one via withdrawal.
    h.applications
        .withdraw(candidate, posting_c, meta("candidate"))
        .await
        .unwrap();

    let upcoming = h.interviews.upcoming_for_candidate(candidate).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].job_posting_id, posting_b);
    assert_eq!(upcoming[0].interview_date, date("2025-08-20"));
}

#[tokio::test]
async fn posting_stats_bucket_by_status_and_day() {
    // Clock pinned at 2025-08-20 09:00 UTC by the harness.
    let h = harness();
    let posting = Uuid::new_v4();

    let _today = scheduled_application(&h, posting, schedule("2025-08-20", Some("15:00"))).await;
    let _tomorrow = scheduled_application(&h, posting, schedule("2025-08-21", None)).await;
    // Yesterday, still scheduled, so it shows up as unattended.
    let _stale = scheduled_application(&h, posting, schedule("2025-08-19", Some("10:00"))).await;
    let passed = scheduled_application(&h, posting, schedule("2025-08-18", Some("09:00"))).await;
    h.applications
        .complete_interview(passed, InterviewVerdict::Passed, meta("agency"))
        .await
        .unwrap();
    let withdrawn = scheduled_application(&h, posting, schedule("2025-08-22", None)).await;
    let withdrawn = h.applications.get(withdrawn).await.unwrap();
    h.applications
        .withdraw(withdrawn.candidate_id, posting, meta("candidate"))
        .await
        .unwrap();
    // Another posting entirely; must not leak into the stats.
    let _other = scheduled_application(&h, Uuid::new_v4(), schedule("2025-08-20", None)).await;

    let stats = h
        .interviews
        .stats_for_posting(posting, DateWindow::default())
        .await
        .unwrap();
    assert_eq!(
        stats,
        InterviewStats {
            total_scheduled: 3,
            today: 1,
            tomorrow: 1,
            unattended: 1,
            completed: 1,
            passed: 1,
            failed: 0,
            cancelled: 1,
        }
    );

    // Narrowing the window to today drops everything else.
    let windowed = h
        .interviews
        .stats_for_posting(
            posting,
            DateWindow {
                from: Some(date("2025-08-20")),
                to: Some(date("2025-08-20")),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        windowed,
        InterviewStats {
            total_scheduled: 1,
            today: 1,
            tomorrow: 0,
            unattended: 0,
            completed: 0,
            passed: 0,
            failed: 0,
            cancelled: 0,
        }
    );
}
