use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationResponse, CompleteInterviewPayload, InterviewResponse,
        RescheduleInterviewPayload, ScheduleInterviewPayload,
    },
    error::{Error, Result},
    services::application_service::TransitionMeta,
    services::interview_service::DateWindow,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications/{id}/interview",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = ScheduleInterviewPayload,
    responses(
        (status = 201, description = "Interview scheduled"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application is not shortlisted")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (schedule, meta) = payload.into_parts();
    let application = state
        .application_service
        .schedule_interview(id, schedule, meta)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/interview/{interview_id}",
    params(
        ("id" = Uuid, Path, description = "Application ID"),
        ("interview_id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = RescheduleInterviewPayload,
    responses(
        (status = 200, description = "Interview rescheduled in place"),
        (status = 404, description = "Application or interview not found"),
        (status = 409, description = "Interview belongs to another application or cannot move")
    )
)]
#[axum::debug_handler]
pub async fn reschedule_interview(
    State(state): State<AppState>,
    Path((id, interview_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RescheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (patch, meta) = payload.into_parts();
    let application = state
        .application_service
        .reschedule_interview(id, interview_id, patch, meta)
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/interview/complete",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = CompleteInterviewPayload,
    responses(
        (status = 200, description = "Interview outcome recorded"),
        (status = 404, description = "Application or interview not found"),
        (status = 409, description = "Application has no pending interview")
    )
)]
#[axum::debug_handler]
pub async fn complete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .complete_interview(
            id,
            payload.result,
            TransitionMeta {
                note: payload.note,
                updated_by: payload.updated_by,
            },
        )
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/interview",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Latest interview for the application"),
        (status = 404, description = "No interview for this application")
    )
)]
#[axum::debug_handler]
pub async fn get_latest_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let interview = state
        .interview_service
        .find_latest_for_application(id)
        .await?
        .ok_or(Error::InterviewNotFound)?;
    Ok(Json(InterviewResponse::from(interview)))
}

#[utoipa::path(
    get,
    path = "/api/postings/{posting_id}/interviews/stats",
    params(
        ("posting_id" = Uuid, Path, description = "Job posting ID"),
        ("from" = Option<String>, Query, description = "Window start (inclusive, YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Window end (inclusive, YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Interview counters for the posting")
    )
)]
#[axum::debug_handler]
pub async fn interview_stats(
    State(state): State<AppState>,
    Path(posting_id): Path<Uuid>,
    Query(window): Query<DateWindow>,
) -> Result<impl IntoResponse> {
    let stats = state
        .interview_service
        .stats_for_posting(posting_id, window)
        .await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{candidate_id}/interviews/upcoming",
    params(
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate's upcoming interviews, soonest first")
    )
)]
#[axum::debug_handler]
pub async fn upcoming_interviews(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let interviews = state
        .interview_service
        .upcoming_for_candidate(candidate_id)
        .await?;
    let body: Vec<InterviewResponse> = interviews.into_iter().map(InterviewResponse::from).collect();
    Ok(Json(body))
}
