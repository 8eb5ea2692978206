use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListQuery, ApplicationListResponse, ApplicationResponse, ApplyPayload,
        UpdateStatusPayload, WithdrawPayload,
    },
    error::Result,
    services::application_service::TransitionMeta,
    store::ApplicationPage,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application created"),
        (status = 409, description = "Candidate already applied to this posting"),
        (status = 422, description = "Job posting is not active")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .apply(
            payload.candidate_id,
            payload.job_posting_id,
            payload.position_id,
            TransitionMeta {
                note: payload.note,
                updated_by: payload.updated_by,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/applications/withdraw",
    request_body = WithdrawPayload,
    responses(
        (status = 200, description = "Application withdrawn (idempotent)"),
        (status = 404, description = "No application for this candidate and posting"),
        (status = 409, description = "Application already has a final interview outcome")
    )
)]
#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Json(payload): Json<WithdrawPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .withdraw(
            payload.candidate_id,
            payload.job_posting_id,
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
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(id).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .update_status(
            id,
            payload.status,
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
    path = "/api/candidates/{candidate_id}/applications",
    params(
        ("candidate_id" = Uuid, Path, description = "Candidate ID"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by exact status"),
        ("order" = Option<String>, Query, description = "asc or desc by creation time")
    ),
    responses(
        (status = 200, description = "Candidate's applications")
    )
)]
#[axum::debug_handler]
pub async fn list_applied(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    // Out-of-range paging is capped by the store.
    let page = ApplicationPage {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(20),
        status: query.status,
        ascending: query.order.as_deref() == Some("asc"),
    };
    let list = state
        .application_service
        .list_applied(candidate_id, page)
        .await?;
    Ok(Json(ApplicationListResponse::from(list)))
}
