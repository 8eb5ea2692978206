use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{ApplicationResponse, CorrectionPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/admin/applications/{id}/correction",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = CorrectionPayload,
    responses(
        (status = 200, description = "Status forced; history record flagged as corrected"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn make_correction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CorrectionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .make_correction(id, payload.status, payload.reason, payload.updated_by)
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}
