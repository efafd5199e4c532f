use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use crate::{
    api::middleware::{ApiError, ApiResult, AppState},
    models::CreateTechnicianRequest,
};

/// Register a technician on the fan-out roster.
pub async fn create_technician(
    State(state): State<AppState>,
    Json(request): Json<CreateTechnicianRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.id.trim().is_empty() || request.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "id and name are required".to_string(),
        ));
    }

    let technician = state.db.create_technician(&request.id, &request.name).await?;

    Ok((StatusCode::CREATED, Json(technician)))
}

pub async fn list_technicians(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let technicians = state.db.list_technicians().await?;
    Ok(Json(technicians))
}

pub async fn delete_technician(
    State(state): State<AppState>,
    Path(technician_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let removed = state.db.delete_technician(&technician_id).await?;
    if !removed {
        return Err(ApiError::NotFound(format!(
            "Technician {} not found",
            technician_id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/technicians", post(create_technician))
        .route("/api/technicians", get(list_technicians))
        .route("/api/technicians/:id", delete(delete_technician))
}
