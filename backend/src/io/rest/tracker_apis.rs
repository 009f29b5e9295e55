//! # REST API for Trackers
//!
//! Endpoints for creating, listing, marking and deleting habit trackers, plus
//! the dashboard summary and a tracker's calendar month. All routes sit behind
//! [`crate::io::auth::require_auth`].

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch},
    Json, Router,
};
use shared::{CreateTrackerRequest, DeleteTrackerResponse, TrackerCalendarRequest};
use tracing::{error, info, warn};

use crate::domain::commands::tracker::{DeleteTrackerCommand, MarkTodayCommand};
use crate::domain::TrackerError;
use crate::io::auth::AuthenticatedOwner;
use crate::io::rest::error_response;
use crate::io::rest::mappers::tracker_mapper::TrackerMapper;
use crate::AppState;

/// Create a router for tracker related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trackers", get(list_trackers).post(create_tracker))
        .route("/trackers/summary", get(get_summary))
        .route("/trackers/:id", delete(delete_tracker))
        .route("/trackers/:id/mark", patch(mark_tracker))
        .route("/trackers/:id/calendar", get(get_tracker_calendar))
}

/// Translate a domain error into a status code and error body
fn tracker_error_response(err: TrackerError) -> Response {
    match err {
        TrackerError::NotFound => error_response(StatusCode::NOT_FOUND, err.to_string(), "not_found"),
        TrackerError::Invalid(message) => {
            error_response(StatusCode::BAD_REQUEST, message, "invalid_input")
        }
        TrackerError::Rejected(rejection) => {
            error_response(StatusCode::BAD_REQUEST, rejection.to_string(), rejection.code())
        }
        TrackerError::Conflict => error_response(StatusCode::CONFLICT, err.to_string(), "conflict"),
        TrackerError::Storage(e) => {
            error!("Internal error: {:?}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "internal",
            )
        }
    }
}

/// Create a new tracker
pub async fn create_tracker(
    State(state): State<AppState>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
    payload: Result<Json<CreateTrackerRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!("POST /api/trackers - malformed body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text(), "invalid_input");
        }
    };
    info!("POST /api/trackers - request: {:?}", request);

    let command = TrackerMapper::to_create_command(request);
    match state.tracker_service.create_tracker(&owner_id, command).await {
        Ok(view) => (StatusCode::CREATED, Json(TrackerMapper::to_dto(view))).into_response(),
        Err(e) => tracker_error_response(e),
    }
}

/// List the caller's trackers
pub async fn list_trackers(
    State(state): State<AppState>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
) -> impl IntoResponse {
    info!("GET /api/trackers");

    match state.tracker_service.list_trackers(&owner_id).await {
        Ok(result) => (StatusCode::OK, Json(TrackerMapper::to_dto_list(result.trackers))).into_response(),
        Err(e) => tracker_error_response(e),
    }
}

/// Mark today on a tracker
pub async fn mark_tracker(
    State(state): State<AppState>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
    Path(tracker_id): Path<String>,
) -> impl IntoResponse {
    info!("PATCH /api/trackers/{}/mark", tracker_id);

    let command = MarkTodayCommand { tracker_id };
    match state.tracker_service.mark_today(&owner_id, command).await {
        Ok(view) => (StatusCode::OK, Json(TrackerMapper::to_dto(view))).into_response(),
        Err(e) => tracker_error_response(e),
    }
}

/// Delete a tracker
pub async fn delete_tracker(
    State(state): State<AppState>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
    Path(tracker_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/trackers/{}", tracker_id);

    let command = DeleteTrackerCommand { tracker_id };
    match state.tracker_service.delete_tracker(&owner_id, command).await {
        Ok(result) => {
            let response = DeleteTrackerResponse {
                message: result.success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => tracker_error_response(e),
    }
}

/// Overview statistics across the caller's trackers
pub async fn get_summary(
    State(state): State<AppState>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
) -> impl IntoResponse {
    info!("GET /api/trackers/summary");

    match state.tracker_service.get_summary(&owner_id).await {
        Ok(summary) => {
            (StatusCode::OK, Json(TrackerMapper::to_summary_response(summary))).into_response()
        }
        Err(e) => tracker_error_response(e),
    }
}

/// One month of a tracker, defaulting to the current month
pub async fn get_tracker_calendar(
    State(state): State<AppState>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
    Path(tracker_id): Path<String>,
    query: Result<Query<TrackerCalendarRequest>, QueryRejection>,
) -> impl IntoResponse {
    let Query(request) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text(), "invalid_input");
        }
    };
    info!("GET /api/trackers/{}/calendar - query: {:?}", tracker_id, request);

    let query = TrackerMapper::to_calendar_query(tracker_id, request);
    match state.tracker_service.get_calendar_month(&owner_id, query).await {
        Ok(result) => {
            (StatusCode::OK, Json(TrackerMapper::to_calendar_response(result))).into_response()
        }
        Err(e) => tracker_error_response(e),
    }
}
