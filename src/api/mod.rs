//! JSON endpoints mirroring the form posts

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PlannerError;
use crate::models::{AttractionSuggestion, Itinerary, TripForm, TripPayload};
use crate::web::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Offending form field for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItineraryRequest {
    pub trip: TripPayload,
    #[serde(default)]
    pub attractions: Vec<AttractionSuggestion>,
}

/// HTTP status for a planner error
#[must_use]
pub fn status_for(error: &PlannerError) -> StatusCode {
    match error {
        PlannerError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PlannerError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

struct ApiError(PlannerError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("API request failed: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.user_message(),
            field: self.0.field().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

impl From<PlannerError> for ApiError {
    fn from(error: PlannerError) -> Self {
        Self(error)
    }
}

/// Undecodable bodies answer with the same JSON error shape as bad fields
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PlannerError::validation("body", rejection.body_text()))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suggestions", post(post_suggestions))
        .route("/itinerary", post(post_itinerary))
}

async fn post_suggestions(
    State(state): State<AppState>,
    payload: Result<Json<TripPayload>, JsonRejection>,
) -> Result<Json<Vec<AttractionSuggestion>>, ApiError> {
    let Json(payload) = payload?;
    let request = TripForm::from(payload).validate()?;
    let suggestions = state.planner.suggest(&request).await?;
    Ok(Json(suggestions))
}

async fn post_itinerary(
    State(state): State<AppState>,
    payload: Result<Json<ItineraryRequest>, JsonRejection>,
) -> Result<Json<Itinerary>, ApiError> {
    let Json(payload) = payload?;
    let request = TripForm::from(payload.trip).validate()?;
    let itinerary = state
        .planner
        .plan_itinerary(&request, &payload.attractions)
        .await?;
    Ok(Json(itinerary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for() {
        assert_eq!(
            status_for(&PlannerError::validation("days", "bad")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&PlannerError::upstream("Gemini", "down")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&PlannerError::template("broken")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
