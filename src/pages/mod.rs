//! Server-rendered planner page and its form posts

use std::collections::{BTreeMap, BTreeSet};

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::status_for;
use crate::models::{
    AttractionSuggestion, Budget, Itinerary, MAX_TRIP_DAYS, MIN_TRIP_DAYS, TripForm,
};
use crate::session::PlannerSession;
use crate::web::AppState;
use crate::{PlannerError, Result};

const INDEX: &str = "index";

#[derive(Debug, Serialize)]
struct BudgetOption {
    value: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct SuggestionView {
    name: String,
    category: String,
    description: String,
    /// "Palace Rd, Kochi · rating 4.3 · 3.1 km away"
    details: String,
    selected: bool,
}

impl SuggestionView {
    fn new(suggestion: &AttractionSuggestion, selected: &BTreeSet<String>) -> Self {
        let mut details = Vec::new();
        if let Some(enrichment) = &suggestion.enrichment {
            if let Some(address) = &enrichment.address {
                details.push(address.clone());
            }
            if let Some(rating) = enrichment.rating {
                details.push(format!("rating {rating:.1}"));
            }
            if let Some(distance) = enrichment.distance_km {
                details.push(format!("{distance:.1} km away"));
            }
        }

        Self {
            name: suggestion.name.clone(),
            category: suggestion.category.clone(),
            description: suggestion.description.clone(),
            details: details.join(" · "),
            selected: selected.contains(&suggestion.name),
        }
    }
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    form: &'a TripForm,
    budgets: Vec<BudgetOption>,
    min_days: u8,
    max_days: u8,
    errors: BTreeMap<String, String>,
    notice: Option<String>,
    suggestions: Vec<SuggestionView>,
    itinerary: Option<&'a Itinerary>,
}

/// Handlebars registry holding the page template
pub struct PageRenderer {
    hbs: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut hbs = Handlebars::new();
        hbs.register_template_string(INDEX, include_str!("index.html.hbs"))
            .map_err(|e| PlannerError::template(format!("Invalid page template: {e}")))?;
        Ok(Self { hbs })
    }

    /// Render the session, showing `form` values and an optional error
    pub fn render(
        &self,
        session: &PlannerSession,
        form: &TripForm,
        selected: &BTreeSet<String>,
        error: Option<&PlannerError>,
    ) -> Result<String> {
        let mut errors = BTreeMap::new();
        let mut notice = None;
        match error {
            Some(PlannerError::Validation { field, message }) => {
                errors.insert(field.clone(), message.clone());
            }
            Some(other) => notice = Some(other.user_message()),
            None => {}
        }

        let view = PageView {
            form,
            budgets: budget_options(&form.budget),
            min_days: MIN_TRIP_DAYS,
            max_days: MAX_TRIP_DAYS,
            errors,
            notice,
            suggestions: session
                .suggestions
                .iter()
                .map(|s| SuggestionView::new(s, selected))
                .collect(),
            itinerary: session.itinerary.as_ref(),
        };

        self.hbs
            .render(INDEX, &view)
            .map_err(|e| PlannerError::template(format!("Failed to render page: {e}")))
    }
}

fn budget_options(current: &str) -> Vec<BudgetOption> {
    Budget::ALL
        .iter()
        .map(|budget| BudgetOption {
            value: budget.as_str(),
            selected: budget.as_str().eq_ignore_ascii_case(current.trim()),
        })
        .collect()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/suggestions", post(post_suggestions))
        .route("/itinerary", post(post_itinerary))
}

fn page(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            warn!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.user_message())).into_response()
        }
    }
}

async fn index(State(state): State<AppState>) -> Response {
    let session = state.session.read().await;
    let rendered = state
        .pages
        .render(&session, &session.form, &session.selected, None);
    page(StatusCode::OK, rendered)
}

/// Prior session state plus the submitted form and the error
async fn error_page(
    state: &AppState,
    form: &TripForm,
    selected: &BTreeSet<String>,
    error: PlannerError,
) -> Response {
    let status = status_for(&error);
    if error.is_validation() {
        info!("Rejected form: {}", error);
    } else {
        warn!("Request failed: {}", error);
    }
    let session = state.session.read().await;
    let rendered = state.pages.render(&session, form, selected, Some(&error));
    page(status, rendered)
}

async fn post_suggestions(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = TripForm::from_pairs(&pairs);
    let selected = selected_names(&pairs);

    let request = match form.validate() {
        Ok(request) => request,
        Err(e) => return error_page(&state, &form, &selected, e).await,
    };

    // the session lock is not held across upstream calls
    let suggestions = match state.planner.suggest(&request).await {
        Ok(suggestions) => suggestions,
        Err(e) => return error_page(&state, &form, &selected, e).await,
    };

    let mut session = state.session.write().await;
    session.record_suggestions(form, request, suggestions);
    let rendered = state
        .pages
        .render(&session, &session.form, &session.selected, None);
    page(StatusCode::OK, rendered)
}

async fn post_itinerary(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = TripForm::from_pairs(&pairs);
    let selected = selected_names(&pairs);

    let request = match form.validate() {
        Ok(request) => request,
        Err(e) => return error_page(&state, &form, &selected, e).await,
    };

    let attractions = state.session.read().await.selected_suggestions(&selected);
    if attractions.len() < selected.len() {
        warn!(
            "{} selected attractions are not among the current suggestions",
            selected.len() - attractions.len()
        );
    }

    let itinerary = match state.planner.plan_itinerary(&request, &attractions).await {
        Ok(itinerary) => itinerary,
        Err(e) => return error_page(&state, &form, &selected, e).await,
    };

    let mut session = state.session.write().await;
    session.record_itinerary(form, request, selected, itinerary);
    let rendered = state
        .pages
        .render(&session, &session.form, &session.selected, None);
    page(StatusCode::OK, rendered)
}

fn selected_names(pairs: &[(String, String)]) -> BTreeSet<String> {
    pairs
        .iter()
        .filter(|(key, value)| key == "attraction" && !value.trim().is_empty())
        .map(|(_, value)| value.clone())
        .collect()
}
