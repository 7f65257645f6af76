//! Prompt templates
//!
//! Both prompts are Handlebars templates compiled into the binary. A
//! directory configured as `prompts.dir` can override either one with a file
//! of the same name (`suggestions.hbs`, `itinerary.hbs`).

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::{AttractionSuggestion, PlaceRecord, TripRequest};
use crate::{PlannerError, Result};

pub const SUGGESTIONS: &str = "suggestions";
pub const ITINERARY: &str = "itinerary";

const EMBEDDED: [(&str, &str); 2] = [
    (SUGGESTIONS, include_str!("suggestions.hbs")),
    (ITINERARY, include_str!("itinerary.hbs")),
];

#[derive(Debug, Serialize)]
struct PromptPlace {
    name: String,
    address: String,
    rating: String,
}

#[derive(Debug, Serialize)]
struct SuggestionsContext {
    destination: String,
    budget: String,
    preferences: String,
    purpose: Option<String>,
    places: Vec<PromptPlace>,
}

#[derive(Debug, Serialize)]
struct PromptAttraction {
    name: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct ItineraryContext {
    days: u8,
    destination: String,
    budget: String,
    preferences: String,
    purpose: Option<String>,
    start_location: Option<String>,
    attractions: Vec<PromptAttraction>,
}

/// Compiled prompt templates
pub struct PromptTemplates {
    hbs: Handlebars<'static>,
}

impl PromptTemplates {
    /// Templates compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::load(None)
    }

    /// Embedded templates, each replaced by `<dir>/<name>.hbs` when that file exists
    pub fn load(override_dir: Option<&Path>) -> Result<Self> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);

        for (name, embedded) in EMBEDDED {
            let override_path = override_dir.map(|dir| dir.join(format!("{name}.hbs")));
            let source = match override_path {
                Some(path) if path.exists() => {
                    info!("Using prompt override {}", path.display());
                    std::fs::read_to_string(&path)?
                }
                _ => {
                    debug!(%name, "using embedded prompt");
                    embedded.to_string()
                }
            };

            hbs.register_template_string(name, source).map_err(|e| {
                PlannerError::template(format!("Invalid prompt template '{name}': {e}"))
            })?;
        }

        Ok(Self { hbs })
    }

    /// Prompt asking the LLM to pick top attractions, optionally from a places list
    pub fn suggestions(&self, request: &TripRequest, places: &[PlaceRecord]) -> Result<String> {
        let context = SuggestionsContext {
            destination: request.destination().to_string(),
            budget: request.budget().to_string(),
            preferences: request.preferences_label(),
            purpose: request.purpose().map(str::to_string),
            places: places
                .iter()
                .map(|place| PromptPlace {
                    name: place.name.clone(),
                    address: place.address.clone().unwrap_or_else(|| "unknown".to_string()),
                    rating: place.rating_label(),
                })
                .collect(),
        };
        self.render(SUGGESTIONS, &context)
    }

    /// Prompt asking the LLM for one summary sentence per trip day
    pub fn itinerary(
        &self,
        request: &TripRequest,
        attractions: &[AttractionSuggestion],
    ) -> Result<String> {
        let context = ItineraryContext {
            days: request.days(),
            destination: request.destination().to_string(),
            budget: request.budget().to_string(),
            preferences: request.preferences_label(),
            purpose: request.purpose().map(str::to_string),
            start_location: request.start_location().map(str::to_string),
            attractions: attractions
                .iter()
                .map(|a| PromptAttraction {
                    name: a.name.clone(),
                    description: a.description.clone(),
                })
                .collect(),
        };
        self.render(ITINERARY, &context)
    }

    fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        self.hbs
            .render(name, context)
            .map_err(|e| PlannerError::template(format!("Failed to render prompt '{name}': {e}")))
    }
}
