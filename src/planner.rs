//! Trip planner facade used by the CLI and the web UI

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::itinerary::ItineraryGenerator;
use crate::llm::{GeminiClient, LlmProvider};
use crate::models::{AttractionSuggestion, Itinerary, TripRequest};
use crate::places::{GooglePlacesClient, PlacesProvider};
use crate::prompts::PromptTemplates;
use crate::suggestions::{SuggestionGenerator, SuggestionSettings};
use crate::Result;

/// Suggestion and itinerary generation over shared providers
pub struct TripPlanner {
    suggestions: SuggestionGenerator,
    itinerary: ItineraryGenerator,
}

impl TripPlanner {
    /// Wire the generators to the given providers
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        places: Option<Arc<dyn PlacesProvider>>,
        config: &PlannerConfig,
    ) -> Result<Self> {
        let prompts = Arc::new(PromptTemplates::load(
            config.prompts.dir.as_deref().map(Path::new),
        )?);

        let settings = SuggestionSettings {
            max_places: config.places.max_places as usize,
            max_suggestions: config.defaults.max_suggestions as usize,
            default_query: config.places.default_query.clone(),
        };

        Ok(Self {
            suggestions: SuggestionGenerator::new(llm.clone(), places, prompts.clone(), settings),
            itinerary: ItineraryGenerator::new(llm, prompts),
        })
    }

    /// Build the Gemini and Google Places clients described by `config`
    ///
    /// The places lookup is skipped when disabled; a missing places key only
    /// disables it with a warning, a missing Gemini key is an error.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let llm: Arc<dyn LlmProvider> =
            Arc::new(GeminiClient::new(&config.llm, config.require_llm_key()?)?);

        let places: Option<Arc<dyn PlacesProvider>> = if !config.places.enabled {
            info!("Places lookup disabled by configuration");
            None
        } else {
            match config.require_places_key() {
                Ok(key) => {
                    let client: Arc<dyn PlacesProvider> =
                        Arc::new(GooglePlacesClient::new(&config.places, key)?);
                    Some(client)
                }
                Err(e) => {
                    warn!("{}; suggestions will not be cross-checked", e);
                    None
                }
            }
        };

        Self::new(llm, places, config)
    }

    /// Ranked attractions for the trip
    pub async fn suggest(&self, request: &TripRequest) -> Result<Vec<AttractionSuggestion>> {
        self.suggestions.suggest(request).await
    }

    /// Day-by-day plan covering the selected attractions
    pub async fn plan_itinerary(
        &self,
        request: &TripRequest,
        attractions: &[AttractionSuggestion],
    ) -> Result<Itinerary> {
        self.itinerary.generate(request, attractions).await
    }
}
