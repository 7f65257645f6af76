//! Itinerary planner - AI travel suggestions and day-by-day itineraries
//!
//! This library collects trip parameters, asks a hosted LLM for attraction
//! suggestions cross-checked against a places API, and turns a second LLM
//! answer into a day-indexed itinerary.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod itinerary;
pub mod llm;
pub mod logging;
pub mod models;
pub mod pages;
pub mod places;
pub mod planner;
pub mod prompts;
pub mod session;
pub mod suggestions;
pub mod web;

// Re-export core types for public API
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use itinerary::ItineraryGenerator;
pub use llm::{GeminiClient, LlmProvider};
pub use models::{
    AttractionSuggestion, Budget, Itinerary, ItineraryDay, Location, PlaceEnrichment,
    PlaceRecord, TripForm, TripRequest,
};
pub use places::{GooglePlacesClient, PlacesProvider};
pub use planner::TripPlanner;
pub use suggestions::SuggestionGenerator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;
