//! Data models for the itinerary planner
//!
//! This module contains the core domain models organized by concern:
//! - Trip: the submitted form and the validated trip request
//! - Attraction: places records and LLM attraction suggestions
//! - Itinerary: the day-indexed plan
//! - Location: geographic coordinates

pub mod attraction;
pub mod itinerary;
pub mod location;
pub mod trip;

// Re-export all public types for convenient access
pub use attraction::{AttractionSuggestion, PlaceEnrichment, PlaceRecord};
pub use itinerary::{Itinerary, ItineraryDay};
pub use location::Location;
pub use trip::{Budget, MAX_TRIP_DAYS, MIN_TRIP_DAYS, TripForm, TripPayload, TripRequest};
