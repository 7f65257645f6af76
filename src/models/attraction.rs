//! Places records and attraction suggestions

use serde::{Deserialize, Serialize};

use super::Location;

/// A point of interest returned by the places API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    /// Short address ("vicinity")
    pub address: Option<String>,
    /// Average user rating, 1.0 - 5.0
    pub rating: Option<f32>,
    pub location: Option<Location>,
    /// Place types, e.g. `museum`, `tourist_attraction`
    #[serde(default)]
    pub types: Vec<String>,
}

impl PlaceRecord {
    /// Rating for display, "N/A" when unrated
    #[must_use]
    pub fn rating_label(&self) -> String {
        self.rating
            .map_or_else(|| "N/A".to_string(), |rating| format!("{rating:.1}"))
    }

    /// First descriptive place type, humanized ("art_gallery" -> "art gallery")
    #[must_use]
    pub fn primary_category(&self) -> Option<String> {
        self.types
            .iter()
            .find(|t| !matches!(t.as_str(), "point_of_interest" | "establishment"))
            .map(|t| t.replace('_', " "))
    }
}

/// Places data attached to a suggestion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceEnrichment {
    pub address: Option<String>,
    pub rating: Option<f32>,
    /// Distance from the destination centre
    pub distance_km: Option<f64>,
}

/// One attraction proposed by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionSuggestion {
    /// 1-based position in the LLM's answer
    #[serde(default)]
    pub rank: usize,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Absent when the places lookup had no matching record
    #[serde(default)]
    pub enrichment: Option<PlaceEnrichment>,
}

fn default_category() -> String {
    "attraction".to_string()
}

impl AttractionSuggestion {
    /// A bare suggestion known only by name, e.g. picked on the command line
    #[must_use]
    pub fn named(rank: usize, name: impl Into<String>) -> Self {
        Self {
            rank,
            name: name.into(),
            description: String::new(),
            category: default_category(),
            enrichment: None,
        }
    }

    #[must_use]
    pub fn is_enriched(&self) -> bool {
        self.enrichment.is_some()
    }
}
