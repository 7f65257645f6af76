//! Day-by-day itinerary model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of an itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// 1-based, unique within an itinerary
    pub day_index: u8,
    pub date: Option<NaiveDate>,
    /// One sentence summarizing the day
    pub summary: String,
    /// False when the LLM answer skipped this day and a placeholder was used
    pub generated: bool,
}

/// Ordered itinerary with exactly one entry per trip day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub destination: String,
    pub days: Vec<ItineraryDay>,
}

impl Itinerary {
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of days filled with a placeholder
    #[must_use]
    pub fn missing_days(&self) -> usize {
        self.days.iter().filter(|d| !d.generated).count()
    }
}
