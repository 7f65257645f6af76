//! Itinerary generator
//!
//! Asks the LLM for one sentence per trip day and turns the answer into an
//! [`Itinerary`] with exactly one entry per requested day.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{info, instrument, warn};

use crate::llm::LlmProvider;
use crate::models::{AttractionSuggestion, Itinerary, ItineraryDay, TripRequest};
use crate::prompts::PromptTemplates;
use crate::{PlannerError, Result};

/// `Day 3: ...`, `- day 3 - ...`, `### Day 3.` once bold markers are stripped
static DAY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*#>•]+\s*)*day\s*(\d{1,3})\s*[:.)\-–—]\s*(.*?)\s*$").unwrap()
});

pub const PLACEHOLDER_SUMMARY: &str = "No plan was generated for this day; keep it free to explore.";

/// Produces a day-indexed itinerary for a trip request
pub struct ItineraryGenerator {
    llm: Arc<dyn LlmProvider>,
    prompts: Arc<PromptTemplates>,
}

impl ItineraryGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, prompts: Arc<PromptTemplates>) -> Self {
        Self { llm, prompts }
    }

    #[instrument(skip_all, fields(destination = %request.destination(), days = request.days()))]
    pub async fn generate(
        &self,
        request: &TripRequest,
        attractions: &[AttractionSuggestion],
    ) -> Result<Itinerary> {
        let prompt = self.prompts.itinerary(request, attractions)?;
        let answer = self.llm.complete(&prompt).await?;

        let parsed = parse_day_lines(&answer, request.days());
        if parsed.is_empty() {
            warn!("LLM answer contained no day lines");
            return Err(PlannerError::upstream(
                self.llm.provider_name(),
                "The answer did not contain a day-by-day plan",
            ));
        }

        let itinerary = build_itinerary(request, parsed);
        let missing = itinerary.missing_days();
        if missing > 0 {
            warn!("LLM answer skipped {} of {} days", missing, itinerary.len());
        }
        info!("Generated itinerary with {} days", itinerary.len());
        Ok(itinerary)
    }
}

/// Day summaries keyed by day index, limited to `1..=days`
///
/// The first line for a given day wins; lines with an empty summary are
/// ignored.
pub fn parse_day_lines(answer: &str, days: u8) -> BTreeMap<u8, String> {
    let mut parsed = BTreeMap::new();

    for line in answer.lines() {
        let cleaned = line.replace("**", "").replace("__", "");
        let Some(captures) = DAY_LINE.captures(&cleaned) else {
            continue;
        };

        let Ok(day_index) = captures[1].parse::<u8>() else {
            continue;
        };
        if day_index == 0 || day_index > days {
            continue;
        }

        let summary = captures[2].trim();
        if summary.is_empty() {
            continue;
        }
        parsed.entry(day_index).or_insert_with(|| summary.to_string());
    }

    parsed
}

/// One entry per trip day in order, placeholders for days the answer skipped
pub fn build_itinerary(request: &TripRequest, mut parsed: BTreeMap<u8, String>) -> Itinerary {
    let days = (1..=request.days())
        .map(|day_index| {
            let (summary, generated) = match parsed.remove(&day_index) {
                Some(summary) => (summary, true),
                None => (PLACEHOLDER_SUMMARY.to_string(), false),
            };
            ItineraryDay {
                day_index,
                date: request.date_of_day(day_index),
                summary,
                generated,
            }
        })
        .collect();

    Itinerary {
        destination: request.destination().to_string(),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TripForm;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn request(days: u8, start_date: &str) -> TripRequest {
        TripForm {
            days: days.to_string(),
            start_date: start_date.to_string(),
            ..TripForm::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_single_day() {
        let parsed = parse_day_lines("Day 1: Visit the museum.", 1);
        let itinerary = build_itinerary(&request(1, ""), parsed);

        assert_eq!(itinerary.len(), 1);
        assert_eq!(itinerary.days[0].day_index, 1);
        assert_eq!(itinerary.days[0].summary, "Visit the museum.");
        assert!(itinerary.days[0].generated);
        assert!(itinerary.days[0].date.is_none());
    }

    #[rstest]
    #[case("**Day 2:** Backwater cruise in Alleppey.")]
    #[case("- Day 2 - Backwater cruise in Alleppey.")]
    #[case("### DAY 2. Backwater cruise in Alleppey.")]
    #[case("Day 2) Backwater cruise in Alleppey.")]
    #[case("  day2: Backwater cruise in Alleppey.  ")]
    fn test_day_line_formats(#[case] line: &str) {
        let parsed = parse_day_lines(line, 4);
        assert_eq!(parsed.get(&2).map(String::as_str), Some("Backwater cruise in Alleppey."));
    }

    #[test]
    fn test_ignores_out_of_range_and_duplicates() {
        let answer = "Okay, here's your plan:\n\
            Day 0: Nothing.\n\
            Day 1: Arrive in Kochi.\n\
            Day 1: Duplicate entry.\n\
            Day 3: Tea gardens in Munnar.\n\
            Day 9: Beyond the trip.\n\
            Day 2:\n\
            Keep the response short.";
        let parsed = parse_day_lines(answer, 3);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[&1], "Arrive in Kochi.");
        assert_eq!(parsed[&3], "Tea gardens in Munnar.");
    }

    #[test]
    fn test_partial_answer_is_padded() {
        let parsed = parse_day_lines("Day 1: Arrive.\nDay 3: Leave.", 4);
        let itinerary = build_itinerary(&request(4, ""), parsed);

        let indexes: Vec<u8> = itinerary.days.iter().map(|d| d.day_index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4]);
        assert_eq!(itinerary.missing_days(), 2);
        assert!(!itinerary.days[1].generated);
        assert_eq!(itinerary.days[1].summary, PLACEHOLDER_SUMMARY);
        assert_eq!(itinerary.days[2].summary, "Leave.");
    }

    #[test]
    fn test_dates_follow_start_date() {
        let parsed = parse_day_lines("Day 1: Arrive.\nDay 2: Leave.", 2);
        let itinerary = build_itinerary(&request(2, "2026-02-28"), parsed);

        assert_eq!(itinerary.days[0].date, NaiveDate::from_ymd_opt(2026, 2, 28));
        assert_eq!(itinerary.days[1].date, NaiveDate::from_ymd_opt(2026, 3, 1));
    }

    #[test]
    fn test_every_length_has_exact_days() {
        for days in 1..=30u8 {
            let answer: String = (1..=days)
                .map(|d| format!("**Day {d}:** Explore part {d}.\n"))
                .collect();
            let itinerary = build_itinerary(&request(days, ""), parse_day_lines(&answer, days));

            assert_eq!(itinerary.len(), usize::from(days));
            for (i, day) in itinerary.days.iter().enumerate() {
                assert_eq!(usize::from(day.day_index), i + 1);
                assert!(day.generated);
            }
        }
    }
}
