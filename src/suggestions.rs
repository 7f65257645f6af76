//! Suggestion generator
//!
//! Looks up attractions around the destination, asks the LLM to pick the ones
//! matching the traveller's style and cross-references its answer against the
//! places records.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::llm::LlmProvider;
use crate::models::{AttractionSuggestion, Location, PlaceEnrichment, PlaceRecord, TripRequest};
use crate::places::PlacesProvider;
use crate::prompts::PromptTemplates;
use crate::{PlannerError, Result};

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•+]|\d{1,2}[.)])\s+(.+?)\s*$").unwrap());

static TRAILING_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^()]*\)\s*$").unwrap());

const DEFAULT_CATEGORY: &str = "attraction";

/// Knobs for the suggestion step
#[derive(Debug, Clone)]
pub struct SuggestionSettings {
    /// Places passed to the LLM
    pub max_places: usize,
    /// Suggestions kept from the LLM answer
    pub max_suggestions: usize,
    /// Keyword prefix for the nearby search
    pub default_query: String,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            max_places: 5,
            max_suggestions: 10,
            default_query: "tourist attraction".to_string(),
        }
    }
}

/// Produces ranked attraction suggestions for a trip request
pub struct SuggestionGenerator {
    llm: Arc<dyn LlmProvider>,
    places: Option<Arc<dyn PlacesProvider>>,
    prompts: Arc<PromptTemplates>,
    settings: SuggestionSettings,
}

/// Destination centre and the places found around it
struct PlacesLookup {
    center: Option<Location>,
    records: Vec<PlaceRecord>,
}

impl SuggestionGenerator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        places: Option<Arc<dyn PlacesProvider>>,
        prompts: Arc<PromptTemplates>,
        settings: SuggestionSettings,
    ) -> Self {
        Self {
            llm,
            places,
            prompts,
            settings,
        }
    }

    /// Ranked suggestions, enriched with places data where a record matches
    #[instrument(skip(self, request), fields(destination = %request.destination()))]
    pub async fn suggest(&self, request: &TripRequest) -> Result<Vec<AttractionSuggestion>> {
        let lookup = self.lookup_places(request).await?;

        let prompt = self.prompts.suggestions(request, &lookup.records)?;
        let answer = self.llm.complete(&prompt).await?;

        let mut suggestions = parse_suggestions(&answer, self.settings.max_suggestions);
        if suggestions.is_empty() {
            warn!("LLM answer contained no attraction lines");
            return Err(PlannerError::upstream(
                self.llm.provider_name(),
                "The answer did not contain any attractions",
            ));
        }

        enrich(&mut suggestions, &lookup.records, lookup.center.as_ref());
        info!(
            "Generated {} suggestions ({} enriched)",
            suggestions.len(),
            suggestions.iter().filter(|s| s.is_enriched()).count()
        );
        Ok(suggestions)
    }

    async fn lookup_places(&self, request: &TripRequest) -> Result<PlacesLookup> {
        let Some(places) = &self.places else {
            debug!("Places lookup disabled");
            return Ok(PlacesLookup {
                center: None,
                records: Vec::new(),
            });
        };

        let Some(center) = places.geocode(request.destination()).await? else {
            return Ok(PlacesLookup {
                center: None,
                records: Vec::new(),
            });
        };

        let keyword = self.keyword(request);
        let mut records = places.nearby_attractions(&center, &keyword).await?;
        records.truncate(self.settings.max_places);

        Ok(PlacesLookup {
            center: Some(center),
            records,
        })
    }

    fn keyword(&self, request: &TripRequest) -> String {
        if request.preferences().is_empty() {
            self.settings.default_query.clone()
        } else {
            format!(
                "{} {}",
                self.settings.default_query,
                request
                    .preferences()
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            )
        }
    }
}

/// Parse a markdown bullet list of `Name | Category | Note` lines
///
/// Lines without a `|` fall back to `Name - note` or `Name: note`. Order is
/// kept as ranking; repeated names are dropped.
pub fn parse_suggestions(answer: &str, limit: usize) -> Vec<AttractionSuggestion> {
    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();

    for line in answer.lines() {
        if suggestions.len() >= limit {
            break;
        }

        let cleaned = line.replace("**", "").replace("__", "");
        let Some(captures) = BULLET.captures(&cleaned) else {
            continue;
        };
        let body = captures[1].trim();

        let (name, category, description) = split_fields(body);
        let name = TRAILING_PARENTHETICAL.replace(name, "").trim().to_string();
        if name.is_empty() || !seen.insert(normalize(&name)) {
            continue;
        }

        suggestions.push(AttractionSuggestion {
            rank: suggestions.len() + 1,
            name,
            description: description.trim().to_string(),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string(),
            enrichment: None,
        });
    }

    suggestions
}

fn split_fields(body: &str) -> (&str, Option<&str>, &str) {
    if body.contains('|') {
        let parts: Vec<&str> = body.splitn(3, '|').map(str::trim).collect();
        return match parts.as_slice() {
            [name, category, note] => (name, Some(category), note),
            [name, note] => (name, None, note),
            _ => (body, None, ""),
        };
    }

    for separator in [" - ", " – ", " — ", ": "] {
        if let Some((name, note)) = body.split_once(separator) {
            return (name, None, note);
        }
    }
    (body, None, "")
}

/// Lowercase alphanumeric words
fn words(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize(name: &str) -> String {
    words(name).join(" ")
}

/// Same words, or the shorter name is a run of at least two whole words in the longer
fn names_match(suggestion: &str, place: &str) -> bool {
    let (a, b) = (words(suggestion), words(place));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    short.len() >= 2 && long.windows(short.len()).any(|run| run == short.as_slice())
}

/// Attach address, rating and distance from the best matching place record
pub fn enrich(
    suggestions: &mut [AttractionSuggestion],
    records: &[PlaceRecord],
    center: Option<&Location>,
) {
    for suggestion in suggestions.iter_mut() {
        let name = normalize(&suggestion.name);
        let Some(record) = records
            .iter()
            .find(|record| normalize(&record.name) == name)
            .or_else(|| {
                records
                    .iter()
                    .find(|record| names_match(&suggestion.name, &record.name))
            })
        else {
            continue;
        };

        if suggestion.category == DEFAULT_CATEGORY {
            if let Some(category) = record.primary_category() {
                suggestion.category = category;
            }
        }

        let distance_km = match (center, &record.location) {
            (Some(center), Some(location)) => Some(center.distance_km(location)),
            _ => None,
        };

        suggestion.enrichment = Some(PlaceEnrichment {
            address: record.address.clone(),
            rating: record.rating,
            distance_km,
        });
    }
}
