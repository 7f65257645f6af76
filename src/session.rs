//! In-memory state of the planning session

use std::collections::BTreeSet;

use crate::models::{AttractionSuggestion, Itinerary, TripForm, TripRequest};

/// Last successful results, kept so a failed request can re-render them
#[derive(Debug, Clone, Default)]
pub struct PlannerSession {
    /// Values last shown in the form
    pub form: TripForm,
    /// Request the current suggestions were generated for
    pub request: Option<TripRequest>,
    pub suggestions: Vec<AttractionSuggestion>,
    pub itinerary: Option<Itinerary>,
    /// Suggestion names picked for the current itinerary
    pub selected: BTreeSet<String>,
}

impl PlannerSession {
    /// Store fresh suggestions; an itinerary for a different trip is dropped
    pub fn record_suggestions(
        &mut self,
        form: TripForm,
        request: TripRequest,
        suggestions: Vec<AttractionSuggestion>,
    ) {
        if self.request.as_ref() != Some(&request) {
            self.itinerary = None;
            self.selected.clear();
        }
        self.form = form;
        self.request = Some(request);
        self.suggestions = suggestions;
    }

    /// Store a fresh itinerary and the selection it was built from
    pub fn record_itinerary(
        &mut self,
        form: TripForm,
        request: TripRequest,
        selected: BTreeSet<String>,
        itinerary: Itinerary,
    ) {
        self.form = form;
        self.request = Some(request);
        self.selected = selected;
        self.itinerary = Some(itinerary);
    }

    /// Current suggestions whose names were picked, in ranking order
    #[must_use]
    pub fn selected_suggestions(&self, names: &BTreeSet<String>) -> Vec<AttractionSuggestion> {
        self.suggestions
            .iter()
            .filter(|s| names.contains(&s.name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItineraryDay;

    fn request(destination: &str) -> (TripForm, TripRequest) {
        let form = TripForm {
            destination: destination.to_string(),
            ..TripForm::default()
        };
        let request = form.validate().unwrap();
        (form, request)
    }

    fn itinerary() -> Itinerary {
        Itinerary {
            destination: "Kerala".to_string(),
            days: vec![ItineraryDay {
                day_index: 1,
                date: None,
                summary: "Arrive.".to_string(),
                generated: true,
            }],
        }
    }

    #[test]
    fn test_new_trip_drops_old_itinerary() {
        let mut session = PlannerSession::default();
        let (form, req) = request("Kerala");
        session.record_itinerary(form.clone(), req.clone(), BTreeSet::new(), itinerary());

        // same trip keeps the itinerary
        session.record_suggestions(form, req, vec![AttractionSuggestion::named(1, "Fort Kochi")]);
        assert!(session.itinerary.is_some());

        let (form, req) = request("Goa");
        session.record_suggestions(form, req, vec![AttractionSuggestion::named(1, "Baga Beach")]);
        assert!(session.itinerary.is_none());
        assert_eq!(session.form.destination, "Goa");
    }

    #[test]
    fn test_selected_suggestions_keep_rank_order() {
        let mut session = PlannerSession::default();
        let (form, req) = request("Kerala");
        session.record_suggestions(
            form,
            req,
            vec![
                AttractionSuggestion::named(1, "Fort Kochi"),
                AttractionSuggestion::named(2, "Munnar"),
                AttractionSuggestion::named(3, "Alleppey"),
            ],
        );

        let names: BTreeSet<String> = ["Alleppey", "Fort Kochi", "Unknown"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let selected = session.selected_suggestions(&names);
        let picked: Vec<&str> = selected.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(picked, vec!["Fort Kochi", "Alleppey"]);
    }
}
