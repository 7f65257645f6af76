//! Places lookup providers
//!
//! Suggestions are cross-checked against a [`PlacesProvider`]; the Google
//! implementation lives in [`google`].

use async_trait::async_trait;

use crate::Result;
use crate::models::{Location, PlaceRecord};

pub mod google;

pub use google::GooglePlacesClient;

/// Geocoding plus nearby point-of-interest search
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Resolve a free-text address; `None` when nothing matched
    async fn geocode(&self, address: &str) -> Result<Option<Location>>;

    /// Attractions around `center` matching `keyword`, best match first
    async fn nearby_attractions(&self, center: &Location, keyword: &str)
    -> Result<Vec<PlaceRecord>>;

    /// Name used in logs and upstream error messages
    fn provider_name(&self) -> &'static str;
}
