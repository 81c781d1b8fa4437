//! Geocoding Tool
//!
//! Resolves a place name to coordinates with Nominatim.

use agent_core::{
    InputSchema, ParamKind, ParameterSchema, Result as CoreResult, Tool, ToolDescriptor, ToolInput,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{ensure_success, text_arg};
use crate::endpoints::{Endpoints, url};
use crate::error::{Result, TravelError};
use crate::model::{Coordinates, Place};

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// Tool for turning a place name into latitude and longitude
pub struct GeocodingTool {
    client: Client,
    base_url: String,
}

impl GeocodingTool {
    pub fn new(endpoints: &Endpoints) -> Result<Self> {
        Ok(Self {
            client: endpoints.client(endpoints.timeout)?,
            base_url: endpoints.nominatim.clone(),
        })
    }

    /// Best match for `place_name`
    pub async fn lookup(&self, place_name: &str) -> Result<Place> {
        let response = self
            .client
            .get(url(&self.base_url, "/search"))
            .query(&[("q", place_name), ("format", "json"), ("limit", "1")])
            .send()
            .await?;
        let hits: Vec<NominatimHit> = ensure_success("Nominatim", response)?.json().await?;

        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| TravelError::PlaceNotFound(place_name.to_string()))?;
        let parse = |raw: &str| {
            raw.parse::<f64>().map_err(|_| TravelError::BadResponse {
                service: "Nominatim",
                detail: format!("non-numeric coordinate '{raw}'"),
            })
        };

        Ok(Place {
            place_name: place_name.to_string(),
            display_name: hit.display_name,
            coordinates: Coordinates::new(parse(&hit.lat)?, parse(&hit.lon)?),
        })
    }
}

#[async_trait]
impl Tool for GeocodingTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_coordinates".into(),
            description: "Look up the latitude and longitude of a place by name. \
                Call this before any tool that needs coordinates. \
                Returns an error if the place cannot be found."
                .into(),
            input_schema: InputSchema::new(vec![ParameterSchema::required(
                "place_name",
                ParamKind::String,
                "Name of a city, region or landmark (e.g. 'Lisbon')",
            )]),
        }
    }

    async fn execute(&self, input: &ToolInput) -> CoreResult<Value> {
        let place_name = text_arg(input, "place_name")?;
        let place = self.lookup(place_name).await?;
        tracing::debug!(place = %place.display_name, "Geocoded");
        Ok(serde_json::to_value(place)?)
    }
}
