//! Attractions Tool
//!
//! Tourist points of interest around a coordinate, from the Overpass API.

use std::collections::HashMap;

use agent_core::{
    InputSchema, ParamKind, ParameterSchema, Result as CoreResult, Tool, ToolDescriptor, ToolInput,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{coordinates_arg, ensure_success, text_arg};
use crate::endpoints::{Endpoints, url};
use crate::error::{Result, TravelError};
use crate::model::{Attraction, Coordinates};

/// Most attractions returned per call
pub const MAX_ATTRACTIONS: usize = 5;

const DEFAULT_RADIUS_M: u32 = 5000;
const MAX_RADIUS_M: u32 = 50_000;
const TOURISM_KINDS: &str = "attraction|museum|viewpoint|gallery|theme_park";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    /// Present on ways when queried with `out center`
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

/// "theme_park" -> "Theme Park"
fn title_case(raw: &str) -> String {
    raw.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn overpass_query(at: Coordinates, radius_m: u32) -> String {
    let around = format!("(around:{radius_m},{},{})", at.latitude, at.longitude);
    format!(
        "[out:json][timeout:25];\
         (node[\"tourism\"~\"{TOURISM_KINDS}\"]{around};\
          way[\"tourism\"~\"{TOURISM_KINDS}\"]{around};);\
         out center {MAX_ATTRACTIONS};"
    )
}

fn to_attraction(element: OverpassElement) -> Attraction {
    let (latitude, longitude) = match (element.lat, element.lon, element.center) {
        (Some(lat), Some(lon), _) => (Some(lat), Some(lon)),
        (_, _, Some(c)) => (Some(c.lat), Some(c.lon)),
        _ => (None, None),
    };
    let mut tags = element.tags;
    Attraction {
        name: tags
            .remove("name")
            .unwrap_or_else(|| "Unnamed attraction".into()),
        kind: title_case(tags.get("tourism").map_or("attraction", String::as_str)),
        latitude,
        longitude,
        website: tags.remove("website"),
        description: tags.remove("description"),
    }
}

/// Tool for sights near a coordinate
pub struct AttractionsTool {
    client: Client,
    base_url: String,
}

impl AttractionsTool {
    pub fn new(endpoints: &Endpoints) -> Result<Self> {
        Ok(Self {
            client: endpoints.client(endpoints.overpass_timeout)?,
            base_url: endpoints.overpass.clone(),
        })
    }

    pub async fn near(&self, at: Coordinates, radius_m: u32) -> Result<Vec<Attraction>> {
        let query = overpass_query(at, radius_m);
        let response = self
            .client
            .post(url(&self.base_url, "/api/interpreter"))
            .form(&[("data", query)])
            .send()
            .await?;
        let body: OverpassResponse = ensure_success("Overpass", response)?.json().await?;

        Ok(body
            .elements
            .into_iter()
            .filter(|e| !e.tags.is_empty())
            .take(MAX_ATTRACTIONS)
            .map(to_attraction)
            .collect())
    }
}

#[async_trait]
impl Tool for AttractionsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_attractions".into(),
            description: "List up to five tourist attractions (museums, viewpoints, galleries, \
                theme parks) near a location. Requires coordinates from get_coordinates."
                .into(),
            input_schema: InputSchema::new(vec![
                ParameterSchema::required("latitude", ParamKind::Number, "Latitude in degrees"),
                ParameterSchema::required("longitude", ParamKind::Number, "Longitude in degrees"),
                ParameterSchema::required("place_name", ParamKind::String, "Name of the place"),
                ParameterSchema::optional(
                    "radius_m",
                    ParamKind::Integer,
                    "Search radius in metres (default 5000)",
                ),
            ]),
        }
    }

    async fn execute(&self, input: &ToolInput) -> CoreResult<Value> {
        let at = coordinates_arg(input, "")?;
        let place_name = text_arg(input, "place_name")?;
        let radius_m = match input.get("radius_m").filter(|v| !v.is_null()) {
            None => DEFAULT_RADIUS_M,
            Some(raw) => raw
                .as_u64()
                .and_then(|r| u32::try_from(r).ok())
                .filter(|r| (1..=MAX_RADIUS_M).contains(r))
                .ok_or_else(|| {
                    TravelError::InvalidInput(format!("radius_m must be between 1 and {MAX_RADIUS_M}"))
                })?,
        };

        let attractions = self.near(at, radius_m).await?;
        if attractions.is_empty() {
            return Ok(json!({
                "place_name": place_name,
                "attractions": [],
                "message": format!("No attractions found within {radius_m} m"),
            }));
        }
        Ok(json!({
            "place_name": place_name,
            "attractions": attractions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("theme_park"), "Theme Park");
        assert_eq!(title_case("museum"), "Museum");
    }

    #[test]
    fn test_query_shape() {
        let q = overpass_query(Coordinates::new(38.7, -9.1), 2000);
        assert!(q.contains("(around:2000,38.7,-9.1)"));
        assert!(q.contains("out center 5;"));
    }

    #[tokio::test]
    async fn test_parses_nodes_and_ways() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/interpreter"))
            .and(body_string_contains("tourism"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    {"type": "node", "id": 1, "lat": 38.69, "lon": -9.21,
                     "tags": {"name": "Torre de Belém", "tourism": "attraction", "website": "https://example.org"}},
                    {"type": "way", "id": 2, "center": {"lat": 38.70, "lon": -9.20},
                     "tags": {"tourism": "theme_park"}},
                    {"type": "node", "id": 3, "lat": 38.0, "lon": -9.0}
                ]
            })))
            .mount(&server)
            .await;
        let tool = AttractionsTool::new(&Endpoints::all_at(&server.uri())).unwrap();

        let out = tool
            .execute(
                json!({"latitude": 38.7, "longitude": -9.14, "place_name": "Lisbon"})
                    .as_object()
                    .unwrap(),
            )
            .await
            .unwrap();

        let list = out["attractions"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["name"], "Torre de Belém");
        assert_eq!(list[0]["website"], "https://example.org");
        assert_eq!(list[1]["name"], "Unnamed attraction");
        assert_eq!(list[1]["kind"], "Theme Park");
        assert_eq!(list[1]["latitude"], 38.70);
    }

    #[tokio::test]
    async fn test_bad_radius_rejected() {
        let tool = AttractionsTool::new(&Endpoints::all_at("http://127.0.0.1:9")).unwrap();
        for radius in [json!(0), json!(-250), json!(50_001)] {
            let err = tool
                .execute(
                    json!({"latitude": 0.0, "longitude": 0.0, "place_name": "x", "radius_m": radius})
                        .as_object()
                        .unwrap(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, agent_core::AgentError::ToolValidation(_)), "{radius}");
        }
    }
}
