//! Service Kit - Agent Tools
//!
//! Travel tools implementing `agent_core::Tool`. Each one wraps a single
//! upstream service and reports failures as errors, which the dispatcher
//! turns into `{"error": ...}` results for the model.

mod attractions;
mod flight_price;
mod geocoding;
mod weather;

pub use attractions::{AttractionsTool, MAX_ATTRACTIONS};
pub use flight_price::FlightPriceTool;
pub use geocoding::GeocodingTool;
pub use weather::{WeatherTool, describe_weather_code};

use agent_core::ToolInput;
use reqwest::Response;

use crate::error::{Result, TravelError};
use crate::model::Coordinates;

pub(crate) fn text_arg<'a>(input: &'a ToolInput, key: &str) -> Result<&'a str> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TravelError::InvalidInput(format!("'{key}' must be a non-empty string")))
}

pub(crate) fn number_arg(input: &ToolInput, key: &str) -> Result<f64> {
    input
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| TravelError::InvalidInput(format!("'{key}' must be a number")))
}

/// Read `<prefix>latitude` / `<prefix>longitude` and range-check them
pub(crate) fn coordinates_arg(input: &ToolInput, prefix: &str) -> Result<Coordinates> {
    let latitude = number_arg(input, &format!("{prefix}latitude"))?;
    let longitude = number_arg(input, &format!("{prefix}longitude"))?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(TravelError::InvalidInput(format!(
            "coordinates out of range: {latitude}, {longitude}"
        )));
    }
    Ok(Coordinates::new(latitude, longitude))
}

pub(crate) fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::warn!(service, status = status.as_u16(), "Upstream request failed");
        Err(TravelError::Upstream {
            service,
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> ToolInput {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_coordinates_arg() {
        let ok = input(json!({"latitude": 38.72, "longitude": -9}));
        assert_eq!(coordinates_arg(&ok, "").unwrap(), Coordinates::new(38.72, -9.0));

        let prefixed = input(json!({"origin_latitude": 1.0, "origin_longitude": 2.0}));
        assert!(coordinates_arg(&prefixed, "origin_").is_ok());

        assert!(coordinates_arg(&input(json!({"latitude": 95.0, "longitude": 0.0})), "").is_err());
        assert!(coordinates_arg(&input(json!({"latitude": "north"})), "").is_err());
    }

    #[test]
    fn test_text_arg_rejects_blank() {
        assert!(text_arg(&input(json!({"place_name": "  "})), "place_name").is_err());
        assert_eq!(text_arg(&input(json!({"place_name": " Porto "})), "place_name").unwrap(), "Porto");
    }
}
