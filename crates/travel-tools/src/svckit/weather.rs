//! Weather Tool
//!
//! Current conditions from Open-Meteo.

use agent_core::{
    InputSchema, ParamKind, ParameterSchema, Result as CoreResult, Tool, ToolDescriptor, ToolInput,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{coordinates_arg, ensure_success, text_arg};
use crate::endpoints::{Endpoints, url};
use crate::error::{Result, TravelError};
use crate::model::{Coordinates, WeatherReport};

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: Option<String>,
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    time: Option<String>,
    temperature_2m: Option<f64>,
    precipitation_probability: Option<f64>,
    weather_code: Option<u16>,
}

/// WMO weather interpretation code to text
pub const fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        95 => "Thunderstorm",
        _ => "Unknown",
    }
}

/// Tool for current weather at a coordinate
pub struct WeatherTool {
    client: Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new(endpoints: &Endpoints) -> Result<Self> {
        Ok(Self {
            client: endpoints.client(endpoints.timeout)?,
            base_url: endpoints.open_meteo.clone(),
        })
    }

    pub async fn current(&self, at: Coordinates, place_name: &str) -> Result<WeatherReport> {
        let response = self
            .client
            .get(url(&self.base_url, "/v1/forecast"))
            .query(&[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                (
                    "current",
                    "temperature_2m,precipitation_probability,weather_code".to_string(),
                ),
                ("temperature_unit", "celsius".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;
        let forecast: ForecastResponse = ensure_success("Open-Meteo", response)?.json().await?;

        let current = forecast.current.ok_or_else(|| TravelError::BadResponse {
            service: "Open-Meteo",
            detail: "missing current conditions".into(),
        })?;

        Ok(WeatherReport {
            place_name: place_name.to_string(),
            temperature: current.temperature_2m,
            temperature_unit: "°C".into(),
            precipitation_probability: Some(current.precipitation_probability.unwrap_or(0.0)),
            weather_description: describe_weather_code(current.weather_code.unwrap_or(0)).into(),
            timezone: forecast.timezone.unwrap_or_else(|| "UTC".into()),
            observed_at: current
                .time
                .as_deref()
                .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok()),
        })
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_weather".into(),
            description: "Get the current temperature, conditions and chance of rain at a location. \
                Requires coordinates from get_coordinates."
                .into(),
            input_schema: InputSchema::new(vec![
                ParameterSchema::required("latitude", ParamKind::Number, "Latitude in degrees"),
                ParameterSchema::required("longitude", ParamKind::Number, "Longitude in degrees"),
                ParameterSchema::required("place_name", ParamKind::String, "Name of the place"),
            ]),
        }
    }

    async fn execute(&self, input: &ToolInput) -> CoreResult<Value> {
        let at = coordinates_arg(input, "")?;
        let place_name = text_arg(input, "place_name")?;
        let report = self.current(at, place_name).await?;
        Ok(serde_json::to_value(report)?)
    }
}
