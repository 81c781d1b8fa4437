//! Domain Models
//!
//! Payloads returned to the model by the travel tools. Fare amounts use
//! `rust_decimal`; coordinates are plain `f64`.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A point on the globe
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance in kilometres
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// A resolved place name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_name: String,
    pub display_name: String,
    #[serde(flatten)]
    pub coordinates: Coordinates,
}

/// Current conditions at a place
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeatherReport {
    pub place_name: String,
    pub temperature: Option<f64>,
    pub temperature_unit: String,
    pub precipitation_probability: Option<f64>,
    pub weather_description: String,
    pub timezone: String,
    /// Local time of the observation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<NaiveDateTime>,
}

/// A point of interest near a place
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub kind: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A one-way economy fare between two places
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FareQuote {
    pub origin: String,
    pub destination: String,
    pub distance_km: u32,
    pub estimated_price_eur: Decimal,
    /// True when the price is a model, not a live offer
    pub estimated: bool,
}
