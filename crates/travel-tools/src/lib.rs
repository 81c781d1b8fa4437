//! # travel-tools
//!
//! The fixed tool set behind the travel agent:
//!
//! | tool               | source                  |
//! |--------------------|-------------------------|
//! | `get_coordinates`  | Nominatim (OpenStreetMap) |
//! | `get_weather`      | Open-Meteo              |
//! | `get_attractions`  | Overpass API            |
//! | `get_flight_price` | [`fares::FareSource`]   |
//!
//! Every tool needs a place name; the coordinate-based ones expect the
//! model to call `get_coordinates` first.

pub mod endpoints;
pub mod error;
pub mod fares;
pub mod model;
pub mod svckit;

use std::sync::Arc;

use agent_core::ToolRegistry;

pub use endpoints::Endpoints;
pub use error::{Result, TravelError};
pub use model::{Attraction, Coordinates, FareQuote, Place, WeatherReport};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{AttractionsTool, FlightPriceTool, GeocodingTool, WeatherTool};
}

/// System prompt for the travel agent
pub const TRAVEL_AGENT_PROMPT: &str = r"You are a friendly, concise travel assistant.

Use the tools to answer questions about places:

1. Always resolve a place with `get_coordinates` before calling a tool that needs coordinates.
2. If `get_coordinates` reports that a place was not found, say so and ask the user to check the spelling. Do not guess coordinates.
3. Request independent lookups (for example weather and attractions for the same place) together in one reply.
4. Flight prices from `get_flight_price` are estimates; say so.

Answer in plain conversational prose. Never show raw JSON or tool output to the user.";

/// Build the registry with every travel tool
pub fn default_registry(
    endpoints: &Endpoints,
    fares: Arc<dyn fares::FareSource>,
) -> agent_core::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(tools::GeocodingTool::new(endpoints)?)?;
    registry.register(tools::WeatherTool::new(endpoints)?)?;
    registry.register(tools::AttractionsTool::new(endpoints)?)?;
    registry.register(tools::FlightPriceTool::new(fares))?;
    Ok(registry)
}
