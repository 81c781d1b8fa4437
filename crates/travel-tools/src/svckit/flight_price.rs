//! Flight Price Tool
//!
//! One-way economy fare between two coordinates.

use std::sync::Arc;

use agent_core::{
    InputSchema, ParamKind, ParameterSchema, Result as CoreResult, Tool, ToolDescriptor, ToolInput,
};
use async_trait::async_trait;
use serde_json::Value;

use super::{coordinates_arg, text_arg};
use crate::fares::FareSource;

/// Tool for flight fare lookups
pub struct FlightPriceTool {
    source: Arc<dyn FareSource>,
}

impl FlightPriceTool {
    pub fn new(source: Arc<dyn FareSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for FlightPriceTool {
    fn descriptor(&self) -> ToolDescriptor {
        let mut parameters = Vec::new();
        for (prefix, label) in [("origin", "departure"), ("destination", "arrival")] {
            parameters.push(ParameterSchema::required(
                format!("{prefix}_name"),
                ParamKind::String,
                format!("Name of the {label} place"),
            ));
            parameters.push(ParameterSchema::required(
                format!("{prefix}_latitude"),
                ParamKind::Number,
                format!("Latitude of the {label} place"),
            ));
            parameters.push(ParameterSchema::required(
                format!("{prefix}_longitude"),
                ParamKind::Number,
                format!("Longitude of the {label} place"),
            ));
        }

        ToolDescriptor {
            name: "get_flight_price".into(),
            description: "Estimate the one-way economy flight price in EUR between two places. \
                Requires coordinates for both from get_coordinates."
                .into(),
            input_schema: InputSchema::new(parameters),
        }
    }

    async fn execute(&self, input: &ToolInput) -> CoreResult<Value> {
        let origin = (text_arg(input, "origin_name")?, coordinates_arg(input, "origin_")?);
        let destination = (
            text_arg(input, "destination_name")?,
            coordinates_arg(input, "destination_")?,
        );

        let quote = self.source.quote(origin, destination).await?;
        tracing::debug!(source = self.source.name(), price = %quote.estimated_price_eur, "Fare quoted");
        Ok(serde_json::to_value(quote)?)
    }
}
