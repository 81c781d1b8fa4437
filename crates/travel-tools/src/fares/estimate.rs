//! Distance-based fare estimator
//!
//! Deterministic prices from great-circle distance. Good enough to give a
//! traveller a ballpark; every quote is flagged `estimated`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::FareSource;
use crate::error::{Result, TravelError};
use crate::model::{Coordinates, FareQuote};

/// Below this there is no sensible flight
const MIN_FLIGHT_KM: f64 = 50.0;

/// Per-km economy rates by haul (EUR)
fn rate_per_km(distance_km: u32) -> Decimal {
    match distance_km {
        0..=800 => dec!(0.14),
        801..=3000 => dec!(0.10),
        _ => dec!(0.07),
    }
}

/// Fare source that prices by distance
pub struct DistanceFareEstimator {
    /// Fixed taxes and fees added to every fare
    base_fare: Decimal,
}

impl Default for DistanceFareEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceFareEstimator {
    pub fn new() -> Self {
        Self { base_fare: dec!(35) }
    }

    pub fn price_for(&self, distance_km: u32) -> Decimal {
        (self.base_fare + Decimal::from(distance_km) * rate_per_km(distance_km)).round_dp(2)
    }
}

#[async_trait]
impl FareSource for DistanceFareEstimator {
    async fn quote(
        &self,
        origin: (&str, Coordinates),
        destination: (&str, Coordinates),
    ) -> Result<FareQuote> {
        let km = origin.1.distance_km(&destination.1);
        if km < MIN_FLIGHT_KM {
            return Err(TravelError::InvalidInput(format!(
                "{} and {} are only {km:.0} km apart; no flight needed",
                origin.0, destination.0
            )));
        }
        // Earth's half circumference fits comfortably in u32.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let distance_km = km.round() as u32;

        Ok(FareQuote {
            origin: origin.0.to_string(),
            destination: destination.0.to_string(),
            distance_km,
            estimated_price_eur: self.price_for(distance_km),
            estimated: true,
        })
    }

    fn name(&self) -> &str {
        "DistanceEstimate"
    }
}
