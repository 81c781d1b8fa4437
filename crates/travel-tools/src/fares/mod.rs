//! Fare Sources
//!
//! Abstraction over where flight prices come from.

mod estimate;

pub use estimate::DistanceFareEstimator;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Coordinates, FareQuote};

/// Fare source trait (Strategy pattern)
///
/// Implement this for a live fare API; the distance estimator is the
/// default when none is configured.
#[async_trait]
pub trait FareSource: Send + Sync {
    /// Cheapest one-way economy fare between two places
    async fn quote(
        &self,
        origin: (&str, Coordinates),
        destination: (&str, Coordinates),
    ) -> Result<FareQuote>;

    /// Source name
    fn name(&self) -> &str;
}
