//! Upstream API locations and the shared HTTP client.

use std::time::Duration;

use reqwest::Client;

use crate::error::{Result, TravelError};

/// Nominatim's usage policy requires an identifying agent.
pub const USER_AGENT: &str = "TourismAgentSystem/1.0";

/// Base URLs and timeouts for the public data services
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub nominatim: String,
    pub open_meteo: String,
    pub overpass: String,
    pub timeout: Duration,
    /// Overpass queries are slow; they get their own budget
    pub overpass_timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            nominatim: "https://nominatim.openstreetmap.org".into(),
            open_meteo: "https://api.open-meteo.com".into(),
            overpass: "https://overpass-api.de".into(),
            timeout: Duration::from_secs(10),
            overpass_timeout: Duration::from_secs(30),
        }
    }
}

impl Endpoints {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut endpoints = Self::default();
        if let Some(url) = lookup("NOMINATIM_URL") {
            endpoints.nominatim = url;
        }
        if let Some(url) = lookup("OPEN_METEO_URL") {
            endpoints.open_meteo = url;
        }
        if let Some(url) = lookup("OVERPASS_URL") {
            endpoints.overpass = url;
        }
        if let Some(raw) = lookup("TOOL_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                TravelError::Config(format!("TOOL_TIMEOUT_SECS must be a number, got '{raw}'"))
            })?;
            endpoints.timeout = Duration::from_secs(secs);
        }
        Ok(endpoints)
    }

    /// Same base URL for every service; handy for mock servers
    pub fn all_at(base: &str) -> Self {
        Self {
            nominatim: base.into(),
            open_meteo: base.into(),
            overpass: base.into(),
            ..Self::default()
        }
    }

    pub(crate) fn client(&self, timeout: Duration) -> Result<Client> {
        Ok(Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?)
    }
}

pub(crate) fn url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
