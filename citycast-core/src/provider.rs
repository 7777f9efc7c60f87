use crate::{
    Config,
    error::FetchError,
    model::{Candidate, ForecastSample},
    provider::open_meteo::OpenMeteo,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

/// Place-name lookup.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    /// Candidates for `name`, in the provider's order.
    async fn search(&self, name: &str) -> Result<Vec<Candidate>, FetchError>;
}

/// Hourly forecast lookup.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn hourly(&self, latitude: f64, longitude: f64) -> Result<ForecastSample, FetchError>;
}

/// Construct both providers from config, sharing one HTTP client.
pub fn providers_from_config(
    config: &Config,
) -> anyhow::Result<(Box<dyn GeocodingProvider>, Box<dyn ForecastProvider>)> {
    config.validate()?;

    let open_meteo = OpenMeteo::new(config)?;
    Ok((Box::new(open_meteo.clone()), Box::new(open_meteo)))
}
