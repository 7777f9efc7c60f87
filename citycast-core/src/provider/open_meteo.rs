use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    Config,
    error::{Endpoint, FetchError},
    model::{Candidate, ForecastSample, Quantity, Series},
};

use super::{ForecastProvider, GeocodingProvider};

const USER_AGENT: &str = concat!("citycast/", env!("CARGO_PKG_VERSION"));

/// Open-Meteo geocoding and forecast APIs. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
    limit: Option<u32>,
    language: Option<String>,
    days: u8,
    timeout: Duration,
}

impl OpenMeteo {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let timeout = config.request_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            geocoding_url: config.geocoding.url.clone(),
            forecast_url: config.forecast.url.clone(),
            limit: config.geocoding.limit,
            language: config.geocoding.language.clone(),
            days: config.forecast.days,
            timeout,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        tracing::debug!(%endpoint, url, ?query, "sending request");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport(endpoint, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport(endpoint, e))?;

        if !status.is_success() {
            return Err(FetchError::Status { endpoint, status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::decode(endpoint, e.to_string()))
    }

    fn transport(&self, endpoint: Endpoint, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout { endpoint, after: self.timeout }
        } else {
            FetchError::Transport { endpoint, source }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    // Absent when nothing matched.
    results: Option<Vec<OmPlace>>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    id: u64,
    name: String,
    #[serde(default)]
    country: String,
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl From<OmPlace> for Candidate {
    fn from(p: OmPlace) -> Self {
        Candidate {
            id: p.id,
            name: p.name,
            country: p.country,
            admin1: p.admin1,
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<String>,
    temperature_2m: Option<Vec<Option<f64>>>,
    windspeed_10m: Option<Vec<Option<f64>>>,
    rain: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct OmHourlyUnits {
    temperature_2m: Option<String>,
    windspeed_10m: Option<String>,
    rain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    hourly: OmHourly,
    hourly_units: OmHourlyUnits,
}

impl TryFrom<OmForecastResponse> for ForecastSample {
    type Error = FetchError;

    fn try_from(res: OmForecastResponse) -> Result<Self, Self::Error> {
        let OmForecastResponse { hourly, hourly_units } = res;

        Ok(ForecastSample {
            time: hourly.time,
            temperature: series(
                Quantity::Temperature,
                hourly.temperature_2m,
                hourly_units.temperature_2m,
            )?,
            wind_speed: series(Quantity::WindSpeed, hourly.windspeed_10m, hourly_units.windspeed_10m)?,
            rain: series(Quantity::Rain, hourly.rain, hourly_units.rain)?,
        })
    }
}

fn series(
    quantity: Quantity,
    values: Option<Vec<Option<f64>>>,
    unit: Option<String>,
) -> Result<Series, FetchError> {
    let values = values.ok_or_else(|| {
        FetchError::decode(Endpoint::Forecast, format!("missing hourly.{quantity}"))
    })?;
    let unit = unit.ok_or_else(|| {
        FetchError::decode(Endpoint::Forecast, format!("missing hourly_units.{quantity}"))
    })?;

    Ok(Series::new(unit, values))
}

#[async_trait]
impl GeocodingProvider for OpenMeteo {
    async fn search(&self, name: &str) -> Result<Vec<Candidate>, FetchError> {
        let mut query = vec![("name", name.to_string())];
        if let Some(limit) = self.limit {
            query.push(("count", limit.to_string()));
        }
        if let Some(language) = &self.language {
            query.push(("language", language.clone()));
        }

        let parsed: OmSearchResponse =
            self.get_json(Endpoint::Geocoding, &self.geocoding_url, &query).await?;

        Ok(parsed.results.unwrap_or_default().into_iter().map(Candidate::from).collect())
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteo {
    async fn hourly(&self, latitude: f64, longitude: f64) -> Result<ForecastSample, FetchError> {
        let hourly = Quantity::all().iter().map(Quantity::as_str).collect::<Vec<_>>().join(",");

        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("hourly", hourly),
            ("forecast_days", self.days.to_string()),
        ];

        let parsed: OmForecastResponse =
            self.get_json(Endpoint::Forecast, &self.forecast_url, &query).await?;

        ForecastSample::try_from(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
