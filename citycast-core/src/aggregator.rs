use std::{sync::Arc, time::Duration};

use crate::{
    error::{Endpoint, FetchError},
    model::{Summary, summarize},
    provider::ForecastProvider,
    sink::ObservabilitySink,
};

/// Fetches an hourly forecast and reduces it to a [`Summary`].
#[derive(Debug)]
pub struct ForecastAggregator {
    provider: Box<dyn ForecastProvider>,
    sink: Arc<dyn ObservabilitySink>,
    timeout: Duration,
}

impl ForecastAggregator {
    pub fn new(
        provider: Box<dyn ForecastProvider>,
        sink: Arc<dyn ObservabilitySink>,
        timeout: Duration,
    ) -> Self {
        Self { provider, sink, timeout }
    }

    /// Summary for the given coordinates, or `None` if the forecast could not be fetched.
    pub async fn aggregate(&self, latitude: f64, longitude: f64) -> Option<Summary> {
        let fetch = self.provider.hourly(latitude, longitude);
        let result = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout { endpoint: Endpoint::Forecast, after: self.timeout }),
        };

        match result {
            Ok(sample) => Some(summarize(&sample)),
            Err(err) => {
                self.sink.report(&err, &format!("forecast for ({latitude}, {longitude})"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        model::{ForecastSample, Series},
        sink::testing::RecordingSink,
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;

    #[derive(Debug)]
    enum Reply {
        Sample(ForecastSample),
        Unavailable,
        Hang,
    }

    #[derive(Debug)]
    struct FakeForecast(Reply);

    #[async_trait]
    impl ForecastProvider for FakeForecast {
        async fn hourly(&self, _: f64, _: f64) -> Result<ForecastSample, FetchError> {
            match &self.0 {
                Reply::Sample(s) => Ok(s.clone()),
                Reply::Unavailable => Err(FetchError::Status {
                    endpoint: Endpoint::Forecast,
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: String::new(),
                }),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(ForecastSample::default())
                }
            }
        }
    }

    fn aggregator(reply: Reply) -> (ForecastAggregator, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let agg =
            ForecastAggregator::new(Box::new(FakeForecast(reply)), sink.clone(), Duration::from_secs(5));
        (agg, sink)
    }

    #[tokio::test]
    async fn reduces_each_series_independently() {
        let (agg, sink) = aggregator(Reply::Sample(ForecastSample {
            time: Vec::new(),
            temperature: Series::complete("°C", &[18.0, 21.5, 19.0]),
            wind_speed: Series::complete("km/h", &[7.0, 2.0]),
            rain: Series::complete("mm", &[]),
        }));

        let summary = agg.aggregate(-12.05, -77.04).await.expect("summary");

        assert_eq!(summary.temperature.min(), Some(18.0));
        assert_eq!(summary.temperature.max(), Some(21.5));
        assert_eq!(summary.wind_speed.min(), Some(2.0));
        assert_eq!(summary.rain.extremes, None);
        assert!(sink.reports().is_empty());
    }

    #[tokio::test]
    async fn failure_yields_none_and_reports() {
        let (agg, sink) = aggregator(Reply::Unavailable);

        assert!(agg.aggregate(1.0, 2.0).await.is_none());

        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, ErrorKind::Transport);
        assert_eq!(reports[0].1, "forecast for (1, 2)");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_yields_none() {
        let (agg, sink) = aggregator(Reply::Hang);

        assert!(agg.aggregate(1.0, 2.0).await.is_none());
        assert_eq!(sink.reports()[0].0, ErrorKind::Transport);
    }
}
