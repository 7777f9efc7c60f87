use std::sync::Arc;

use crate::{
    Config,
    aggregator::ForecastAggregator,
    provider::{ForecastProvider, GeocodingProvider, providers_from_config},
    resolver::SuggestionResolver,
    session::{Command, Completion},
    sink::ObservabilitySink,
};

/// Runs session commands against the resolver and aggregator.
#[derive(Debug)]
pub struct Dispatcher {
    resolver: SuggestionResolver,
    aggregator: ForecastAggregator,
}

impl Dispatcher {
    pub fn new(resolver: SuggestionResolver, aggregator: ForecastAggregator) -> Self {
        Self { resolver, aggregator }
    }

    /// Wire arbitrary providers with the timeout and query settings from `config`.
    pub fn with_providers(
        config: &Config,
        geocoding: Box<dyn GeocodingProvider>,
        forecast: Box<dyn ForecastProvider>,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Self {
        let timeout = config.request_timeout();
        let resolver = SuggestionResolver::new(geocoding, sink.clone(), timeout)
            .with_min_query_len(config.search.min_query_len);
        let aggregator = ForecastAggregator::new(forecast, sink, timeout);

        Self::new(resolver, aggregator)
    }

    /// Build the Open-Meteo backed dispatcher described by `config`.
    pub fn from_config(config: &Config, sink: Arc<dyn ObservabilitySink>) -> anyhow::Result<Self> {
        let (geocoding, forecast) = providers_from_config(config)?;
        Ok(Self::with_providers(config, geocoding, forecast, sink))
    }

    pub fn resolver(&self) -> &SuggestionResolver {
        &self.resolver
    }

    pub fn aggregator(&self) -> &ForecastAggregator {
        &self.aggregator
    }

    /// Run one command to completion. Never fails; failures come back as empty outcomes.
    pub async fn execute(&self, command: Command) -> Completion {
        match command {
            Command::Search(ticket) => {
                let outcome = self.resolver.lookup(&ticket.query).await;
                Completion::Suggestions { ticket, outcome }
            }
            Command::Forecast(ticket) => {
                let summary = self
                    .aggregator
                    .aggregate(ticket.candidate.latitude, ticket.candidate.longitude)
                    .await;
                Completion::Forecast { ticket, summary }
            }
        }
    }
}
