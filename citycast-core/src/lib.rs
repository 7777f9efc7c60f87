//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Place suggestions from free text ([`SuggestionResolver`])
//! - Forecast min/max summaries for a place ([`ForecastAggregator`])
//! - The search-and-select state machine tying them together ([`Session`])
//! - Configuration, providers and error reporting
//!
//! It is used by `citycast-cli`, but can also be driven by any other front end
//! that can turn its input into [`Event`]s.

pub mod aggregator;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod sink;

pub use aggregator::ForecastAggregator;
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, FetchError, SessionError};
pub use model::{Candidate, ForecastSample, Quantity, Series, SeriesSummary, Summary, summarize};
pub use provider::{ForecastProvider, GeocodingProvider};
pub use resolver::{SearchOutcome, SuggestionResolver};
pub use session::{Command, Completion, Event, Phase, Session};
pub use sink::{ObservabilitySink, TracingSink};
