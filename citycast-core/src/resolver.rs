use std::{sync::Arc, time::Duration};

use crate::{
    error::{Endpoint, ErrorKind, FetchError},
    model::Candidate,
    provider::GeocodingProvider,
    sink::ObservabilitySink,
};

/// What a single suggestion lookup produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The query was too short to search; no request was made.
    Skipped,
    Found(Vec<Candidate>),
    NoResults,
    /// The lookup failed and was reported to the sink.
    Failed(ErrorKind),
}

impl SearchOutcome {
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            SearchOutcome::Found(c) => c,
            _ => &[],
        }
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            SearchOutcome::Found(c) => c,
            _ => Vec::new(),
        }
    }
}

/// Turns free text into place candidates.
#[derive(Debug)]
pub struct SuggestionResolver {
    provider: Box<dyn GeocodingProvider>,
    sink: Arc<dyn ObservabilitySink>,
    timeout: Duration,
    min_query_len: usize,
}

impl SuggestionResolver {
    pub fn new(
        provider: Box<dyn GeocodingProvider>,
        sink: Arc<dyn ObservabilitySink>,
        timeout: Duration,
    ) -> Self {
        Self { provider, sink, timeout, min_query_len: 1 }
    }

    /// Queries shorter than `len` characters resolve to nothing without a request.
    /// Zero is treated as one: the empty query never searches.
    pub fn with_min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len.max(1);
        self
    }

    pub fn should_search(&self, query: &str) -> bool {
        query.chars().count() >= self.min_query_len
    }

    /// Candidates for `query`, empty on any failure.
    pub async fn resolve(&self, query: &str) -> Vec<Candidate> {
        self.lookup(query).await.into_candidates()
    }

    /// Like [`resolve`](Self::resolve) but keeps "failed" apart from "no results".
    pub async fn lookup(&self, query: &str) -> SearchOutcome {
        if !self.should_search(query) {
            return SearchOutcome::Skipped;
        }

        let result = match tokio::time::timeout(self.timeout, self.provider.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout { endpoint: Endpoint::Geocoding, after: self.timeout }),
        };

        match result {
            Ok(candidates) if candidates.is_empty() => SearchOutcome::NoResults,
            Ok(candidates) => {
                tracing::debug!(query, count = candidates.len(), "suggestions resolved");
                SearchOutcome::Found(candidates)
            }
            Err(err) => {
                self.sink.report(&err, &format!("suggestions for {query:?}"));
                SearchOutcome::Failed(err.kind())
            }
        }
    }
}
