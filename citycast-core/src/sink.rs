//! Where recovered lookup failures are reported.

use std::fmt::Debug;

use crate::error::FetchError;

/// Destination for failures the resolver and aggregator swallow.
pub trait ObservabilitySink: Send + Sync + Debug {
    fn report(&self, error: &FetchError, context: &str);
}

/// Forwards reports to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ObservabilitySink for TracingSink {
    fn report(&self, error: &FetchError, context: &str) {
        tracing::warn!(
            endpoint = %error.endpoint(),
            kind = ?error.kind(),
            context,
            "{error}"
        );
    }
}
