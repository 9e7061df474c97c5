use std::sync::Arc;

use thiserror::Error;

/// Errors raised by the fetch orchestration layer.
///
/// `Clone` so a failure can live inside a published [`FetchPhase`](crate::engine::phase::FetchPhase).
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The content source failed. Opaque; carries the source's message.
    #[error("network failure: {0:#}")]
    Network(Arc<anyhow::Error>),

    /// Pagination reached its configured ceiling.
    #[error("page limit of {limit} pages reached")]
    PageLimitExceeded { limit: u32 },

    /// The operation was superseded by a token change or an explicit cancel.
    #[error("operation superseded")]
    Cancelled,
}

impl FetchError {
    pub fn network(err: anyhow::Error) -> Self {
        Self::Network(Arc::new(err))
    }

    pub fn is_page_limit(&self) -> bool {
        matches!(self, Self::PageLimitExceeded { .. })
    }
}
