use crate::error::FetchError;

/// Lifecycle of a data request. Exactly one variant is active at a time.
#[derive(Debug, Clone, Default)]
pub enum FetchPhase<T> {
    #[default]
    Idle,
    Loading,
    /// Appending a page; keeps the previous payload visible.
    LoadingNextPage(T),
    Success(T),
    Failure(FetchError),
}

impl<T> FetchPhase<T> {
    /// Payload currently on screen, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            FetchPhase::Success(v) | FetchPhase::LoadingNextPage(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchPhase::Failure(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchPhase::Loading)
    }

    pub fn is_loading_next_page(&self) -> bool {
        matches!(self, FetchPhase::LoadingNextPage(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchPhase::Success(_))
    }
}
