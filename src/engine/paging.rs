// Page cursor ownership and the page ceiling.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageCursor {
    current_page: u32,
}

/// Drives an injected page-fetch function one page at a time.
///
/// The page index is owned here, never supplied by the caller. The cursor lock is
/// held across the fetch, so racing callers cannot request the same page twice.
pub struct PagingCoordinator {
    cursor: Mutex<PageCursor>,
    items_per_page: u32,
    max_page_limit: u32,
}

impl PagingCoordinator {
    pub fn new(items_per_page: u32, max_page_limit: u32) -> Self {
        Self {
            cursor: Mutex::new(PageCursor { current_page: 0 }),
            items_per_page,
            max_page_limit,
        }
    }

    /// Rewind to page 0 ahead of a fresh first-page load.
    pub async fn reset(&self) {
        self.cursor.lock().await.current_page = 0;
    }

    /// Fetch the page at the cursor and advance it.
    ///
    /// Fails with [`FetchError::PageLimitExceeded`] once `max_page_limit` pages have been
    /// loaded. Errors from `fetch` are returned unchanged and leave the cursor in place,
    /// so a retry asks for the same page.
    pub async fn load_next_page<T, F, Fut>(&self, fetch: F) -> Result<Vec<T>, FetchError>
    where
        F: FnOnce(u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>, FetchError>>,
    {
        let mut cursor = self.cursor.lock().await;
        if cursor.current_page >= self.max_page_limit {
            debug!(
                "page limit reached: current_page={} max_page_limit={}",
                cursor.current_page, self.max_page_limit
            );
            return Err(FetchError::PageLimitExceeded {
                limit: self.max_page_limit,
            });
        }

        let page = cursor.current_page;
        let items = fetch(page).await?;
        cursor.current_page += 1;
        debug!("loaded page {} ({} items)", page, items.len());
        Ok(items)
    }

    pub async fn current_page(&self) -> u32 {
        self.cursor.lock().await.current_page
    }

    pub async fn has_more_pages(&self) -> bool {
        self.cursor.lock().await.current_page < self.max_page_limit
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn max_page_limit(&self) -> u32 {
        self.max_page_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok_page(page: u32) -> Result<Vec<u32>, FetchError> {
        Ok(vec![page * 10, page * 10 + 1])
    }

    #[tokio::test]
    async fn test_pages_advance_in_order() {
        let paging = PagingCoordinator::new(2, 5);
        assert_eq!(paging.load_next_page(ok_page).await.unwrap(), vec![0, 1]);
        assert_eq!(paging.load_next_page(ok_page).await.unwrap(), vec![10, 11]);
        assert_eq!(paging.current_page().await, 2);
    }

    #[tokio::test]
    async fn test_limit_enforced_without_moving_cursor() {
        let limit = 3;
        let paging = PagingCoordinator::new(2, limit);
        for _ in 0..limit {
            paging.load_next_page(ok_page).await.unwrap();
        }
        assert!(!paging.has_more_pages().await);

        let err = paging.load_next_page(ok_page).await.unwrap_err();
        assert!(matches!(err, FetchError::PageLimitExceeded { limit: 3 }));
        assert_eq!(paging.current_page().await, limit);
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_page() {
        let paging = PagingCoordinator::new(2, 5);
        paging.load_next_page(ok_page).await.unwrap();

        let err = paging
            .load_next_page(|_| async {
                Err::<Vec<u32>, _>(FetchError::network(anyhow::anyhow!("timeout")))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(paging.current_page().await, 1);

        // Retry resumes at the same page.
        assert_eq!(paging.load_next_page(ok_page).await.unwrap(), vec![10, 11]);
    }

    #[tokio::test]
    async fn test_reset_always_returns_to_zero() {
        let paging = PagingCoordinator::new(2, 2);
        paging.reset().await;
        assert_eq!(paging.current_page().await, 0);

        paging.load_next_page(ok_page).await.unwrap();
        paging.load_next_page(ok_page).await.unwrap();
        assert!(paging.load_next_page(ok_page).await.is_err());

        paging.reset().await;
        assert_eq!(paging.current_page().await, 0);
        assert!(paging.has_more_pages().await);
        assert_eq!(paging.items_per_page(), 2);
        assert_eq!(paging.max_page_limit(), 2);
    }
}
