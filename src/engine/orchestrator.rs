// Fetch orchestration: phase state machine, cache lookups, epoch-based supersession.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::ExpiringCache;
use super::paging::PagingCoordinator;
use super::phase::FetchPhase;
use super::stats::{FetchStats, FetchStatsSnapshot};
use super::token::{last_refreshed_description, CacheKey, FetchToken};
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::model::article::Article;
use crate::model::category::Category;
use crate::source::traits::ContentSource;

pub type ArticlePhase = FetchPhase<Vec<Article>>;

/// What a load call did. Failures are returned as [`FetchError`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Served from cache; the content source was not called.
    Cached { items: usize },
    /// Fetched from the content source; `items` is the total now shown.
    Fetched { items: usize },
    /// A newer epoch took over; nothing was written.
    Superseded,
    /// Next-page request while no loaded content was showing.
    NotReady,
}

struct EpochState {
    token: FetchToken,
    cancel: CancellationToken,
    /// Token the content in the phase was loaded for, if any is showing.
    shown: Option<FetchToken>,
    /// Bumped on every phase write.
    version: u64,
}

/// The epoch an operation started in.
struct Operation {
    token: FetchToken,
    cancel: CancellationToken,
}

impl Operation {
    fn is_superseded(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Coordinates cache lookups, pagination and phase transitions for one article list.
///
/// Concurrent calls are allowed. Rather than excluding each other, every
/// operation re-checks its epoch under the epoch lock right before it writes the
/// phase or the cache, and token changes happen under that same lock. A stale
/// operation therefore never overwrites state published by a newer one.
pub struct FetchOrchestrator {
    source: Arc<dyn ContentSource>,
    config: FetchConfig,
    cache: ExpiringCache<CacheKey, Vec<Article>>,
    paging: PagingCoordinator,
    epoch: Mutex<EpochState>,
    phase: watch::Sender<ArticlePhase>,
    stats: FetchStats,
}

impl FetchOrchestrator {
    pub fn new(
        source: Arc<dyn ContentSource>,
        config: FetchConfig,
        selected: Category,
    ) -> Result<Self> {
        Self::with_phase(source, config, selected, FetchPhase::Idle)
    }

    /// Start with `articles` already on screen.
    pub fn with_articles(
        source: Arc<dyn ContentSource>,
        config: FetchConfig,
        selected: Category,
        articles: Vec<Article>,
    ) -> Result<Self> {
        Self::with_phase(source, config, selected, FetchPhase::Success(articles))
    }

    fn with_phase(
        source: Arc<dyn ContentSource>,
        config: FetchConfig,
        selected: Category,
        initial: ArticlePhase,
    ) -> Result<Self> {
        config.validate()?;

        let token = FetchToken::new(vec![selected]);
        let shown = initial.value().map(|_| token.clone());
        let (phase, _) = watch::channel(initial);
        let cache = ExpiringCache::new(config.cache_ttl());
        let paging = PagingCoordinator::new(config.items_per_page, config.max_page_limit);
        info!(
            "fetch orchestrator created category={} items_per_page={} max_page_limit={} ttl_secs={}",
            selected, config.items_per_page, config.max_page_limit, config.cache_ttl_secs
        );

        Ok(Self {
            source,
            config,
            cache,
            paging,
            epoch: Mutex::new(EpochState {
                token,
                cancel: CancellationToken::new(),
                shown,
                version: 0,
            }),
            phase,
            stats: FetchStats::new(),
        })
    }

    /// Load page 0 for the current selection, from cache when fresh.
    pub async fn load_first_page(&self) -> Result<LoadOutcome, FetchError> {
        let op = self.begin();
        if op.is_superseded() {
            return Ok(self.superseded("first page", &op));
        }

        let key = op.token.cache_key();
        if let Some(articles) = self.cache.get(&key) {
            self.stats.record_cache_hit();
            let items = articles.len();
            debug!("cache hit key={} items={}", key, items);
            if !self.publish(&op, FetchPhase::Success(articles)) {
                return Ok(self.superseded("first page", &op));
            }
            return Ok(LoadOutcome::Cached { items });
        }

        self.stats.record_cache_miss();
        debug!("cache miss key={}", key);
        if !self.publish(&op, FetchPhase::Loading) {
            return Ok(self.superseded("first page", &op));
        }

        self.paging.reset().await;
        let result = self
            .paging
            .load_next_page(|page| self.fetch_page(&op, page))
            .await;

        match result {
            Ok(articles) => {
                let items = articles.len();
                let committed = self.commit(&op, |cache| {
                    cache.set(key, articles.clone());
                    FetchPhase::Success(articles)
                });
                if !committed {
                    return Ok(self.superseded("first page", &op));
                }
                self.stats.record_page_loaded();
                info!(
                    "first page loaded categories={:?} items={}",
                    op.token.categories(),
                    items
                );
                Ok(LoadOutcome::Fetched { items })
            }
            Err(FetchError::Cancelled) => Ok(self.superseded("first page", &op)),
            Err(err) => {
                warn!("first page failed: {}", err);
                if !self.publish(&op, FetchPhase::Failure(err.clone())) {
                    return Ok(self.superseded("first page", &op));
                }
                Err(err)
            }
        }
    }

    /// Append the next page to the content on screen.
    ///
    /// Only acts while the phase is `Success` with content loaded for the current
    /// token. Errors, including [`FetchError::PageLimitExceeded`], are returned but
    /// the phase falls back to the content that was showing.
    pub async fn load_next_page(&self) -> Result<LoadOutcome, FetchError> {
        let op = self.begin();

        let (previous, version) = {
            let mut epoch = self.epoch.lock();
            if op.is_superseded() {
                return Ok(self.superseded("next page", &op));
            }
            if epoch.shown.as_ref() != Some(&op.token) {
                debug!("next page ignored: content is from an older token");
                return Ok(LoadOutcome::NotReady);
            }
            let current = match &*self.phase.borrow() {
                FetchPhase::Success(articles) => Some(articles.clone()),
                _ => None,
            };
            let Some(current) = current else {
                debug!("next page ignored: no loaded content");
                return Ok(LoadOutcome::NotReady);
            };
            self.write_phase(&mut epoch, FetchPhase::LoadingNextPage(current.clone()));
            (current, epoch.version)
        };

        let result = self
            .paging
            .load_next_page(|page| self.fetch_page(&op, page))
            .await;

        match result {
            Ok(next) => {
                let mut combined = previous;
                combined.extend(next);
                let items = combined.len();
                let key = op.token.cache_key();
                let committed = self.commit(&op, |cache| {
                    cache.set(key, combined.clone());
                    FetchPhase::Success(combined)
                });
                if !committed {
                    return Ok(self.superseded("next page", &op));
                }
                self.stats.record_page_loaded();
                debug!("next page appended total_items={}", items);
                Ok(LoadOutcome::Fetched { items })
            }
            Err(FetchError::Cancelled) => Ok(self.superseded("next page", &op)),
            Err(err) => {
                if err.is_page_limit() {
                    debug!("pagination stopped: {}", err);
                } else {
                    warn!("next page failed: {}", err);
                }
                self.restore_after_next_page(&op, version, previous);
                Err(err)
            }
        }
    }

    /// Drop cached results for the current selection and issue a new token.
    ///
    /// In-flight operations are superseded; the caller is expected to follow up
    /// with [`load_first_page`](Self::load_first_page).
    pub fn refresh(&self) -> FetchToken {
        let mut epoch = self.epoch.lock();
        self.cache.remove(&epoch.token.cache_key());
        for &category in epoch.token.categories() {
            self.cache.remove(&CacheKey::for_categories(&[category]));
        }

        let token = epoch.token.reissued();
        info!("refresh categories={:?}", token.categories());
        self.advance_epoch(&mut epoch, token.clone());
        token
    }

    /// Switch to a new category selection. Duplicates are dropped, order is kept.
    ///
    /// Returns `false` (and changes nothing) for an empty or unchanged selection.
    pub fn select_categories<I>(&self, categories: I) -> bool
    where
        I: IntoIterator<Item = Category>,
    {
        let mut selection: Vec<Category> = Vec::new();
        for category in categories {
            if !selection.contains(&category) {
                selection.push(category);
            }
        }
        if selection.is_empty() {
            warn!("ignoring empty category selection");
            return false;
        }

        let mut epoch = self.epoch.lock();
        if epoch.token.categories() == selection.as_slice() {
            return false;
        }
        let token = epoch.token.with_categories(selection);
        info!("category selection changed to {:?}", token.categories());
        self.advance_epoch(&mut epoch, token);
        true
    }

    /// Supersede every in-flight operation without changing the selection.
    ///
    /// An interrupted next-page load leaves its previous content showing.
    pub fn cancel(&self) {
        let mut epoch = self.epoch.lock();
        epoch.cancel.cancel();
        epoch.cancel = CancellationToken::new();
        self.settle_next_page(&mut epoch);
        debug!("in-flight operations cancelled");
    }

    pub fn phase(&self) -> ArticlePhase {
        self.phase.borrow().clone()
    }

    /// Receiver that observes every phase change.
    pub fn subscribe(&self) -> watch::Receiver<ArticlePhase> {
        self.phase.subscribe()
    }

    /// Articles on screen, or empty.
    pub fn articles(&self) -> Vec<Article> {
        self.phase.borrow().value().cloned().unwrap_or_default()
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.phase.borrow().is_loading_next_page()
    }

    pub fn token(&self) -> FetchToken {
        self.epoch.lock().token.clone()
    }

    pub fn last_refreshed_description(&self) -> String {
        last_refreshed_description(self.epoch.lock().token.issued_at())
    }

    /// Whether another page may be requested in the current epoch.
    pub async fn has_more_pages(&self) -> bool {
        self.paging.has_more_pages().await
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn stats(&self) -> FetchStatsSnapshot {
        self.stats.snapshot()
    }

    fn begin(&self) -> Operation {
        let epoch = self.epoch.lock();
        Operation {
            token: epoch.token.clone(),
            cancel: epoch.cancel.clone(),
        }
    }

    /// Supersede the running epoch and start one for `token`.
    ///
    /// Content already on screen stays, but it no longer matches the token, so
    /// next-page loads wait for a first-page load of the new epoch.
    fn advance_epoch(&self, epoch: &mut EpochState, token: FetchToken) {
        epoch.cancel.cancel();
        epoch.cancel = CancellationToken::new();
        epoch.token = token;
        self.settle_next_page(epoch);
    }

    /// Put an interrupted next-page load's content back as `Success`.
    fn settle_next_page(&self, epoch: &mut EpochState) {
        let restored = match &*self.phase.borrow() {
            FetchPhase::LoadingNextPage(articles) => Some(articles.clone()),
            _ => None,
        };
        if let Some(articles) = restored {
            self.write_phase(epoch, FetchPhase::Success(articles));
        }
    }

    /// Fetch `page` for every selected category, one request each, in selection order.
    async fn fetch_page(&self, op: &Operation, page: u32) -> Result<Vec<Article>, FetchError> {
        let page_size = self.config.items_per_page;
        let mut articles = Vec::new();

        for &category in op.token.categories() {
            self.stats.record_source_request();
            let result = tokio::select! {
                result = self.source.fetch(category, page, page_size) => result,
                _ = op.cancel.cancelled() => {
                    debug!("fetch category={} page={} cancelled in flight", category, page);
                    return Err(FetchError::Cancelled);
                }
            };
            if op.is_superseded() {
                debug!("fetch category={} page={} superseded", category, page);
                return Err(FetchError::Cancelled);
            }

            let fetched = result.map_err(|e| {
                warn!("fetch category={} page={} failed: {:#}", category, page, e);
                FetchError::network(e)
            })?;
            debug!(
                "fetched category={} page={} articles={}",
                category,
                page,
                fetched.len()
            );
            articles.extend(fetched);
        }

        Ok(articles)
    }

    /// Run `write` and publish its phase, unless `op` has been superseded.
    fn commit<F>(&self, op: &Operation, write: F) -> bool
    where
        F: FnOnce(&ExpiringCache<CacheKey, Vec<Article>>) -> ArticlePhase,
    {
        let mut epoch = self.epoch.lock();
        if op.is_superseded() {
            return false;
        }
        let next = write(&self.cache);
        match next {
            FetchPhase::Success(_) => epoch.shown = Some(op.token.clone()),
            FetchPhase::LoadingNextPage(_) => {}
            _ => epoch.shown = None,
        }
        self.write_phase(&mut epoch, next);
        true
    }

    /// Fall back to `previous` after a failed next page, unless the phase moved on.
    fn restore_after_next_page(&self, op: &Operation, version: u64, previous: Vec<Article>) {
        let mut epoch = self.epoch.lock();
        if op.is_superseded() || epoch.version != version {
            debug!("next page failed after a newer phase was published; leaving it");
            return;
        }
        self.write_phase(&mut epoch, FetchPhase::Success(previous));
    }

    fn write_phase(&self, epoch: &mut EpochState, next: ArticlePhase) {
        epoch.version += 1;
        self.phase.send_replace(next);
    }

    fn publish(&self, op: &Operation, phase: ArticlePhase) -> bool {
        self.commit(op, |_| phase)
    }

    fn superseded(&self, what: &str, op: &Operation) -> LoadOutcome {
        self.stats.record_superseded();
        debug!(
            "{} load superseded categories={:?}",
            what,
            op.token.categories()
        );
        LoadOutcome::Superseded
    }
}
