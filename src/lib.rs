pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod source;

pub use config::{FetchConfig, LogConfig, NewsApiConfig};
pub use engine::cache::ExpiringCache;
pub use engine::orchestrator::{ArticlePhase, FetchOrchestrator, LoadOutcome};
pub use engine::paging::PagingCoordinator;
pub use engine::phase::FetchPhase;
pub use engine::token::{CacheKey, FetchToken};
pub use error::FetchError;
pub use model::article::{Article, ArticleSource};
pub use model::category::Category;
pub use source::http_source::NewsApiSource;
pub use source::traits::ContentSource;
