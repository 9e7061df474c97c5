use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::ContentSource;
use crate::config::NewsApiConfig;
use crate::model::article::Article;
use crate::model::category::Category;

/// Body of a NewsAPI `top-headlines` response. Error bodies carry `code`/`message`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Option<Vec<Article>>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl NewsApiResponse {
    fn error_text(&self) -> String {
        format!(
            "{}: {}",
            self.code.as_deref().unwrap_or("unknown"),
            self.message.as_deref().unwrap_or("no message")
        )
    }
}

pub struct NewsApiSource {
    client: Client,
    base_url: String,
    api_key: Arc<RwLock<String>>,
}

impl NewsApiSource {
    pub fn new(config: NewsApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: Arc::new(RwLock::new(config.api_key)),
        }
    }

    /// Swap the API key used for subsequent requests.
    pub fn update_api_key(&self, api_key: String) {
        if !api_key.trim().is_empty() {
            *self.api_key.write() = api_key;
        }
    }

    fn build_request(&self, category: Category, page: u32, page_size: u32) -> RequestBuilder {
        let url = format!("{}/top-headlines", self.base_url);
        let (param, value) = category.api_query();
        // Upstream pages are 1-based.
        let upstream_page = (page + 1).to_string();
        let page_size = page_size.to_string();

        let mut req = self.client.get(&url).query(&[
            (param, value.as_str()),
            ("pageSize", page_size.as_str()),
            ("page", upstream_page.as_str()),
        ]);
        let key = self.api_key.read().clone();
        if !key.is_empty() {
            req = req.header("X-Api-Key", key);
        }
        req
    }
}

#[async_trait]
impl ContentSource for NewsApiSource {
    async fn fetch(&self, category: Category, page: u32, page_size: u32) -> Result<Vec<Article>> {
        let resp = self.build_request(category, page, page_size).send().await?;

        let status = resp.status();
        debug!(
            "news api status={} category={} page={}",
            status.as_u16(),
            category,
            page
        );

        if !status.is_success() {
            let body = resp.json::<NewsApiResponse>().await.ok();
            let detail = body
                .map(|b| b.error_text())
                .unwrap_or_else(|| "unreadable error body".to_string());
            warn!(
                "news api failed status={} category={} {}",
                status.as_u16(),
                category,
                detail
            );
            return Err(anyhow!("HTTP {}: {}", status.as_u16(), detail));
        }

        let body: NewsApiResponse = resp.json().await?;
        if body.status != "ok" {
            warn!("news api error category={} {}", category, body.error_text());
            return Err(anyhow!(body.error_text()));
        }

        let articles: Vec<Article> = body
            .articles
            .unwrap_or_default()
            .into_iter()
            .filter(|a| !a.is_removed())
            .collect();
        debug!(
            "news api category={} page={} articles={}",
            category,
            page,
            articles.len()
        );
        Ok(articles)
    }
}
