use anyhow::Result;
use async_trait::async_trait;

use crate::model::article::Article;
use crate::model::category::Category;

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch one page of articles for `category`. `page` is zero-based.
    async fn fetch(&self, category: Category, page: u32, page_size: u32) -> Result<Vec<Article>>;
}
