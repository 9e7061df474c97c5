use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
}

/// A single news article as returned by the content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl Article {
    /// Author line, falling back to the publisher name.
    pub fn author_text(&self) -> &str {
        self.author.as_deref().unwrap_or(&self.source.name)
    }

    /// Placeholder entries the upstream leaves behind for retracted stories.
    pub fn is_removed(&self) -> bool {
        self.title == "[Removed]" || self.url.is_empty() || self.title.is_empty()
    }
}
