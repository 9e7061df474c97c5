use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// A selectable content source. Declaration order is menu precedence.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    #[default]
    #[serde(rename = "general")]
    General,
    Axios,
    Bloomberg,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::General, Category::Axios, Category::Bloomberg];

    /// Raw value used on the wire and in cache keys.
    pub fn raw_value(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Axios => "Axios",
            Category::Bloomberg => "Bloomberg",
        }
    }

    /// Menu label.
    pub fn text(self) -> &'static str {
        match self {
            Category::General => "Top Headlines",
            other => other.raw_value(),
        }
    }

    /// SF Symbols name shown next to the menu label.
    pub fn system_image(self) -> &'static str {
        match self {
            Category::General => "newspaper",
            Category::Axios => "building.2",
            Category::Bloomberg => "desktopcomputer",
        }
    }

    pub fn sort_index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Query parameter selecting this category on a NewsAPI `top-headlines` request.
    pub fn api_query(self) -> (&'static str, String) {
        match self {
            Category::General => ("category", self.raw_value().to_string()),
            other => ("sources", other.raw_value().to_lowercase()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_value())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.raw_value().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("unknown category: {}", s))
    }
}
