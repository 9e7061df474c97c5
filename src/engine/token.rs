use std::fmt;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};

use crate::model::category::Category;

/// Category selection plus issue time; identifies one logical request epoch.
///
/// Tokens are values: a selection change or refresh produces a new token and
/// never edits one an in-flight operation already holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchToken {
    categories: Vec<Category>,
    issued_at: DateTime<Utc>,
}

impl FetchToken {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            issued_at: Utc::now(),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Same selection, new timestamp.
    pub fn reissued(&self) -> Self {
        self.with_categories(self.categories.clone())
    }

    /// New selection, new timestamp. The timestamp is strictly later than this
    /// token's, so the result never compares equal to `self`.
    pub fn with_categories(&self, categories: Vec<Category>) -> Self {
        let floor = self.issued_at + TimeDelta::microseconds(1);
        Self {
            categories,
            issued_at: Utc::now().max(floor),
        }
    }

    /// Cache key for this token's selection.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_categories(&self.categories)
    }
}

/// Canonical, order-independent cache key for a category selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Sorted by category order, deduplicated, raw values joined with `,`.
    pub fn for_categories(categories: &[Category]) -> Self {
        let mut sorted = categories.to_vec();
        sorted.sort();
        sorted.dedup();
        let joined = sorted
            .iter()
            .map(|c| c.raw_value())
            .collect::<Vec<_>>()
            .join(",");
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// "Last refreshed at: 3:04 PM" in the local time zone.
pub fn last_refreshed_description(issued_at: DateTime<Utc>) -> String {
    format_last_refreshed(&issued_at.with_timezone(&Local))
}

pub fn format_last_refreshed<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!("Last refreshed at: {}", at.format("%-I:%M %p"))
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn test_cache_key_is_order_independent() {
        let a = CacheKey::for_categories(&[Category::Bloomberg, Category::Axios]);
        let b = CacheKey::for_categories(&[Category::Axios, Category::Bloomberg]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Axios,Bloomberg");

        let dup = CacheKey::for_categories(&[Category::General, Category::General]);
        assert_eq!(dup.as_str(), "general");
    }

    #[test]
    fn test_reissue_yields_distinct_token() {
        let token = FetchToken::new(vec![Category::General]);
        let next = token.reissued();
        assert_ne!(token, next);
        assert!(next.issued_at() > token.issued_at());
        assert_eq!(next.categories(), token.categories());

        let switched = next.with_categories(vec![Category::Axios]);
        assert_eq!(switched.categories(), &[Category::Axios]);
        assert_eq!(switched.cache_key().as_str(), "Axios");
    }

    #[test]
    fn test_clones_compare_equal() {
        let token = FetchToken::new(vec![Category::Axios, Category::Bloomberg]);
        assert_eq!(token.clone(), token);
    }

    #[test]
    fn test_format_last_refreshed() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let at = offset.with_ymd_and_hms(2023, 6, 7, 15, 4, 0).unwrap();
        assert_eq!(format_last_refreshed(&at), "Last refreshed at: 3:04 PM");

        let morning = offset.with_ymd_and_hms(2023, 6, 7, 9, 30, 0).unwrap();
        assert_eq!(format_last_refreshed(&morning), "Last refreshed at: 9:30 AM");
    }
}
