// Search / category / sort over an in-memory token list. Every evaluation starts from
// the full list so that orthogonal criteria never narrow each other's input.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::models::{Timeframe, Token};

/// Market cap past which a token has left its bonding curve.
pub const GRADUATION_MCAP: f64 = 69_000.0;
/// Minimum 24h traders for `hot`.
pub const HOT_MIN_TRADERS: u64 = 100;
/// Minimum 24h volume / market cap for `trending`.
pub const TRENDING_MIN_TURNOVER: f64 = 0.1;
/// Maximum age for `new`.
pub const NEW_MAX_AGE_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    All,
    Hot,
    Trending,
    Graduated,
    New,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::All,
        Category::Hot,
        Category::Trending,
        Category::Graduated,
        Category::New,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Hot => "hot",
            Category::Trending => "trending",
            Category::Graduated => "graduated",
            Category::New => "new",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Hot => "Hot",
            Category::Trending => "Trending",
            Category::Graduated => "Graduated",
            Category::New => "New",
        }
    }

    pub fn next(self) -> Self {
        let idx = Category::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Category::ALL[(idx + 1) % Category::ALL.len()]
    }

    pub fn matches(&self, token: &Token, now: DateTime<Utc>) -> bool {
        match self {
            Category::All => true,
            Category::Hot => token.stats(Timeframe::H24).num_traders() >= HOT_MIN_TRADERS,
            Category::Trending => {
                let mcap = token.market_cap();
                mcap > 0.0 && token.volume_24h() / mcap > TRENDING_MIN_TURNOVER
            }
            Category::Graduated => token.market_cap() > GRADUATION_MCAP,
            Category::New => token
                .created_at()
                .is_some_and(|created| now - created < Duration::hours(NEW_MAX_AGE_HOURS)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    MarketCap,
    Volume,
    Price,
    Traders,
    Holders,
    Newest,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::MarketCap,
        SortKey::Volume,
        SortKey::Price,
        SortKey::Traders,
        SortKey::Holders,
        SortKey::Newest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::MarketCap => "market_cap",
            SortKey::Volume => "volume",
            SortKey::Price => "price",
            SortKey::Traders => "traders",
            SortKey::Holders => "holders",
            SortKey::Newest => "newest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::MarketCap => "Market Cap",
            SortKey::Volume => "Volume",
            SortKey::Price => "Price",
            SortKey::Traders => "Traders",
            SortKey::Holders => "Holders",
            SortKey::Newest => "Newest",
        }
    }

    pub fn next(self) -> Self {
        let idx = SortKey::ALL.iter().position(|k| *k == self).unwrap_or(0);
        SortKey::ALL[(idx + 1) % SortKey::ALL.len()]
    }

    /// Descending comparison; `Less` means `a` is listed before `b`.
    pub fn compare(&self, a: &Token, b: &Token) -> Ordering {
        match self {
            SortKey::MarketCap => b.market_cap().total_cmp(&a.market_cap()),
            SortKey::Volume => b.volume_24h().total_cmp(&a.volume_24h()),
            SortKey::Price => b.usd_price().total_cmp(&a.usd_price()),
            SortKey::Traders => b
                .stats(Timeframe::H24)
                .num_traders()
                .cmp(&a.stats(Timeframe::H24).num_traders()),
            SortKey::Holders => b.holder_count().cmp(&a.holder_count()),
            // Option orders None first, so unparseable timestamps land at the end
            SortKey::Newest => b.created_at().cmp(&a.created_at()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sort key '{s}'"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExploreQuery {
    pub search: String,
    pub category: Category,
    pub sort: SortKey,
}

impl ExploreQuery {
    /// Case-insensitive substring match on symbol or name. A blank query matches all.
    pub fn matches_search(&self, token: &Token) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        token.symbol().to_lowercase().contains(&needle)
            || token.name().to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, tokens: &'a [Token], now: DateTime<Utc>) -> Vec<&'a Token> {
        let mut visible: Vec<&Token> = tokens
            .iter()
            .filter(|t| self.matches_search(t))
            .filter(|t| self.category.matches(t, now))
            .collect();

        // sort_by is stable; equal keys keep upstream order
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}
