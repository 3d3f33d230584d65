use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stats bucket selector, also the path segment of the top-traded endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "6h")]
    H6,
    #[default]
    #[serde(rename = "24h")]
    H24,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [Timeframe::M5, Timeframe::H1, Timeframe::H6, Timeframe::H24];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::H1 => "1h",
            Timeframe::H6 => "6h",
            Timeframe::H24 => "24h",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown timeframe '{s}' (expected 5m, 1h, 6h or 24h)"))
    }
}

/// Candle width accepted by the chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartInterval {
    #[default]
    #[serde(rename = "1_HOUR")]
    OneHour,
    #[serde(rename = "4_HOUR")]
    FourHour,
    #[serde(rename = "12_HOUR")]
    TwelveHour,
}

impl ChartInterval {
    pub const ALL: [ChartInterval; 3] = [
        ChartInterval::OneHour,
        ChartInterval::FourHour,
        ChartInterval::TwelveHour,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartInterval::OneHour => "1_HOUR",
            ChartInterval::FourHour => "4_HOUR",
            ChartInterval::TwelveHour => "12_HOUR",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartInterval::OneHour => "1H",
            ChartInterval::FourHour => "4H",
            ChartInterval::TwelveHour => "12H",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartInterval::OneHour => ChartInterval::FourHour,
            ChartInterval::FourHour => ChartInterval::TwelveHour,
            ChartInterval::TwelveHour => ChartInterval::OneHour,
        }
    }
}

impl fmt::Display for ChartInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartInterval::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s) || i.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown chart interval '{s}' (expected 1_HOUR, 4_HOUR or 12_HOUR)"))
    }
}

/// Per-timeframe aggregate as reported upstream. Percent changes may be negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStats {
    #[serde(default)]
    pub price_change: Option<f64>,
    #[serde(default)]
    pub holder_change: Option<f64>,
    #[serde(default)]
    pub liquidity_change: Option<f64>,
    #[serde(default)]
    pub volume_change: Option<f64>,
    #[serde(default)]
    pub buy_volume: Option<f64>,
    #[serde(default)]
    pub sell_volume: Option<f64>,
    #[serde(default)]
    pub num_buys: Option<u64>,
    #[serde(default)]
    pub num_sells: Option<u64>,
    #[serde(default)]
    pub num_traders: Option<u64>,
    #[serde(default)]
    pub num_net_buyers: Option<i64>,
}

impl TokenStats {
    pub fn price_change(&self) -> f64 {
        self.price_change.unwrap_or(0.0)
    }

    pub fn holder_change(&self) -> f64 {
        self.holder_change.unwrap_or(0.0)
    }

    pub fn liquidity_change(&self) -> f64 {
        self.liquidity_change.unwrap_or(0.0)
    }

    pub fn volume_change(&self) -> f64 {
        self.volume_change.unwrap_or(0.0)
    }

    pub fn buy_volume(&self) -> f64 {
        self.buy_volume.unwrap_or(0.0)
    }

    pub fn sell_volume(&self) -> f64 {
        self.sell_volume.unwrap_or(0.0)
    }

    pub fn num_buys(&self) -> u64 {
        self.num_buys.unwrap_or(0)
    }

    pub fn num_sells(&self) -> u64 {
        self.num_sells.unwrap_or(0)
    }

    pub fn num_traders(&self) -> u64 {
        self.num_traders.unwrap_or(0)
    }

    pub fn num_net_buyers(&self) -> i64 {
        self.num_net_buyers.unwrap_or(0)
    }

    pub fn total_volume(&self) -> f64 {
        self.buy_volume() + self.sell_volume()
    }

    /// Share of volume on the buy side, in percent. Zero when nothing traded.
    pub fn buy_pressure(&self) -> f64 {
        let total = self.total_volume();
        if total > 0.0 {
            self.buy_volume() / total * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseAsset {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub usd_price: Option<f64>,
    #[serde(default)]
    pub mcap: Option<f64>,
    #[serde(default)]
    pub fdv: Option<f64>,
    #[serde(default)]
    pub holder_count: Option<u64>,
    #[serde(default)]
    pub organic_score: Option<f64>,
    #[serde(default)]
    pub organic_score_label: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub stats5m: Option<TokenStats>,
    #[serde(default)]
    pub stats1h: Option<TokenStats>,
    #[serde(default)]
    pub stats6h: Option<TokenStats>,
    #[serde(default)]
    pub stats24h: Option<TokenStats>,
}

/// A tradable pool; the UI calls it a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dex: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default)]
    pub liquidity: Option<f64>,
    #[serde(default, rename = "volume24h")]
    pub volume_24h: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub base_asset: BaseAsset,
}

impl Token {
    pub fn name(&self) -> &str {
        &self.base_asset.name
    }

    pub fn symbol(&self) -> &str {
        &self.base_asset.symbol
    }

    pub fn usd_price(&self) -> f64 {
        self.base_asset.usd_price.unwrap_or(0.0)
    }

    pub fn market_cap(&self) -> f64 {
        self.base_asset.mcap.unwrap_or(0.0)
    }

    pub fn fdv(&self) -> f64 {
        self.base_asset.fdv.unwrap_or(0.0)
    }

    pub fn holder_count(&self) -> u64 {
        self.base_asset.holder_count.unwrap_or(0)
    }

    pub fn organic_score(&self) -> f64 {
        self.base_asset.organic_score.unwrap_or(0.0)
    }

    pub fn liquidity(&self) -> f64 {
        self.liquidity.unwrap_or(0.0)
    }

    pub fn volume_24h(&self) -> f64 {
        self.volume_24h.unwrap_or(0.0)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    /// Stats for one bucket, all-zero when upstream omitted it.
    pub fn stats(&self, timeframe: Timeframe) -> TokenStats {
        let stats = match timeframe {
            Timeframe::M5 => &self.base_asset.stats5m,
            Timeframe::H1 => &self.base_asset.stats1h,
            Timeframe::H6 => &self.base_asset.stats6h,
            Timeframe::H24 => &self.base_asset.stats24h,
        };
        stats.clone().unwrap_or_default()
    }
}

/// Upstream sends `null` for absent strings and lists as often as it omits the key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Normalized result of the token-list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenList {
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadWindowStats {
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub traders: Option<u64>,
    #[serde(default)]
    pub market_share: Option<f64>,
    #[serde(default)]
    pub mint_count: Option<u64>,
    #[serde(default)]
    pub graduate_count: Option<u64>,
}

impl LaunchpadWindowStats {
    pub fn volume(&self) -> f64 {
        self.volume.unwrap_or(0.0)
    }

    pub fn traders(&self) -> u64 {
        self.traders.unwrap_or(0)
    }

    pub fn market_share(&self) -> f64 {
        self.market_share.unwrap_or(0.0)
    }

    pub fn mint_count(&self) -> u64 {
        self.mint_count.unwrap_or(0)
    }

    pub fn graduate_count(&self) -> u64 {
        self.graduate_count.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadStats {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stats5m: Option<LaunchpadWindowStats>,
    #[serde(default)]
    pub stats1h: Option<LaunchpadWindowStats>,
    #[serde(default)]
    pub stats6h: Option<LaunchpadWindowStats>,
    #[serde(default)]
    pub stats24h: Option<LaunchpadWindowStats>,
}

impl LaunchpadStats {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn stats(&self, timeframe: Timeframe) -> LaunchpadWindowStats {
        let stats = match timeframe {
            Timeframe::M5 => &self.stats5m,
            Timeframe::H1 => &self.stats1h,
            Timeframe::H6 => &self.stats6h,
            Timeframe::H24 => &self.stats24h,
        };
        stats.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartCandle {
    pub time: i64,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl ChartCandle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Candles ascending by time, exactly as returned upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub candles: Vec<ChartCandle>,
}

impl ChartData {
    /// Lowest low and highest high, `None` for an empty chart.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        self.candles.iter().fold(None, |range, c| match range {
            None => Some((c.low, c.high)),
            Some((lo, hi)) => Some((lo.min(c.low), hi.max(c.high))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_decodes_with_missing_numbers() {
        let raw = r#"{
            "id": "pool-1",
            "chain": "solana",
            "dex": "met-dbc",
            "createdAt": "2025-05-20T10:00:00Z",
            "baseAsset": { "id": "mint-1", "name": "Rabbit", "symbol": "RAB", "tags": ["verified"] }
        }"#;

        let token: Token = serde_json::from_str(raw).unwrap();
        assert_eq!(token.symbol(), "RAB");
        assert_eq!(token.market_cap(), 0.0);
        assert_eq!(token.volume_24h(), 0.0);
        assert_eq!(token.stats(Timeframe::H24).num_traders(), 0);
        assert!(token.base_asset.tags.contains("verified"));
        assert!(token.created_at().is_some());
    }

    #[test]
    fn test_token_decodes_with_null_strings() {
        let raw = r#"{
            "id": "a",
            "chain": null,
            "createdAt": null,
            "baseAsset": { "id": null, "name": null, "symbol": "X", "mcap": null, "tags": null }
        }"#;

        let token: Token = serde_json::from_str(raw).unwrap();
        assert_eq!(token.symbol(), "X");
        assert_eq!(token.name(), "");
        assert_eq!(token.chain, "");
        assert!(token.base_asset.tags.is_empty());
        assert!(token.created_at().is_none());
        assert_eq!(token.market_cap(), 0.0);

        let bare: Token = serde_json::from_str(r#"{ "id": "b", "baseAsset": null }"#).unwrap();
        assert_eq!(bare.base_asset, BaseAsset::default());
    }

    #[test]
    fn test_token_stats_keep_negative_changes() {
        let raw = r#"{ "priceChange": -42.5, "buyVolume": 300.0, "sellVolume": 100.0, "numTraders": 12 }"#;
        let stats: TokenStats = serde_json::from_str(raw).unwrap();

        assert_eq!(stats.price_change(), -42.5);
        assert_eq!(stats.total_volume(), 400.0);
        assert_eq!(stats.buy_pressure(), 75.0);
        assert_eq!(stats.num_traders(), 12);
    }

    #[test]
    fn test_buy_pressure_without_volume() {
        assert_eq!(TokenStats::default().buy_pressure(), 0.0);
    }

    #[test]
    fn test_timeframe_and_interval_parsing() {
        assert_eq!("6h".parse::<Timeframe>().unwrap(), Timeframe::H6);
        assert!("2h".parse::<Timeframe>().is_err());
        assert_eq!("4_HOUR".parse::<ChartInterval>().unwrap(), ChartInterval::FourHour);
        assert_eq!("12h".parse::<ChartInterval>().unwrap(), ChartInterval::TwelveHour);
        assert_eq!(ChartInterval::TwelveHour.next(), ChartInterval::OneHour);
    }

    #[test]
    fn test_chart_price_range() {
        let chart = ChartData {
            candles: vec![
                ChartCandle { time: 1, open: 1.0, high: 2.0, low: 0.5, close: 1.5, volume: 10.0 },
                ChartCandle { time: 2, open: 1.5, high: 3.0, low: 1.0, close: 1.2, volume: 5.0 },
            ],
        };

        assert_eq!(chart.price_range(), Some((0.5, 3.0)));
        assert!(!chart.candles[1].is_bullish());
        assert_eq!(ChartData::default().price_range(), None);
    }

    #[test]
    fn test_launchpad_stats_missing_bucket_defaults() {
        let raw = r#"{ "id": "believe", "stats24h": { "volume": 1000.0, "graduateCount": 3 } }"#;
        let stats: LaunchpadStats = serde_json::from_str(raw).unwrap();

        assert_eq!(stats.display_name(), "believe");
        assert_eq!(stats.stats(Timeframe::H24).graduate_count(), 3);
        assert_eq!(stats.stats(Timeframe::M5).volume(), 0.0);
    }
}
