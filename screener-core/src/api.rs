// Read-only client for the market-data API. One attempt per call: no retry, no backoff.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::models::{ChartData, ChartInterval, LaunchpadStats, Timeframe, Token, TokenList};

#[derive(Debug, Deserialize)]
struct LaunchpadStatsResponse {
    launchpads: Vec<LaunchpadStats>,
}

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    pools: Vec<Token>,
}

/// The two shapes the top-traded endpoint has been seen to return.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PoolsEnvelope {
    Pools { pools: Vec<Token> },
    Tokens { tokens: Vec<Token> },
}

impl From<PoolsEnvelope> for TokenList {
    fn from(envelope: PoolsEnvelope) -> Self {
        match envelope {
            PoolsEnvelope::Pools { pools } => TokenList { tokens: pools },
            PoolsEnvelope::Tokens { tokens } => TokenList { tokens },
        }
    }
}

/// Strict decode of a token-list body. Unknown shapes are an error here.
pub fn decode_token_list(body: &[u8]) -> Result<TokenList> {
    let envelope: PoolsEnvelope = serde_json::from_slice(body)?;
    Ok(envelope.into())
}

#[derive(Clone)]
pub struct DatapiClient {
    client: reqwest::Client,
    base_url: String,
    chart_base_url: String,
    launchpad: String,
}

impl DatapiClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chart_base_url: config.chart_base_url.trim_end_matches('/').to_string(),
            launchpad: config.launchpad.clone(),
        }
    }

    pub fn launchpad(&self) -> &str {
        &self.launchpad
    }

    pub async fn fetch_launchpad_stats(&self) -> Result<Vec<LaunchpadStats>> {
        let url = format!("{}/launchpads/stats", self.base_url);
        let response: LaunchpadStatsResponse = self.get_json(&url, &[]).await?;
        Ok(response.launchpads)
    }

    /// Top-traded pools for the configured launchpad. A body in neither known shape
    /// degrades to an empty list; HTTP failures still propagate.
    pub async fn fetch_tokens(&self, timeframe: Timeframe) -> Result<TokenList> {
        let url = format!("{}/pools/toptraded/{}", self.base_url, timeframe);
        let body = self
            .get(&url, &[("launchpads", self.launchpad.clone())])
            .await?;

        match decode_token_list(&body) {
            Ok(list) => Ok(list),
            Err(err) => {
                warn!("unexpected token list shape from {url}, showing no tokens: {err}");
                Ok(TokenList::default())
            }
        }
    }

    pub async fn fetch_token_detail(&self, asset_id: &str) -> Result<Option<Token>> {
        let url = format!("{}/pools", self.base_url);
        let response: PoolsResponse = self
            .get_json(&url, &[("assetIds", asset_id.to_string())])
            .await?;
        Ok(response.pools.into_iter().next())
    }

    pub async fn fetch_token_chart(
        &self,
        asset_id: &str,
        interval: ChartInterval,
        candles: u32,
    ) -> Result<ChartData> {
        self.fetch_token_chart_until(asset_id, interval, candles, Utc::now().timestamp_millis())
            .await
    }

    /// Chart ending at `to_millis` (epoch milliseconds).
    pub async fn fetch_token_chart_until(
        &self,
        asset_id: &str,
        interval: ChartInterval,
        candles: u32,
        to_millis: i64,
    ) -> Result<ChartData> {
        let url = format!("{}/charts/{}", self.chart_base_url, asset_id);
        let query = [
            ("interval", interval.as_str().to_string()),
            ("to", to_millis.to_string()),
            ("candles", candles.to_string()),
            ("type", "price".to_string()),
        ];
        self.get_json(&url, &query).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let body = self.get(url, query).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
        debug!("GET {url} {query:?}");

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
