// One-shot subcommands that print to stdout instead of opening the screen.

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};
use screener_core::{
    config::ScreenerConfig,
    explore::ExploreQuery,
    format::{
        format_address, format_count, format_currency_millions, format_number, format_percentage,
        format_price, time_ago_at,
    },
    models::{ChartData, LaunchpadStats, Timeframe, Token},
    DatapiClient,
};

use crate::config::{Command, ListArgs};

pub async fn run(command: Command, config: &ScreenerConfig, client: &DatapiClient) -> Result<()> {
    let lines = match command {
        Command::Tui => return Err(anyhow!("the interactive screen is not a one-shot command")),
        Command::List(args) => {
            let timeframe = args.timeframe.unwrap_or(config.explore.timeframe);
            let list = client.fetch_tokens(timeframe).await?;
            tracing::info!("fetched {} tokens for {timeframe}", list.tokens.len());
            token_table(&list.tokens, &args, timeframe, Utc::now())
        }
        Command::Stats { timeframe } => {
            let stats = client.fetch_launchpad_stats().await?;
            stats_table(&stats, timeframe)
        }
        Command::Token { asset_id } => match client.fetch_token_detail(&asset_id).await? {
            Some(token) => token_detail(&token, Utc::now()),
            None => return Err(anyhow!("no pool found for asset {asset_id}")),
        },
        Command::Chart {
            asset_id,
            interval,
            candles,
        } => {
            let interval = interval.unwrap_or(config.explore.chart_interval);
            let candles = candles.unwrap_or(config.explore.chart_candles);
            let chart = client.fetch_token_chart(&asset_id, interval, candles).await?;
            chart_table(&chart)
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

pub fn token_table(
    tokens: &[Token],
    args: &ListArgs,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Vec<String> {
    let query = ExploreQuery {
        search: args.search.clone(),
        category: args.category,
        sort: args.sort,
    };
    let visible = query.apply(tokens, now);
    let limit = args.limit.unwrap_or(visible.len());

    let mut lines = vec![format!(
        "{:<4} {:<10} {:>12} {:>10} {:>10} {:>9} {:>8} {:>8} {:>8}",
        "#",
        "TOKEN",
        "PRICE",
        "MCAP",
        "VOL 24H",
        format!("Δ {timeframe}"),
        "TRADERS",
        "HOLDERS",
        "AGE"
    )];

    for (i, token) in visible.iter().take(limit).enumerate() {
        let stats = token.stats(timeframe);
        lines.push(format!(
            "{:<4} {:<10} {:>12} {:>10} {:>10} {:>9} {:>8} {:>8} {:>8}",
            i + 1,
            token.symbol(),
            format_price(token.usd_price()),
            format_currency_millions(token.market_cap()),
            format_currency_millions(token.volume_24h()),
            format_percentage(stats.price_change()).text,
            format_count(token.stats(Timeframe::H24).num_traders()),
            format_count(token.holder_count()),
            time_ago_at(&token.created_at, now).trim_end_matches(" ago"),
        ));
    }

    if visible.is_empty() {
        lines.push("no tokens match".to_string());
    }
    lines
}

pub fn stats_table(stats: &[LaunchpadStats], timeframe: Timeframe) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<16} {:>10} {:>9} {:>8} {:>7} {:>10}",
        "LAUNCHPAD",
        format!("VOL {timeframe}"),
        "TRADERS",
        "SHARE",
        "MINTS",
        "GRADUATES"
    )];

    for launchpad in stats {
        let window = launchpad.stats(timeframe);
        lines.push(format!(
            "{:<16} {:>10} {:>9} {:>8} {:>7} {:>10}",
            launchpad.display_name(),
            format_currency_millions(window.volume()),
            format_count(window.traders()),
            format!("{:.2}%", window.market_share()),
            format_count(window.mint_count()),
            format_count(window.graduate_count()),
        ));
    }
    lines
}

pub fn token_detail(token: &Token, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", token.name(), token.symbol()),
        format!("Pool        {}", format_address(&token.id)),
        format!("Mint        {}", format_address(&token.base_asset.id)),
        format!("DEX         {} on {}", token.dex, token.chain),
        format!("Created     {}", time_ago_at(&token.created_at, now)),
        format!("Price       {}", format_price(token.usd_price())),
        format!("Market cap  {}", format_currency_millions(token.market_cap())),
        format!("FDV         {}", format_currency_millions(token.fdv())),
        format!("Liquidity   {}", format_currency_millions(token.liquidity())),
        format!("Holders     {}", format_count(token.holder_count())),
        format!("Org score   {:.2}", token.organic_score()),
    ];

    if !token.base_asset.tags.is_empty() {
        let tags: Vec<&str> = token.base_asset.tags.iter().map(String::as_str).collect();
        lines.push(format!("Tags        {}", tags.join(", ")));
    }

    lines.push(String::new());
    lines.push(format!(
        "{:<5} {:>9} {:>10} {:>10} {:>7} {:>7} {:>8}",
        "", "PRICE Δ", "BUY VOL", "SELL VOL", "BUYS", "SELLS", "TRADERS"
    ));
    for timeframe in Timeframe::ALL {
        let stats = token.stats(timeframe);
        lines.push(format!(
            "{:<5} {:>9} {:>10} {:>10} {:>7} {:>7} {:>8}",
            timeframe.as_str(),
            format_percentage(stats.price_change()).text,
            format_number(stats.buy_volume()),
            format_number(stats.sell_volume()),
            format_count(stats.num_buys()),
            format_count(stats.num_sells()),
            format_count(stats.num_traders()),
        ));
    }
    lines
}

pub fn chart_table(chart: &ChartData) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<20} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "TIME (UTC)", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
    )];

    for candle in &chart.candles {
        let time = Utc
            .timestamp_opt(candle.time, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| candle.time.to_string());
        lines.push(format!(
            "{:<20} {:>12} {:>12} {:>12} {:>12} {:>10}",
            time,
            format_price(candle.open),
            format_price(candle.high),
            format_price(candle.low),
            format_price(candle.close),
            format_number(candle.volume),
        ));
    }
    lines
}
