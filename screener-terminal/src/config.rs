use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use dotenv::dotenv;
use screener_core::{
    config::ScreenerConfig,
    explore::{Category, SortKey},
    models::{ChartInterval, Timeframe},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Market-data API base URL
    #[arg(long, global = true, env = "SCREENER_BASE_URL")]
    pub base_url: Option<String>,

    /// Chart API base URL
    #[arg(long, global = true, env = "SCREENER_CHART_BASE_URL")]
    pub chart_base_url: Option<String>,

    /// Launchpad whose tokens are listed
    #[arg(long, global = true, env = "SCREENER_LAUNCHPAD")]
    pub launchpad: Option<String>,

    /// Write logs to this file (the interactive screen discards them otherwise)
    #[arg(long, global = true, env = "SCREENER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive screener (default)
    Tui,
    /// Print the filtered and sorted token list
    List(ListArgs),
    /// Print launchpad stats
    Stats {
        #[arg(short, long, default_value = "24h")]
        timeframe: Timeframe,
    },
    /// Print one token's detail
    Token { asset_id: String },
    /// Print price candles for a token
    Chart {
        asset_id: String,
        #[arg(short, long)]
        interval: Option<ChartInterval>,
        #[arg(short, long)]
        candles: Option<u32>,
    },
}

#[derive(ClapArgs, Debug, Clone, PartialEq)]
pub struct ListArgs {
    #[arg(short, long)]
    pub timeframe: Option<Timeframe>,

    /// Case-insensitive match on symbol or name
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// all, hot, trending, graduated or new
    #[arg(short, long, default_value = "all")]
    pub category: Category,

    /// market_cap, volume, price, traders, holders or newest
    #[arg(long, default_value = "market_cap")]
    pub sort: SortKey,

    #[arg(short, long)]
    pub limit: Option<usize>,
}

impl Args {
    /// Flags and `SCREENER_*` variables win over the file/`SCREENER__*` config.
    pub fn apply(&self, config: &mut ScreenerConfig) {
        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(url) = &self.chart_base_url {
            config.api.chart_base_url = url.clone();
        }
        if let Some(launchpad) = &self.launchpad {
            config.api.launchpad = launchpad.clone();
        }
    }
}

pub fn load_config() -> Result<(Args, ScreenerConfig)> {
    dotenv().ok();
    let args = Args::parse();
    let mut config = ScreenerConfig::from_env()?;
    args.apply(&mut config);
    Ok((args, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let args = Args::try_parse_from(["screener"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_list_arguments_parse() {
        let args = Args::try_parse_from([
            "screener", "list", "--timeframe", "1h", "--search", "rab", "--category", "hot",
            "--sort", "newest", "--limit", "5",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Some(Command::List(ListArgs {
                timeframe: Some(Timeframe::H1),
                search: "rab".to_string(),
                category: Category::Hot,
                sort: SortKey::Newest,
                limit: Some(5),
            }))
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "screener", "list", "--base-url", "http://localhost:4000/v1", "--log-file", "screener.log",
        ])
        .unwrap();

        assert_eq!(args.base_url.as_deref(), Some("http://localhost:4000/v1"));
        assert_eq!(args.log_file, Some(PathBuf::from("screener.log")));
        assert!(matches!(args.command, Some(Command::List(_))));
    }

    #[test]
    fn test_rejects_unknown_category() {
        assert!(Args::try_parse_from(["screener", "list", "--category", "cheap"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "screener", "--base-url", "http://localhost:4000/v1", "--launchpad", "Other",
        ])
        .unwrap();
        let mut config = ScreenerConfig::default();
        args.apply(&mut config);

        assert_eq!(config.api.base_url, "http://localhost:4000/v1");
        assert_eq!(config.api.launchpad, "Other");
        assert_eq!(config.api.chart_base_url, ScreenerConfig::default().api.chart_base_url);
    }
}
