use screener_core::DatapiClient;
use tokio::sync::mpsc;

use crate::app::{AppEvent, Command};

/// Runs app commands on the runtime and reports back over the event channel.
#[derive(Clone)]
pub struct Dispatcher {
    client: DatapiClient,
    events_tx: mpsc::Sender<AppEvent>,
}

impl Dispatcher {
    pub fn new(client: DatapiClient, events_tx: mpsc::Sender<AppEvent>) -> Self {
        Self { client, events_tx }
    }

    pub fn dispatch(&self, command: Command) {
        let client = self.client.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let event = run_command(&client, command).await;
            if events_tx.send(event).await.is_err() {
                tracing::debug!("event receiver closed, dropping fetch result");
            }
        });
    }
}

pub async fn run_command(client: &DatapiClient, command: Command) -> AppEvent {
    match command {
        Command::LoadExplore { timeframe } => {
            // Independent reads; merged only once both resolve.
            let (stats, tokens) = tokio::join!(
                client.fetch_launchpad_stats(),
                client.fetch_tokens(timeframe)
            );
            AppEvent::ExploreLoaded {
                timeframe,
                stats,
                tokens,
            }
        }
        Command::LoadTokens { timeframe } => AppEvent::TokensLoaded {
            timeframe,
            tokens: client.fetch_tokens(timeframe).await,
        },
        Command::LoadDetail { asset_id } => {
            let token = client.fetch_token_detail(&asset_id).await;
            AppEvent::DetailLoaded { asset_id, token }
        }
        Command::LoadChart {
            asset_id,
            interval,
            candles,
            generation,
        } => AppEvent::ChartLoaded {
            generation,
            chart: client.fetch_token_chart(&asset_id, interval, candles).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::{config::ApiConfig, models::Timeframe};
    use tokio::net::TcpListener;

    async fn unreachable_client() -> DatapiClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        DatapiClient::new(&ApiConfig {
            base_url: format!("http://{addr}/v1"),
            chart_base_url: format!("http://{addr}/v2"),
            launchpad: "Believe".to_string(),
        })
    }

    #[tokio::test]
    async fn test_explore_load_reports_both_failures() {
        let client = unreachable_client().await;
        let event = run_command(&client, Command::LoadExplore { timeframe: Timeframe::H6 }).await;

        match event {
            AppEvent::ExploreLoaded { timeframe, stats, tokens } => {
                assert_eq!(timeframe, Timeframe::H6);
                assert!(stats.is_err());
                assert!(tokens.is_err());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers_chart_generation() {
        let client = unreachable_client().await;
        let (tx, mut rx) = mpsc::channel(4);
        let dispatcher = Dispatcher::new(client, tx);

        dispatcher.dispatch(Command::LoadChart {
            asset_id: "mint".to_string(),
            interval: Default::default(),
            candles: 10,
            generation: 7,
        });

        match rx.recv().await {
            Some(AppEvent::ChartLoaded { generation, chart }) => {
                assert_eq!(generation, 7);
                assert!(chart.is_err());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
