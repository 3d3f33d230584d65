use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use screener_core::{
    config::ScreenerConfig,
    explore::ExploreQuery,
    models::{ChartData, ChartInterval, LaunchpadStats, Timeframe, Token, TokenList},
    ApiError,
};

use crate::theme::Theme;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Explore,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Fetch requested by a key press; `main` runs it off the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadExplore {
        timeframe: Timeframe,
    },
    LoadTokens {
        timeframe: Timeframe,
    },
    LoadDetail {
        asset_id: String,
    },
    LoadChart {
        asset_id: String,
        interval: ChartInterval,
        candles: u32,
        generation: u64,
    },
}

/// Result of a finished fetch, delivered back to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    ExploreLoaded {
        timeframe: Timeframe,
        stats: Result<Vec<LaunchpadStats>, ApiError>,
        tokens: Result<TokenList, ApiError>,
    },
    TokensLoaded {
        timeframe: Timeframe,
        tokens: Result<TokenList, ApiError>,
    },
    DetailLoaded {
        asset_id: String,
        token: Result<Option<Token>, ApiError>,
    },
    ChartLoaded {
        generation: u64,
        chart: Result<ChartData, ApiError>,
    },
}

#[derive(Debug, Default)]
pub struct DetailState {
    pub asset_id: String,
    pub token: Option<Token>,
    pub loading: bool,
    pub chart: ChartData,
    pub chart_loading: bool,
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub launchpad: String,
    pub timeframe: Timeframe,
    pub query: ExploreQuery,
    pub launchpad_stats: Vec<LaunchpadStats>,
    pub tokens: Vec<Token>,
    pub visible: Vec<Token>,
    pub selected: usize,
    pub loading: bool,
    pub alert: Option<String>,
    pub logs: Vec<String>,
    pub theme: Theme,
    pub detail: DetailState,
    pub chart_interval: ChartInterval,
    pub chart_candles: u32,
    pub chart_generation: u64,
}

impl App {
    pub fn new(config: &ScreenerConfig) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Explore,
            input_mode: InputMode::Normal,
            launchpad: config.api.launchpad.clone(),
            timeframe: config.explore.timeframe,
            query: ExploreQuery::default(),
            launchpad_stats: Vec::new(),
            tokens: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            loading: false,
            alert: None,
            logs: vec![format!("Watching {} launchpad", config.api.launchpad)],
            theme: Theme::default(),
            detail: DetailState::default(),
            chart_interval: config.explore.chart_interval,
            chart_candles: config.explore.chart_candles,
            chart_generation: 0,
        }
    }

    /// Initial screen load: stats and tokens together.
    pub fn start(&mut self) -> Command {
        self.loading = true;
        Command::LoadExplore {
            timeframe: self.timeframe,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn add_log(&mut self, message: String) {
        self.logs.push(message);
        if self.logs.len() > MAX_LOGS {
            let excess = self.logs.len() - MAX_LOGS;
            self.logs.drain(..excess);
        }
    }

    pub fn selected_token(&self) -> Option<&Token> {
        self.visible.get(self.selected)
    }

    pub fn refresh_visible(&mut self) {
        self.refresh_visible_at(Utc::now());
    }

    /// Re-derives the displayed list from the full token list.
    pub fn refresh_visible_at(&mut self, now: DateTime<Utc>) {
        let selected_id = self.selected_token().map(|t| t.id.clone());

        self.visible = self
            .query
            .apply(&self.tokens, now)
            .into_iter()
            .cloned()
            .collect();

        self.selected = selected_id
            .and_then(|id| self.visible.iter().position(|t| t.id == id))
            .unwrap_or(0);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return Vec::new();
        }

        if self.input_mode == InputMode::Search {
            self.handle_search_key(key);
            return Vec::new();
        }

        if self.alert.is_some() && key.code == KeyCode::Esc {
            self.alert = None;
            return Vec::new();
        }

        match self.screen {
            Screen::Explore => self.handle_explore_key(key),
            Screen::Detail => self.handle_detail_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.query.search.clear();
                self.refresh_visible();
            }
            KeyCode::Backspace => {
                self.query.search.pop();
                self.refresh_visible();
            }
            KeyCode::Char(c) => {
                self.query.search.push(c);
                self.refresh_visible();
            }
            _ => {}
        }
    }

    fn handle_explore_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('t') => self.theme = self.theme.toggle(),
            KeyCode::Char('f') => {
                self.query.category = self.query.category.next();
                self.refresh_visible();
            }
            KeyCode::Char('s') => {
                self.query.sort = self.query.sort.next();
                self.refresh_visible();
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                let timeframe = Timeframe::ALL[idx];
                if timeframe != self.timeframe {
                    self.timeframe = timeframe;
                    self.loading = true;
                    return vec![Command::LoadTokens { timeframe }];
                }
            }
            KeyCode::Char('r') => return vec![self.start()],
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(token) = self.selected_token().cloned() {
                    return self.open_detail(token);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc | KeyCode::Backspace => self.screen = Screen::Explore,
            KeyCode::Char('t') => self.theme = self.theme.toggle(),
            KeyCode::Char('i') => {
                self.chart_interval = self.chart_interval.next();
                return vec![self.request_chart()];
            }
            KeyCode::Char('r') => {
                self.detail.loading = true;
                return vec![
                    Command::LoadDetail {
                        asset_id: self.detail.asset_id.clone(),
                    },
                    self.request_chart(),
                ];
            }
            _ => {}
        }
        Vec::new()
    }

    fn open_detail(&mut self, token: Token) -> Vec<Command> {
        let asset_id = if token.base_asset.id.is_empty() {
            token.id.clone()
        } else {
            token.base_asset.id.clone()
        };

        self.screen = Screen::Detail;
        self.detail = DetailState {
            asset_id: asset_id.clone(),
            token: Some(token),
            loading: true,
            chart: ChartData::default(),
            chart_loading: false,
        };

        vec![Command::LoadDetail { asset_id }, self.request_chart()]
    }

    /// Every chart request supersedes the previous one; older responses get dropped.
    fn request_chart(&mut self) -> Command {
        self.chart_generation += 1;
        self.detail.chart_loading = true;
        Command::LoadChart {
            asset_id: self.detail.asset_id.clone(),
            interval: self.chart_interval,
            candles: self.chart_candles,
            generation: self.chart_generation,
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ExploreLoaded {
                timeframe,
                stats,
                tokens,
            } => {
                match stats {
                    Ok(stats) => self.launchpad_stats = stats,
                    Err(err) => self.fail("launchpad stats", &err),
                }
                self.apply_tokens(timeframe, tokens);
            }
            AppEvent::TokensLoaded { timeframe, tokens } => self.apply_tokens(timeframe, tokens),
            AppEvent::DetailLoaded { asset_id, token } => {
                if asset_id != self.detail.asset_id {
                    return;
                }
                self.detail.loading = false;
                match token {
                    Ok(Some(token)) => self.detail.token = Some(token),
                    Ok(None) => {
                        self.alert = Some(format!("Token {asset_id} was not found."));
                    }
                    Err(err) => self.fail("token detail", &err),
                }
            }
            AppEvent::ChartLoaded { generation, chart } => {
                if generation != self.chart_generation {
                    self.add_log(format!("Dropped stale chart response #{generation}"));
                    return;
                }
                self.detail.chart_loading = false;
                match chart {
                    Ok(chart) => self.detail.chart = chart,
                    Err(err) => self.fail("chart", &err),
                }
            }
        }
    }

    fn apply_tokens(&mut self, timeframe: Timeframe, tokens: Result<TokenList, ApiError>) {
        if timeframe != self.timeframe {
            self.add_log(format!("Ignored {timeframe} tokens, now showing {}", self.timeframe));
            return;
        }
        self.loading = false;

        match tokens {
            Ok(list) => {
                self.add_log(format!("Loaded {} tokens ({timeframe})", list.tokens.len()));
                self.tokens = list.tokens;
                self.refresh_visible();
            }
            Err(err) => self.fail("tokens", &err),
        }
    }

    fn fail(&mut self, what: &str, err: &ApiError) {
        self.add_log(format!("Failed to load {what}: {err}"));
        self.alert = Some(format!("Could not load {what}. Press r to retry."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use screener_core::explore::{Category, SortKey};
    use screener_core::models::{BaseAsset, ChartCandle};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn token(id: &str, symbol: &str, mcap: f64) -> Token {
        Token {
            id: id.to_string(),
            created_at: "2025-05-01T00:00:00Z".to_string(),
            base_asset: BaseAsset {
                id: format!("{id}-mint"),
                name: format!("{symbol} Token"),
                symbol: symbol.to_string(),
                mcap: Some(mcap),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new(&ScreenerConfig::default());
        app.start();
        app.apply_event(AppEvent::ExploreLoaded {
            timeframe: Timeframe::H24,
            stats: Ok(vec![LaunchpadStats {
                id: "believe".to_string(),
                ..Default::default()
            }]),
            tokens: Ok(TokenList {
                tokens: vec![
                    token("a", "AAA", 10.0),
                    token("b", "BBB", 5.0),
                    token("c", "CCC", 100_000.0),
                ],
            }),
        });
        app
    }

    fn stale_error() -> ApiError {
        ApiError::Decode(serde_json::from_str::<u8>("x").unwrap_err())
    }

    #[test]
    fn test_start_requests_stats_and_tokens() {
        let mut app = App::new(&ScreenerConfig::default());
        assert_eq!(
            app.start(),
            Command::LoadExplore {
                timeframe: Timeframe::H24
            }
        );
        assert!(app.loading);
    }

    #[test]
    fn test_loaded_tokens_are_sorted_for_display() {
        let app = loaded_app();
        assert!(!app.loading);
        assert_eq!(app.launchpad_stats.len(), 1);
        let ids: Vec<&str> = app.visible.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_filter_and_sort_keys_recompute_from_full_list() {
        let mut app = loaded_app();

        app.handle_key(key(KeyCode::Char('f')));
        app.handle_key(key(KeyCode::Char('f')));
        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.query.category, Category::Graduated);
        assert_eq!(app.visible.len(), 1);

        app.query.category = Category::All;
        app.refresh_visible();
        assert_eq!(app.visible.len(), 3);

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.query.sort, SortKey::Volume);
    }

    #[test]
    fn test_search_mode_edits_query() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);

        app.handle_key(key(KeyCode::Char('b')));
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.query.search, "bb");
        assert_eq!(app.visible.len(), 1);

        // 'q' is text while searching
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Backspace));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.query.search.is_empty());
        assert_eq!(app.visible.len(), 3);
    }

    #[test]
    fn test_selection_follows_token_across_resort() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected_token().map(|t| t.id.as_str()), Some("a"));

        app.query.sort = SortKey::Newest;
        app.refresh_visible_at(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(app.selected_token().map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn test_timeframe_switch_requests_tokens() {
        let mut app = loaded_app();
        let commands = app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(commands, vec![Command::LoadTokens { timeframe: Timeframe::H1 }]);

        assert!(app.handle_key(key(KeyCode::Char('2'))).is_empty());
    }

    #[test]
    fn test_tokens_for_old_timeframe_are_ignored() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('1')));

        app.apply_event(AppEvent::TokensLoaded {
            timeframe: Timeframe::H24,
            tokens: Ok(TokenList::default()),
        });
        assert_eq!(app.tokens.len(), 3);
        assert!(app.loading);
    }

    #[test]
    fn test_fetch_failure_raises_alert() {
        let mut app = loaded_app();
        app.apply_event(AppEvent::TokensLoaded {
            timeframe: Timeframe::H24,
            tokens: Err(stale_error()),
        });

        assert_eq!(app.tokens.len(), 3);
        assert_eq!(
            app.alert.as_deref(),
            Some("Could not load tokens. Press r to retry.")
        );

        app.handle_key(key(KeyCode::Esc));
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_enter_opens_detail_with_chart() {
        let mut app = loaded_app();
        let commands = app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(
            commands,
            vec![
                Command::LoadDetail { asset_id: "c-mint".to_string() },
                Command::LoadChart {
                    asset_id: "c-mint".to_string(),
                    interval: ChartInterval::OneHour,
                    candles: 100,
                    generation: 1,
                },
            ]
        );

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Explore);
    }

    #[test]
    fn test_stale_chart_response_is_dropped() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.chart_generation, 2);
        assert_eq!(app.chart_interval, ChartInterval::FourHour);

        let candle = ChartCandle { time: 1, open: 1.0, high: 1.0, low: 1.0, close: 1.0, volume: 0.0 };

        app.apply_event(AppEvent::ChartLoaded {
            generation: 2,
            chart: Ok(ChartData { candles: vec![candle; 2] }),
        });
        app.apply_event(AppEvent::ChartLoaded {
            generation: 1,
            chart: Ok(ChartData { candles: vec![candle; 5] }),
        });

        assert_eq!(app.detail.chart.candles.len(), 2);
        assert!(!app.detail.chart_loading);
    }

    #[test]
    fn test_missing_detail_alerts() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Enter));

        app.apply_event(AppEvent::DetailLoaded {
            asset_id: "c-mint".to_string(),
            token: Ok(None),
        });
        assert!(!app.detail.loading);
        assert!(app.alert.is_some());
        assert_eq!(app.detail.token.as_ref().map(|t| t.id.as_str()), Some("c"));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = loaded_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_logs_are_capped() {
        let mut app = App::new(&ScreenerConfig::default());
        for i in 0..(MAX_LOGS + 10) {
            app.add_log(format!("line {i}"));
        }
        assert_eq!(app.logs.len(), MAX_LOGS);
        assert_eq!(app.logs.last().map(String::as_str), Some("line 209"));
    }
}
