use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line as TextLine, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph, Row, Table, TableState, Wrap,
        canvas::{Canvas, Line, Rectangle},
    },
};
use screener_core::{
    format::{
        format_address, format_count, format_currency_millions, format_number, format_percentage,
        format_price, time_ago,
    },
    models::{ChartData, Timeframe, Token},
};

use crate::app::{App, InputMode, Screen};
use crate::theme::Palette;

pub fn ui(f: &mut Frame, app: &App) {
    let palette = app.theme.palette();

    let area = f.area();
    f.render_widget(Block::default().style(palette.base()), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Screen
            Constraint::Length(5), // Logs
            Constraint::Length(1), // Key help
        ])
        .split(area);

    match app.screen {
        Screen::Explore => render_explore(f, app, layout[0], &palette),
        Screen::Detail => render_detail(f, app, layout[0], &palette),
    }
    render_logs(f, app, layout[1], &palette);
    render_help(f, app, layout[2], &palette);

    if let Some(alert) = &app.alert {
        render_alert(f, alert, area, &palette);
    }
}

fn render_explore(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Launchpad stats
            Constraint::Length(3), // Search / filter / sort bar
            Constraint::Min(0),    // Token table
        ])
        .split(area);

    render_launchpad_stats(f, app, chunks[0], palette);
    render_query_bar(f, app, chunks[1], palette);
    render_token_table(f, app, chunks[2], palette);
}

fn render_launchpad_stats(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let launchpad = app
        .launchpad_stats
        .iter()
        .find(|s| s.display_name().eq_ignore_ascii_case(&app.launchpad) || s.id.eq_ignore_ascii_case(&app.launchpad))
        .or_else(|| app.launchpad_stats.first());

    let text = match launchpad {
        Some(stats) => {
            let window = stats.stats(app.timeframe);
            vec![
                TextLine::from(vec![
                    Span::raw("Volume "),
                    Span::styled(format_currency_millions(window.volume()), palette.bold()),
                    Span::raw("   Traders "),
                    Span::styled(format_count(window.traders()), palette.bold()),
                    Span::raw("   Share "),
                    Span::styled(format!("{:.2}%", window.market_share()), palette.bold()),
                ]),
                TextLine::from(vec![
                    Span::raw("Mints "),
                    Span::styled(format_count(window.mint_count()), palette.bold()),
                    Span::raw("   Graduates "),
                    Span::styled(
                        format_count(window.graduate_count()),
                        Style::default().fg(palette.positive),
                    ),
                ]),
            ]
        }
        None if app.loading => vec![TextLine::from("Loading...")],
        None => vec![TextLine::from("No launchpad stats")],
    };

    let title = format!("{} · {}", app.launchpad, app.timeframe);
    f.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(palette.border_style())
                .title(title),
        ),
        area,
    );
}

fn render_query_bar(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.fg)
    };
    let search = if app.query.search.is_empty() && app.input_mode == InputMode::Normal {
        "-".to_string()
    } else if app.input_mode == InputMode::Search {
        format!("{}_", app.query.search)
    } else {
        app.query.search.clone()
    };

    let mut spans = vec![
        Span::raw("Search "),
        Span::styled(search, search_style),
        Span::raw("   Filter "),
        Span::styled(app.query.category.label(), Style::default().fg(palette.accent)),
        Span::raw("   Sort "),
        Span::styled(app.query.sort.label(), Style::default().fg(palette.accent)),
        Span::raw("   "),
    ];
    for timeframe in Timeframe::ALL {
        let style = if timeframe == app.timeframe {
            Style::default().fg(palette.bg).bg(palette.accent)
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(format!(" {timeframe} "), style));
    }

    f.render_widget(
        Paragraph::new(TextLine::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border_style()),
        ),
        area,
    );
}

fn render_token_table(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let rows: Vec<Row> = app
        .visible
        .iter()
        .enumerate()
        .map(|(i, token)| token_row(i, token, app.timeframe, palette))
        .collect();

    let title = if app.loading {
        "Tokens (loading...)".to_string()
    } else {
        format!("Tokens ({}/{})", app.visible.len(), app.tokens.len())
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(16),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(10),
            Constraint::Percentage(10),
            Constraint::Percentage(10),
            Constraint::Percentage(8),
        ],
    )
    .header(
        Row::new(vec![
            "#".to_string(),
            "Token".to_string(),
            "Price".to_string(),
            "MC".to_string(),
            "Vol 24h".to_string(),
            format!("Δ {}", app.timeframe),
            "Traders".to_string(),
            "Holders".to_string(),
            "Age".to_string(),
        ])
        .style(Style::default().fg(palette.accent)),
    )
    .row_highlight_style(Style::default().bg(palette.highlight_bg).add_modifier(Modifier::BOLD))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border_style())
            .title(title),
    );

    let mut state = TableState::default();
    if !app.visible.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn token_row<'a>(i: usize, token: &Token, timeframe: Timeframe, palette: &Palette) -> Row<'a> {
    let change = format_percentage(token.stats(timeframe).price_change());
    let change_style = palette.change(change.is_positive);

    Row::new(vec![
        Span::raw(format!("{}", i + 1)),
        Span::styled(token.symbol().to_string(), palette.bold()),
        Span::raw(format_price(token.usd_price())),
        Span::raw(format_currency_millions(token.market_cap())),
        Span::raw(format_currency_millions(token.volume_24h())),
        Span::styled(change.text, change_style),
        Span::raw(format_count(token.stats(Timeframe::H24).num_traders())),
        Span::raw(format_count(token.holder_count())),
        Span::styled(
            time_ago(&token.created_at).trim_end_matches(" ago").to_string(),
            Style::default().fg(palette.muted),
        ),
    ])
}

fn render_detail(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let Some(token) = &app.detail.token else {
        f.render_widget(
            Paragraph::new("Loading token...").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.border_style()),
            ),
            area,
        );
        return;
    };

    render_detail_sidebar(f, app, token, columns[0], palette);
    render_chart(f, app, token, &app.detail.chart, columns[1], palette);
}

fn render_detail_sidebar(f: &mut Frame, app: &App, token: &Token, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12), // Top metrics
            Constraint::Min(0),     // Stats per timeframe
        ])
        .split(area);

    let metric = |label: &'static str, value: String| {
        TextLine::from(vec![
            Span::styled(format!("{label:<11}"), Style::default().fg(palette.muted)),
            Span::styled(value, palette.bold()),
        ])
    };

    let mut metrics = vec![
        metric("Price", format_price(token.usd_price())),
        metric("MC", format_currency_millions(token.market_cap())),
        metric("FDV", format_currency_millions(token.fdv())),
        metric("Liquidity", format_currency_millions(token.liquidity())),
        metric("Holders", format_count(token.holder_count())),
        metric("Org Score", format!("{:.2}", token.organic_score())),
        metric("Mint", format_address(&token.base_asset.id)),
        metric("DEX", token.dex.clone()),
        metric("Created", time_ago(&token.created_at)),
    ];
    if !token.base_asset.tags.is_empty() {
        let tags: Vec<&str> = token.base_asset.tags.iter().map(String::as_str).collect();
        metrics.push(metric("Tags", tags.join(", ")));
    }

    let title = if app.detail.loading {
        format!("{} ({}) refreshing...", token.name(), token.symbol())
    } else {
        format!("{} ({})", token.name(), token.symbol())
    };
    f.render_widget(
        Paragraph::new(metrics).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(palette.border_style())
                .title(title),
        ),
        chunks[0],
    );

    let rows: Vec<Row> = Timeframe::ALL
        .into_iter()
        .map(|timeframe| {
            let stats = token.stats(timeframe);
            let change = format_percentage(stats.price_change());
            let style = palette.change(change.is_positive);
            Row::new(vec![
                Span::raw(timeframe.as_str()),
                Span::styled(change.text, style),
                Span::raw(format_number(stats.total_volume())),
                Span::raw(format!("{:.0}%", stats.buy_pressure())),
                Span::raw(format_count(stats.num_traders())),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(12),
            Constraint::Percentage(24),
            Constraint::Percentage(24),
            Constraint::Percentage(16),
            Constraint::Percentage(24),
        ],
    )
    .header(
        Row::new(vec!["", "Price Δ", "Volume", "Buys", "Traders"])
            .style(Style::default().fg(palette.accent)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border_style())
            .title("Stats"),
    );
    f.render_widget(table, chunks[1]);
}

fn render_chart(
    f: &mut Frame,
    app: &App,
    token: &Token,
    chart: &ChartData,
    area: Rect,
    palette: &Palette,
) {
    let title = format!(
        "Chart - {} · {}{}",
        token.symbol(),
        app.chart_interval.label(),
        if app.detail.chart_loading { " (loading...)" } else { "" }
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border_style())
        .title(title);

    let Some((low, high)) = chart.price_range() else {
        f.render_widget(Paragraph::new("No candles").block(block), area);
        return;
    };

    // Flat charts still need a non-empty y range
    let pad = ((high - low) * 0.05).max(high.abs() * 0.01).max(f64::EPSILON);
    let positive = palette.positive;
    let negative = palette.negative;

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([-1.0, chart.candles.len() as f64])
        .y_bounds([low - pad, high + pad])
        .paint(move |ctx| {
            for (i, candle) in chart.candles.iter().enumerate() {
                let color = if candle.is_bullish() { positive } else { negative };
                let x = i as f64;

                // Wick
                ctx.draw(&Line {
                    x1: x,
                    y1: candle.low,
                    x2: x,
                    y2: candle.high,
                    color,
                });

                let (bottom, top) = if candle.open < candle.close {
                    (candle.open, candle.close)
                } else {
                    (candle.close, candle.open)
                };
                ctx.draw(&Rectangle {
                    x: x - 0.2,
                    y: bottom,
                    width: 0.4,
                    height: (top - bottom).max(pad * 0.01),
                    color,
                });
            }
        });
    f.render_widget(canvas, area);
}

fn render_logs(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<TextLine> = app
        .logs
        .iter()
        .skip(app.logs.len().saturating_sub(visible))
        .map(|l| TextLine::from(l.as_str()))
        .collect();

    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(palette.muted))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.border_style())
                    .title("Logs"),
            ),
        area,
    );
}

fn render_help(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let help = match (app.screen, app.input_mode) {
        (_, InputMode::Search) => "type to search · Enter keep · Esc clear",
        (Screen::Explore, _) => {
            "/ search · f filter · s sort · 1-4 timeframe · ↑↓ select · Enter open · r refresh · t theme · q quit"
        }
        (Screen::Detail, _) => "i interval · r refresh · Esc back · t theme · q quit",
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(palette.muted)),
        area,
    );
}

fn render_alert(f: &mut Frame, message: &str, area: Rect, palette: &Palette) {
    let [popup] = Layout::horizontal([Constraint::Length(50)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(popup);

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(vec![
            TextLine::from(message.to_string()),
            TextLine::from(""),
            TextLine::from(Span::styled("Esc to dismiss", Style::default().fg(palette.muted))),
        ])
        .wrap(Wrap { trim: true })
        .style(palette.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.negative))
                .title("Error"),
        ),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use screener_core::{
        config::ScreenerConfig,
        models::{BaseAsset, TokenList},
    };

    use crate::app::AppEvent;

    fn render(app: &App) -> String {
        let backend = TestBackend::new(140, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_with_token() -> App {
        let mut app = App::new(&ScreenerConfig::default());
        app.apply_event(AppEvent::TokensLoaded {
            timeframe: app.timeframe,
            tokens: Ok(TokenList {
                tokens: vec![Token {
                    id: "pool".to_string(),
                    created_at: "2025-05-01T00:00:00Z".to_string(),
                    base_asset: BaseAsset {
                        id: "mint".to_string(),
                        name: "Rabbit".to_string(),
                        symbol: "RAB".to_string(),
                        mcap: Some(1_500_000.0),
                        ..Default::default()
                    },
                    ..Default::default()
                }],
            }),
        });
        app
    }

    #[test]
    fn test_explore_screen_lists_tokens() {
        let screen = render(&app_with_token());
        assert!(screen.contains("RAB"));
        assert!(screen.contains("$1.50M"));
        assert!(screen.contains("Tokens (1/1)"));
    }

    #[test]
    fn test_alert_is_drawn() {
        let mut app = app_with_token();
        app.alert = Some("Could not load tokens. Press r to retry.".to_string());
        let screen = render(&app);
        assert!(screen.contains("Press r to retry."));
    }

    #[test]
    fn test_detail_screen_without_candles() {
        let mut app = app_with_token();
        app.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Enter,
            crossterm::event::KeyModifiers::NONE,
        ));
        let screen = render(&app);
        assert!(screen.contains("Rabbit (RAB)"));
        assert!(screen.contains("No candles"));
    }
}
