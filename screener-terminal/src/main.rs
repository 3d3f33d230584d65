use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{fs::File, io, path::Path, sync::Mutex, time::Duration};

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use screener_core::{DatapiClient, config::ScreenerConfig};
use screener_terminal::app::{App, AppEvent};
use screener_terminal::config::Command;
use screener_terminal::network::Dispatcher;
use screener_terminal::ui::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let (args, config) = screener_terminal::config::load_config()?;
    let command = args.command.clone().unwrap_or(Command::Tui);
    let interactive = command == Command::Tui;

    init_tracing(args.log_file.as_deref(), interactive)?;
    tracing::info!("Starting screener with config: {:?}", config.api);

    let client = DatapiClient::new(&config.api);

    if !interactive {
        return screener_terminal::cli::run(command, &config, &client).await;
    }

    run_tui(config, client).await
}

fn init_tracing(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // stdout belongs to the screen while the TUI runs
        None if interactive => builder.with_writer(io::sink).init(),
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

async fn run_tui(config: ScreenerConfig, client: DatapiClient) -> Result<()> {
    // Channel for async events
    let (tx, mut rx) = mpsc::channel(100);
    let dispatcher = Dispatcher::new(client, tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    dispatcher.dispatch(app.start());

    let res = run_app(&mut terminal, &mut app, &dispatcher, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("screener exited with error: {err:?}");
        println!("{:?}", err)
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &Dispatcher,
    rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Drain finished fetches
        while let Ok(event) = rx.try_recv() {
            app.apply_event(event);
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                for command in app.handle_key(key) {
                    tracing::debug!("dispatching {command:?}");
                    dispatcher.dispatch(command);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
