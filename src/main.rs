mod app;
mod config;
mod dialog;
mod media;
mod picker;
mod storage;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Focus, Services};
use config::{AppConfig, Variant};
use dialog::DialogService;
use picker::{NamePool, SystemClock};

/// How long to wait for input before ticking
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "Draw a name from a list using the current millisecond timestamp")]
struct Args {
    /// Names to draw from, separated by whitespace
    #[arg(short, long)]
    pool: Option<String>,

    /// Plain mode: no clips, no remembered disclaimer
    #[arg(long)]
    classic: bool,

    /// Draw once, print the name and exit
    #[arg(long)]
    pick: bool,

    /// With --pick, print the draw as JSON
    #[arg(long, requires = "pick")]
    json: bool,

    /// With --pick, also show a desktop notification
    #[arg(long, requires = "pick")]
    notify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load().unwrap_or_default();
    if args.classic {
        config.variant = Variant::Classic;
    }

    // Handle CLI-only commands
    if args.pick {
        return print_pick(&args, &config);
    }

    // Run TUI
    run_tui(config, args.pool).await
}

fn print_pick(args: &Args, config: &AppConfig) -> Result<()> {
    let raw = args.pool.as_deref().unwrap_or(&config.default_pool);
    let pool = NamePool::parse(raw);
    tracing::debug!("Drawing from {:?}", pool.names());
    let pick = pool
        .pick(&SystemClock)
        .context("Nothing to draw from (pass --pool or set default_pool)")?;

    if args.json {
        let output = serde_json::json!({
            "name": pick.name,
            "index": pick.index,
            "timestamp": pick.timestamp,
            "pool_size": pick.pool_size,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", pick.name);
    }

    if args.notify {
        notify("rollcall", &format!("Drawn: {}", pick.name))?;
    }
    Ok(())
}

async fn run_tui(config: AppConfig, pool: Option<String>) -> Result<()> {
    let services = Services::system(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(&config, pool, services);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if !app.dialog.is_visible() && app.focus != Focus::Pool => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // A failed handler aborts that action only
                            if let Err(e) = app.handle_key(key) {
                                app.report_error(&e);
                            }
                        }
                    }
                }
            }
        }

        // Deferred reveals and playback end
        if let Err(e) = app.tick() {
            app.report_error(&e);
        }

        tokio::task::yield_now().await;
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("dialog-information")
        .show()?;
    Ok(())
}
