mod app;
mod components;
mod event;
mod handler;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use remote_file_browser::config::{AppConfig, GeneralConfig, LoggingConfig, ServiceConfig};
use remote_file_browser::dispatch::Dispatcher;
use remote_file_browser::service::{HttpListingService, ListingService};
use remote_file_browser::{logging, Browser, Result};

use crate::app::{App, Command, ScreenState};
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// Terminal browser for a remote folder listing service.
#[derive(Parser, Debug)]
#[command(name = "rfb", version, about)]
struct Cli {
    /// Folder to open on startup
    start: Option<String>,

    /// Path to a config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Base URL of the listing service
    #[arg(long, short = 'u')]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable mouse support
    #[arg(long)]
    mouse: bool,

    /// Delete folders without asking first
    #[arg(long)]
    no_confirm: bool,
}

impl Cli {
    /// Flags as a partial config layered over the config files.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                start_path: self.start.clone(),
                confirm_delete: self.no_confirm.then_some(false),
                mouse: self.mouse.then_some(true),
            },
            service: ServiceConfig {
                base_url: self.url.clone(),
                timeout_secs: self.timeout,
            },
            logging: LoggingConfig {
                file: self
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                level: None,
            },
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    // Logging failures should not keep the browser from starting.
    if let Some(log_file) = config.log_file() {
        if let Err(e) = logging::init(&log_file, config.log_level()) {
            eprintln!("Warning: logging disabled: {}", e);
        }
    }
    info!(base_url = config.base_url(), "starting rfb");

    let service: Arc<dyn ListingService> =
        Arc::new(HttpListingService::new(config.base_url(), config.timeout())?);

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(50));
    let dispatcher = Dispatcher::new(service, events.sender());

    let browser = Browser::new(
        config.sort_view_state(),
        ScreenState::new(config.view_mode()),
    );
    let mut app = App::new(browser, config.confirm_delete());
    app.start(config.start_path());

    loop {
        for command in app.take_commands() {
            match command {
                Command::Load(requests) => dispatcher.dispatch(requests),
                Command::Mutate(request) => {
                    if let Err(e) = dispatcher.mutate(request) {
                        app.show_error(e.inline_message());
                    }
                }
                Command::CheckEmpty(path) => dispatcher.check_empty(&path),
            }
        }

        tui.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::Service(event) => app.handle_service_event(event),
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    info!("rfb exited");
    Ok(())
}
