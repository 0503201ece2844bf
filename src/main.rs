mod app;
mod catalog;
mod config;
mod error;
mod input;
mod layout;
mod matcher;
mod render;
mod search_bar;
mod state;
mod theme;
mod view;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::App;
use crate::catalog::{Catalog, PendingCatalog};
use crate::config::{AppPaths, Settings, SettingsFile};
use crate::layout::Viewport;

const TICK_RATE: Duration = Duration::from_millis(100);
const LOG_ENV: &str = "STARTPAGE_LOG";

fn main() -> Result<()> {
    let paths = AppPaths::new()?;
    init_logging(&paths)?;

    let settings = Settings::resolve(SettingsFile::load(&paths.settings_file)?, &paths);
    if settings.default_catalog && Catalog::write_default_if_missing(&settings.catalog_path)? {
        log::info!("Wrote starter catalog to {}", settings.catalog_path.display());
    }
    log::info!(
        "Starting with catalog {} and theme {}",
        settings.catalog_path.display(),
        settings.theme.name
    );
    let pending = PendingCatalog::spawn(settings.catalog_path.clone());

    if let Some(url) = run_app(settings, pending)? {
        open::that(&url).with_context(|| format!("Unable to open {url}"))?;
    }
    Ok(())
}

fn init_logging(paths: &AppPaths) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_file)
        .with_context(|| format!("Unable to open log file {}", paths.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Runs the page until the user quits or picks a destination, which is
/// returned once the terminal has been restored.
fn run_app(settings: Settings, pending: PendingCatalog) -> Result<Option<String>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    // Needed for Ctrl+Enter to arrive as a modified Enter.
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        stdout.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES,
        ))?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let size = terminal.size()?;
    let mut app = App::new(settings, pending, Viewport::from(size));
    let result = event_loop(&mut terminal, &mut app);

    restore_terminal(&mut terminal, enhanced)?;
    result
}

fn event_loop<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<Option<String>>
where
    B: ratatui::backend::Backend + Write,
{
    loop {
        app.poll_catalog();
        app.tick(Instant::now());
        let scene = app.scene();
        terminal.draw(|frame| render::draw(frame, app, &scene))?;
        app.remember_scene(scene);

        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(width, height) => app.handle_resize(Viewport::new(width, height)),
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            };
        }

        if let Some(url) = app.take_navigation() {
            return Ok(Some(url));
        }
        if app.should_quit() {
            log::info!("Exiting");
            return Ok(None);
        }
    }
}

fn restore_terminal<B>(terminal: &mut Terminal<B>, enhanced: bool) -> Result<()>
where
    B: ratatui::backend::Backend + Write,
{
    disable_raw_mode()?;
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
