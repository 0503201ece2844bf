use std::time::{Duration, Instant};

use crossterm::event::{KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use crate::catalog::{Catalog, PendingCatalog, Tile};
use crate::config::Settings;
use crate::input::{route, route_pointer, Action, KeyInput, Pointer};
use crate::layout::{LayoutMetrics, PageCount, Viewport};
use crate::search_bar::SearchBar;
use crate::state::{Context, Effect, Mode, ModeKind, PresentationState};
use crate::theme::Theme;
use crate::view::{build_scene, Scene};

/// How long tiles are drawn as bare outlines after the last resize.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

pub struct App {
    settings: Settings,
    catalog: Option<Catalog>,
    pending: Option<PendingCatalog>,
    load_error: Option<String>,
    /// The pending load was asked for by the user, not by startup.
    reloading: bool,
    state: PresentationState,
    viewport: Viewport,
    scene: Scene,
    settle_until: Option<Instant>,
    status_message: Option<String>,
    pending_navigation: Option<String>,
    should_quit: bool,
}

/// Split out of `App` so the state machine can be borrowed mutably next to it.
fn context<'a>(
    catalog: Option<&'a Catalog>,
    settings: &'a Settings,
    viewport: Viewport,
) -> Context<'a> {
    Context {
        tiles: catalog.map_or(&[][..], |catalog| catalog.tiles.as_slice()),
        engines: catalog.map_or(&[][..], |catalog| catalog.search_engines.as_slice()),
        viewport,
        metrics: &settings.metrics,
        web_search_url: &settings.web_search_url,
    }
}

impl App {
    pub fn new(settings: Settings, pending: PendingCatalog, viewport: Viewport) -> Self {
        App {
            settings,
            catalog: None,
            pending: Some(pending),
            load_error: None,
            reloading: false,
            state: PresentationState::new(),
            viewport,
            scene: Scene::default(),
            settle_until: None,
            status_message: None,
            pending_navigation: None,
            should_quit: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.settings.title
    }

    pub fn theme(&self) -> &Theme {
        &self.settings.theme
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.settings.metrics
    }

    pub fn search_bar(&self) -> &SearchBar {
        self.state.search_bar()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn tiles(&self) -> &[Tile] {
        self.catalog.as_ref().map_or(&[][..], |catalog| catalog.tiles.as_slice())
    }

    /// Takes the load outcome once it arrives. Returns whether it did.
    pub fn poll_catalog(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let Some(outcome) = pending.poll() else {
            return false;
        };
        let path = pending.path().display().to_string();
        self.pending = None;
        let reloaded = std::mem::take(&mut self.reloading);
        match outcome {
            Ok(catalog) => {
                log::info!(
                    "Loaded {} tiles and {} search engines from {path}",
                    catalog.tiles.len(),
                    catalog.search_engines.len()
                );
                self.catalog = Some(catalog);
                self.load_error = None;
                self.status_message = None;
            }
            Err(err) => {
                log::error!("Catalog load failed: {err}");
                self.catalog = None;
                self.load_error = Some(err.to_string());
                self.status_message = Some("Tiles unavailable".into());
            }
        }
        let ctx = context(self.catalog.as_ref(), &self.settings, self.viewport);
        if reloaded && self.load_error.is_none() {
            self.state.enter_grid(&ctx);
        } else {
            self.state.catalog_changed(&ctx);
        }
        true
    }

    /// Starts a fresh load; the current catalog and mode stay as they are
    /// until the new catalog replaces them.
    pub fn reload(&mut self) {
        if self.pending.is_some() {
            return;
        }
        log::info!("Reloading catalog from {}", self.settings.catalog_path.display());
        self.reloading = true;
        self.pending = Some(PendingCatalog::spawn(self.settings.catalog_path.clone()));
        self.status_message = Some("Reloading tiles".into());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let input = KeyInput::from(key);
        if let Some(action) = route(self.state.kind(), input, self.state.query().is_empty()) {
            self.dispatch(action);
        }
    }

    /// Hit targets come from the last drawn scene.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let pointer = match mouse.kind {
            MouseEventKind::Moved => Pointer::Hover(self.scene.hit_test(mouse.column, mouse.row)),
            MouseEventKind::Down(MouseButton::Left) => {
                match self.scene.hit_test(mouse.column, mouse.row) {
                    Some(hit) => Pointer::Click(hit),
                    None => return,
                }
            }
            MouseEventKind::ScrollUp => Pointer::ScrollUp,
            MouseEventKind::ScrollDown => Pointer::ScrollDown,
            _ => return,
        };
        if let Some(action) = route_pointer(self.state.kind(), pointer) {
            self.dispatch(action);
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        if action == Action::Reload {
            self.reload();
            return;
        }
        let ctx = context(self.catalog.as_ref(), &self.settings, self.viewport);
        match self.state.apply(action, &ctx) {
            Effect::None => {}
            Effect::Navigate(url) => {
                log::info!("Navigating to {url}");
                self.pending_navigation = Some(url);
            }
            Effect::Quit => self.should_quit = true,
        }
    }

    /// Geometry is recomputed on every resize; only the redraw style waits
    /// for the size to settle.
    pub fn handle_resize(&mut self, viewport: Viewport) {
        self.handle_resize_at(viewport, Instant::now());
    }

    fn handle_resize_at(&mut self, viewport: Viewport, now: Instant) {
        if viewport == self.viewport {
            return;
        }
        log::debug!("Resize to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        let ctx = context(self.catalog.as_ref(), &self.settings, self.viewport);
        self.state.refresh(&ctx);
        self.settle_until = Some(now + SETTLE_DELAY);
    }

    pub fn tick(&mut self, now: Instant) {
        if self.settle_until.is_some_and(|until| now >= until) {
            self.settle_until = None;
        }
    }

    pub fn is_settling(&self) -> bool {
        self.settle_until.is_some()
    }

    pub fn scene(&self) -> Scene {
        let ctx = context(self.catalog.as_ref(), &self.settings, self.viewport);
        build_scene(&self.state, &ctx, self.notice())
    }

    pub fn remember_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    /// Only the grid shows notices; the other modes own the content area.
    fn notice(&self) -> Option<String> {
        if self.state.kind() != ModeKind::Grid {
            return None;
        }
        if let Some(err) = &self.load_error {
            return Some(format!("There is a problem with the tile catalog.\n{err}"));
        }
        if self.catalog.is_none() {
            return self.pending.is_some().then(|| "Loading tiles…".to_string());
        }
        self.tiles().is_empty().then(|| {
            format!(
                "No tiles yet. Add some to {}",
                self.settings.catalog_path.display()
            )
        })
    }

    pub fn take_navigation(&mut self) -> Option<String> {
        self.pending_navigation.take()
    }

    pub fn status_text(&self) -> String {
        let mut text = format!("Tiles {}", self.tiles().len());
        match self.state.mode() {
            Mode::Grid(grid) => {
                let ctx = context(self.catalog.as_ref(), &self.settings, self.viewport);
                match ctx.grid_geometry(grid.current_page).page_count {
                    PageCount::Finite(pages) => {
                        text.push_str(&format!(" | Page {}/{pages}", grid.current_page));
                    }
                    PageCount::Unbounded => text.push_str(" | Window too small"),
                }
            }
            Mode::Search(search) => {
                text.push_str(&format!(" | {} shown", search.matches.len()));
            }
            Mode::EngineChooser(_) => text.push_str(" | No matching tile"),
        }
        if let Some(msg) = &self.status_message {
            text.push_str(" | ");
            text.push_str(msg);
        }
        text
    }
}
