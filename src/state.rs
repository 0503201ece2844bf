//! The presentation state machine.
//!
//! Exactly one of Grid, Search or EngineChooser is active. Every transition
//! rebuilds the mode value from scratch, so nothing the previous mode showed
//! or selected survives into the next one.

use crate::catalog::{append_query, SearchEngine, Tile};
use crate::input::Action;
use crate::layout::{
    compute_grid_geometry, compute_search_row, page_range, LayoutMetrics, PageCount, PageGeometry,
    Viewport,
};
use crate::matcher::{has_any_match, match_tiles};
use crate::search_bar::{EraseKey, SearchBar};

/// Everything outside the state machine a transition may look at.
///
/// Built fresh for every event, so the viewport is never older than the
/// current event.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub tiles: &'a [Tile],
    pub engines: &'a [SearchEngine],
    pub viewport: Viewport,
    pub metrics: &'a LayoutMetrics,
    pub web_search_url: &'a str,
}

impl Context<'_> {
    pub fn grid_geometry(&self, current_page: usize) -> PageGeometry {
        compute_grid_geometry(self.viewport, self.metrics, self.tiles.len(), current_page)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeKind {
    Grid,
    Search,
    EngineChooser,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridState {
    pub current_page: usize,
    /// Position on the current page.
    pub selected: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchState {
    /// Catalog indices, best match first.
    pub matches: Vec<usize>,
    /// Position within `matches`.
    pub selected: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChooserState {
    pub engine_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Grid(GridState),
    Search(SearchState),
    EngineChooser(ChooserState),
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Grid(_) => ModeKind::Grid,
            Mode::Search(_) => ModeKind::Search,
            Mode::EngineChooser(_) => ModeKind::EngineChooser,
        }
    }
}

/// What the event loop has to do after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Navigate(String),
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentationState {
    mode: Mode,
    bar: SearchBar,
    /// Grid page to return to after leaving search.
    grid_page: usize,
    /// Engine shown the next time the chooser opens.
    engine_index: usize,
}

impl Default for PresentationState {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Grid(GridState {
                current_page: 1,
                selected: None,
            }),
            bar: SearchBar::new(),
            grid_page: 1,
            engine_index: 0,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn search_bar(&self) -> &SearchBar {
        &self.bar
    }

    /// The search buffer; in EngineChooser mode this is the pending query.
    pub fn query(&self) -> &str {
        self.bar.text()
    }

    pub fn apply(&mut self, action: Action, ctx: &Context) -> Effect {
        match action {
            Action::Type(ch) => self.type_char(ch, ctx),
            Action::Erase(key) => self.erase(key, ctx),
            Action::SelectAll => self.bar.select_all(),
            Action::CaretHome => self.bar.move_home(),
            Action::CaretEnd => self.bar.move_end(),
            Action::PageLeft => self.move_left(ctx),
            Action::PageRight => self.move_right(ctx),
            Action::FirstPage => self.jump_to_page(1, ctx),
            Action::LastPage => {
                if let Some(pages) = self.page_count(ctx).and_then(PageCount::finite) {
                    self.jump_to_page(pages, ctx);
                }
            }
            Action::JumpToPage(page) => self.jump_to_page(page, ctx),
            Action::SelectLeft => self.select_left(),
            Action::SelectRight => self.select_right(),
            Action::Select(slot) => self.select(slot, ctx),
            Action::ClearSelection => self.clear_hover(),
            Action::OpenSlot(slot) => {
                return self
                    .tile_in_slot(slot, ctx)
                    .map_or(Effect::None, |tile| Effect::Navigate(tile.destination.clone()));
            }
            Action::Activate => return self.activate(ctx),
            Action::Cancel => self.enter_grid(ctx),
            Action::NextEngine => self.cycle_engine(ctx, true),
            Action::PreviousEngine => self.cycle_engine(ctx, false),
            Action::WebSearch => {
                return Effect::Navigate(append_query(ctx.web_search_url, self.bar.text()));
            }
            Action::Quit => return Effect::Quit,
            // Catalog reloads are owned by the app.
            Action::Reload => {}
        }
        Effect::None
    }

    fn set_mode(&mut self, mode: Mode) {
        if mode.kind() != self.mode.kind() {
            log::debug!("Mode {:?} -> {:?}", self.mode.kind(), mode.kind());
        }
        self.mode = mode;
    }

    /// Leaves whatever mode is active, clears the query and shows the grid
    /// page the user last browsed.
    pub fn enter_grid(&mut self, ctx: &Context) {
        self.bar.clear();
        let geometry = ctx.grid_geometry(self.grid_page);
        self.grid_page = geometry.current_page;
        self.set_mode(Mode::Grid(GridState {
            current_page: geometry.current_page,
            selected: None,
        }));
    }

    fn enter_search(&mut self, ctx: &Context) {
        let capacity = compute_search_row(ctx.viewport, ctx.metrics);
        let matches = match_tiles(ctx.tiles, self.bar.text(), capacity);
        let selected = (!matches.is_empty()).then_some(0);
        self.set_mode(Mode::Search(SearchState { matches, selected }));
    }

    fn enter_chooser(&mut self, ctx: &Context) {
        if matches!(self.mode, Mode::EngineChooser(_)) {
            return;
        }
        let engine_index = match ctx.engines.len() {
            0 => 0,
            count => self.engine_index % count,
        };
        self.set_mode(Mode::EngineChooser(ChooserState { engine_index }));
    }

    fn type_char(&mut self, ch: char, ctx: &Context) {
        self.bar.insert(ch);
        match self.mode {
            // Typing refines the web query only; the chooser stays up.
            Mode::EngineChooser(_) => {}
            Mode::Grid(_) | Mode::Search(_) => {
                if has_any_match(ctx.tiles, self.bar.text()) {
                    self.enter_search(ctx);
                } else {
                    self.enter_chooser(ctx);
                }
            }
        }
    }

    fn erase(&mut self, key: EraseKey, ctx: &Context) {
        if matches!(self.mode, Mode::Grid(_)) {
            return;
        }
        if self.bar.will_be_clear(key) {
            self.enter_grid(ctx);
            return;
        }
        self.bar.erase(key);
        if self.bar.is_empty() {
            self.enter_grid(ctx);
        } else if has_any_match(ctx.tiles, self.bar.text()) {
            self.enter_search(ctx);
        } else {
            self.enter_chooser(ctx);
        }
    }

    fn page_count(&self, ctx: &Context) -> Option<PageCount> {
        match &self.mode {
            Mode::Grid(grid) => Some(ctx.grid_geometry(grid.current_page).page_count),
            _ => None,
        }
    }

    fn set_page(&mut self, page: usize) {
        if let Mode::Grid(grid) = &mut self.mode {
            if grid.current_page != page {
                grid.current_page = page;
                grid.selected = None;
            }
            self.grid_page = page;
        }
    }

    pub fn move_right(&mut self, ctx: &Context) {
        let Mode::Grid(grid) = &self.mode else {
            return;
        };
        let geometry = ctx.grid_geometry(grid.current_page);
        if let PageCount::Finite(pages) = geometry.page_count {
            if geometry.current_page < pages {
                self.set_page(geometry.current_page + 1);
            }
        }
    }

    pub fn move_left(&mut self, ctx: &Context) {
        let Mode::Grid(grid) = &self.mode else {
            return;
        };
        let geometry = ctx.grid_geometry(grid.current_page);
        if geometry.page_count.finite().is_some() && geometry.current_page > 1 {
            self.set_page(geometry.current_page - 1);
        }
    }

    /// Pages outside `[1, page_count]` are ignored.
    pub fn jump_to_page(&mut self, page: usize, ctx: &Context) {
        let Some(PageCount::Finite(pages)) = self.page_count(ctx) else {
            return;
        };
        if (1..=pages).contains(&page) {
            self.set_page(page);
        }
    }

    /// Number of tiles currently on screen.
    pub fn rendered_count(&self, ctx: &Context) -> usize {
        match &self.mode {
            Mode::Grid(grid) => {
                page_range(&ctx.grid_geometry(grid.current_page), ctx.tiles.len()).len()
            }
            Mode::Search(search) => search.matches.len(),
            Mode::EngineChooser(_) => 0,
        }
    }

    /// Catalog tile shown in `slot` of the active mode.
    pub fn tile_in_slot<'a>(&self, slot: usize, ctx: &Context<'a>) -> Option<&'a Tile> {
        let index = match &self.mode {
            Mode::Grid(grid) => {
                page_range(&ctx.grid_geometry(grid.current_page), ctx.tiles.len()).nth(slot)?
            }
            Mode::Search(search) => *search.matches.get(slot)?,
            Mode::EngineChooser(_) => return None,
        };
        ctx.tiles.get(index)
    }

    pub fn selected_slot(&self) -> Option<usize> {
        match &self.mode {
            Mode::Grid(grid) => grid.selected,
            Mode::Search(search) => search.selected,
            Mode::EngineChooser(_) => None,
        }
    }

    fn selected_mut(&mut self) -> Option<&mut Option<usize>> {
        match &mut self.mode {
            Mode::Grid(grid) => Some(&mut grid.selected),
            Mode::Search(search) => Some(&mut search.selected),
            Mode::EngineChooser(_) => None,
        }
    }

    /// Moves the single selection to `slot`; out-of-range slots are ignored.
    pub fn select(&mut self, slot: usize, ctx: &Context) {
        if slot >= self.rendered_count(ctx) {
            return;
        }
        if let Some(selected) = self.selected_mut() {
            *selected = Some(slot);
        }
    }

    fn clear_hover(&mut self) {
        if let Mode::Grid(grid) = &mut self.mode {
            grid.selected = None;
        }
    }

    pub fn select_left(&mut self) {
        if let Mode::Search(search) = &mut self.mode {
            if let Some(slot) = search.selected {
                search.selected = Some(slot.saturating_sub(1));
            }
        }
    }

    pub fn select_right(&mut self) {
        if let Mode::Search(search) = &mut self.mode {
            if let Some(slot) = search.selected {
                let last = search.matches.len().saturating_sub(1);
                search.selected = Some((slot + 1).min(last));
            }
        }
    }

    fn cycle_engine(&mut self, ctx: &Context, forward: bool) {
        let count = ctx.engines.len();
        let Mode::EngineChooser(chooser) = &mut self.mode else {
            return;
        };
        if count == 0 {
            return;
        }
        chooser.engine_index = if forward {
            (chooser.engine_index + 1) % count
        } else {
            (chooser.engine_index + count - 1) % count
        };
        self.engine_index = chooser.engine_index;
    }

    pub fn activate(&self, ctx: &Context) -> Effect {
        match &self.mode {
            Mode::Grid(_) | Mode::Search(_) => self
                .selected_slot()
                .and_then(|slot| self.tile_in_slot(slot, ctx))
                .map_or(Effect::None, |tile| Effect::Navigate(tile.destination.clone())),
            Mode::EngineChooser(chooser) => ctx
                .engines
                .get(chooser.engine_index)
                .map_or(Effect::None, |engine| {
                    Effect::Navigate(engine.search_url(self.bar.text()))
                }),
        }
    }

    /// Re-derives everything viewport- or catalog-dependent without changing
    /// mode: the grid page is clamped, search is re-matched against the new
    /// row capacity.
    pub fn refresh(&mut self, ctx: &Context) {
        match &self.mode {
            Mode::Grid(grid) => {
                let geometry = ctx.grid_geometry(grid.current_page);
                let visible = page_range(&geometry, ctx.tiles.len()).len();
                let selected = grid.selected.filter(|slot| *slot < visible);
                self.grid_page = geometry.current_page;
                self.mode = Mode::Grid(GridState {
                    current_page: geometry.current_page,
                    selected,
                });
            }
            Mode::Search(_) => {
                if has_any_match(ctx.tiles, self.bar.text()) {
                    self.enter_search(ctx);
                } else {
                    self.enter_chooser(ctx);
                }
            }
            Mode::EngineChooser(chooser) => {
                if chooser.engine_index >= ctx.engines.len() {
                    self.mode = Mode::EngineChooser(ChooserState { engine_index: 0 });
                    self.engine_index = 0;
                }
            }
        }
    }

    /// `refresh` for a newly arrived catalog. A chooser opened while the
    /// tiles were missing gives way to search once the query matches.
    pub fn catalog_changed(&mut self, ctx: &Context) {
        if matches!(self.mode, Mode::EngineChooser(_)) && has_any_match(ctx.tiles, self.bar.text())
        {
            self.enter_search(ctx);
            return;
        }
        self.refresh(ctx);
    }
}
