//! Tile view-models for the active mode.
//!
//! A `Scene` is rebuilt from `PresentationState` for every frame and is the
//! only thing the renderer paints, so tiles of a mode that is no longer
//! active cannot linger. The last drawn scene also answers pointer hit tests.

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use crate::layout::{
    grid_margins, grid_tile_rect, page_range, search_row_placement, search_tile_rect, PageCount,
    TileMargins,
};
use crate::state::{Context, Mode, ModeKind, PresentationState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Tile(usize),
    PreviousPage,
    NextPage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileView {
    /// Position among the tiles of this scene.
    pub slot: usize,
    pub name: String,
    pub icon: String,
    pub destination: String,
    pub rect: Rect,
    /// Free cells around `rect` that belong to this tile alone.
    pub margins: TileMargins,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationView {
    pub previous: Option<Rect>,
    pub next: Option<Rect>,
    pub counter: Rect,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChooserView {
    pub engines: Vec<String>,
    pub engine_index: usize,
    pub query: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    pub mode: ModeKind,
    pub tiles: Vec<TileView>,
    pub pagination: Option<PaginationView>,
    pub chooser: Option<ChooserView>,
    pub notice: Option<String>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            mode: ModeKind::Grid,
            tiles: Vec::new(),
            pagination: None,
            chooser: None,
            notice: None,
        }
    }
}

impl Scene {
    pub fn hit_test(&self, column: u16, row: u16) -> Option<Hit> {
        if let Some(tile) = self.tiles.iter().find(|tile| contains(tile.rect, column, row)) {
            return Some(Hit::Tile(tile.slot));
        }
        let pagination = self.pagination.as_ref()?;
        if pagination.previous.is_some_and(|rect| contains(rect, column, row)) {
            return Some(Hit::PreviousPage);
        }
        if pagination.next.is_some_and(|rect| contains(rect, column, row)) {
            return Some(Hit::NextPage);
        }
        None
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

pub fn build_scene(state: &PresentationState, ctx: &Context, notice: Option<String>) -> Scene {
    let mut scene = Scene {
        mode: state.kind(),
        notice,
        ..Scene::default()
    };
    let selected = state.selected_slot();

    match state.mode() {
        Mode::Grid(grid) => {
            let geometry = ctx.grid_geometry(grid.current_page);
            let Some(margins) = grid_margins(ctx.viewport, ctx.metrics, &geometry) else {
                return scene;
            };
            scene.tiles = page_range(&geometry, ctx.tiles.len())
                .enumerate()
                .map(|(slot, index)| TileView {
                    rect: grid_tile_rect(ctx.metrics, &geometry, margins, slot),
                    margins,
                    ..tile_view(ctx, slot, index, selected)
                })
                .collect();
            if let PageCount::Finite(pages) = geometry.page_count {
                if geometry.shows_pagination() {
                    scene.pagination = Some(pagination(ctx, geometry.current_page, pages));
                }
            }
        }
        Mode::Search(search) => {
            let Some(placement) =
                search_row_placement(ctx.viewport, ctx.metrics, search.matches.len())
            else {
                return scene;
            };
            let margins = TileMargins {
                horizontal: placement.side_margin,
                vertical: ctx.metrics.min_margin_y,
            };
            scene.tiles = search
                .matches
                .iter()
                .enumerate()
                .map(|(slot, &index)| TileView {
                    rect: search_tile_rect(ctx.metrics, &placement, slot),
                    margins,
                    ..tile_view(ctx, slot, index, selected)
                })
                .collect();
        }
        Mode::EngineChooser(chooser) => {
            scene.chooser = Some(ChooserView {
                engines: ctx.engines.iter().map(|engine| engine.label()).collect(),
                engine_index: chooser.engine_index,
                query: state.query().to_string(),
            });
        }
    }
    scene
}

fn tile_view(ctx: &Context, slot: usize, index: usize, selected: Option<usize>) -> TileView {
    let tile = &ctx.tiles[index];
    TileView {
        slot,
        name: tile.name.clone(),
        icon: tile.icon.clone(),
        destination: tile.destination.clone(),
        rect: Rect::default(),
        margins: TileMargins::default(),
        selected: selected == Some(slot),
    }
}

/// `◀  current / pages  ▶` centred on the first row below the tiles. An
/// arrow is left out when there is no page in its direction.
fn pagination(ctx: &Context, current: usize, pages: usize) -> PaginationView {
    let label = format!("{current} / {pages}");
    let label_width = u16::try_from(label.width()).unwrap_or(u16::MAX);
    let total = label_width.saturating_add(6);
    let row = ctx.viewport.height.saturating_sub(ctx.metrics.reserve_bottom);
    let start = ctx.viewport.width.saturating_sub(total) / 2;
    let counter = Rect::new(start.saturating_add(3), row, label_width, 1);
    let next_x = counter.right().saturating_add(2);
    PaginationView {
        previous: (current > 1).then(|| Rect::new(start, row, 1, 1)),
        next: (current < pages).then(|| Rect::new(next_x, row, 1, 1)),
        counter,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SearchEngine, Tile};
    use crate::input::Action;
    use crate::layout::{LayoutMetrics, Viewport};

    fn tiles(count: usize) -> Vec<Tile> {
        (0..count)
            .map(|i| Tile::new(&format!("Tile {i}"), "", &format!("https://t{i}.example")))
            .collect()
    }

    fn names(scene: &Scene) -> Vec<&str> {
        scene.tiles.iter().map(|t| t.name.as_str()).collect()
    }

    fn ctx<'a>(
        tiles: &'a [Tile],
        engines: &'a [SearchEngine],
        metrics: &'a LayoutMetrics,
        viewport: Viewport,
    ) -> Context<'a> {
        Context {
            tiles,
            engines,
            viewport,
            metrics,
            web_search_url: "https://search.example/?q=",
        }
    }

    #[test]
    fn grid_scene_shows_page_slice() {
        let tiles = tiles(20);
        let metrics = LayoutMetrics::default();
        let ctx = ctx(&tiles, &[], &metrics, Viewport::new(80, 24));
        let mut state = PresentationState::new();
        state.apply(Action::LastPage, &ctx);

        let scene = build_scene(&state, &ctx, None);
        assert_eq!(names(&scene), vec!["Tile 18", "Tile 19"]);

        let pagination = scene.pagination.unwrap();
        assert_eq!(pagination.label, "3 / 3");
        assert!(pagination.previous.is_some());
        assert!(pagination.next.is_none());
    }

    #[test]
    fn single_page_hides_pagination() {
        let tiles = tiles(4);
        let metrics = LayoutMetrics::default();
        let ctx = ctx(&tiles, &[], &metrics, Viewport::new(80, 24));
        let scene = build_scene(&PresentationState::new(), &ctx, None);
        assert_eq!(scene.tiles.len(), 4);
        assert!(scene.pagination.is_none());
    }

    #[test]
    fn degenerate_viewport_renders_nothing() {
        let tiles = tiles(20);
        let metrics = LayoutMetrics::default();
        let ctx = ctx(&tiles, &[], &metrics, Viewport::new(80, 10));
        let scene = build_scene(&PresentationState::new(), &ctx, None);
        assert!(scene.tiles.is_empty());
        assert!(scene.pagination.is_none());
    }

    #[test]
    fn entering_search_leaves_no_grid_tiles() {
        let tiles = tiles(20);
        let metrics = LayoutMetrics::default();
        let ctx = ctx(&tiles, &[], &metrics, Viewport::new(80, 24));
        let mut state = PresentationState::new();
        assert_eq!(build_scene(&state, &ctx, None).tiles.len(), 9);

        state.apply(Action::Type('1'), &ctx);
        let scene = build_scene(&state, &ctx, None);
        assert_eq!(scene.mode, ModeKind::Search);
        assert!(scene.pagination.is_none());
        // "Tile 1", "Tile 10", "Tile 11": one row of search tiles only.
        assert_eq!(names(&scene), vec!["Tile 1", "Tile 10", "Tile 11"]);
        assert!(scene.tiles.iter().all(|t| t.rect.y == scene.tiles[0].rect.y));
    }

    #[test]
    fn chooser_scene_has_no_tiles() {
        let tiles = tiles(3);
        let engines = vec![SearchEngine {
            name: Some("Duck".into()),
            icon: String::new(),
            url: "https://duck.example/?q=".into(),
        }];
        let metrics = LayoutMetrics::default();
        let ctx = ctx(&tiles, &engines, &metrics, Viewport::new(80, 24));
        let mut state = PresentationState::new();
        state.apply(Action::Type('#'), &ctx);

        let scene = build_scene(&state, &ctx, None);
        assert!(scene.tiles.is_empty());
        let chooser = scene.chooser.unwrap();
        assert_eq!(chooser.engines, vec!["Duck".to_string()]);
        assert_eq!(chooser.query, "#");
    }

    #[test]
    fn at_most_one_tile_is_selected() {
        let tiles = tiles(9);
        let metrics = LayoutMetrics::default();
        let ctx = ctx(&tiles, &[], &metrics, Viewport::new(80, 24));
        let mut state = PresentationState::new();
        state.apply(Action::Select(0), &ctx);
        state.apply(Action::Select(5), &ctx);

        let scene = build_scene(&state, &ctx, None);
        assert_eq!(scene.tiles.iter().filter(|t| t.selected).count(), 1);
        assert!(scene.tiles[5].selected);
    }

    #[test]
    fn hit_test_finds_tiles_and_arrows() {
        let tiles = tiles(20);
        let metrics = LayoutMetrics::default();
        let ctx = ctx(&tiles, &[], &metrics, Viewport::new(80, 24));
        let mut state = PresentationState::new();
        state.apply(Action::PageRight, &ctx);
        let scene = build_scene(&state, &ctx, None);

        let tile = &scene.tiles[4];
        assert_eq!(scene.hit_test(tile.rect.x + 1, tile.rect.y + 1), Some(Hit::Tile(4)));
        assert_eq!(scene.hit_test(0, 0), None);

        let pagination = scene.pagination.as_ref().unwrap();
        let previous = pagination.previous.unwrap();
        let next = pagination.next.unwrap();
        assert_eq!(scene.hit_test(previous.x, previous.y), Some(Hit::PreviousPage));
        assert_eq!(scene.hit_test(next.x, next.y), Some(Hit::NextPage));
    }
}
