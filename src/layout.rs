//! Grid and search-row geometry.
//!
//! Everything here is a pure function of the viewport, the layout metrics and
//! a tile count. Nothing is cached: callers recompute on every render and on
//! every resize.

use std::ops::Range;

use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

/// Terminal size in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl From<Rect> for Viewport {
    fn from(rect: Rect) -> Self {
        Self::new(rect.width, rect.height)
    }
}

/// Tile dimensions and the space reserved around the tile area for chrome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    pub tile_width: u16,
    pub tile_height: u16,
    pub min_margin_x: u16,
    pub min_margin_y: u16,
    pub reserve_left: u16,
    pub reserve_right: u16,
    /// Rows above the tile area: title bar and search box.
    pub reserve_top: u16,
    /// Rows below the tile area: pagination, shortcuts and status.
    pub reserve_bottom: u16,
    pub search_tile_pitch: u16,
    pub max_search_tiles: usize,
}

const MIN_RESERVE_TOP: u16 = 4;
const MIN_RESERVE_BOTTOM: u16 = 3;
const MIN_TILE_WIDTH: u16 = 4;
const MIN_TILE_HEIGHT: u16 = 3;

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            tile_width: 18,
            tile_height: 5,
            min_margin_x: 1,
            min_margin_y: 0,
            reserve_left: 2,
            reserve_right: 2,
            reserve_top: 5,
            reserve_bottom: 3,
            search_tile_pitch: 24,
            max_search_tiles: 4,
        }
    }
}

impl LayoutMetrics {
    /// Raises user-supplied values to the minimum the chrome needs.
    pub fn sanitized(mut self) -> Self {
        self.tile_width = self.tile_width.max(MIN_TILE_WIDTH);
        self.tile_height = self.tile_height.max(MIN_TILE_HEIGHT);
        self.reserve_top = self.reserve_top.max(MIN_RESERVE_TOP);
        self.reserve_bottom = self.reserve_bottom.max(MIN_RESERVE_BOTTOM);
        self.search_tile_pitch = self.search_tile_pitch.max(self.tile_width);
        self
    }

    pub fn horizontal_reserve(&self) -> u16 {
        self.reserve_left.saturating_add(self.reserve_right)
    }

    pub fn vertical_reserve(&self) -> u16 {
        self.reserve_top.saturating_add(self.reserve_bottom)
    }

    pub fn extended_tile_width(&self) -> usize {
        usize::from(self.tile_width) + 2 * usize::from(self.min_margin_x)
    }

    pub fn extended_tile_height(&self) -> usize {
        usize::from(self.tile_height) + 2 * usize::from(self.min_margin_y)
    }

    fn available_width(&self, viewport: Viewport) -> usize {
        usize::from(viewport.width.saturating_sub(self.horizontal_reserve()))
    }

    fn available_height(&self, viewport: Viewport) -> usize {
        usize::from(viewport.height.saturating_sub(self.vertical_reserve()))
    }
}

/// Number of pages the grid splits into.
///
/// `Unbounded` stands for a viewport that fits no tile at all; no page
/// arithmetic is done in that case and pagination chrome is suppressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageCount {
    Finite(usize),
    Unbounded,
}

impl PageCount {
    pub fn finite(self) -> Option<usize> {
        match self {
            PageCount::Finite(pages) => Some(pages),
            PageCount::Unbounded => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageGeometry {
    pub tiles_per_row: usize,
    pub row_count: usize,
    pub page_count: PageCount,
    pub current_page: usize,
}

impl PageGeometry {
    pub fn capacity(&self) -> usize {
        self.tiles_per_row * self.row_count
    }

    pub fn is_degenerate(&self) -> bool {
        self.capacity() == 0
    }

    /// Page counter and arrows are shown only when there is somewhere to go.
    pub fn shows_pagination(&self) -> bool {
        matches!(self.page_count, PageCount::Finite(pages) if pages > 1)
    }
}

/// Symmetric per-tile margins: `horizontal` on the left and right,
/// `vertical` above and below.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileMargins {
    pub horizontal: u16,
    pub vertical: u16,
}

pub fn compute_grid_geometry(
    viewport: Viewport,
    metrics: &LayoutMetrics,
    tile_count: usize,
    current_page: usize,
) -> PageGeometry {
    let tiles_per_row = metrics
        .available_width(viewport)
        .checked_div(metrics.extended_tile_width())
        .unwrap_or(0);
    let row_count = metrics
        .available_height(viewport)
        .checked_div(metrics.extended_tile_height())
        .unwrap_or(0);

    let capacity = tiles_per_row * row_count;
    let page_count = if capacity == 0 {
        PageCount::Unbounded
    } else {
        PageCount::Finite(tile_count.div_ceil(capacity).max(1))
    };
    let current_page = match page_count {
        PageCount::Finite(pages) => current_page.clamp(1, pages),
        PageCount::Unbounded => current_page.max(1),
    };

    PageGeometry {
        tiles_per_row,
        row_count,
        page_count,
        current_page,
    }
}

/// Spreads the space left over after packing whole tiles evenly around
/// every tile on the page.
pub fn grid_margins(
    viewport: Viewport,
    metrics: &LayoutMetrics,
    geometry: &PageGeometry,
) -> Option<TileMargins> {
    if geometry.is_degenerate() {
        return None;
    }
    let remainder_x = metrics.available_width(viewport) % metrics.extended_tile_width();
    let remainder_y = metrics.available_height(viewport) % metrics.extended_tile_height();
    let extra_x = remainder_x / (2 * geometry.tiles_per_row);
    let extra_y = remainder_y / (2 * geometry.row_count);
    Some(TileMargins {
        horizontal: metrics.min_margin_x.saturating_add(to_cells(extra_x)),
        vertical: metrics.min_margin_y.saturating_add(to_cells(extra_y)),
    })
}

/// Catalog indices shown on the current page.
pub fn page_range(geometry: &PageGeometry, tile_count: usize) -> Range<usize> {
    let capacity = geometry.capacity();
    if capacity == 0 {
        return 0..0;
    }
    let start = (geometry.current_page - 1)
        .saturating_mul(capacity)
        .min(tile_count);
    let end = geometry
        .current_page
        .saturating_mul(capacity)
        .min(tile_count);
    start..end
}

/// Cell rectangle of the tile at `position` on the current page
/// (row-major), excluding its margins.
pub fn grid_tile_rect(
    metrics: &LayoutMetrics,
    geometry: &PageGeometry,
    margins: TileMargins,
    position: usize,
) -> Rect {
    let columns = geometry.tiles_per_row.max(1);
    let column = position % columns;
    let row = position / columns;
    let pitch_x = usize::from(metrics.tile_width) + 2 * usize::from(margins.horizontal);
    let pitch_y = usize::from(metrics.tile_height) + 2 * usize::from(margins.vertical);
    let x = usize::from(metrics.reserve_left) + column * pitch_x + usize::from(margins.horizontal);
    let y = usize::from(metrics.reserve_top) + row * pitch_y + usize::from(margins.vertical);
    Rect::new(to_cells(x), to_cells(y), metrics.tile_width, metrics.tile_height)
}

/// How many matches fit on the single search row.
pub fn compute_search_row(viewport: Viewport, metrics: &LayoutMetrics) -> usize {
    metrics
        .available_width(viewport)
        .checked_div(usize::from(metrics.search_tile_pitch))
        .unwrap_or(0)
        .min(metrics.max_search_tiles)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchRowPlacement {
    /// Left offset of the first match, inside the horizontal reserve.
    pub first_offset: u16,
    /// Half the gap between neighbouring search tiles.
    pub side_margin: u16,
    pub top_margin: u16,
}

/// Centres a row of `match_count` tiles. Nothing to centre for zero matches.
pub fn search_row_placement(
    viewport: Viewport,
    metrics: &LayoutMetrics,
    match_count: usize,
) -> Option<SearchRowPlacement> {
    if match_count == 0 {
        return None;
    }
    let pitch = usize::from(metrics.search_tile_pitch);
    let block = (match_count - 1) * pitch + usize::from(metrics.tile_width);
    let first_offset = metrics.available_width(viewport).saturating_sub(block) / 2;
    let top_margin = metrics
        .available_height(viewport)
        .saturating_sub(usize::from(metrics.tile_height))
        / 2;
    Some(SearchRowPlacement {
        first_offset: to_cells(first_offset),
        side_margin: metrics.search_tile_pitch.saturating_sub(metrics.tile_width) / 2,
        top_margin: to_cells(top_margin),
    })
}

pub fn search_tile_rect(
    metrics: &LayoutMetrics,
    placement: &SearchRowPlacement,
    position: usize,
) -> Rect {
    let x = usize::from(metrics.reserve_left)
        + usize::from(placement.first_offset)
        + position * usize::from(metrics.search_tile_pitch);
    let y = usize::from(metrics.reserve_top) + usize::from(placement.top_margin);
    Rect::new(to_cells(x), to_cells(y), metrics.tile_width, metrics.tile_height)
}

fn to_cells(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> LayoutMetrics {
        LayoutMetrics::default()
    }

    #[test]
    fn grid_geometry_counts_rows_and_pages() {
        // (80 - 4) / 20 = 3 per row, (24 - 8) / 5 = 3 rows.
        let geometry = compute_grid_geometry(Viewport::new(80, 24), &metrics(), 20, 1);
        assert_eq!(geometry.tiles_per_row, 3);
        assert_eq!(geometry.row_count, 3);
        assert_eq!(geometry.page_count, PageCount::Finite(3));
        assert_eq!(geometry.current_page, 1);
    }

    #[test]
    fn page_count_matches_ceiling_division() {
        let m = metrics();
        for width in [30u16, 64, 80, 120, 200] {
            for height in [13u16, 20, 24, 50] {
                for tiles in [0usize, 1, 7, 9, 10, 33] {
                    let g = compute_grid_geometry(Viewport::new(width, height), &m, tiles, 1);
                    if g.capacity() == 0 {
                        assert_eq!(g.page_count, PageCount::Unbounded);
                        continue;
                    }
                    let expected = tiles.div_ceil(g.capacity()).max(1);
                    assert_eq!(g.page_count, PageCount::Finite(expected));
                }
            }
        }
    }

    #[test]
    fn current_page_clamps_when_pages_shrink() {
        let m = metrics();
        let wide = compute_grid_geometry(Viewport::new(80, 24), &m, 20, 3);
        assert_eq!(wide.current_page, 3);

        // 160 wide fits 7 per row, 21 per page: one page left.
        let wider = compute_grid_geometry(Viewport::new(160, 24), &m, 20, wide.current_page);
        assert_eq!(wider.page_count, PageCount::Finite(1));
        assert_eq!(wider.current_page, 1);
    }

    #[test]
    fn degenerate_viewport_is_unbounded_and_shows_nothing() {
        let m = metrics();
        let narrow = compute_grid_geometry(Viewport::new(10, 40), &m, 12, 2);
        assert_eq!(narrow.tiles_per_row, 0);
        assert_eq!(narrow.page_count, PageCount::Unbounded);
        assert_eq!(narrow.current_page, 2);
        assert!(!narrow.shows_pagination());
        assert_eq!(page_range(&narrow, 12), 0..0);
        assert!(grid_margins(Viewport::new(10, 40), &m, &narrow).is_none());

        let short = compute_grid_geometry(Viewport::new(120, 9), &m, 12, 1);
        assert_eq!(short.row_count, 0);
        assert_eq!(short.page_count, PageCount::Unbounded);
    }

    #[test]
    fn empty_catalog_has_one_page() {
        let geometry = compute_grid_geometry(Viewport::new(80, 24), &metrics(), 0, 4);
        assert_eq!(geometry.page_count, PageCount::Finite(1));
        assert_eq!(geometry.current_page, 1);
        assert!(!geometry.shows_pagination());
        assert_eq!(page_range(&geometry, 0), 0..0);
    }

    #[test]
    fn page_range_slices_last_page_short() {
        let geometry = compute_grid_geometry(Viewport::new(80, 24), &metrics(), 20, 3);
        assert_eq!(page_range(&geometry, 20), 18..20);
    }

    #[test]
    fn margins_share_the_remainder() {
        let m = metrics();
        // Available 86 x 19: 4 tiles (80) leave 6, 3 rows (15) leave 4.
        let viewport = Viewport::new(90, 27);
        let geometry = compute_grid_geometry(viewport, &m, 40, 1);
        assert_eq!(geometry.tiles_per_row, 4);
        assert_eq!(geometry.row_count, 3);
        let margins = grid_margins(viewport, &m, &geometry).unwrap();
        assert_eq!(margins.horizontal, 1);
        assert_eq!(margins.vertical, 0);

        // Available 96: 4 tiles leave 16, 16 / 8 = 2 extra per side.
        let viewport = Viewport::new(100, 27);
        let geometry = compute_grid_geometry(viewport, &m, 40, 1);
        let margins = grid_margins(viewport, &m, &geometry).unwrap();
        assert_eq!(margins.horizontal, 3);
    }

    #[test]
    fn grid_tiles_fit_inside_the_viewport() {
        let m = metrics();
        let viewport = Viewport::new(101, 37);
        let geometry = compute_grid_geometry(viewport, &m, 100, 1);
        let margins = grid_margins(viewport, &m, &geometry).unwrap();
        let last = grid_tile_rect(&m, &geometry, margins, geometry.capacity() - 1);
        assert!(last.right() <= viewport.width - m.reserve_right);
        assert!(last.bottom() <= viewport.height - m.reserve_bottom);

        let first = grid_tile_rect(&m, &geometry, margins, 0);
        assert_eq!(first.x, m.reserve_left + margins.horizontal);
        assert_eq!(first.y, m.reserve_top + margins.vertical);
    }

    #[test]
    fn search_row_is_capped() {
        let m = metrics();
        assert_eq!(compute_search_row(Viewport::new(80, 24), &m), 3);
        assert_eq!(compute_search_row(Viewport::new(300, 24), &m), 4);
        assert_eq!(compute_search_row(Viewport::new(20, 24), &m), 0);
    }

    #[test]
    fn search_row_is_centred() {
        let m = metrics();
        let viewport = Viewport::new(104, 24);
        assert!(search_row_placement(viewport, &m, 0).is_none());

        // Available 100, block of two = 24 + 18 = 42, offset (100 - 42) / 2.
        let placement = search_row_placement(viewport, &m, 2).unwrap();
        assert_eq!(placement.first_offset, 29);
        assert_eq!(placement.side_margin, 3);
        assert_eq!(placement.top_margin, 5);

        let first = search_tile_rect(&m, &placement, 0);
        let second = search_tile_rect(&m, &placement, 1);
        assert_eq!(second.x - first.x, m.search_tile_pitch);
        let left_gap = first.x - m.reserve_left;
        let right_gap = viewport.width - m.reserve_right - second.right();
        assert!(left_gap.abs_diff(right_gap) <= 1);
    }

    #[test]
    fn sanitized_metrics_never_divide_by_zero() {
        let metrics = LayoutMetrics {
            tile_width: 0,
            tile_height: 0,
            min_margin_x: 0,
            min_margin_y: 0,
            search_tile_pitch: 0,
            ..LayoutMetrics::default()
        }
        .sanitized();
        assert!(metrics.extended_tile_width() > 0);
        assert!(metrics.extended_tile_height() > 0);
        assert!(metrics.search_tile_pitch >= metrics.tile_width);
    }
}
