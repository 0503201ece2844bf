use std::ops::Range;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::catalog::url_host;
use crate::state::ModeKind;
use crate::theme::Theme;
use crate::view::{ChooserView, PaginationView, Scene, TileView};

struct FooterShortcut {
    key: &'static str,
    label: &'static str,
}

const GRID_SHORTCUTS: &[FooterShortcut] = &[
    FooterShortcut {
        key: "type",
        label: " Search",
    },
    FooterShortcut {
        key: "←→",
        label: " Page",
    },
    FooterShortcut {
        key: "1-9",
        label: " Jump",
    },
    FooterShortcut {
        key: "↵",
        label: " Open",
    },
    FooterShortcut {
        key: "^R",
        label: " Reload",
    },
    FooterShortcut {
        key: "esc",
        label: " Exit",
    },
];

const SEARCH_SHORTCUTS: &[FooterShortcut] = &[
    FooterShortcut {
        key: "←→",
        label: " Select",
    },
    FooterShortcut {
        key: "↵",
        label: " Open",
    },
    FooterShortcut {
        key: "^↵",
        label: " Web search",
    },
    FooterShortcut {
        key: "^A",
        label: " Select all",
    },
    FooterShortcut {
        key: "esc",
        label: " Back",
    },
];

const CHOOSER_SHORTCUTS: &[FooterShortcut] = &[
    FooterShortcut {
        key: "↑↓",
        label: " Engine",
    },
    FooterShortcut {
        key: "↵",
        label: " Search",
    },
    FooterShortcut {
        key: "^↵",
        label: " Web search",
    },
    FooterShortcut {
        key: "esc",
        label: " Back",
    },
];

fn footer_shortcuts(mode: ModeKind) -> &'static [FooterShortcut] {
    match mode {
        ModeKind::Grid => GRID_SHORTCUTS,
        ModeKind::Search => SEARCH_SHORTCUTS,
        ModeKind::EngineChooser => CHOOSER_SHORTCUTS,
    }
}

/// Paints one frame. Rows are fixed: title, search box, tile area,
/// pagination, shortcuts and status, top to bottom.
pub fn draw(frame: &mut Frame, app: &App, scene: &Scene) {
    let size = frame.size();
    let theme = app.theme();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        size,
    );
    if size.height == 0 || size.width == 0 {
        return;
    }

    let header = Paragraph::new(app.title().to_string())
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(theme.text)
                .bg(theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    render_in(frame, header, Rect::new(size.x, size.y, size.width, 1));

    render_search_box(frame, app, Rect::new(size.x, size.y.saturating_add(1), size.width, 3));

    let content = content_area(size, app);
    if !content.is_empty() {
        frame.render_widget(Clear, content);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.background)),
            content,
        );
    }

    for tile in &scene.tiles {
        render_tile(frame, theme, tile, app.is_settling());
    }
    if let Some(pagination) = &scene.pagination {
        render_pagination(frame, theme, pagination);
    }
    match (&scene.chooser, &scene.notice) {
        (Some(chooser), _) => render_chooser(frame, theme, chooser, content),
        (None, Some(notice)) => render_notice(frame, theme, notice, content),
        (None, None) => {}
    }

    if size.height >= 3 {
        let shortcuts = Paragraph::new(footer_line(theme, scene.mode))
            .alignment(Alignment::Center)
            .style(Style::default().bg(theme.highlight));
        render_in(frame, shortcuts, Rect::new(size.x, size.bottom() - 2, size.width, 1));
    }
    let status = Paragraph::new(app.status_text())
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .bg(theme.primary)
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        );
    render_in(frame, status, Rect::new(size.x, size.bottom() - 1, size.width, 1));
}

/// Renders clipped to the frame; areas entirely outside are skipped.
fn render_in<W: ratatui::widgets::Widget>(frame: &mut Frame, widget: W, area: Rect) {
    let area = area.intersection(frame.size());
    if !area.is_empty() {
        frame.render_widget(widget, area);
    }
}

fn content_area(size: Rect, app: &App) -> Rect {
    let metrics = app.metrics();
    let top = size.y.saturating_add(metrics.reserve_top);
    let bottom = size.bottom().saturating_sub(metrics.reserve_bottom);
    Rect::new(size.x, top, size.width, bottom.saturating_sub(top))
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let bar = app.search_bar();
    let border = if bar.is_empty() { theme.surface } else { theme.accent };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(" Search ")
        .style(Style::default().bg(theme.background).fg(theme.text));

    let caret_style = Style::default().add_modifier(Modifier::REVERSED);
    let line = if bar.is_empty() {
        Line::from(vec![
            Span::styled(" ", caret_style),
            Span::styled(
                "Type to filter tiles, Ctrl+Enter to search the web",
                Style::default().fg(theme.surface),
            ),
        ])
    } else {
        let selected = Style::default().fg(theme.background).bg(theme.highlight);
        let mut cells: Vec<(String, Style)> = bar
            .text()
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                let style = match bar.selection() {
                    Some((start, end)) if (start..end).contains(&index) => selected,
                    None if index == bar.caret() => caret_style,
                    _ => Style::default(),
                };
                (ch.to_string(), style)
            })
            .collect();
        let trailing = if bar.selection().is_none() && bar.caret() >= cells.len() {
            caret_style
        } else {
            Style::default()
        };
        cells.push((" ".to_string(), trailing));

        let widths: Vec<usize> = cells.iter().map(|(text, _)| text.width()).collect();
        let window = visible_cells(&widths, bar.caret(), usize::from(area.width.saturating_sub(2)));
        Line::from(
            cells[window]
                .iter()
                .map(|(text, style)| Span::styled(text.clone(), *style))
                .collect::<Vec<_>>(),
        )
    };
    render_in(frame, Paragraph::new(line).block(block), area);
}

/// Cells that fit in `max_width` columns with the cell at `focus` kept in
/// view, scrolled as little as possible from the left.
fn visible_cells(widths: &[usize], focus: usize, max_width: usize) -> Range<usize> {
    if widths.is_empty() {
        return 0..0;
    }
    let focus = focus.min(widths.len() - 1);
    let mut start = 0;
    let mut used: usize = widths[..=focus].iter().sum();
    while used > max_width && start < focus {
        used -= widths[start];
        start += 1;
    }
    let mut end = focus + 1;
    while end < widths.len() && used + widths[end] <= max_width {
        used += widths[end];
        end += 1;
    }
    start..end
}

fn render_tile(frame: &mut Frame, theme: &Theme, tile: &TileView, settling: bool) {
    let area = tile.rect.intersection(frame.size());
    if area.is_empty() {
        return;
    }
    if tile.selected {
        let margins = tile.margins;
        let cell = Rect::new(
            tile.rect.x.saturating_sub(margins.horizontal),
            tile.rect.y.saturating_sub(margins.vertical),
            tile.rect.width.saturating_add(margins.horizontal.saturating_mul(2)),
            tile.rect.height.saturating_add(margins.vertical.saturating_mul(2)),
        );
        render_in(frame, Block::default().style(Style::default().bg(theme.primary)), cell);
    }
    if settling {
        let outline = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface));
        frame.render_widget(outline, area);
        return;
    }

    let (border, body) = if tile.selected {
        (
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            Style::default().bg(theme.highlight).fg(theme.background),
        )
    } else {
        (
            Style::default().fg(theme.primary),
            Style::default().bg(theme.surface).fg(theme.text),
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(body);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.is_empty() {
        return;
    }

    let width = usize::from(inner.width);
    let mut lines = Vec::new();
    if inner.height >= 2 {
        lines.push(Line::from(Span::styled(
            icon_glyph(tile),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(truncate(&tile.name, width)));
    if inner.height >= 3 {
        let host = url_host(&tile.destination).unwrap_or(&tile.destination);
        lines.push(Line::from(Span::styled(
            truncate(host, width),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    // Centre the block of lines vertically.
    let padding = inner.height.saturating_sub(lines.len() as u16) / 2;
    let text_area = Rect::new(inner.x, inner.y + padding, inner.width, inner.height - padding);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), text_area);
}

/// Short icons (emoji, a letter) are drawn as-is; anything else, such as
/// an image path, becomes the name's initial.
fn icon_glyph(tile: &TileView) -> String {
    let icon = tile.icon.trim();
    if !icon.is_empty() && icon.width() <= 2 {
        return icon.to_string();
    }
    tile.name
        .chars()
        .find(|ch| !ch.is_whitespace())
        .map_or_else(|| "•".to_string(), |ch| ch.to_uppercase().collect())
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width + 1 > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    if max_width > 0 {
        out.push('…');
    }
    out
}

fn render_pagination(frame: &mut Frame, theme: &Theme, pagination: &PaginationView) {
    let arrow = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    if let Some(rect) = pagination.previous {
        render_in(frame, Paragraph::new(Span::styled("◀", arrow)), rect);
    }
    render_in(
        frame,
        Paragraph::new(Span::styled(
            pagination.label.clone(),
            Style::default().fg(theme.text),
        )),
        pagination.counter,
    );
    if let Some(rect) = pagination.next {
        render_in(frame, Paragraph::new(Span::styled("▶", arrow)), rect);
    }
}

fn render_chooser(frame: &mut Frame, theme: &Theme, chooser: &ChooserView, content: Rect) {
    if content.is_empty() {
        return;
    }
    let area = centered_rect(content, 60, 80);
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();
    match chooser.engines.get(chooser.engine_index) {
        Some(engine) => lines.push(Line::from(vec![
            Span::raw("Press Enter to search in "),
            Span::styled(
                engine.clone(),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
        ])),
        None => lines.push(Line::from("No search engines configured")),
    }
    lines.push(Line::from(""));
    for (index, engine) in chooser.engines.iter().enumerate() {
        if index == chooser.engine_index {
            lines.push(Line::from(Span::styled(
                format!("▶ {engine}"),
                Style::default()
                    .fg(theme.background)
                    .bg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(format!("  {engine}")));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Query: ", Style::default().fg(theme.highlight)),
        Span::raw(chooser.query.clone()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .title(" No matching tile ")
        .style(Style::default().bg(theme.surface).fg(theme.text));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_notice(frame: &mut Frame, theme: &Theme, notice: &str, content: Rect) {
    if content.is_empty() {
        return;
    }
    let lines = notice.lines().count() as u16;
    let top = content.y + content.height.saturating_sub(lines) / 2;
    let area = Rect::new(content.x, top, content.width, lines.min(content.height));
    frame.render_widget(
        Paragraph::new(notice.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.text))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn footer_line(theme: &Theme, mode: ModeKind) -> Line<'static> {
    let shortcut_style = Style::default()
        .fg(theme.accent)
        .bg(theme.highlight)
        .add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(theme.background).bg(theme.highlight);
    let mut spans = Vec::new();
    for (index, shortcut) in footer_shortcuts(mode).iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" | ", label_style));
        }
        spans.push(Span::styled(shortcut.key, shortcut_style));
        spans.push(Span::styled(shortcut.label, label_style));
    }
    Line::from(spans)
}

fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - height_percent) / 2),
            Constraint::Percentage(height_percent),
            Constraint::Percentage((100 - height_percent) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}
