use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::{App, Mode};
use crate::editor::selection::SelectionOps;
use crate::editor::Editor;
use crate::syntax::Highlight;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Default,
    Selection,
    SearchMatch,
}

/// One screen cell of the text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    /// None for filler drawn outside the buffer
    pub hl: Option<Highlight>,
    pub reverse: bool,
    pub background: Background,
}

impl Cell {
    fn filler(ch: char) -> Self {
        Self {
            ch,
            hl: None,
            reverse: false,
            background: Background::Default,
        }
    }
}

pub fn welcome_message() -> String {
    format!("Dim editor -- version {}", env!("CARGO_PKG_VERSION"))
}

/// Lay out the visible part of the buffer as `rows` lines of at most `cols` cells.
/// The selection is painted only when `visual` is set.
pub fn build_grid(editor: &Editor, visual: bool, rows: usize, cols: usize) -> Vec<Vec<Cell>> {
    let buf = &editor.buffer;
    (0..rows)
        .map(|y| {
            let filerow = y + editor.cursor.rowoff;
            if filerow < buf.len() {
                text_row(editor, filerow, visual, cols)
            } else if buf.is_empty() && y == rows / 3 {
                welcome_row(cols)
            } else {
                vec![Cell::filler('~')]
            }
        })
        .collect()
}

fn welcome_row(cols: usize) -> Vec<Cell> {
    let welcome: String = welcome_message().chars().take(cols).collect();
    let mut padding = cols.saturating_sub(welcome.len()) / 2;
    let mut cells = Vec::with_capacity(cols);
    if padding > 0 {
        cells.push(Cell::filler('~'));
        padding -= 1;
    }
    cells.extend(std::iter::repeat(Cell::filler(' ')).take(padding));
    cells.extend(welcome.chars().map(Cell::filler));
    cells
}

fn text_row(editor: &Editor, y: usize, visual: bool, cols: usize) -> Vec<Cell> {
    let buf = &editor.buffer;
    let Some(row) = buf.row(y) else {
        return Vec::new();
    };
    let render = &row.render;
    let matches = match_mask(render, editor.search.query.as_deref());

    let mut cells = Vec::with_capacity(cols);
    let mut rx = editor.cursor.coloff;
    while rx < render.len() && cells.len() < cols {
        let (ch, width, reverse) = display_char(&render[rx..]);
        // Search matches win over the selection
        let background = if matches[rx] {
            Background::SearchMatch
        } else if visual && SelectionOps::contains_rx(buf, &editor.selection, y, rx) {
            Background::Selection
        } else {
            Background::Default
        };
        cells.push(Cell {
            ch,
            hl: Some(row.hl.get(rx).copied().unwrap_or_default()),
            reverse,
            background,
        });
        rx += width;
    }
    cells
}

/// Marks every rendered column covered by an occurrence of `query`.
fn match_mask(render: &[u8], query: Option<&[u8]>) -> Vec<bool> {
    let mut mask = vec![false; render.len()];
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return mask;
    };
    for start in 0..render.len() {
        if render[start..].starts_with(query) {
            mask[start..start + query.len()].fill(true);
        }
    }
    mask
}

/// The character shown for the bytes starting at `bytes[0]`, how many bytes it
/// covers, and whether it is drawn in reverse video.
fn display_char(bytes: &[u8]) -> (char, usize, bool) {
    let b = bytes[0];
    if b.is_ascii_control() {
        let sym = if b <= 26 { (b'@' + b) as char } else { '?' };
        return (sym, 1, true);
    }
    if b.is_ascii() {
        return (b as char, 1, false);
    }
    let len = match b {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    };
    match std::str::from_utf8(&bytes[..len.min(bytes.len())]) {
        Ok(s) => (s.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER), len, false),
        Err(_) => (char::REPLACEMENT_CHARACTER, 1, false),
    }
}

fn cell_style(cell: &Cell, theme: &Theme) -> Style {
    let mut style = match cell.hl {
        Some(hl) => Style::default().fg(theme.color_for(hl)),
        None => Style::default().fg(theme.ui.non_text.to_color()),
    };
    match cell.background {
        Background::Default => {}
        Background::Selection => style = style.bg(theme.ui.selection.to_color()),
        Background::SearchMatch => {
            style = style
                .bg(theme.ui.search_match.to_color())
                .fg(theme.ui.search_match_fg.to_color())
        }
    }
    if cell.reverse {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

/// Merge runs of equally styled cells into spans.
fn line_from_cells(cells: &[Cell], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut current: Option<Style> = None;

    for cell in cells {
        let style = cell_style(cell, theme);
        if current != Some(style) {
            if let Some(prev) = current {
                spans.push(Span::styled(std::mem::take(&mut text), prev));
            }
            current = Some(style);
        }
        text.push(cell.ch);
    }
    if let Some(style) = current {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let editor = &app.editor;
    let grid = build_grid(
        editor,
        app.mode == Mode::Visual,
        area.height as usize,
        area.width as usize,
    );

    let lines: Vec<Line> = grid
        .iter()
        .map(|cells| line_from_cells(cells, theme))
        .collect();
    let paragraph = Paragraph::new(lines).style(
        Style::default()
            .fg(theme.ui.foreground.to_color())
            .bg(theme.ui.background.to_color()),
    );
    frame.render_widget(paragraph, area);

    if app.prompt.is_none() {
        let cursor = editor.cursor;
        let x = cursor.rx.saturating_sub(cursor.coloff) as u16;
        let y = cursor.cy.saturating_sub(cursor.rowoff) as u16;
        frame.set_cursor_position(Position::new(area.x + x, area.y + y));
    }
}
