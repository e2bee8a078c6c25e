use crate::app::App;
use ratatui::{prelude::*, widgets::Paragraph};

/// Left part: file name, line count, mode and modified flag.
pub fn left_status(app: &App) -> String {
    let editor = &app.editor;
    let name = editor
        .display_name()
        .unwrap_or_else(|| String::from("[No Name]"));
    let name: String = name.chars().take(20).collect();
    let modified = if editor.is_dirty() { "(modified)" } else { "" };
    format!(
        "{} - {} lines {} -- {}",
        name,
        editor.buffer.len(),
        app.mode.label(),
        modified
    )
}

/// Right part: file type and cursor row.
pub fn right_status(app: &App) -> String {
    let editor = &app.editor;
    let filetype = editor.buffer.syntax().map_or("no ft", |s| s.filetype);
    format!("{} | {}/{}", filetype, editor.cursor.cy + 1, editor.buffer.len())
}

/// The full bar, `width` columns wide. The right part is dropped when it
/// does not fit next to the left part.
pub fn status_line(app: &App, width: usize) -> String {
    let mut line: String = left_status(app).chars().take(width).collect();
    let right = right_status(app);
    let used = line.chars().count();
    let right_len = right.chars().count();

    if used + right_len <= width {
        line.push_str(&" ".repeat(width - used - right_len));
        line.push_str(&right);
    } else {
        line.push_str(&" ".repeat(width - used));
    }
    line
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let text = status_line(app, area.width as usize);
    let paragraph = Paragraph::new(text).style(
        Style::default()
            .fg(theme.ui.status_bar.to_color())
            .add_modifier(Modifier::REVERSED),
    );
    frame.render_widget(paragraph, area);
}
