use crate::app::App;
use ratatui::prelude::*;

pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    // Text area + status bar + message bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    let text_area = chunks[0];
    app.editor
        .resize(text_area.height as usize, text_area.width as usize);
    app.editor.scroll();

    super::editor::render(frame, text_area, app);
    super::status_bar::render(frame, chunks[1], app);
    super::message_bar::render(frame, chunks[2], app);
}
