use std::time::Instant;

use crate::app::App;
use ratatui::{prelude::*, widgets::Paragraph};

/// The open prompt, or the status message while it is fresh.
pub fn message_text(app: &App, now: Instant) -> String {
    match &app.prompt {
        Some(prompt) => prompt.display(),
        None => app.visible_status(now).unwrap_or_default().to_string(),
    }
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let text: String = message_text(app, Instant::now())
        .chars()
        .take(area.width as usize)
        .collect();
    let paragraph = Paragraph::new(text).style(
        Style::default()
            .fg(theme.ui.message.to_color())
            .bg(theme.ui.background.to_color()),
    );
    frame.render_widget(paragraph, area);

    // Cursor after the typed input
    if let Some(prompt) = &app.prompt {
        let col = (prompt.kind.label().len() + prompt.input.len()).min(area.width as usize);
        frame.set_cursor_position(Position::new(area.x + col as u16, area.y));
    }
}
