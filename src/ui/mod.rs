pub mod editor;
pub mod layout;
pub mod message_bar;
pub mod status_bar;

use crate::app::App;
use ratatui::Frame;

pub fn render(frame: &mut Frame, app: &mut App) {
    layout::render(frame, app);
}
