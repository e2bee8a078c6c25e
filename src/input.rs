use crate::app::{App, Mode, PendingFind};
use crate::editor::{Direction, Movement, SearchStep};
use crate::prompt::{PromptEvent, PromptKind};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::Path;
use std::time::{Duration, Instant};

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Control plus a letter, lowercased
    Ctrl(char),
    Enter,
    Esc,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        let key = match event.code {
            KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Key::Ctrl(c.to_ascii_lowercase())
            }
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Tab => Key::Tab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
}

/// Result of executing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Quit,
}

pub fn handle_event(app: &mut App) -> Result<Option<Action>> {
    if !event::poll(Duration::from_millis(100))? {
        app.tick(Instant::now());
        return Ok(Some(Action::None));
    }

    match event::read()? {
        Event::Key(event) => match Key::from_event(event) {
            Some(key) => handle_key(app, key, Instant::now()),
            None => Ok(Some(Action::None)),
        },
        Event::Resize(width, height) => {
            app.resize(width, height);
            Ok(Some(Action::None))
        }
        _ => Ok(Some(Action::None)),
    }
}

pub fn handle_key(app: &mut App, key: Key, now: Instant) -> Result<Option<Action>> {
    // Quit guard works everywhere
    if key == Key::Ctrl('q') {
        if app.request_quit() {
            return Ok(Some(Action::Quit));
        }
        return Ok(Some(Action::None));
    }
    app.reset_quit_times();

    if app.prompt.is_some() {
        return handle_prompt(app, key);
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Insert => handle_insert_mode(app, key, now),
        Mode::Visual => handle_visual_mode(app, key),
    }
}

fn handle_prompt(app: &mut App, key: Key) -> Result<Option<Action>> {
    let cwd = app.cwd.clone();
    let Some(prompt) = app.prompt.as_mut() else {
        return Ok(Some(Action::None));
    };
    let event = prompt.handle_key(key, &cwd);
    let kind = prompt.kind;
    let saved_cursor = prompt.saved_cursor;
    let query = prompt.input.clone();

    if kind == PromptKind::Search {
        let step = match (&event, key) {
            (PromptEvent::Cancel | PromptEvent::Submit(_), _) => SearchStep::Finish,
            (_, Key::Right | Key::Down) => SearchStep::Forward,
            (_, Key::Left | Key::Up) => SearchStep::Backward,
            _ => SearchStep::Restart,
        };
        app.editor.search_step(query.as_bytes(), step);
    }

    match event {
        PromptEvent::Continue => {}
        PromptEvent::Cancel => {
            app.prompt = None;
            match kind {
                PromptKind::Search => {
                    app.editor.cursor = saved_cursor;
                    app.set_status("");
                }
                PromptKind::SaveAs { .. } => app.set_status("Save aborted!"),
                _ => app.set_status(""),
            }
        }
        PromptEvent::Submit(input) => {
            app.prompt = None;
            app.set_status("");
            match kind {
                PromptKind::Command => {
                    if app.execute_command(&input) == CommandResult::Quit {
                        return Ok(Some(Action::Quit));
                    }
                }
                PromptKind::Search => app.editor.search.commit(input.into_bytes()),
                PromptKind::SaveAs { then_quit } => {
                    if app.save_as(&input) && then_quit {
                        return Ok(Some(Action::Quit));
                    }
                }
                PromptKind::OpenFile => app.open(Path::new(&input)),
            }
        }
    }
    Ok(Some(Action::None))
}

fn movement_for(key: Key) -> Option<Movement> {
    match key {
        Key::Char('h') | Key::Left => Some(Movement::Left),
        Key::Char('j') | Key::Down => Some(Movement::Down),
        Key::Char('k') | Key::Up => Some(Movement::Up),
        Key::Char('l') | Key::Right => Some(Movement::Right),
        Key::Char('0') | Key::Home => Some(Movement::Home),
        Key::Char('$') | Key::End => Some(Movement::End),
        _ => None,
    }
}

fn handle_normal_mode(app: &mut App, key: Key) -> Result<Option<Action>> {
    // Target character for a pending f/t
    if let Some(find) = app.pending_find.take() {
        let count = combined_count(app).unwrap_or(1);
        app.pending_key = None;
        if let Key::Char(c) = key {
            if c.is_ascii() {
                apply_find(app, find, c as u8, count);
            }
        }
        return Ok(Some(Action::None));
    }

    // Count prefix (1-9 for first digit, 0-9 for subsequent)
    if let Key::Char(c) = key {
        if let Some(digit) = c.to_digit(10) {
            if digit != 0 || app.pending_count.is_some() {
                let count = app.pending_count.unwrap_or(0);
                app.pending_count = Some(count.saturating_mul(10).saturating_add(digit as usize));
                return Ok(Some(Action::None));
            }
        }
    }

    let explicit = combined_count(app);
    let count = explicit.unwrap_or(1);
    let prev = app.pending_key.take();

    if let Some(movement) = movement_for(key) {
        for _ in 0..count {
            app.editor.move_cursor(movement);
        }
        return Ok(Some(Action::None));
    }

    match key {
        Key::Char('w') => match prev {
            Some(op @ ('c' | 'd')) => {
                app.editor.push_undo();
                app.editor.delete_to_end_of_word();
                if op == 'c' {
                    app.mode = Mode::Insert;
                }
            }
            Some('i') => {
                app.editor.push_undo();
                app.editor.delete_surrounding_word();
                app.mode = Mode::Insert;
            }
            // w after y or g is not a command; drop it
            Some(_) => {}
            None => {
                for _ in 0..count {
                    app.editor.move_word_forward();
                }
            }
        },
        Key::Char('i') => {
            if prev == Some('c') {
                set_pending(app, 'i', explicit);
            } else {
                app.mode = Mode::Insert;
            }
        }
        Key::Char('c') => set_pending(app, 'c', explicit),
        Key::Char('d') => {
            if prev == Some('d') {
                app.editor.push_undo();
                app.editor.delete_lines(count);
            } else {
                set_pending(app, 'd', explicit);
            }
        }
        Key::Char('g') => {
            if prev == Some('g') {
                app.editor.go_to_first_line();
            } else {
                set_pending(app, 'g', explicit);
            }
        }
        Key::Char('y') => {
            if prev == Some('y') {
                if let Some(len) = app.editor.yank_line() {
                    app.set_status(format!("Yanked line: {} chars", len));
                }
            } else {
                set_pending(app, 'y', explicit);
            }
        }
        Key::Char(c @ ('f' | 't')) => {
            app.pending_find = Some(PendingFind {
                till: c == 't',
                operator: prev.filter(|p| matches!(*p, 'c' | 'd')),
            });
            app.carried_count = explicit;
        }
        Key::Char('G') => app.editor.go_to_last_line(),
        Key::Char('A') => {
            app.editor.move_cursor(Movement::EndOfLine);
            app.mode = Mode::Insert;
        }
        Key::Char('o') => {
            app.editor.open_line_below();
            app.mode = Mode::Insert;
        }
        Key::Char('x') => {
            app.editor.push_undo();
            for _ in 0..count {
                app.editor.x_char();
            }
        }
        Key::Char('p') => {
            if app.editor.clipboard.is_empty() {
                app.set_status("Clipboard is empty");
            } else {
                app.editor.push_undo();
                app.editor.paste_below();
            }
        }
        Key::Char('v') => {
            app.editor.start_visual();
            app.mode = Mode::Visual;
        }
        Key::Char('%') => {
            app.editor.jump_to_matching_bracket();
        }
        Key::Char('u') => app.undo(),
        Key::Char(':') => app.start_prompt(PromptKind::Command),
        Key::Char('/') | Key::Ctrl('f') => app.start_search(),
        Key::Char('n') => {
            app.editor.search.direction = Direction::Forward;
            app.editor.next_search();
        }
        Key::Char('N') => {
            app.editor.search.direction = Direction::Backward;
            app.editor.next_search();
        }
        Key::Char('*') => {
            app.editor.search_word_under_cursor();
        }
        Key::Ctrl('s') => {
            app.save();
        }
        Key::PageUp => app.editor.page(true),
        Key::PageDown => app.editor.page(false),
        _ => {}
    }

    Ok(Some(Action::None))
}

/// The count typed before a pending key times the count typed after it.
fn combined_count(app: &mut App) -> Option<usize> {
    match (app.carried_count.take(), app.pending_count.take()) {
        (Some(before), Some(after)) => Some(before.saturating_mul(after)),
        (before, after) => before.or(after),
    }
}

fn set_pending(app: &mut App, key: char, count: Option<usize>) {
    app.pending_key = Some(key);
    app.carried_count = count;
}

fn apply_find(app: &mut App, find: PendingFind, target: u8, count: usize) {
    match find.operator {
        Some(op) => {
            let inclusive = !find.till;
            if app.editor.can_delete_to_char(target, inclusive) {
                app.editor.push_undo();
                app.editor.delete_to_char(target, inclusive);
                if op == 'c' {
                    app.mode = Mode::Insert;
                }
            }
        }
        None => {
            for _ in 0..count {
                if !app.editor.find_char(target, find.till) {
                    break;
                }
            }
        }
    }
}

fn handle_insert_mode(app: &mut App, key: Key, now: Instant) -> Result<Option<Action>> {
    let chord = app.config.editor.escape_chord;
    if key == Key::Char(chord) {
        let timeout = app.config.editor.escape_chord_timeout();
        if let Some(at) = app.pending_escape.take() {
            if now.saturating_duration_since(at) <= timeout {
                for _ in 0..chord.len_utf8() {
                    app.editor.delete_char();
                }
                app.editor.push_undo();
                app.mode = Mode::Normal;
                return Ok(Some(Action::None));
            }
        }
        insert_text(app, chord);
        app.pending_escape = Some(now);
        return Ok(Some(Action::None));
    }
    app.pending_escape = None;

    match key {
        Key::Esc | Key::Ctrl('l') => {
            app.editor.push_undo();
            app.mode = Mode::Normal;
        }
        Key::Enter => app.editor.insert_newline(),
        Key::Backspace | Key::Ctrl('h') => app.editor.delete_char(),
        Key::Delete => {
            let before = app.editor.cursor;
            app.editor.move_cursor(Movement::Right);
            if app.editor.cursor != before {
                app.editor.delete_char();
            }
        }
        Key::Tab => {
            if app.editor.buffer.contains_tab() {
                app.editor.insert_char(b'\t');
            } else {
                for _ in 0..app.config.editor.tab_stop {
                    app.editor.insert_char(b' ');
                }
            }
        }
        Key::Left => app.editor.move_cursor(Movement::Left),
        Key::Right => app.editor.move_cursor(Movement::Right),
        Key::Up => app.editor.move_cursor(Movement::Up),
        Key::Down => app.editor.move_cursor(Movement::Down),
        Key::Home => app.editor.move_cursor(Movement::Home),
        Key::End => app.editor.move_cursor(Movement::EndOfLine),
        Key::PageUp => app.editor.page(true),
        Key::PageDown => app.editor.page(false),
        Key::Ctrl('s') => {
            app.save();
        }
        Key::Ctrl('f') => app.start_search(),
        Key::Char(c) => insert_text(app, c),
        _ => {}
    }

    Ok(Some(Action::None))
}

fn insert_text(app: &mut App, c: char) {
    let mut utf8 = [0u8; 4];
    app.editor.insert_bytes(c.encode_utf8(&mut utf8).as_bytes());
}

fn handle_visual_mode(app: &mut App, key: Key) -> Result<Option<Action>> {
    match key {
        Key::Esc | Key::Char('v') => app.mode = Mode::Normal,
        Key::Char('y') => {
            let len = app.editor.yank_selection();
            app.set_status(format!("Yanked {} chars", len));
            app.mode = Mode::Normal;
        }
        Key::Char('x') | Key::Char('d') => {
            app.editor.push_undo();
            app.editor.delete_selection();
            app.mode = Mode::Normal;
        }
        Key::Char('%') => {
            app.editor.jump_to_matching_bracket();
            app.editor.set_visual_end();
        }
        Key::Char('w') => {
            app.editor.move_word_forward();
            app.editor.set_visual_end();
        }
        Key::Char('G') => {
            app.editor.go_to_last_line();
            app.editor.set_visual_end();
        }
        _ => {
            if let Some(movement) = movement_for(key) {
                app.editor.move_cursor(movement);
                app.editor.set_visual_end();
            }
        }
    }
    Ok(Some(Action::None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_app(lines: &[&str]) -> App {
        let mut config = Config::default();
        config.editor.tree_sitter = false;
        config.editor.system_clipboard = false;
        let mut app = App::new(config);
        app.resize(80, 24);
        app.editor
            .buffer
            .load_lines(lines.iter().map(|l| l.as_bytes().to_vec()).collect());
        app
    }

    fn text(app: &App) -> Vec<String> {
        app.editor
            .buffer
            .rows()
            .iter()
            .map(|r| String::from_utf8_lossy(&r.chars).to_string())
            .collect()
    }

    fn press(app: &mut App, keys: &str) -> Option<Action> {
        let mut last = None;
        for c in keys.chars() {
            last = handle_key(app, Key::Char(c), Instant::now()).unwrap();
        }
        last
    }

    fn press_key(app: &mut App, key: Key) -> Option<Action> {
        handle_key(app, key, Instant::now()).unwrap()
    }

    #[test]
    fn test_key_from_event() {
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(Key::from_event(ctrl_q), Some(Key::Ctrl('q')));
        let plain = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(Key::from_event(plain), Some(Key::Char('Q')));
        let f1 = KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(Key::from_event(f1), None);
    }

    #[test]
    fn test_movement_with_count() {
        let mut app = test_app(&["0", "1", "2", "3", "4", "5"]);
        press(&mut app, "3j");
        assert_eq!(app.editor.cursor.cy, 3);
        press(&mut app, "k");
        assert_eq!(app.editor.cursor.cy, 2);
        press(&mut app, "G");
        assert_eq!(app.editor.cursor.cy, 5);
        press(&mut app, "gg");
        assert_eq!(app.editor.cursor.cy, 0);
    }

    #[test]
    fn test_zero_is_line_start_without_count() {
        let mut app = test_app(&["hello world"]);
        press(&mut app, "$");
        assert_eq!(app.editor.cursor.cx, 10);
        press(&mut app, "0");
        assert_eq!(app.editor.cursor.cx, 0);
        press(&mut app, "10l");
        assert_eq!(app.editor.cursor.cx, 10);
    }

    #[test]
    fn test_dd_with_counts() {
        let lines = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
        let mut app = test_app(&lines);
        press(&mut app, "dd");
        assert_eq!(text(&app).len(), 9);
        press(&mut app, "3dd");
        assert_eq!(text(&app).len(), 6);
        press(&mut app, "d2d");
        assert_eq!(text(&app).len(), 4);
        press(&mut app, "u");
        assert_eq!(text(&app).len(), 6);
    }

    #[test]
    fn test_counts_multiply_across_two_key_commands() {
        let lines: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let mut app = test_app(&refs);
        press(&mut app, "2d3d");
        assert_eq!(text(&app), vec!["6", "7", "8", "9"]);
    }

    #[test]
    fn test_x_deletes_count_chars_with_one_undo() {
        let mut app = test_app(&["abcdef"]);
        press(&mut app, "3x");
        assert_eq!(text(&app), vec!["def"]);
        press(&mut app, "u");
        assert_eq!(text(&app), vec!["abcdef"]);
        press(&mut app, "u");
        assert_eq!(app.status_message, "Nothing to undo");
    }

    #[test]
    fn test_insert_and_escape_chord() {
        let mut app = test_app(&[]);
        press(&mut app, "i");
        assert_eq!(app.mode, Mode::Insert);
        let now = Instant::now();
        for c in "hij".chars() {
            handle_key(&mut app, Key::Char(c), now).unwrap();
        }
        handle_key(&mut app, Key::Char('j'), now + Duration::from_millis(50)).unwrap();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(text(&app), vec!["hi"]);
    }

    #[test]
    fn test_slow_chord_inserts_both() {
        let mut app = test_app(&[]);
        press(&mut app, "i");
        let now = Instant::now();
        handle_key(&mut app, Key::Char('j'), now).unwrap();
        handle_key(&mut app, Key::Char('j'), now + Duration::from_millis(400)).unwrap();
        assert_eq!(app.mode, Mode::Insert);
        assert_eq!(text(&app), vec!["jj"]);

        handle_key(&mut app, Key::Char('a'), now).unwrap();
        handle_key(&mut app, Key::Char('j'), now).unwrap();
        handle_key(&mut app, Key::Char('x'), now).unwrap();
        handle_key(&mut app, Key::Char('j'), now).unwrap();
        assert_eq!(text(&app), vec!["jjajxj"]);
    }

    #[test]
    fn test_ctrl_l_leaves_insert_with_one_undo_entry() {
        let mut app = test_app(&["xy"]);
        press(&mut app, "iab");
        press_key(&mut app, Key::Ctrl('l'));
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(text(&app), vec!["abxy"]);

        app.set_status("");
        press(&mut app, "u");
        assert_eq!(text(&app), vec!["abxy"]);
        assert_eq!(app.status_message, "");
        press(&mut app, "u");
        assert_eq!(app.status_message, "Nothing to undo");
    }

    #[test]
    fn test_insert_mode_editing_keys() {
        let mut app = test_app(&["ab"]);
        press(&mut app, "A");
        assert_eq!(app.editor.cursor.cx, 2);
        press_key(&mut app, Key::Enter);
        press(&mut app, "c");
        press_key(&mut app, Key::Tab);
        assert_eq!(text(&app), vec!["ab", "c    "]);
        press_key(&mut app, Key::Backspace);
        press_key(&mut app, Key::Home);
        press_key(&mut app, Key::Backspace);
        assert_eq!(text(&app), vec!["abc   "]);
        press_key(&mut app, Key::Esc);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_tab_inserts_tab_when_file_uses_tabs() {
        let mut app = test_app(&["\tx"]);
        press(&mut app, "i");
        press_key(&mut app, Key::Tab);
        assert_eq!(text(&app), vec!["\t\tx"]);
    }

    #[test]
    fn test_delete_key_removes_char_under_cursor() {
        let mut app = test_app(&["abc"]);
        press(&mut app, "i");
        press_key(&mut app, Key::Delete);
        assert_eq!(text(&app), vec!["bc"]);
        press_key(&mut app, Key::End);
        press_key(&mut app, Key::Delete);
        assert_eq!(text(&app), vec!["bc"]);
    }

    #[test]
    fn test_open_line_below() {
        let mut app = test_app(&["first", "third"]);
        press(&mut app, "osecond");
        assert_eq!(text(&app), vec!["first", "second", "third"]);
        assert_eq!(app.mode, Mode::Insert);
    }

    #[test]
    fn test_change_and_delete_words() {
        let mut app = test_app(&["foo bar baz"]);
        press(&mut app, "w");
        press(&mut app, "ciw");
        assert_eq!(app.mode, Mode::Insert);
        press(&mut app, "qux");
        press_key(&mut app, Key::Esc);
        assert_eq!(text(&app), vec!["foo qux baz"]);

        press(&mut app, "0dw");
        assert_eq!(text(&app), vec![" qux baz"]);
        assert_eq!(app.mode, Mode::Normal);
        press(&mut app, "lcw");
        assert_eq!(text(&app), vec!["  baz"]);
        assert_eq!(app.mode, Mode::Insert);
    }

    #[test]
    fn test_find_and_delete_to_char() {
        let mut app = test_app(&["call(a, b, c)"]);
        press(&mut app, "f,");
        assert_eq!(app.editor.cursor.cx, 6);
        press(&mut app, "0t(");
        assert_eq!(app.editor.cursor.cx, 3);
        press(&mut app, "0df(");
        assert_eq!(text(&app), vec!["a, b, c)"]);
        press(&mut app, "ct)");
        assert_eq!(text(&app), vec![")"]);
        assert_eq!(app.mode, Mode::Insert);
    }

    #[test]
    fn test_find_with_count() {
        let mut app = test_app(&["a,b,c,d"]);
        press(&mut app, "2f,");
        assert_eq!(app.editor.cursor.cx, 3);
    }

    #[test]
    fn test_missing_find_target_does_not_push_undo() {
        let mut app = test_app(&["abc"]);
        press(&mut app, "dfz");
        assert_eq!(text(&app), vec!["abc"]);
        press(&mut app, "u");
        assert_eq!(app.status_message, "Nothing to undo");
    }

    #[test]
    fn test_visual_yank_and_paste() {
        let mut app = test_app(&["abcdef", "x"]);
        press(&mut app, "lvlly");
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.status_message, "Yanked 3 chars");
        assert_eq!(app.editor.clipboard.contents(), b"bcd");
        press(&mut app, "jp");
        assert_eq!(text(&app), vec!["abcdef", "x", "bcd"]);
    }

    #[test]
    fn test_visual_delete() {
        let mut app = test_app(&["abcdef"]);
        press(&mut app, "lvlld");
        assert_eq!(text(&app), vec!["aef"]);
        assert_eq!(app.editor.cursor.cx, 1);
        assert_eq!(app.mode, Mode::Normal);
        press(&mut app, "u");
        assert_eq!(text(&app), vec!["abcdef"]);
    }

    #[test]
    fn test_visual_x_deletes_selection_into_clipboard() {
        let mut app = test_app(&["abcdef"]);
        press(&mut app, "lvllx");
        assert_eq!(text(&app), vec!["aef"]);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.editor.clipboard.contents(), b"bcd");
        press(&mut app, "u");
        assert_eq!(text(&app), vec!["abcdef"]);
    }

    #[test]
    fn test_visual_escape_and_bracket() {
        let mut app = test_app(&["f(a, b)"]);
        press(&mut app, "lv%");
        assert_eq!(app.editor.selection.end.x, 6);
        press_key(&mut app, Key::Esc);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_yank_line_and_empty_paste() {
        let mut app = test_app(&["one"]);
        press(&mut app, "p");
        assert_eq!(app.status_message, "Clipboard is empty");
        press(&mut app, "yy");
        assert_eq!(app.status_message, "Yanked line: 3 chars");
        press(&mut app, "p");
        assert_eq!(text(&app), vec!["one", "one"]);
    }

    #[test]
    fn test_bracket_jump() {
        let mut app = test_app(&["a(b(c)d)e"]);
        press(&mut app, "l%");
        assert_eq!(app.editor.cursor.cx, 7);
        press(&mut app, "%");
        assert_eq!(app.editor.cursor.cx, 1);
    }

    #[test]
    fn test_quit_guard() {
        let mut app = test_app(&["x"]);
        assert_eq!(press_key(&mut app, Key::Ctrl('q')), Some(Action::Quit));

        press(&mut app, "x");
        for _ in 0..3 {
            assert_eq!(press_key(&mut app, Key::Ctrl('q')), Some(Action::None));
        }
        press(&mut app, "h");
        assert_eq!(app.quit_times, 3);
        for _ in 0..3 {
            press_key(&mut app, Key::Ctrl('q'));
        }
        assert_eq!(press_key(&mut app, Key::Ctrl('q')), Some(Action::Quit));
    }

    #[test]
    fn test_incremental_search_commit_and_repeat() {
        let mut app = test_app(&["alpha", "beta", "alpha beta"]);
        press(&mut app, "/");
        press(&mut app, "beta");
        assert_eq!(app.editor.cursor.cy, 1);
        press_key(&mut app, Key::Down);
        assert_eq!((app.editor.cursor.cx, app.editor.cursor.cy), (6, 2));
        press_key(&mut app, Key::Enter);
        assert!(app.prompt.is_none());
        assert_eq!(app.editor.search.query.as_deref(), Some(&b"beta"[..]));

        press(&mut app, "n");
        assert_eq!(app.editor.cursor.cy, 1);
        press(&mut app, "N");
        assert_eq!(app.editor.cursor.cy, 2);
    }

    #[test]
    fn test_search_cancel_restores_cursor() {
        let mut app = test_app(&["one", "two", "three"]);
        press(&mut app, "l");
        press_key(&mut app, Key::Ctrl('f'));
        press(&mut app, "thr");
        assert_eq!(app.editor.cursor.cy, 2);
        press_key(&mut app, Key::Esc);
        assert_eq!((app.editor.cursor.cx, app.editor.cursor.cy), (1, 0));
        assert!(app.editor.search.query.is_none());
    }

    #[test]
    fn test_star_searches_word() {
        let mut app = test_app(&["x foo", "bar", "foo"]);
        press(&mut app, "w*");
        assert_eq!((app.editor.cursor.cx, app.editor.cursor.cy), (2, 0));
        press(&mut app, "n");
        assert_eq!(app.editor.cursor.cy, 2);
    }

    #[test]
    fn test_command_prompt_quit_and_save_as() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&["body"]);
        press(&mut app, ":q");
        assert_eq!(press_key(&mut app, Key::Enter), Some(Action::Quit));

        press(&mut app, ":wq");
        press_key(&mut app, Key::Enter);
        assert!(matches!(
            app.prompt.as_ref().map(|p| p.kind),
            Some(PromptKind::SaveAs { then_quit: true })
        ));
        let path = dir.path().join("saved.txt");
        press(&mut app, &path.to_string_lossy());
        assert_eq!(press_key(&mut app, Key::Enter), Some(Action::Quit));
        assert_eq!(std::fs::read(&path).unwrap(), b"body\n");
    }

    #[test]
    fn test_save_as_cancel() {
        let mut app = test_app(&["body"]);
        press_key(&mut app, Key::Ctrl('s'));
        assert!(app.prompt.is_some());
        press_key(&mut app, Key::Esc);
        assert_eq!(app.status_message, "Save aborted!");
    }
}
