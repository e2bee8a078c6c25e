pub mod buffer;
pub mod clipboard;
pub mod cursor;
pub mod edit;
pub mod motion;
pub mod row;
pub mod search;
pub mod selection;
pub mod undo;

pub use buffer::Buffer;
pub use cursor::{Cursor, Movement};
pub use search::{Direction, SearchStep};
pub use selection::{Mark, Selection};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};

use crate::config::EditorConfig;
use crate::syntax::{self, HighlightStrategy};
use clipboard::Clipboard;
use cursor::CursorOps;
use edit::EditOps;
use motion::{word_at, MotionOps};
use search::SearchState;
use selection::SelectionOps;
use undo::{Snapshot, UndoStack};

/// How `Editor::open_file` found the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Loaded,
    Created,
}

/// The editing engine: one buffer with its cursor, viewport, selection,
/// clipboard, search and undo history.
pub struct Editor {
    pub buffer: Buffer,
    pub cursor: Cursor,
    pub screen_rows: usize,
    pub screen_cols: usize,
    pub filename: Option<PathBuf>,
    pub selection: Selection,
    pub clipboard: Clipboard,
    pub search: SearchState,
    undo: UndoStack,
}

/// Split file content into lines, dropping the newline and any carriage return.
fn split_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<Vec<u8>> = bytes
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect();
    if bytes.ends_with(b"\n") {
        lines.pop();
    }
    lines
}

impl Editor {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            buffer: Buffer::new(config.tab_stop, config.tree_sitter, config.reparse_throttle()),
            cursor: Cursor::default(),
            screen_rows: 0,
            screen_cols: 0,
            filename: None,
            selection: Selection::default(),
            clipboard: Clipboard::new(config.system_clipboard),
            search: SearchState::new(),
            undo: UndoStack::new(config.undo_limit),
        }
    }

    // ========== Files ==========

    /// Load `path` into the buffer. A path that does not exist yet gives an
    /// empty buffer with that name; any other failure leaves the buffer as it was.
    pub fn open_file(&mut self, path: &Path) -> Result<OpenOutcome> {
        let (lines, outcome) = match fs::read(path) {
            Ok(bytes) => (split_lines(&bytes), OpenOutcome::Loaded),
            Err(e) if e.kind() == io::ErrorKind::NotFound => (Vec::new(), OpenOutcome::Created),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let count = lines.len();
        self.filename = Some(path.to_path_buf());
        self.buffer.load_lines(lines);
        self.cursor = Cursor::default();
        self.selection = Selection::default();
        self.undo.clear();
        self.select_syntax();
        self.buffer.dirty = 0;

        tracing::info!(path = %path.display(), lines = count, ?outcome, "opened file");
        Ok(outcome)
    }

    /// Write the buffer to its file. Returns the number of bytes written.
    pub fn save(&mut self) -> Result<usize> {
        let Some(path) = self.filename.as_ref() else {
            bail!("No file name");
        };
        let content = self.buffer.to_flat_text();
        fs::write(path, &content).with_context(|| format!("Failed to write {}", path.display()))?;
        self.buffer.dirty = 0;
        tracing::info!(path = %path.display(), bytes = content.len(), "saved file");
        Ok(content.len())
    }

    pub fn display_name(&self) -> Option<String> {
        self.filename
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
    }

    /// Pick the syntax profile for the current filename.
    pub fn select_syntax(&mut self) -> HighlightStrategy {
        let profile = self
            .filename
            .as_ref()
            .and_then(|path| syntax::select_profile(&path.to_string_lossy()));
        self.buffer.set_syntax(profile)
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.dirty > 0
    }

    // ========== Undo ==========

    pub fn push_undo(&mut self) {
        self.undo.push(Snapshot {
            rows: self.buffer.rows().to_vec(),
            cx: self.cursor.cx,
            cy: self.cursor.cy,
        });
    }

    /// Restore the most recent snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo.pop() else {
            return false;
        };
        self.buffer.restore_rows(snapshot.rows);
        self.cursor.cx = snapshot.cx;
        self.cursor.cy = snapshot.cy;
        CursorOps::clamp(&mut self.cursor, &self.buffer);
        tracing::debug!(remaining = self.undo.len(), "undo");
        true
    }

    // ========== Viewport ==========

    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.screen_rows = rows;
        self.screen_cols = cols;
    }

    pub fn scroll(&mut self) {
        CursorOps::scroll(&mut self.cursor, &self.buffer, self.screen_rows, self.screen_cols);
    }

    /// Run a reparse that the throttle held back, once it is allowed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.buffer.reparse_if_stale(now)
    }

    // ========== Motion ==========

    pub fn move_cursor(&mut self, movement: Movement) {
        CursorOps::move_cursor(&mut self.cursor, &self.buffer, movement);
    }

    pub fn page(&mut self, up: bool) {
        CursorOps::page(&mut self.cursor, &self.buffer, self.screen_rows, up);
    }

    pub fn go_to_first_line(&mut self) {
        self.cursor.cy = 0;
        CursorOps::clamp(&mut self.cursor, &self.buffer);
    }

    pub fn go_to_last_line(&mut self) {
        self.cursor.cy = self.buffer.len().saturating_sub(1);
        CursorOps::clamp(&mut self.cursor, &self.buffer);
    }

    pub fn move_word_forward(&mut self) {
        MotionOps::word_forward(&mut self.cursor, &self.buffer);
    }

    pub fn jump_to_matching_bracket(&mut self) -> bool {
        MotionOps::jump_to_matching_bracket(&mut self.cursor, &self.buffer)
    }

    pub fn find_char(&mut self, target: u8, till: bool) -> bool {
        MotionOps::find_char(&mut self.cursor, &self.buffer, target, till)
    }

    // ========== Editing ==========

    pub fn insert_char(&mut self, ch: u8) {
        EditOps::insert_char(&mut self.buffer, &mut self.cursor, ch);
    }

    /// Insert raw bytes at the cursor; '\n' starts a new line.
    pub fn insert_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if b == b'\n' {
                self.insert_newline();
            } else {
                self.insert_char(b);
            }
        }
    }

    pub fn insert_newline(&mut self) {
        EditOps::insert_newline(&mut self.buffer, &mut self.cursor);
    }

    pub fn delete_char(&mut self) {
        EditOps::delete_char(&mut self.buffer, &mut self.cursor);
    }

    pub fn x_char(&mut self) {
        EditOps::x_char(&mut self.buffer, &mut self.cursor);
    }

    pub fn delete_lines(&mut self, count: usize) {
        EditOps::delete_lines(&mut self.buffer, &mut self.cursor, count);
    }

    pub fn open_line_below(&mut self) {
        EditOps::open_line_below(&mut self.buffer, &mut self.cursor);
    }

    pub fn delete_to_end_of_word(&mut self) {
        EditOps::delete_to_end_of_word(&mut self.buffer, &mut self.cursor);
    }

    pub fn delete_surrounding_word(&mut self) {
        EditOps::delete_surrounding_word(&mut self.buffer, &mut self.cursor);
    }

    pub fn delete_to_char(&mut self, target: u8, inclusive: bool) -> bool {
        EditOps::delete_to_char(&mut self.buffer, &mut self.cursor, target, inclusive)
    }

    /// Whether `delete_to_char` would remove anything.
    pub fn can_delete_to_char(&self, target: u8, inclusive: bool) -> bool {
        EditOps::span_to_char(&self.buffer, &self.cursor, target, inclusive).is_some()
    }

    // ========== Visual selection and clipboard ==========

    pub fn start_visual(&mut self) {
        let here = Mark {
            x: self.cursor.cx,
            y: self.cursor.cy,
        };
        self.selection = Selection {
            start: here,
            end: here,
        };
    }

    pub fn set_visual_end(&mut self) {
        self.selection.end = Mark {
            x: self.cursor.cx,
            y: self.cursor.cy,
        };
    }

    /// Copy the selection to the clipboard. Returns the number of bytes copied.
    pub fn yank_selection(&mut self) -> usize {
        let text = SelectionOps::selected_text(&self.buffer, self.selection.start, self.selection.end);
        self.clipboard.copy(&text);
        text.len()
    }

    /// Delete the selection, keeping its text in the clipboard.
    pub fn delete_selection(&mut self) {
        let Selection { start, end } = self.selection;
        let text = SelectionOps::selected_text(&self.buffer, start, end);
        if !text.is_empty() {
            self.clipboard.copy(&text);
        }
        EditOps::delete_span(&mut self.buffer, &mut self.cursor, start, end);
    }

    /// `yy`: copy the current line. None when the cursor is not on a line.
    pub fn yank_line(&mut self) -> Option<usize> {
        let chars = self.buffer.row(self.cursor.cy)?.chars.clone();
        self.clipboard.copy(&chars);
        Some(chars.len())
    }

    /// `p`: put the clipboard on a new line below the cursor. False when the clipboard is empty.
    pub fn paste_below(&mut self) -> bool {
        if self.clipboard.is_empty() {
            return false;
        }
        let contents = self.clipboard.contents().to_vec();
        if !self.buffer.is_empty() {
            self.open_line_below();
        }
        self.insert_bytes(&contents);
        true
    }

    // ========== Search ==========

    pub fn search_step(&mut self, query: &[u8], step: SearchStep) -> bool {
        self.search
            .step(&mut self.buffer, &mut self.cursor, query, step)
    }

    pub fn next_search(&mut self) -> bool {
        self.search.next(&mut self.buffer, &mut self.cursor)
    }

    /// `*`: search for the identifier under the cursor.
    pub fn search_word_under_cursor(&mut self) -> bool {
        let Some(row) = self.buffer.row(self.cursor.cy) else {
            return false;
        };
        let Some((start, end)) = word_at(&row.chars, self.cursor.cx) else {
            return false;
        };
        let word = row.chars[start..end].to_vec();
        self.search.commit(word);
        self.search.index = None;
        self.search.direction = Direction::Forward;
        self.next_search()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn editor(lines: &[&str]) -> Editor {
        let config = EditorConfig {
            tree_sitter: false,
            system_clipboard: false,
            ..Default::default()
        };
        let mut editor = Editor::new(&config);
        editor
            .buffer
            .load_lines(lines.iter().map(|l| l.as_bytes().to_vec()).collect());
        editor.resize(20, 80);
        editor
    }

    fn text(editor: &Editor) -> Vec<String> {
        editor
            .buffer
            .rows()
            .iter()
            .map(|r| String::from_utf8_lossy(&r.chars).to_string())
            .collect()
    }

    #[test]
    fn test_split_lines() {
        assert!(split_lines(b"").is_empty());
        assert_eq!(split_lines(b"a\r\nb\n"), vec![b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(split_lines(b"a\n\nb"), vec![b"a".to_vec(), b"".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn test_undo_restores_content_and_cursor() {
        let mut editor = editor(&["hello", "world"]);
        editor.cursor.cx = 2;
        editor.cursor.cy = 1;
        editor.push_undo();
        editor.cursor.cx = 0;
        editor.cursor.cy = 0;
        editor.delete_lines(2);
        editor.insert_char(b'z');
        assert_eq!(text(&editor), vec!["z"]);

        assert!(editor.undo());
        assert_eq!(text(&editor), vec!["hello", "world"]);
        assert_eq!((editor.cursor.cx, editor.cursor.cy), (2, 1));
        assert!(editor.is_dirty());
        assert!(!editor.undo());
        assert_eq!(text(&editor), vec!["hello", "world"]);
    }

    #[test]
    fn test_undo_history_is_not_capped_by_default() {
        let mut editor = editor(&[""]);
        for _ in 0..1001 {
            editor.push_undo();
            editor.insert_char(b'a');
        }
        assert_eq!(editor.buffer.row_len(0), 1001);

        let mut undone = 0;
        while editor.undo() {
            undone += 1;
        }
        assert_eq!(undone, 1001);
        assert_eq!(text(&editor), vec![""]);
    }

    #[test]
    fn test_open_and_save_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "int main() {{\r\n\treturn 0;\n}}\n").unwrap();

        let mut editor = editor(&[]);
        let outcome = editor.open_file(file.path()).unwrap();
        assert_eq!(outcome, OpenOutcome::Loaded);
        assert_eq!(text(&editor), vec!["int main() {", "\treturn 0;", "}"]);
        assert!(!editor.is_dirty());

        editor.insert_char(b'/');
        assert!(editor.is_dirty());
        let written = editor.save().unwrap();
        assert_eq!(written, "/int main() {\n\treturn 0;\n}\n".len());
        assert!(!editor.is_dirty());
        assert_eq!(
            std::fs::read(file.path()).unwrap(),
            b"/int main() {\n\treturn 0;\n}\n"
        );
    }

    #[test]
    fn test_open_missing_file_creates_named_buffer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.py");
        let mut editor = editor(&["old"]);
        assert_eq!(editor.open_file(&path).unwrap(), OpenOutcome::Created);
        assert!(editor.buffer.is_empty());
        assert_eq!(editor.filename.as_deref(), Some(path.as_path()));
        assert_eq!(editor.buffer.syntax().map(|s| s.filetype), Some("python"));
    }

    #[test]
    fn test_open_failure_keeps_buffer() {
        let dir = tempdir().unwrap();
        let mut editor = editor(&["keep"]);
        assert!(editor.open_file(dir.path()).is_err());
        assert_eq!(text(&editor), vec!["keep"]);
        assert!(editor.filename.is_none());
    }

    #[test]
    fn test_save_without_name_fails() {
        let mut editor = editor(&["x"]);
        assert!(editor.save().is_err());
    }

    #[test]
    fn test_visual_delete_span() {
        let mut editor = editor(&["abcdef"]);
        editor.cursor.cx = 1;
        editor.start_visual();
        editor.move_cursor(Movement::Right);
        editor.move_cursor(Movement::Right);
        editor.set_visual_end();
        editor.delete_selection();
        assert_eq!(text(&editor), vec!["aef"]);
        assert_eq!(editor.cursor.cx, 1);
        assert_eq!(editor.clipboard.contents(), b"bcd");
    }

    #[test]
    fn test_yank_line_and_paste_below() {
        let mut editor = editor(&["first", "second"]);
        assert_eq!(editor.yank_line(), Some(5));
        editor.cursor.cy = 1;
        assert!(editor.paste_below());
        assert_eq!(text(&editor), vec!["first", "second", "first"]);
        assert_eq!(editor.cursor.cy, 2);
    }

    #[test]
    fn test_paste_multi_line_selection() {
        let mut editor = editor(&["ab", "cd", "x"]);
        editor.start_visual();
        editor.cursor.cy = 1;
        editor.cursor.cx = 0;
        editor.set_visual_end();
        assert_eq!(editor.yank_selection(), 4);
        editor.cursor.cy = 2;
        assert!(editor.paste_below());
        assert_eq!(text(&editor), vec!["ab", "cd", "x", "ab", "c"]);
    }

    #[test]
    fn test_paste_with_empty_clipboard() {
        let mut editor = editor(&["a"]);
        assert!(!editor.paste_below());
        assert_eq!(text(&editor), vec!["a"]);
    }

    #[test]
    fn test_search_word_under_cursor() {
        let mut editor = editor(&["let count = 1;", "other", "count += 1;"]);
        editor.cursor.cx = 6;
        assert!(editor.search_word_under_cursor());
        assert_eq!(editor.search.query.as_deref(), Some(&b"count"[..]));
        assert_eq!((editor.cursor.cx, editor.cursor.cy), (4, 0));
        assert!(editor.next_search());
        assert_eq!((editor.cursor.cx, editor.cursor.cy), (0, 2));
    }

    #[test]
    fn test_search_wraps_from_line_three() {
        let mut editor = editor(&["needle", "a", "b", "c", "d"]);
        editor.search.commit(b"needle".to_vec());
        editor.search.index = Some(3);
        editor.cursor.cy = 3;
        assert!(editor.next_search());
        assert_eq!(editor.cursor.cy, 0);
    }
}
