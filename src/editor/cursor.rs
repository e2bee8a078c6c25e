use super::buffer::Buffer;

/// Cursor position and scroll offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Logical column (byte index into the row)
    pub cx: usize,
    pub cy: usize,
    /// Rendered column, recomputed by `CursorOps::scroll`
    pub rx: usize,
    pub rowoff: usize,
    pub coloff: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Left,
    Right,
    Up,
    Down,
    /// Column 0
    Home,
    /// Last character of the line
    End,
    /// One past the last character, where insert mode appends
    EndOfLine,
}

/// Cursor movement and viewport utilities
pub struct CursorOps;

impl CursorOps {
    pub fn move_cursor(cursor: &mut Cursor, buf: &Buffer, movement: Movement) {
        match movement {
            Movement::Home => cursor.cx = 0,
            Movement::End => cursor.cx = buf.row_len(cursor.cy).saturating_sub(1),
            Movement::EndOfLine => cursor.cx = buf.row_len(cursor.cy),
            Movement::Left => {
                if cursor.cx > 0 {
                    cursor.cx -= 1;
                } else if cursor.cy > 0 {
                    cursor.cy -= 1;
                    cursor.cx = buf.row_len(cursor.cy);
                }
            }
            Movement::Right => {
                if cursor.cx < buf.row_len(cursor.cy) {
                    cursor.cx += 1;
                } else if cursor.cy + 1 < buf.len() {
                    cursor.cy += 1;
                    cursor.cx = 0;
                }
            }
            Movement::Down => {
                if cursor.cy + 1 < buf.len() {
                    cursor.cy += 1;
                }
            }
            Movement::Up => {
                cursor.cy = cursor.cy.saturating_sub(1);
            }
        }
        Self::clamp(cursor, buf);
    }

    /// Keep the cursor on an existing row and inside that row's content.
    pub fn clamp(cursor: &mut Cursor, buf: &Buffer) {
        cursor.cy = cursor.cy.min(buf.len().saturating_sub(1));
        cursor.cx = cursor.cx.min(buf.row_len(cursor.cy));
    }

    /// Move a screenful up or down, the way PageUp/PageDown do.
    pub fn page(cursor: &mut Cursor, buf: &Buffer, screen_rows: usize, up: bool) {
        if up {
            cursor.cy = cursor.rowoff;
        } else {
            cursor.cy = (cursor.rowoff + screen_rows.saturating_sub(1))
                .min(buf.len().saturating_sub(1));
        }
        let movement = if up { Movement::Up } else { Movement::Down };
        for _ in 0..screen_rows {
            Self::move_cursor(cursor, buf, movement);
        }
    }

    /// Recompute `rx` and adjust the offsets so the cursor is inside the viewport.
    pub fn scroll(cursor: &mut Cursor, buf: &Buffer, screen_rows: usize, screen_cols: usize) {
        cursor.rx = buf
            .row(cursor.cy)
            .map_or(0, |row| row.cx_to_rx(cursor.cx, buf.tab_stop()));

        let screen_rows = screen_rows.max(1);
        let screen_cols = screen_cols.max(1);
        if cursor.cy < cursor.rowoff {
            cursor.rowoff = cursor.cy;
        }
        if cursor.cy >= cursor.rowoff + screen_rows {
            cursor.rowoff = cursor.cy - screen_rows + 1;
        }
        if cursor.rx < cursor.coloff {
            cursor.coloff = cursor.rx;
        }
        if cursor.rx >= cursor.coloff + screen_cols {
            cursor.coloff = cursor.rx - screen_cols + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn buffer(lines: &[&str]) -> Buffer {
        let mut buf = Buffer::new(4, false, Duration::from_secs(1));
        buf.load_lines(lines.iter().map(|l| l.as_bytes().to_vec()).collect());
        buf
    }

    #[test]
    fn test_left_right_wrap_between_lines() {
        let buf = buffer(&["ab", "cd"]);
        let mut cursor = Cursor { cx: 2, ..Default::default() };
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Right);
        assert_eq!((cursor.cx, cursor.cy), (0, 1));
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Left);
        assert_eq!((cursor.cx, cursor.cy), (2, 0));
    }

    #[test]
    fn test_right_stops_at_buffer_end() {
        let buf = buffer(&["ab"]);
        let mut cursor = Cursor { cx: 2, ..Default::default() };
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Right);
        assert_eq!((cursor.cx, cursor.cy), (2, 0));
    }

    #[test]
    fn test_vertical_moves_clamp_column() {
        let buf = buffer(&["long line", "ab", "x"]);
        let mut cursor = Cursor { cx: 8, ..Default::default() };
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Down);
        assert_eq!((cursor.cx, cursor.cy), (2, 1));
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Down);
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Down);
        assert_eq!((cursor.cx, cursor.cy), (1, 2));
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Up);
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Up);
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Up);
        assert_eq!(cursor.cy, 0);
    }

    #[test]
    fn test_line_end_movements() {
        let buf = buffer(&["hello"]);
        let mut cursor = Cursor::default();
        CursorOps::move_cursor(&mut cursor, &buf, Movement::End);
        assert_eq!(cursor.cx, 4);
        CursorOps::move_cursor(&mut cursor, &buf, Movement::EndOfLine);
        assert_eq!(cursor.cx, 5);
        CursorOps::move_cursor(&mut cursor, &buf, Movement::Home);
        assert_eq!(cursor.cx, 0);
    }

    #[test]
    fn test_scroll_keeps_cursor_visible() {
        let lines: Vec<String> = (0..50).map(|i| format!("\tline {}", i)).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let buf = buffer(&refs);
        let mut cursor = Cursor { cy: 30, cx: 1, ..Default::default() };
        CursorOps::scroll(&mut cursor, &buf, 10, 80);
        assert_eq!(cursor.rowoff, 21);
        assert_eq!(cursor.rx, 4);
        cursor.cy = 5;
        CursorOps::scroll(&mut cursor, &buf, 10, 80);
        assert_eq!(cursor.rowoff, 5);

        cursor.cx = 7;
        CursorOps::scroll(&mut cursor, &buf, 10, 6);
        assert_eq!(cursor.rx, 10);
        assert_eq!(cursor.coloff, 5);
    }

    #[test]
    fn test_page_down_and_up() {
        let lines: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let buf = buffer(&refs);
        let mut cursor = Cursor::default();
        CursorOps::page(&mut cursor, &buf, 20, false);
        assert_eq!(cursor.cy, 39);
        cursor.rowoff = 20;
        CursorOps::page(&mut cursor, &buf, 20, true);
        assert_eq!(cursor.cy, 0);
    }
}
