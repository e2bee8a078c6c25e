use super::buffer::Buffer;
use super::cursor::{Cursor, CursorOps};
use super::motion::{end_of_word, start_of_word};
use super::selection::{Mark, SelectionOps};

/// Cursor-relative text editing operations
pub struct EditOps;

impl EditOps {
    /// Insert `ch` at the cursor; typing on the line past the end creates it.
    pub fn insert_char(buf: &mut Buffer, cursor: &mut Cursor, ch: u8) {
        if cursor.cy == buf.len() {
            buf.insert_line(buf.len(), b"");
        }
        buf.insert_char(cursor.cy, cursor.cx, ch);
        cursor.cx += 1;
    }

    pub fn insert_newline(buf: &mut Buffer, cursor: &mut Cursor) {
        if cursor.cx == 0 || cursor.cy >= buf.len() {
            buf.insert_line(cursor.cy.min(buf.len()), b"");
        } else {
            buf.split_line(cursor.cy, cursor.cx);
        }
        cursor.cy += 1;
        cursor.cx = 0;
    }

    /// Backspace: remove the char before the cursor, joining with the previous line at column 0.
    pub fn delete_char(buf: &mut Buffer, cursor: &mut Cursor) {
        if cursor.cy >= buf.len() || (cursor.cx == 0 && cursor.cy == 0) {
            return;
        }
        if cursor.cx > 0 {
            buf.delete_char(cursor.cy, cursor.cx - 1);
            cursor.cx -= 1;
        } else {
            let prev = cursor.cy - 1;
            cursor.cx = buf.row_len(prev);
            let chars = buf.row(cursor.cy).map(|row| row.chars.clone()).unwrap_or_default();
            buf.append_text(prev, &chars);
            buf.delete_line(cursor.cy);
            cursor.cy = prev;
        }
    }

    /// `x`: delete the char under the cursor, or the whole line when the cursor is past its end.
    pub fn x_char(buf: &mut Buffer, cursor: &mut Cursor) {
        if cursor.cy >= buf.len() {
            return;
        }
        if cursor.cx < buf.row_len(cursor.cy) {
            buf.delete_char(cursor.cy, cursor.cx);
        } else {
            buf.delete_line(cursor.cy);
        }
        CursorOps::clamp(cursor, buf);
    }

    /// Delete `count` whole lines starting at the cursor row.
    pub fn delete_lines(buf: &mut Buffer, cursor: &mut Cursor, count: usize) {
        for _ in 0..count {
            if cursor.cy >= buf.len() {
                break;
            }
            buf.delete_line(cursor.cy);
        }
        CursorOps::clamp(cursor, buf);
    }

    /// Open an empty line below the cursor and move onto it.
    pub fn open_line_below(buf: &mut Buffer, cursor: &mut Cursor) {
        let at = (cursor.cy + 1).min(buf.len());
        buf.insert_line(at, b"");
        cursor.cy = at;
        cursor.cx = 0;
    }

    /// Delete the inclusive span between two marks.
    ///
    /// Across lines the last line loses its head, interior lines go away and
    /// the first line loses its tail; a partial line that would become empty
    /// is removed instead. Within one line the columns are removed, or the
    /// line itself if the span covers all of it.
    pub fn delete_span(buf: &mut Buffer, cursor: &mut Cursor, a: Mark, b: Mark) {
        let (start, end) = SelectionOps::normalize(a, b);
        if start.y >= buf.len() {
            return;
        }

        if start.y != end.y {
            if end.y < buf.len() {
                let end_len = buf.row_len(end.y);
                if end.x + 1 < end_len {
                    buf.delete_span(end.y, 0, end.x + 1);
                } else {
                    buf.delete_line(end.y);
                }
            }
            buf.delete_range(start.y + 1, end.y.min(buf.len()));
            if start.x > 0 {
                let start_len = buf.row_len(start.y);
                buf.delete_span(start.y, start.x, start_len);
            } else {
                buf.delete_line(start.y);
            }
        } else {
            let len = buf.row_len(start.y);
            let stop = (end.x + 1).min(len);
            if start.x == 0 && stop == len {
                buf.delete_line(start.y);
            } else {
                buf.delete_span(start.y, start.x, stop);
            }
        }

        cursor.cx = start.x;
        cursor.cy = start.y;
        CursorOps::clamp(cursor, buf);
    }

    /// `cw`/`dw`: delete from the cursor to the end of the current class run.
    pub fn delete_to_end_of_word(buf: &mut Buffer, cursor: &mut Cursor) {
        let Some(row) = buf.row(cursor.cy) else {
            return;
        };
        let end = end_of_word(&row.chars, cursor.cx);
        buf.delete_span(cursor.cy, cursor.cx, end);
    }

    /// `ciw`: delete the whole class run under the cursor.
    pub fn delete_surrounding_word(buf: &mut Buffer, cursor: &mut Cursor) {
        let Some(row) = buf.row(cursor.cy) else {
            return;
        };
        let start = start_of_word(&row.chars, cursor.cx);
        let end = end_of_word(&row.chars, cursor.cx);
        buf.delete_span(cursor.cy, start, end);
        cursor.cx = start;
    }

    /// `df`/`dt`/`cf`/`ct`: delete from the cursor up to the next `target` on this line,
    /// including it when `inclusive`. Returns false when nothing was deleted.
    pub fn delete_to_char(buf: &mut Buffer, cursor: &mut Cursor, target: u8, inclusive: bool) -> bool {
        match Self::span_to_char(buf, cursor, target, inclusive) {
            Some(end) => {
                buf.delete_span(cursor.cy, cursor.cx, end);
                true
            }
            None => false,
        }
    }

    /// End column of the non-empty span `delete_to_char` would remove.
    pub fn span_to_char(buf: &Buffer, cursor: &Cursor, target: u8, inclusive: bool) -> Option<usize> {
        buf.row(cursor.cy)?
            .chars
            .iter()
            .enumerate()
            .skip(cursor.cx)
            .find(|(_, &c)| c == target)
            .map(|(i, _)| if inclusive { i + 1 } else { i })
            .filter(|&end| end > cursor.cx)
    }
}
