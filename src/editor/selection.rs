use super::buffer::Buffer;

/// A (column, row) position in the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mark {
    pub x: usize,
    pub y: usize,
}

/// Visual mode marks. `end` follows the cursor while selecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: Mark,
    pub end: Mark,
}

/// Selection operations for visual mode
pub struct SelectionOps;

impl SelectionOps {
    /// Order two marks so the first comes first (row, then column).
    pub fn normalize(a: Mark, b: Mark) -> (Mark, Mark) {
        if (a.y, a.x) <= (b.y, b.x) {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Text of the inclusive span between two marks, lines joined with '\n'.
    pub fn selected_text(buf: &Buffer, a: Mark, b: Mark) -> Vec<u8> {
        let (start, end) = Self::normalize(a, b);
        let mut out = Vec::new();

        for y in start.y..=end.y {
            let Some(row) = buf.row(y) else {
                break;
            };
            let chars = &row.chars;
            let from = if y == start.y { start.x.min(chars.len()) } else { 0 };
            let to = if y == end.y {
                (end.x + 1).min(chars.len())
            } else {
                chars.len()
            };
            if y != start.y {
                out.push(b'\n');
            }
            if from < to {
                out.extend_from_slice(&chars[from..to]);
            }
        }
        out
    }

    /// Whether rendered column `rx` of row `y` lies inside the selection.
    /// Columns are compared in render coordinates on both ends.
    pub fn contains_rx(buf: &Buffer, selection: &Selection, y: usize, rx: usize) -> bool {
        let (start, end) = Self::normalize(selection.start, selection.end);
        if y < start.y || y > end.y {
            return false;
        }
        let to_rx = |mark: Mark| {
            buf.row(mark.y)
                .map_or(mark.x, |row| row.cx_to_rx(mark.x, buf.tab_stop()))
        };
        let after_start = y > start.y || rx >= to_rx(start);
        let before_end = y < end.y || rx <= to_rx(end);
        after_start && before_end
    }
}
