use super::buffer::Buffer;
use super::cursor::Cursor;
use crate::syntax::is_space;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Word,
    Punctuation,
}

pub fn char_class(c: u8) -> CharClass {
    if is_space(c) || c == 0 {
        CharClass::Whitespace
    } else if is_word_char(c) {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

pub fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// First column of the class run containing `x`.
pub fn start_of_word(chars: &[u8], x: usize) -> usize {
    let Some(&c) = chars.get(x) else {
        return x.min(chars.len());
    };
    let class = char_class(c);
    let mut x = x;
    while x > 0 && char_class(chars[x - 1]) == class {
        x -= 1;
    }
    x
}

/// One past the last column of the class run containing `x`.
pub fn end_of_word(chars: &[u8], x: usize) -> usize {
    let Some(&c) = chars.get(x) else {
        return x;
    };
    let class = char_class(c);
    let mut x = x;
    while x < chars.len() && char_class(chars[x]) == class {
        x += 1;
    }
    x
}

/// Bounds of the identifier-like run under `x`, if the cursor is on one.
pub fn word_at(chars: &[u8], x: usize) -> Option<(usize, usize)> {
    if !chars.get(x).is_some_and(|&c| is_word_char(c)) {
        return None;
    }
    let mut start = x;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = x;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }
    Some((start, end))
}

/// The bracket that closes (or opens) `c`, and the direction to scan for it.
fn bracket_pair(c: u8) -> Option<(u8, isize)> {
    match c {
        b'{' => Some((b'}', 1)),
        b'}' => Some((b'{', -1)),
        b'(' => Some((b')', 1)),
        b')' => Some((b'(', -1)),
        b'[' => Some((b']', 1)),
        b']' => Some((b'[', -1)),
        _ => None,
    }
}

/// Word motions, bracket matching and in-line character search
pub struct MotionOps;

impl MotionOps {
    /// Past the current run, past any whitespace, and on to the next line's
    /// first non-blank if that runs off the end of the line.
    pub fn word_forward(cursor: &mut Cursor, buf: &Buffer) {
        let Some(row) = buf.row(cursor.cy) else {
            return;
        };
        let chars = &row.chars;
        let mut x = end_of_word(chars, cursor.cx);
        while x < chars.len() && char_class(chars[x]) == CharClass::Whitespace {
            x += 1;
        }
        cursor.cx = x;

        if cursor.cx >= chars.len() && cursor.cy + 1 < buf.len() {
            cursor.cy += 1;
            let next = buf.row(cursor.cy).map_or(&[][..], |row| &row.chars[..]);
            cursor.cx = next.iter().take_while(|&&c| is_space(c)).count();
        }
    }

    /// Position of the bracket matching the one at (`cx`, `cy`).
    pub fn matching_bracket(buf: &Buffer, cx: usize, cy: usize) -> Option<(usize, usize)> {
        let current = *buf.row(cy)?.chars.get(cx)?;
        let (target, direction) = bracket_pair(current)?;

        let mut depth = 1usize;
        let mut y = cy;
        let mut x = cx as isize + direction;
        loop {
            let row = &buf.row(y)?.chars;
            if x < 0 {
                y = y.checked_sub(1)?;
                x = buf.row_len(y) as isize - 1;
                continue;
            }
            if x as usize >= row.len() {
                y += 1;
                x = 0;
                continue;
            }

            let c = row[x as usize];
            if c == target {
                depth -= 1;
                if depth == 0 {
                    return Some((x as usize, y));
                }
            } else if c == current {
                depth += 1;
            }
            x += direction;
        }
    }

    /// Jump to the matching bracket. Returns false and leaves the cursor alone when there is none.
    pub fn jump_to_matching_bracket(cursor: &mut Cursor, buf: &Buffer) -> bool {
        match Self::matching_bracket(buf, cursor.cx, cursor.cy) {
            Some((x, y)) => {
                cursor.cx = x;
                cursor.cy = y;
                true
            }
            None => false,
        }
    }

    /// `f`/`t` jump: to the next `target` after the cursor on this line, or just before it.
    pub fn find_char(cursor: &mut Cursor, buf: &Buffer, target: u8, till: bool) -> bool {
        let Some(row) = buf.row(cursor.cy) else {
            return false;
        };
        let found = row
            .chars
            .iter()
            .enumerate()
            .skip(cursor.cx + 1)
            .find(|(_, &c)| c == target)
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                cursor.cx = if till { i - 1 } else { i };
                true
            }
            None => false,
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
    fn test_char_classes() {
        assert_eq!(char_class(b' '), CharClass::Whitespace);
        assert_eq!(char_class(b'\t'), CharClass::Whitespace);
        assert_eq!(char_class(b'a'), CharClass::Word);
        assert_eq!(char_class(b'_'), CharClass::Word);
        assert_eq!(char_class(b'9'), CharClass::Word);
        assert_eq!(char_class(b'.'), CharClass::Punctuation);
    }

    #[test]
    fn test_word_bounds() {
        let chars = b"foo  bar.baz";
        assert_eq!(start_of_word(chars, 6), 5);
        assert_eq!(end_of_word(chars, 6), 8);
        assert_eq!(start_of_word(chars, 0), 0);
        assert_eq!(end_of_word(chars, 8), 9);
        assert_eq!(end_of_word(chars, 12), 12);
        assert_eq!(word_at(chars, 10), Some((9, 12)));
        assert_eq!(word_at(chars, 3), None);
    }

    #[test]
    fn test_word_forward_three_classes() {
        let buf = buffer(&["foo  bar.baz"]);
        let mut cursor = Cursor::default();
        MotionOps::word_forward(&mut cursor, &buf);
        assert_eq!(cursor.cx, 5);
        MotionOps::word_forward(&mut cursor, &buf);
        // the '.' is its own punctuation run
        assert_eq!(cursor.cx, 8);
        MotionOps::word_forward(&mut cursor, &buf);
        assert_eq!(cursor.cx, 9);
    }

    #[test]
    fn test_word_forward_crosses_lines() {
        let buf = buffer(&["end", "   next"]);
        let mut cursor = Cursor::default();
        MotionOps::word_forward(&mut cursor, &buf);
        assert_eq!((cursor.cx, cursor.cy), (3, 1));

        let buf = buffer(&["last"]);
        let mut cursor = Cursor::default();
        MotionOps::word_forward(&mut cursor, &buf);
        assert_eq!((cursor.cx, cursor.cy), (4, 0));
    }

    #[test]
    fn test_bracket_matching_nested() {
        let buf = buffer(&["a(b(c)d)e"]);
        assert_eq!(MotionOps::matching_bracket(&buf, 1, 0), Some((7, 0)));
        assert_eq!(MotionOps::matching_bracket(&buf, 3, 0), Some((5, 0)));
        assert_eq!(MotionOps::matching_bracket(&buf, 7, 0), Some((1, 0)));
        assert_eq!(MotionOps::matching_bracket(&buf, 8, 0), None);
        assert_eq!(MotionOps::matching_bracket(&buf, 0, 0), None);
    }

    #[test]
    fn test_bracket_matching_across_lines() {
        let buf = buffer(&["fn main() {", "", "    if x { y }", "}"]);
        assert_eq!(MotionOps::matching_bracket(&buf, 10, 0), Some((0, 3)));
        assert_eq!(MotionOps::matching_bracket(&buf, 0, 3), Some((10, 0)));
    }

    #[test]
    fn test_unmatched_bracket_leaves_cursor() {
        let buf = buffer(&["(a", "b"]);
        let mut cursor = Cursor { cx: 0, cy: 0, ..Default::default() };
        assert!(!MotionOps::jump_to_matching_bracket(&mut cursor, &buf));
        assert_eq!((cursor.cx, cursor.cy), (0, 0));

        let buf = buffer(&["a]"]);
        let mut cursor = Cursor { cx: 1, cy: 0, ..Default::default() };
        assert!(!MotionOps::jump_to_matching_bracket(&mut cursor, &buf));
        assert_eq!(cursor.cx, 1);
    }

    #[test]
    fn test_find_char() {
        let buf = buffer(&["a,b,c"]);
        let mut cursor = Cursor::default();
        assert!(MotionOps::find_char(&mut cursor, &buf, b',', false));
        assert_eq!(cursor.cx, 1);
        assert!(MotionOps::find_char(&mut cursor, &buf, b',', true));
        assert_eq!(cursor.cx, 2);
        assert!(!MotionOps::find_char(&mut cursor, &buf, b'z', false));
        assert_eq!(cursor.cx, 2);
    }
}
