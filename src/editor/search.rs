use super::buffer::Buffer;
use super::cursor::Cursor;
use super::row::Row;
use crate::syntax::Highlight;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// What a key typed into the search prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// Right/Down: next match after the current one
    Forward,
    /// Left/Up: previous match
    Backward,
    /// The query changed; scan again from the top
    Restart,
    /// The prompt closed (Enter or Esc)
    Finish,
}

/// Search state and operations.
///
/// `query`, `index` and `direction` persist between searches and drive `n`/`N`.
/// The prompt keeps its own match position so that typing refines the
/// search without disturbing the committed one until Enter.
#[derive(Debug, Default)]
pub struct SearchState {
    pub query: Option<Vec<u8>>,
    pub index: Option<usize>,
    pub direction: Direction,
    prompt_match: Option<usize>,
    prompt_direction: Direction,
    saved_hl: Option<(usize, Vec<Highlight>)>,
}

/// Offset of the first occurrence of `needle` in `haystack`.
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Scan for the next row whose rendered text contains `query`, starting after
/// `from` in `direction` and wrapping around. Returns the row and the rendered column.
pub fn find_line(
    rows: &[Row],
    query: &[u8],
    from: Option<usize>,
    direction: Direction,
) -> Option<(usize, usize)> {
    let len = rows.len();
    if len == 0 || query.is_empty() {
        return None;
    }

    let mut current = from;
    for _ in 0..len {
        let next = match (current, direction) {
            (None, Direction::Forward) => 0,
            (None, Direction::Backward) => len - 1,
            (Some(i), Direction::Forward) => (i + 1) % len,
            (Some(i), Direction::Backward) => (i + len - 1) % len,
        };
        current = Some(next);
        if let Some(rx) = find_bytes(&rows[next].render, query) {
            return Some((next, rx));
        }
    }
    None
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One incremental step of the search prompt.
    /// Returns true when the cursor moved to a match.
    pub fn step(
        &mut self,
        buf: &mut Buffer,
        cursor: &mut Cursor,
        query: &[u8],
        step: SearchStep,
    ) -> bool {
        self.restore_highlight(buf);

        match step {
            SearchStep::Finish => {
                self.prompt_match = None;
                self.prompt_direction = Direction::Forward;
                return false;
            }
            SearchStep::Forward => self.prompt_direction = Direction::Forward,
            SearchStep::Backward => self.prompt_direction = Direction::Backward,
            SearchStep::Restart => {
                self.prompt_match = None;
                self.prompt_direction = Direction::Forward;
            }
        }
        if self.prompt_match.is_none() {
            self.prompt_direction = Direction::Forward;
        }

        let Some((line, rx)) = find_line(buf.rows(), query, self.prompt_match, self.prompt_direction)
        else {
            return false;
        };

        self.prompt_match = Some(line);
        self.index = Some(line);
        self.direction = self.prompt_direction;
        Self::jump(buf, cursor, line, rx);
        if let Some(saved) = buf.overlay_match(line, rx, query.len()) {
            self.saved_hl = Some((line, saved));
        }
        true
    }

    /// `n`/`N`: repeat the committed search from the last match.
    pub fn next(&mut self, buf: &mut Buffer, cursor: &mut Cursor) -> bool {
        self.restore_highlight(buf);
        let Some(query) = self.query.as_deref() else {
            return false;
        };
        match find_line(buf.rows(), query, self.index, self.direction) {
            Some((line, rx)) => {
                self.index = Some(line);
                Self::jump(buf, cursor, line, rx);
                true
            }
            None => false,
        }
    }

    /// Make `query` the committed search without moving.
    pub fn commit(&mut self, query: Vec<u8>) {
        self.query = (!query.is_empty()).then_some(query);
    }

    fn jump(buf: &Buffer, cursor: &mut Cursor, line: usize, rx: usize) {
        cursor.cy = line;
        cursor.cx = buf
            .row(line)
            .map_or(0, |row| row.rx_to_cx(rx, buf.tab_stop()));
        // Past every row, so the next scroll puts the match at the top
        cursor.rowoff = buf.len();
    }

    fn restore_highlight(&mut self, buf: &mut Buffer) {
        if let Some((line, hl)) = self.saved_hl.take() {
            buf.restore_highlight(line, hl);
        }
    }
}
