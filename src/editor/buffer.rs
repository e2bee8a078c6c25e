use std::time::{Duration, Instant};

use super::row::Row;
use crate::parse_tree::ParseTreeCache;
use crate::syntax::{self, Highlight, HighlightStrategy, SyntaxProfile};

/// The line store: ordered rows plus everything needed to keep their
/// render and highlight state current after each mutation.
pub struct Buffer {
    rows: Vec<Row>,
    /// Nonzero means unsaved changes
    pub dirty: usize,
    tab_stop: usize,
    tree_sitter: bool,
    syntax: Option<&'static SyntaxProfile>,
    strategy: HighlightStrategy,
    parse_tree: ParseTreeCache,
}

impl Buffer {
    pub fn new(tab_stop: usize, tree_sitter: bool, reparse_throttle: Duration) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            tab_stop: tab_stop.max(1),
            tree_sitter,
            syntax: None,
            strategy: HighlightStrategy::Scanner,
            parse_tree: ParseTreeCache::new(reparse_throttle),
        }
    }

    // ========== Accessors ==========

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of row `at` in bytes, 0 past the end.
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    pub fn syntax(&self) -> Option<&'static SyntaxProfile> {
        self.syntax
    }

    pub fn strategy(&self) -> HighlightStrategy {
        self.strategy
    }

    pub fn contains_tab(&self) -> bool {
        self.rows.iter().any(|row| row.chars.contains(&b'\t'))
    }

    /// Every row followed by '\n'. Used for saving and for the parser.
    pub fn to_flat_text(&self) -> Vec<u8> {
        let len = self.rows.iter().map(|row| row.len() + 1).sum();
        let mut out = Vec::with_capacity(len);
        for row in &self.rows {
            out.extend_from_slice(&row.chars);
            out.push(b'\n');
        }
        out
    }

    // ========== Whole-buffer operations ==========

    /// Replace the content with `lines` without marking the buffer dirty.
    pub fn load_lines(&mut self, lines: Vec<Vec<u8>>) {
        self.parse_tree.clear();
        self.rows = lines
            .into_iter()
            .enumerate()
            .map(|(idx, chars)| Row {
                idx,
                chars,
                ..Default::default()
            })
            .collect();
        for row in self.rows.iter_mut() {
            row.update_render(self.tab_stop);
        }
        self.rehighlight_all();
        self.dirty = 0;
    }

    /// Install `profile` and recompute every row's highlight with the strategy it selects.
    pub fn set_syntax(&mut self, profile: Option<&'static SyntaxProfile>) -> HighlightStrategy {
        self.syntax = profile;
        self.strategy = profile
            .map(|p| p.strategy(self.tree_sitter))
            .unwrap_or(HighlightStrategy::Scanner);
        self.parse_tree.clear();
        match self.strategy {
            HighlightStrategy::ParseTree(_) => self.reparse(),
            HighlightStrategy::Scanner => self.rehighlight_all(),
        }
        tracing::info!(
            filetype = profile.map_or("none", |p| p.filetype),
            strategy = ?self.strategy,
            "syntax selected"
        );
        self.strategy
    }

    /// Install rows taken from an undo snapshot.
    pub fn restore_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.reindex(0);
        self.dirty += 1;
        self.reparse();
    }

    // ========== Row operations ==========

    pub fn insert_line(&mut self, at: usize, text: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(at, text));
        self.reindex(at + 1);
        self.update_row(at);
        self.dirty += 1;
        self.reparse_throttled();
    }

    pub fn delete_line(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.reindex(at);
        if at < self.rows.len() {
            self.update_syntax(at);
        }
        self.dirty += 1;
        self.reparse_throttled();
    }

    /// Delete rows `start..end`.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        for _ in start..end {
            self.delete_line(start);
        }
    }

    /// Split row `at` so the bytes from `col` on become a new row below it.
    pub fn split_line(&mut self, at: usize, col: usize) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        let col = col.min(row.len());
        let tail = row.chars.split_off(col);
        self.rows.insert(at + 1, Row::new(at + 1, &tail));
        self.reindex(at + 2);
        self.update_row(at);
        self.update_row(at + 1);
        self.dirty += 1;
        self.reparse_throttled();
    }

    /// Insert `ch` at `col`; a column past the end appends.
    pub fn insert_char(&mut self, at: usize, col: usize, ch: u8) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        let col = col.min(row.len());
        row.chars.insert(col, ch);
        self.update_row(at);
        self.dirty += 1;
        self.reparse_throttled();
    }

    pub fn append_text(&mut self, at: usize, text: &[u8]) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        row.chars.extend_from_slice(text);
        self.update_row(at);
        self.dirty += 1;
        self.reparse_throttled();
    }

    /// Remove the byte at `col`; no-op past the end.
    pub fn delete_char(&mut self, at: usize, col: usize) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        if col >= row.len() {
            return;
        }
        row.chars.remove(col);
        self.update_row(at);
        self.dirty += 1;
        self.reparse_throttled();
    }

    /// Remove the half-open column range `start..end`; no-op if the range is empty or out of bounds.
    pub fn delete_span(&mut self, at: usize, start: usize, end: usize) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        if start >= end || end > row.len() {
            return;
        }
        row.chars.drain(start..end);
        self.update_row(at);
        self.dirty += 1;
        self.reparse();
    }

    // ========== Highlighting ==========

    /// Temporarily mark `len` rendered columns from `rx` as a search match.
    /// Returns the classes to restore afterwards.
    pub fn overlay_match(&mut self, at: usize, rx: usize, len: usize) -> Option<Vec<Highlight>> {
        let row = self.rows.get_mut(at)?;
        let saved = row.hl.clone();
        let end = (rx + len).min(row.hl.len());
        if rx < end {
            row.hl[rx..end].fill(Highlight::Match);
        }
        Some(saved)
    }

    pub fn restore_highlight(&mut self, at: usize, hl: Vec<Highlight>) {
        if let Some(row) = self.rows.get_mut(at) {
            if row.hl.len() == hl.len() {
                row.hl = hl;
            }
        }
    }

    /// Full reparse, ignoring the throttle. Scanner buffers are left as they are.
    pub fn reparse(&mut self) {
        self.reparse_at(Instant::now());
    }

    pub fn reparse_throttled(&mut self) {
        let now = Instant::now();
        if let HighlightStrategy::ParseTree(_) = self.strategy {
            if self.parse_tree.due(now) {
                self.reparse_at(now);
            } else {
                self.parse_tree.defer();
            }
        }
    }

    /// Run a reparse that an earlier throttled call skipped, once the window allows it.
    pub fn reparse_if_stale(&mut self, now: Instant) -> bool {
        if self.parse_tree.is_stale() && self.parse_tree.due(now) {
            self.reparse_at(now);
            return true;
        }
        false
    }

    fn reparse_at(&mut self, now: Instant) {
        let HighlightStrategy::ParseTree(grammar) = self.strategy else {
            return;
        };
        let source = self.to_flat_text();
        if self.parse_tree.parse(grammar, &source, now) {
            self.rehighlight_all();
        }
    }

    fn rehighlight_all(&mut self) {
        let mut open_comment = false;
        for at in 0..self.rows.len() {
            self.highlight_row(at, open_comment);
            open_comment = self.rows[at].hl_open_comment;
        }
    }

    /// Recompute render and highlight for row `at`.
    fn update_row(&mut self, at: usize) {
        if let Some(row) = self.rows.get_mut(at) {
            row.update_render(self.tab_stop);
            self.update_syntax(at);
        }
    }

    /// Highlight row `at`, then walk forward while the trailing comment state keeps changing.
    fn update_syntax(&mut self, mut at: usize) {
        while at < self.rows.len() {
            let in_comment = at > 0 && self.rows[at - 1].hl_open_comment;
            let before = self.rows[at].hl_open_comment;
            self.highlight_row(at, in_comment);
            if self.rows[at].hl_open_comment == before {
                break;
            }
            at += 1;
        }
    }

    fn highlight_row(&mut self, at: usize, in_comment: bool) {
        let tab_stop = self.tab_stop;
        let row = &mut self.rows[at];
        row.hl_open_comment = match (self.syntax, self.strategy) {
            (None, _) => {
                row.hl.clear();
                row.hl.resize(row.render.len(), Highlight::Normal);
                false
            }
            (Some(profile), HighlightStrategy::Scanner) => {
                syntax::scan_line(profile, &row.render, in_comment, &mut row.hl)
            }
            (Some(_), HighlightStrategy::ParseTree(_)) => {
                self.parse_tree.highlight_row(row, tab_stop);
                false
            }
        };
    }

    fn reindex(&mut self, from: usize) {
        for (idx, row) in self.rows.iter_mut().enumerate().skip(from) {
            row.idx = idx;
        }
    }
}
