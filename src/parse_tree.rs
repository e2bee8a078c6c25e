use std::time::{Duration, Instant};

use tree_sitter::{Node, Parser, Point, Tree};

use crate::editor::row::Row;
use crate::syntax::{Grammar, Highlight};

/// Owns the tree-sitter parser and the current tree for the open buffer.
pub struct ParseTreeCache {
    parser: Option<Parser>,
    grammar: Option<Grammar>,
    tree: Option<Tree>,
    last_parse: Instant,
    throttle: Duration,
    /// A throttled request was skipped since the last parse
    stale: bool,
}

impl ParseTreeCache {
    pub fn new(throttle: Duration) -> Self {
        Self {
            parser: None,
            grammar: None,
            tree: None,
            last_parse: Instant::now(),
            throttle,
            stale: false,
        }
    }

    /// Drop the current tree; the parser is kept for reuse.
    pub fn clear(&mut self) {
        self.tree = None;
        self.stale = false;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether a throttled parse may run at `now`.
    pub fn due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_parse) >= self.throttle
    }

    /// Record a throttled request that was not allowed to run.
    pub fn defer(&mut self) {
        self.stale = true;
    }

    /// Parse `source` with `grammar`, replacing the current tree.
    /// On failure the previous tree stays in place and false is returned.
    pub fn parse(&mut self, grammar: Grammar, source: &[u8], now: Instant) -> bool {
        self.last_parse = now;
        self.stale = false;

        if self.grammar != Some(grammar) {
            self.parser = None;
            self.tree = None;
            self.grammar = Some(grammar);
        }

        if self.parser.is_none() {
            let mut parser = Parser::new();
            if let Err(e) = parser.set_language(grammar.language()) {
                tracing::error!("failed to load {:?} grammar: {}", grammar, e);
                return false;
            }
            self.parser = Some(parser);
        }

        let Some(parser) = self.parser.as_mut() else {
            return false;
        };

        let started = Instant::now();
        match parser.parse(source, None) {
            Some(tree) => {
                tracing::debug!(
                    bytes = source.len(),
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "reparsed buffer"
                );
                self.tree = Some(tree);
                true
            }
            None => {
                tracing::warn!("tree-sitter returned no tree for {:?}", grammar);
                false
            }
        }
    }

    /// Fill `row.hl` from the current tree. Without a tree the row stays unhighlighted.
    pub fn highlight_row(&self, row: &mut Row, tab_stop: usize) {
        row.hl.clear();
        row.hl.resize(row.render.len(), Highlight::Normal);

        let Some(tree) = &self.tree else {
            return;
        };

        let start = Point::new(row.idx, 0);
        let end = Point::new(row.idx, row.chars.len());
        if let Some(node) = tree.root_node().descendant_for_point_range(start, end) {
            highlight_node(row, node, tab_stop);
        }
    }
}

/// Node kinds painted as a single span even though they have children.
const SPAN_KINDS: &[&str] = &["comment", "string_literal", "string"];

/// Quote tokens of a string node. They keep their own class over the string's span.
const DELIMITER_KINDS: &[&str] = &["string_start", "string_end", "\""];

const KEYWORD_KINDS: &[&str] = &[
    "if", "else", "while", "for", "return", "break", "continue", "switch", "case", "def", "class",
    "import", "from", "struct", "union", "enum", "typedef", "static", "extern", "const",
    "volatile", "#include", "#define", "#ifdef", "#ifndef", "#endif",
];

/// Highlight class for a node kind. `width` is the node's rendered width on the row.
pub fn classify(kind: &str, width: usize) -> Highlight {
    match kind {
        "comment" => Highlight::Comment,
        "string_start" | "string_end" | "\"" if width >= 3 => Highlight::Comment,
        "string_start" | "string_end" | "\"" => Highlight::String,
        "string_literal" | "string" | "string_content" => Highlight::String,
        "number_literal" | "integer" | "float" => Highlight::Number,
        "primitive_type" | "type_identifier" | "sized_type_specifier" | "type_qualifier" => {
            Highlight::Keyword2
        }
        kind if KEYWORD_KINDS.contains(&kind) => Highlight::Keyword1,
        _ => Highlight::Normal,
    }
}

/// Rendered column range of `node` on `row`, if the node touches it.
fn node_span(row: &Row, node: Node, tab_stop: usize) -> Option<(usize, usize)> {
    let start = node.start_position();
    let end = node.end_position();
    if start.row > row.idx || end.row < row.idx {
        return None;
    }

    let start_rx = if start.row == row.idx {
        row.cx_to_rx(start.column, tab_stop)
    } else {
        0
    };
    let end_rx = if end.row == row.idx {
        row.cx_to_rx(end.column, tab_stop)
    } else {
        row.render.len()
    };
    Some((start_rx, end_rx))
}

fn highlight_node(row: &mut Row, node: Node, tab_stop: usize) {
    let Some((start_rx, end_rx)) = node_span(row, node, tab_stop) else {
        return;
    };

    if node.child_count() == 0 || (node.is_named() && SPAN_KINDS.contains(&node.kind())) {
        let class = classify(node.kind(), end_rx.saturating_sub(start_rx));
        paint(row, start_rx, end_rx, class);

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if !DELIMITER_KINDS.contains(&child.kind()) {
                continue;
            }
            if let Some((start, end)) = node_span(row, child, tab_stop) {
                paint(row, start, end, classify(child.kind(), end.saturating_sub(start)));
            }
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        highlight_node(row, child, tab_stop);
    }
}

fn paint(row: &mut Row, start: usize, end: usize, class: Highlight) {
    if class == Highlight::Normal {
        return;
    }
    let end = end.min(row.hl.len());
    if start < end {
        row.hl[start..end].fill(class);
    }
}
