use crate::syntax::Highlight;

/// One line of the buffer with its derived display state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Position of the row in its buffer
    pub idx: usize,
    /// Raw bytes, no trailing newline
    pub chars: Vec<u8>,
    /// Tab-expanded form of `chars`
    pub render: Vec<u8>,
    /// One class per byte of `render`
    pub hl: Vec<Highlight>,
    /// Block comment still open at the end of this row
    pub hl_open_comment: bool,
}

impl Row {
    pub fn new(idx: usize, chars: &[u8]) -> Self {
        Self {
            idx,
            chars: chars.to_vec(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Rebuild `render` from `chars`. Highlight classes are left to the caller.
    pub fn update_render(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        self.render.clear();
        for &c in &self.chars {
            if c == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(c);
            }
        }
    }

    /// Rendered column of logical column `cx`.
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut rx = 0;
        for &c in self.chars.iter().take(cx) {
            if c == b'\t' {
                rx += (tab_stop - 1) - (rx % tab_stop);
            }
            rx += 1;
        }
        rx
    }

    /// Logical column holding rendered column `rx`.
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut cur_rx = 0;
        for (cx, &c) in self.chars.iter().enumerate() {
            if c == b'\t' {
                cur_rx += (tab_stop - 1) - (cur_rx % tab_stop);
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }
}
