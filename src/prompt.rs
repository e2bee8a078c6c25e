use std::fs;
use std::path::Path;

use crate::editor::Cursor;
use crate::input::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// `:` command line
    Command,
    /// `/` incremental search
    Search,
    SaveAs { then_quit: bool },
    /// `:e` without a name
    OpenFile,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::Command => "ex: ",
            PromptKind::Search => "Search: ",
            PromptKind::SaveAs { .. } => "Save as: ",
            PromptKind::OpenFile => "Open file: ",
        }
    }

    fn completes_paths(&self, input: &str) -> bool {
        match self {
            PromptKind::OpenFile => true,
            PromptKind::Command => input.starts_with("e "),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Continue,
    Cancel,
    Submit(String),
}

/// A single-line prompt shown in the message bar.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
    /// Cursor and scroll position when the prompt opened
    pub saved_cursor: Cursor,
}

impl Prompt {
    pub fn new(kind: PromptKind, saved_cursor: Cursor) -> Self {
        Self {
            kind,
            input: String::new(),
            saved_cursor,
        }
    }

    /// Text for the message bar.
    pub fn display(&self) -> String {
        match self.kind {
            PromptKind::Search => format!("{}{} (Use ESC/Arrows/Enter)", self.kind.label(), self.input),
            _ => format!("{}{}", self.kind.label(), self.input),
        }
    }

    /// Edit the input with `key`. Tab completes file names found in `dir`.
    pub fn handle_key(&mut self, key: Key, dir: &Path) -> PromptEvent {
        match key {
            Key::Backspace | Key::Delete | Key::Ctrl('h') => {
                self.input.pop();
            }
            Key::Esc => return PromptEvent::Cancel,
            Key::Enter => {
                if !self.input.is_empty() {
                    return PromptEvent::Submit(self.input.clone());
                }
            }
            Key::Tab => self.complete(dir),
            Key::Char(c) if c.is_ascii() && !c.is_ascii_control() => self.input.push(c),
            _ => {}
        }
        PromptEvent::Continue
    }

    fn complete(&mut self, dir: &Path) {
        if !self.kind.completes_paths(&self.input) {
            return;
        }
        let keep = match self.kind {
            PromptKind::Command => 2,
            _ => 0,
        };
        if let Some(completion) = complete_path(&self.input[keep..], dir) {
            self.input.truncate(keep);
            self.input.push_str(&completion);
        }
    }
}

/// Longest common prefix of the entries in `dir` starting with `prefix`,
/// if it is longer than `prefix`.
pub fn complete_path(prefix: &str, dir: &Path) -> Option<String> {
    let entries = fs::read_dir(dir).ok()?;
    let mut common: Option<String> = None;

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(prefix) {
            continue;
        }
        common = Some(match common {
            None => name,
            Some(current) => {
                let len: usize = current
                    .chars()
                    .zip(name.chars())
                    .take_while(|(a, b)| a == b)
                    .map(|(a, _)| a.len_utf8())
                    .sum();
                current[..len].to_string()
            }
        });
    }

    common.filter(|found| found.len() > prefix.len())
}
