use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::editor::{Editor, OpenOutcome};
use crate::input::CommandResult;
use crate::prompt::{Prompt, PromptKind};
use crate::syntax::HighlightStrategy;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    Visual,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
        }
    }
}

/// An `f`/`t` waiting for its target character, possibly under `c` or `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFind {
    pub till: bool,
    pub operator: Option<char>,
}

pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

pub struct App {
    pub mode: Mode,
    pub editor: Editor,
    pub prompt: Option<Prompt>,
    pub status_message: String,
    pub status_time: Instant,
    pub config: Config,
    /// Directory searched by file name completion
    pub cwd: PathBuf,
    // Normal mode command composition
    pub pending_key: Option<char>,
    pub pending_count: Option<usize>,
    /// Count typed before the first key of a two-key command
    pub carried_count: Option<usize>,
    pub pending_find: Option<PendingFind>,
    /// When the first key of the insert-mode escape chord was typed
    pub pending_escape: Option<Instant>,
    pub quit_times: u32,
}

impl App {
    pub fn new(config: Config) -> Self {
        let editor = Editor::new(&config.editor);
        let quit_times = config.editor.quit_times;
        Self {
            mode: Mode::Normal,
            editor,
            prompt: None,
            status_message: String::from(HELP_MESSAGE),
            status_time: Instant::now(),
            config,
            cwd: PathBuf::from("."),
            pending_key: None,
            pending_count: None,
            carried_count: None,
            pending_find: None,
            pending_escape: None,
            quit_times,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.config.theme
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_time = Instant::now();
    }

    /// The status message, while it is still fresh.
    pub fn visible_status(&self, now: Instant) -> Option<&str> {
        let fresh = now.saturating_duration_since(self.status_time) < self.config.editor.message_timeout();
        (fresh && !self.status_message.is_empty()).then_some(self.status_message.as_str())
    }

    /// Terminal size changed; two rows go to the status and message bars.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.editor
            .resize(height.saturating_sub(2) as usize, width as usize);
    }

    /// Idle work between key presses.
    pub fn tick(&mut self, now: Instant) {
        if let Some(at) = self.pending_escape {
            if now.saturating_duration_since(at) > self.config.editor.escape_chord_timeout() {
                self.pending_escape = None;
            }
        }
        self.editor.tick(now);
    }

    // ========== Files ==========

    pub fn open(&mut self, path: &Path) {
        let name = path.display().to_string();
        match self.editor.open_file(path) {
            Ok(OpenOutcome::Created) => self.set_status(format!("New file: {}", name)),
            Ok(OpenOutcome::Loaded) => match self.editor.buffer.strategy() {
                HighlightStrategy::ParseTree(_) => {
                    let filetype = self.editor.buffer.syntax().map_or("", |s| s.filetype);
                    self.set_status(format!("Tree-sitter highlighting enabled for {}", filetype));
                }
                HighlightStrategy::Scanner => self.set_status(format!("Opened: {}", name)),
            },
            Err(e) => {
                tracing::warn!("open failed: {:#}", e);
                self.set_status(format!("Can't open file: {}", name));
                return;
            }
        }
        self.mode = Mode::Normal;
        self.clear_pending();
    }

    /// Save to the current file, asking for a name first if there is none.
    /// Returns true once the file is on disk.
    pub fn save(&mut self) -> bool {
        if self.editor.filename.is_none() {
            self.start_prompt(PromptKind::SaveAs { then_quit: false });
            return false;
        }
        self.write_file()
    }

    fn write_file(&mut self) -> bool {
        match self.editor.save() {
            Ok(bytes) => {
                self.set_status(format!("{} bytes written to disk", bytes));
                true
            }
            Err(e) => {
                tracing::error!("save failed: {:#}", e);
                let cause = e.root_cause().to_string();
                self.set_status(format!("Can't save! I/O error: {}", cause));
                false
            }
        }
    }

    /// Name the buffer and write it, as the save-as prompt does on Enter.
    pub fn save_as(&mut self, name: &str) -> bool {
        self.editor.filename = Some(PathBuf::from(name));
        self.editor.select_syntax();
        self.write_file()
    }

    // ========== Prompts ==========

    pub fn start_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt::new(kind, self.editor.cursor));
    }

    pub fn start_search(&mut self) {
        self.start_prompt(PromptKind::Search);
    }

    /// Run an `ex:` command line.
    pub fn execute_command(&mut self, command: &str) -> CommandResult {
        let command = command.trim();
        match command {
            "q" => return CommandResult::Quit,
            "w" => {
                self.save();
            }
            "wq" => {
                if self.editor.filename.is_none() {
                    self.start_prompt(PromptKind::SaveAs { then_quit: true });
                } else if self.write_file() {
                    return CommandResult::Quit;
                }
            }
            "e" => self.start_prompt(PromptKind::OpenFile),
            _ => {
                if let Some(name) = command.strip_prefix("e ") {
                    let name = name.trim_start();
                    if !name.is_empty() {
                        self.open(Path::new(name));
                    }
                } else {
                    self.set_status(format!("Not an editor command: {}", command));
                }
            }
        }
        CommandResult::Continue
    }

    // ========== Quit guard ==========

    /// Ctrl-Q. Returns true when the editor may exit.
    pub fn request_quit(&mut self) -> bool {
        if self.editor.is_dirty() && self.quit_times > 0 {
            self.set_status(format!(
                "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                self.quit_times
            ));
            self.quit_times -= 1;
            return false;
        }
        true
    }

    pub fn reset_quit_times(&mut self) {
        self.quit_times = self.config.editor.quit_times;
    }

    // ========== Modes ==========

    pub fn clear_pending(&mut self) {
        self.pending_key = None;
        self.pending_count = None;
        self.carried_count = None;
        self.pending_find = None;
    }

    pub fn undo(&mut self) {
        if !self.editor.undo() {
            self.set_status("Nothing to undo");
        }
    }
}
