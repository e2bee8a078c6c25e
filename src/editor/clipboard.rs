/// Single clipboard register holding the last yanked text.
/// Yanks are optionally mirrored to the system clipboard; pastes always
/// come from the internal register.
pub struct Clipboard {
    contents: Vec<u8>,
    system: Option<arboard::Clipboard>,
    sync: bool,
}

impl Clipboard {
    pub fn new(sync: bool) -> Self {
        Self {
            contents: Vec::new(),
            system: None,
            sync,
        }
    }

    pub fn copy(&mut self, text: &[u8]) {
        self.contents = text.to_vec();
        if self.sync {
            self.sync_system();
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    fn sync_system(&mut self) {
        if self.system.is_none() {
            match arboard::Clipboard::new() {
                Ok(cb) => self.system = Some(cb),
                Err(e) => {
                    tracing::warn!("system clipboard unavailable: {}", e);
                    self.sync = false;
                    return;
                }
            }
        }
        if let Some(cb) = self.system.as_mut() {
            let text = String::from_utf8_lossy(&self.contents).into_owned();
            if let Err(e) = cb.set_text(text) {
                tracing::warn!("failed to set system clipboard: {}", e);
            }
        }
    }
}
