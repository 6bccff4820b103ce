use crate::banner::{Banner, Renderer};

/// Holds the banner container the terminal page draws.
///
/// The terminal has a single banner slot: inserting while a container is
/// already present replaces it, and the replacement is counted so a missing
/// `remove` shows up in tests and logs.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    container: Option<Banner>,
    duplicate_inserts: usize,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self) -> Option<&Banner> {
        self.container.as_ref()
    }

    pub fn duplicate_inserts(&self) -> usize {
        self.duplicate_inserts
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, banner: &Banner) {
        if self.container.is_some() {
            self.duplicate_inserts += 1;
            tracing::warn!(category_id = banner.category_id, "Banner inserted over an existing one");
        }
        self.container = Some(banner.clone());
    }

    fn update(&mut self, banner: &Banner) {
        if let Some(container) = self.container.as_mut() {
            *container = banner.clone();
        }
    }

    fn remove(&mut self) {
        self.container = None;
    }
}
