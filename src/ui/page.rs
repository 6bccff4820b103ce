use std::borrow::Cow;
use std::time::Instant;

/// Interactive page state: the topics given on the command line, which one is
/// showing, and a transient status message.
#[derive(Debug)]
pub struct Page {
    topics: Vec<String>,
    index: usize,
    status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
}

impl Page {
    pub fn new(topics: Vec<String>) -> Self {
        Self {
            topics,
            index: 0,
            status_message: None,
            needs_redraw: true,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.topics.get(self.index).map(String::as_str)
    }

    /// 1-based position and total, for the header.
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.topics.len())
    }

    /// Move to the next topic, wrapping around.
    pub fn advance(&mut self) -> Option<&str> {
        if self.topics.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.topics.len();
        self.current()
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(msg, _)| msg.as_ref())
    }

    /// Clear the status message once it is 3 seconds old. Returns true if a
    /// message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps() {
        let mut page = Page::new(vec!["/t/a/1".into(), "/t/b/2".into()]);
        assert_eq!(page.current(), Some("/t/a/1"));
        assert_eq!(page.advance(), Some("/t/b/2"));
        assert_eq!(page.position(), (2, 2));
        assert_eq!(page.advance(), Some("/t/a/1"));
    }

    #[test]
    fn test_empty_page() {
        let mut page = Page::new(Vec::new());
        assert_eq!(page.current(), None);
        assert_eq!(page.advance(), None);
    }

    #[test]
    fn test_fresh_status_is_kept() {
        let mut page = Page::new(Vec::new());
        page.set_status("Subscribing...");
        assert!(!page.clear_expired_status());
        assert_eq!(page.status(), Some("Subscribing..."));
    }
}
