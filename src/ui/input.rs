//! Keyboard handling for the interactive page.

use crossterm::event::{KeyCode, KeyModifiers};

use super::page::Page;
use super::renderer::TerminalRenderer;
use crate::banner::{AffordanceKind, BannerRuntime};

/// Result of handling a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

pub(super) fn handle_input(
    runtime: &mut BannerRuntime<TerminalRenderer>,
    page: &mut Page,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Action {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('s') => {
            activate(runtime, page, AffordanceKind::Subscribe);
            Action::Continue
        }
        KeyCode::Char('w') => {
            activate(runtime, page, AffordanceKind::WatchAll);
            Action::Continue
        }
        KeyCode::Tab | KeyCode::Char('n') => {
            if let Some(url) = page.advance() {
                let url = url.to_string();
                runtime.page_changed(&url);
            }
            Action::Continue
        }
        KeyCode::Char('r') => {
            if let Some(url) = page.current() {
                let url = url.to_string();
                runtime.page_changed(&url);
                page.set_status("Reloading...");
            }
            Action::Continue
        }
        _ => Action::Continue,
    }
}

fn activate(runtime: &mut BannerRuntime<TerminalRenderer>, page: &mut Page, kind: AffordanceKind) {
    if runtime.activate(kind) {
        page.set_status(format!("{}...", kind.button()));
    } else {
        tracing::debug!(kind = kind.as_str(), "Affordance not available");
    }
}
