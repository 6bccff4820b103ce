//! Main event loop for the interactive page.
//!
//! Multiplexes terminal input, banner events from background tasks, and a
//! periodic tick.

use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::input::{handle_input, Action};
use super::page::Page;
use super::render::render;
use super::renderer::TerminalRenderer;
use crate::banner::{BannerEvent, BannerRuntime};

/// Runs the interactive page until the user quits or a signal arrives.
///
/// Navigates to the first topic, then uses `tokio::select!` over SIGTERM,
/// SIGINT, key presses, [`BannerEvent`]s and a 250ms tick. A panic hook
/// restores the terminal before unwinding.
pub async fn run(
    runtime: &mut BannerRuntime<TerminalRenderer>,
    page: &mut Page,
    mut event_rx: mpsc::Receiver<BannerEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    if let Some(url) = page.current() {
        let url = url.to_string();
        runtime.page_changed(&url);
    }

    loop {
        if page.needs_redraw {
            terminal.draw(|f| render(f, runtime, page))?;
            page.needs_redraw = false;
        }

        if page.clear_expired_status() {
            page.needs_redraw = true;
        }

        // Drain queued banner events before waiting on input again.
        while let Ok(event) = event_rx.try_recv() {
            page.needs_redraw = true;
            runtime.handle_event(event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        page.needs_redraw = true;
                        if handle_input(runtime, page, key.code, key.modifiers) == Action::Quit {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(_, _))) => page.needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => break,
                }
            }

            Some(event) = event_rx.recv() => {
                page.needs_redraw = true;
                runtime.handle_event(event);
            }

            _ = tick_interval.tick() => {}
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
