//! Terminal host for the banner.
//!
//! # Module Structure
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - keyboard handling
//! - `page` - topics being browsed and the status message
//! - `render` - page layout
//! - `renderer` - the banner container the page draws
//! - `status` - status bar widget
//! - `widget` - banner widget and plain-text lines

mod input;
mod loop_runner;
mod page;
mod render;
mod renderer;
mod status;
mod widget;

pub use input::Action;
pub use loop_runner::run;
pub use page::Page;
pub use renderer::TerminalRenderer;
pub use render::describe_state;
pub use widget::{banner_lines, key_hint, BannerWidget};
