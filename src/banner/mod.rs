//! The subscription banner: state, controller, renderer seam and runtime.
//!
//! # Module Structure
//!
//! - `state` - banner contents and the controller's state enum
//! - `controller` - evaluation and action state machine
//! - `render` - the renderer seam
//! - `runtime` - navigation dispatch, background requests, timers

mod controller;
mod render;
mod runtime;
mod state;

pub use controller::{BannerController, Dismissal, PendingAction};
pub use render::Renderer;
pub use runtime::{BannerEvent, BannerRuntime};
pub use state::{
    Affordance, AffordanceKind, AffordanceStatus, Banner, BannerLayout, BannerPhase, BannerState,
    HiddenReason,
};
