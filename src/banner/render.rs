use super::state::Banner;

/// Draws the banner. Only the controller calls it.
///
/// A renderer owns at most one banner container; the controller removes the
/// old one before it renders a new one.
pub trait Renderer {
    /// Insert a banner container in front of the page's anchor element.
    fn render(&mut self, banner: &Banner);

    /// Rewrite the existing container in place. Does nothing if the
    /// container is gone.
    fn update(&mut self, banner: &Banner);

    /// Delete the container if there is one.
    fn remove(&mut self);
}
