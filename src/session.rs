//! Rendering surface abstraction
//!
//! The quiz core does not paint anything itself. It describes what should be
//! displayed through update messages, and a surface (a DOM binding, a
//! terminal, a test recorder) turns them into pixels.

use super::UpdateMessage;

/// Trait for delivering display updates to the rendering surface
pub trait Surface {
    /// Sends an update message to the surface
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to display
    fn send_message(&self, message: &UpdateMessage);
}

impl<T: Surface + ?Sized> Surface for &T {
    fn send_message(&self, message: &UpdateMessage) {
        (**self).send_message(message);
    }
}
