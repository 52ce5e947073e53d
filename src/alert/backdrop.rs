use std::rc::{Rc, Weak};

use crate::config::BackgroundPolicy;
use crate::jobs;
use crate::platform::{ContainerHandle, ModalContainer};
use crate::widgets::Color;

/// Strips the host's default backdrop from the full-screen container so only
/// the alert's own translucent backdrop shows.
pub struct TransparentBackground;

impl TransparentBackground {
    /// Clear the container background now, and again on the next loop
    /// iteration if the policy and the container call for it.
    pub fn apply(container: &ContainerHandle, policy: BackgroundPolicy) {
        container.set_background(Color::TRANSPARENT);

        if policy == BackgroundPolicy::TwoPhase && container.applies_late_styling() {
            let container: Weak<dyn ModalContainer> = Rc::downgrade(container);
            jobs::next_tick(move || {
                if let Some(container) = container.upgrade() {
                    container.set_background(Color::TRANSPARENT);
                }
            });
        }
    }
}
