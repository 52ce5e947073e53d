//! Capabilities the alert needs from the host UI framework.
//!
//! The host owns the native full-screen presentation primitive and knows the
//! screen size; the alert only drives them through these traits. The
//! [`headless`] module provides an in-memory implementation.

pub mod headless;

use std::rc::Rc;

use crate::layout::Size;
use crate::widgets::Color;

pub use headless::{HeadlessContainer, HeadlessPresenter, HeadlessScreen};

/// Options applied to a state change, mirroring the host's transaction
/// concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transaction {
    /// Suppress the host's own transition for this change.
    pub disables_animations: bool,
}

impl Transaction {
    /// A transaction that applies its change instantly, without any
    /// host-provided transition.
    pub const fn instant() -> Self {
        Self {
            disables_animations: true,
        }
    }

    pub const fn animated() -> Self {
        Self {
            disables_animations: false,
        }
    }
}

/// Handle to the host's full-screen modal container.
pub trait ModalContainer {
    fn set_background(&self, color: Color);
    fn background(&self) -> Color;

    /// Whether the host restyles the container after it is mounted, in which
    /// case a background override must be reapplied one loop iteration later.
    fn applies_late_styling(&self) -> bool {
        true
    }
}

pub type ContainerHandle = Rc<dyn ModalContainer>;

/// Completion callback for [`ModalPresenter::unmount`].
pub type UnmountCallback = Box<dyn FnOnce()>;

/// The host's native full-screen presentation primitive.
pub trait ModalPresenter {
    /// Mount the full-screen container and return a handle to it.
    fn mount(&mut self, transaction: &Transaction) -> ContainerHandle;

    /// Unmount the container. `on_unmounted` runs once the host has fully
    /// removed it.
    fn unmount(&mut self, transaction: &Transaction, on_unmounted: UnmountCallback);

    fn is_mounted(&self) -> bool;
}

/// Screen-bounds query.
pub trait ScreenMetrics {
    /// The active screen's size, or `None` if there is no active window.
    fn screen_size(&self) -> Option<Size>;
}

impl<F> ScreenMetrics for F
where
    F: Fn() -> Option<Size>,
{
    fn screen_size(&self) -> Option<Size> {
        self()
    }
}
