//! Modal alert overlay.
//!
//! Attach an alert to any view with [`ShowAlert::show_alert`]. Setting the
//! visibility flag mounts the host's full-screen container without any
//! host transition, fades in a backdrop and springs the content up from
//! below the screen. Clearing it reverses the animation and unmounts the
//! container once the exit has finished.
//!
//! ```ignore
//! let visible = create_signal(false);
//! let view = button("Delete").show_alert(visible.clone(), || confirm_dialog())
//!     .presenter(host_presenter)
//!     .on_dismiss(|| log::info!("alert closed"));
//! ```

mod backdrop;
mod controller;
mod machine;
mod overlay;

use std::fmt;
use std::rc::Rc;

pub use backdrop::TransparentBackground;
pub use controller::{AlertController, AlertSnapshot, offscreen_offset};
pub use machine::{AlertAction, AlertEvent, AlertMachine, AlertPhase};
pub use overlay::Alert;

use crate::reactive::Signal;
use crate::widgets::Widget;

/// Closes the alert that handed it out.
#[derive(Clone)]
pub struct Dismiss(Rc<dyn Fn()>);

impl Dismiss {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn dismiss(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Dismiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dismiss")
    }
}

/// Content that can be shown in an alert.
///
/// The alert hands its content a [`Dismiss`] right after building it. The
/// content keeps it and calls [`Dismiss::dismiss`] to close itself, e.g. from
/// a button.
pub trait AlertView: Widget {
    fn on_dismiss(self, dismiss: Dismiss) -> Self;
}

pub trait ShowAlert: Widget + Sized {
    /// Present the view returned by `content` in a modal overlay while
    /// `is_presented` is true. `content` is called again for every show.
    fn show_alert<C, F>(self, is_presented: Signal<bool>, content: F) -> Alert<Self, C, F>
    where
        C: AlertView,
        F: FnMut() -> C;
}

impl<W: Widget> ShowAlert for W {
    fn show_alert<C, F>(self, is_presented: Signal<bool>, content: F) -> Alert<Self, C, F>
    where
        C: AlertView,
        F: FnMut() -> C,
    {
        Alert::new(self, is_presented, content)
    }
}
