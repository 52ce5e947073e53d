//! In-memory platform used by tests and demos.
//!
//! `HeadlessPresenter` behaves like a typical native full-screen presenter:
//! it paints an opaque default background on mount, restyles the container
//! once more on the next loop iteration, and completes animated unmounts one
//! iteration late. Every call is recorded for inspection.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{ContainerHandle, ModalContainer, ModalPresenter, ScreenMetrics, Transaction, UnmountCallback};
use crate::jobs;
use crate::layout::Size;
use crate::widgets::Color;

/// Opaque background the host applies to a freshly mounted container.
pub const SYSTEM_BACKGROUND: Color = Color::rgb(0.95, 0.95, 0.97);

pub struct HeadlessContainer {
    background: Cell<Color>,
    late_styling: bool,
}

impl HeadlessContainer {
    fn new(late_styling: bool) -> Self {
        Self {
            background: Cell::new(SYSTEM_BACKGROUND),
            late_styling,
        }
    }
}

impl ModalContainer for HeadlessContainer {
    fn set_background(&self, color: Color) {
        self.background.set(color);
    }

    fn background(&self) -> Color {
        self.background.get()
    }

    fn applies_late_styling(&self) -> bool {
        self.late_styling
    }
}

#[derive(Default)]
struct PresenterState {
    late_styling: bool,
    mounted: Cell<usize>,
    max_mounted: Cell<usize>,
    mounts: Cell<usize>,
    unmounts: Cell<usize>,
    completions: Cell<usize>,
    transactions: RefCell<Vec<Transaction>>,
    container: RefCell<Option<Rc<HeadlessContainer>>>,
}

/// Recording presenter. Clones share state, so keep one to inspect after
/// handing the other to an alert.
#[derive(Clone)]
pub struct HeadlessPresenter {
    state: Rc<PresenterState>,
}

impl HeadlessPresenter {
    /// A presenter whose containers get restyled after mount.
    pub fn new() -> Self {
        Self::with_late_styling(true)
    }

    pub fn with_late_styling(late_styling: bool) -> Self {
        Self {
            state: Rc::new(PresenterState {
                late_styling,
                ..PresenterState::default()
            }),
        }
    }

    pub fn mount_count(&self) -> usize {
        self.state.mounts.get()
    }

    pub fn unmount_count(&self) -> usize {
        self.state.unmounts.get()
    }

    /// Unmounts whose completion callback has run.
    pub fn completed_unmounts(&self) -> usize {
        self.state.completions.get()
    }

    /// Highest number of simultaneously mounted containers seen.
    pub fn max_concurrent_mounts(&self) -> usize {
        self.state.max_mounted.get()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.transactions.borrow().clone()
    }

    /// Background of the most recently mounted container.
    pub fn container_background(&self) -> Option<Color> {
        self.state
            .container
            .borrow()
            .as_ref()
            .map(|container| container.background())
    }
}

impl Default for HeadlessPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalPresenter for HeadlessPresenter {
    fn mount(&mut self, transaction: &Transaction) -> ContainerHandle {
        let state = &self.state;
        if state.mounted.get() > 0 {
            log::warn!("Full-screen container mounted while another is still mounted");
        }
        state.transactions.borrow_mut().push(*transaction);
        state.mounts.set(state.mounts.get() + 1);
        state.mounted.set(state.mounted.get() + 1);
        state.max_mounted.set(state.max_mounted.get().max(state.mounted.get()));

        let container = Rc::new(HeadlessContainer::new(state.late_styling));
        if state.late_styling {
            let late = Rc::downgrade(&container);
            jobs::next_tick(move || {
                if let Some(container) = late.upgrade() {
                    container.set_background(SYSTEM_BACKGROUND);
                }
            });
        }
        *state.container.borrow_mut() = Some(container.clone());
        container
    }

    fn unmount(&mut self, transaction: &Transaction, on_unmounted: UnmountCallback) {
        let state = self.state.clone();
        state.transactions.borrow_mut().push(*transaction);
        state.unmounts.set(state.unmounts.get() + 1);
        state.mounted.set(state.mounted.get().saturating_sub(1));

        let complete = move || {
            state.completions.set(state.completions.get() + 1);
            on_unmounted();
        };
        if transaction.disables_animations {
            complete();
        } else {
            jobs::next_tick(complete);
        }
    }

    fn is_mounted(&self) -> bool {
        self.state.mounted.get() > 0
    }
}

/// Fixed screen size; `None` models a missing window scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessScreen(pub Option<Size>);

impl HeadlessScreen {
    pub fn new(width: f32, height: f32) -> Self {
        Self(Some(Size::new(width, height)))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl ScreenMetrics for HeadlessScreen {
    fn screen_size(&self) -> Option<Size> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_unmount_completes_synchronously() {
        let mut presenter = HeadlessPresenter::new();
        presenter.mount(&Transaction::instant());
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        presenter.unmount(&Transaction::instant(), Box::new(move || flag.set(true)));
        assert!(done.get());
        assert!(!presenter.is_mounted());
    }

    #[test]
    fn test_animated_unmount_completes_next_tick() {
        let _clock = jobs::install_manual_clock();
        let mut presenter = HeadlessPresenter::new();
        presenter.mount(&Transaction::animated());
        presenter.unmount(&Transaction::animated(), Box::new(|| {}));
        assert_eq!(presenter.completed_unmounts(), 0);
        jobs::run_due_jobs();
        assert_eq!(presenter.completed_unmounts(), 1);
    }

    #[test]
    fn test_late_styling_restores_default_background() {
        let _clock = jobs::install_manual_clock();
        let mut presenter = HeadlessPresenter::new();
        let container = presenter.mount(&Transaction::instant());
        container.set_background(Color::TRANSPARENT);
        jobs::run_due_jobs();
        assert_eq!(presenter.container_background(), Some(SYSTEM_BACKGROUND));
    }

    #[test]
    fn test_screen_unavailable() {
        assert_eq!(HeadlessScreen::unavailable().screen_size(), None);
        assert_eq!(
            HeadlessScreen::new(390.0, 844.0).screen_size(),
            Some(Size::new(390.0, 844.0))
        );
    }
}
