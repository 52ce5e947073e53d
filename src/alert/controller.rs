//! Carries out [`AlertMachine`] decisions against the host platform.
//!
//! The controller is shared between the visibility effect, the unmount timer
//! and the widget that paints it, so it lives in a [`ControllerCell`]. Events
//! that arrive while the controller is busy (a dismiss callback flipping the
//! flag from inside an unmount, say) are queued and handled once the current
//! event is done.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use super::backdrop::TransparentBackground;
use super::machine::{AlertAction, AlertEvent, AlertMachine, AlertPhase};
use crate::animation::AnimationState;
use crate::config::AlertConfig;
use crate::jobs::{self, TimerId};
use crate::layout::Size;
use crate::platform::{
    ContainerHandle, HeadlessPresenter, HeadlessScreen, ModalPresenter, ScreenMetrics, Transaction,
};
use crate::reactive::{mark_needs_layout, mark_needs_paint};

/// Vertical displacement that puts content of `content_height` fully below
/// the bottom edge of the screen.
///
/// Falls back to half the content height when the screen size is unknown.
pub fn offscreen_offset(content_height: f32, screen: Option<Size>) -> f32 {
    let screen_height = screen.map_or(0.0, |size| size.height);
    (content_height + screen_height) / 2.0
}

/// Point-in-time view of an alert, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertSnapshot {
    pub phase: AlertPhase,
    /// The native overlay is mounted.
    pub presented: bool,
    /// The content is (heading to) fully visible.
    pub animating: bool,
    /// Backdrop opacity in `0.0..=1.0`.
    pub backdrop_opacity: f32,
    /// Current vertical offset of the content; 0 when at rest on screen.
    pub content_offset: f32,
    /// Entrance animations started so far.
    pub entrances: usize,
}

pub struct AlertController {
    machine: AlertMachine,
    config: AlertConfig,
    presenter: Box<dyn ModalPresenter>,
    screen: Box<dyn ScreenMetrics>,
    container: Option<ContainerHandle>,
    opacity: AnimationState<f32>,
    offset: AnimationState<f32>,
    content_height: f32,
    pending_unmount: Option<TimerId>,
    on_dismiss: Rc<dyn Fn()>,
    entrances: usize,
    mounts: usize,
}

impl AlertController {
    pub fn new(config: AlertConfig) -> Self {
        let screen: Box<dyn ScreenMetrics> = Box::new(HeadlessScreen::unavailable());
        let offscreen = offscreen_offset(0.0, screen.screen_size());
        Self {
            machine: AlertMachine::new(),
            opacity: AnimationState::new(0.0, config.entrance.clone()),
            offset: AnimationState::new(offscreen, config.entrance.clone()),
            config,
            presenter: Box::new(HeadlessPresenter::new()),
            screen,
            container: None,
            content_height: 0.0,
            pending_unmount: None,
            on_dismiss: Rc::new(|| {}),
            entrances: 0,
            mounts: 0,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AlertConfig) {
        self.config = config;
    }

    pub fn set_presenter(&mut self, presenter: Box<dyn ModalPresenter>) {
        if self.machine.is_presented() {
            log::warn!("Ignoring presenter change while the alert is presented");
            return;
        }
        self.presenter = presenter;
    }

    pub fn set_screen(&mut self, screen: Box<dyn ScreenMetrics>) {
        self.screen = screen;
        if !self.offset.is_animating() && !self.machine.is_animating() {
            self.offset.set_immediate(self.offscreen());
        }
    }

    pub fn set_on_dismiss(&mut self, on_dismiss: Rc<dyn Fn()>) {
        self.on_dismiss = on_dismiss;
    }

    pub fn screen_size(&self) -> Option<Size> {
        self.screen.screen_size()
    }

    pub fn is_presented(&self) -> bool {
        self.machine.is_presented()
    }

    /// Number of times the overlay has been mounted. Changes once per show
    /// cycle, even when a show follows an unmount within the same event.
    pub fn mount_count(&self) -> usize {
        self.mounts
    }

    /// The mounted native container, if any.
    pub fn container(&self) -> Option<&ContainerHandle> {
        self.container.as_ref()
    }

    pub fn snapshot(&self) -> AlertSnapshot {
        AlertSnapshot {
            phase: self.machine.phase(),
            presented: self.machine.is_presented(),
            animating: self.machine.is_animating(),
            backdrop_opacity: self.opacity.current().clamp(0.0, 1.0),
            content_offset: *self.offset.current(),
            entrances: self.entrances,
        }
    }

    fn offscreen(&self) -> f32 {
        offscreen_offset(self.content_height, self.screen.screen_size())
    }

    fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
        // Content waiting for its entrance sits just below the screen
        if !self.machine.is_animating() && !self.offset.is_animating() {
            self.offset.set_immediate(self.offscreen());
        }
    }

    /// Step both animations. Returns whether either is still running and
    /// whether a running entrance just came to rest.
    fn advance_animations(&mut self) -> (bool, bool) {
        let opacity = self.opacity.advance();
        let offset = self.offset.advance();
        if opacity.is_changed() || offset.is_changed() {
            mark_needs_paint();
        }

        let running = self.opacity.is_animating() || self.offset.is_animating();
        let settled =
            self.machine.phase() == AlertPhase::Showing && self.machine.is_animating() && !running;
        (running, settled)
    }

    fn handle(&mut self, event: AlertEvent, cell: &Rc<ControllerCell>) {
        for action in self.machine.handle(event) {
            self.perform(action, cell);
        }
    }

    fn perform(&mut self, action: AlertAction, cell: &Rc<ControllerCell>) {
        match action {
            AlertAction::Mount => {
                let container = self.presenter.mount(&Transaction::instant());
                TransparentBackground::apply(&container, self.config.background_policy);
                self.container = Some(container);
                self.mounts += 1;
                self.opacity.set_immediate(0.0);
                self.offset.set_immediate(self.offscreen());
                mark_needs_layout();
            }
            AlertAction::AnimateIn => {
                self.entrances += 1;
                self.opacity.animate_with(1.0, self.config.entrance.clone());
                self.offset.animate_with(0.0, self.config.entrance.clone());
                mark_needs_paint();
            }
            AlertAction::AnimateOut => {
                let offscreen = self.offscreen();
                self.opacity.animate_with(0.0, self.config.exit.clone());
                self.offset.animate_with(offscreen, self.config.exit.clone());
                mark_needs_paint();
            }
            AlertAction::ScheduleUnmount { generation } => {
                self.cancel_unmount();
                let cell = Rc::downgrade(cell);
                let id = jobs::schedule_after(self.config.exit.total(), move || {
                    if let Some(cell) = cell.upgrade() {
                        cell.dispatch(AlertEvent::HideElapsed(generation));
                    }
                });
                self.pending_unmount = Some(id);
            }
            AlertAction::CancelUnmount => self.cancel_unmount(),
            AlertAction::Unmount => {
                self.pending_unmount = None;
                self.unmount(Rc::downgrade(cell));
            }
        }
    }

    fn cancel_unmount(&mut self) {
        if let Some(id) = self.pending_unmount.take() {
            jobs::cancel(id);
        }
    }

    fn unmount(&mut self, cell: Weak<ControllerCell>) {
        self.container = None;
        self.opacity.set_immediate(0.0);
        self.offset.set_immediate(self.offscreen());

        let on_dismiss = self.on_dismiss.clone();
        self.presenter.unmount(
            &Transaction::instant(),
            Box::new(move || match cell.upgrade() {
                Some(cell) => cell.defer(Box::new(move || on_dismiss())),
                None => on_dismiss(),
            }),
        );
        mark_needs_layout();
    }

    /// Tear down when the host view leaves the hierarchy.
    fn detach(&mut self, cell: &Rc<ControllerCell>) {
        self.cancel_unmount();
        if self.machine.is_presented() {
            log::debug!("Alert detached while presented, unmounting");
            self.machine = AlertMachine::new();
            self.unmount(Rc::downgrade(cell));
        }
    }
}

/// Shared home of an [`AlertController`] with a re-entrancy safe event queue.
pub(crate) struct ControllerCell {
    controller: RefCell<AlertController>,
    mailbox: RefCell<VecDeque<AlertEvent>>,
    deferred: RefCell<VecDeque<Box<dyn FnOnce()>>>,
    /// Last flag value reported to the machine.
    visibility: Cell<Option<bool>>,
}

impl ControllerCell {
    pub fn new(controller: AlertController) -> Rc<Self> {
        Rc::new(Self {
            controller: RefCell::new(controller),
            mailbox: RefCell::new(VecDeque::new()),
            deferred: RefCell::new(VecDeque::new()),
            visibility: Cell::new(None),
        })
    }

    /// Queue `event` and handle everything queued, unless an outer call is
    /// already doing so.
    pub fn dispatch(self: &Rc<Self>, event: AlertEvent) {
        self.mailbox.borrow_mut().push_back(event);
        self.drain();
    }

    /// Report the flag value if it differs from the last one reported.
    ///
    /// Called by the flag observer and once per frame, so writes made on
    /// another thread (which never reach this thread's observers) are picked
    /// up on the next frame.
    pub fn sync_visibility(self: &Rc<Self>, visible: bool) {
        if self.visibility.replace(Some(visible)) == Some(visible) {
            return;
        }
        self.dispatch(AlertEvent::VisibilityChanged(visible));
    }

    /// Record the laid-out content height, then report the layout.
    pub fn content_laid_out(self: &Rc<Self>, height: f32) {
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.set_content_height(height);
        }
        self.dispatch(AlertEvent::ContentLaidOut);
    }

    /// Advance animations; returns whether another frame is needed.
    pub fn advance(self: &Rc<Self>) -> bool {
        let (running, settled) = match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.advance_animations(),
            Err(_) => return true,
        };
        if settled {
            self.dispatch(AlertEvent::EntranceSettled);
        } else {
            self.drain();
        }
        running
    }

    pub fn detach(self: &Rc<Self>) {
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.detach(self);
        }
        self.run_deferred();
    }

    pub fn with<R>(&self, f: impl FnOnce(&AlertController) -> R) -> Option<R> {
        self.controller.try_borrow().ok().map(|controller| f(&controller))
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut AlertController) -> R) -> Option<R> {
        self.controller
            .try_borrow_mut()
            .ok()
            .map(|mut controller| f(&mut controller))
    }

    /// Run `f` once no event is being handled.
    fn defer(&self, f: Box<dyn FnOnce()>) {
        self.deferred.borrow_mut().push_back(f);
        let idle = self.controller.try_borrow_mut().is_ok();
        if idle {
            self.run_deferred();
        }
    }

    fn drain(self: &Rc<Self>) {
        loop {
            let handled = match self.controller.try_borrow_mut() {
                Ok(mut controller) => match self.next_event() {
                    Some(event) => {
                        controller.handle(event, self);
                        true
                    }
                    None => false,
                },
                // The active borrower picks the queue up when it finishes
                Err(_) => return,
            };
            self.run_deferred();
            if !handled && self.mailbox.borrow().is_empty() {
                return;
            }
        }
    }

    fn next_event(&self) -> Option<AlertEvent> {
        self.mailbox.borrow_mut().pop_front()
    }

    fn run_deferred(&self) {
        loop {
            let next = self.deferred.borrow_mut().pop_front();
            match next {
                Some(f) => f(),
                None => break,
            }
        }
    }
}
