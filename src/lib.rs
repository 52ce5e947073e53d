pub mod alert;
pub mod animation;
pub mod config;
pub mod error;
pub mod jobs;
pub mod layout;
pub mod platform;
pub mod reactive;
pub mod widgets;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use calloop::EventLoop;
use calloop::ping::make_ping;

use layout::{Constraints, Size};
use reactive::{ChangeFlags, take_change_flags, take_frame_request};
use widgets::{PaintContext, Widget};

pub use alert::{Alert, AlertSnapshot, AlertView, Dismiss, ShowAlert};
pub use config::{AlertConfig, BackgroundPolicy};
pub use error::{AlertError, Result};

pub mod prelude {
    pub use crate::alert::{Alert, AlertPhase, AlertSnapshot, AlertView, Dismiss, ShowAlert};
    pub use crate::animation::{SpringConfig, TimingFunction, Transition};
    pub use crate::config::{AlertConfig, BackgroundPolicy};
    pub use crate::error::AlertError;
    pub use crate::layout::{Constraints, Size};
    pub use crate::platform::{
        HeadlessPresenter, HeadlessScreen, ModalContainer, ModalPresenter, ScreenMetrics,
        Transaction,
    };
    pub use crate::reactive::{
        Effect, ReadSignal, Signal, WriteSignal, batch, create_effect, create_signal,
    };
    pub use crate::widgets::{
        Color, DrawCommand, Event, EventResponse, Key, MouseButton, PaintContext, Rect, Widget,
    };
    pub use crate::{AlertLoop, QuitHandle};
}

/// A callback that gets called every loop iteration before jobs run.
/// Use this to process external events (like channel messages) and update signals.
pub type UpdateCallback = Box<dyn FnMut()>;

/// Stops a running [`AlertLoop`] at the start of its next iteration.
#[derive(Clone, Default)]
pub struct QuitHandle {
    quit: Rc<Cell<bool>>,
}

impl QuitHandle {
    pub fn quit(&self) {
        self.quit.set(true);
        reactive::request_frame();
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit.get()
    }
}

/// Drives a root widget: runs due jobs, advances animations, and lays out
/// and paints whenever something changed.
pub struct AlertLoop {
    frame_interval: Duration,
    on_update: Option<UpdateCallback>,
    quit: QuitHandle,
}

impl AlertLoop {
    pub fn new() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            on_update: None,
            quit: QuitHandle::default(),
        }
    }

    /// Time between frames while an animation is running.
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set a callback that gets called every loop iteration. While one is
    /// set the loop never sleeps longer than one frame interval, so the
    /// callback can poll external sources.
    ///
    /// # Example
    /// ```ignore
    /// let (tx, rx) = std::sync::mpsc::channel();
    /// let visible = create_signal(false);
    ///
    /// std::thread::spawn(move || {
    ///     std::thread::sleep(Duration::from_secs(1));
    ///     tx.send(true).ok();
    /// });
    ///
    /// AlertLoop::new()
    ///     .on_update(move || {
    ///         while let Ok(show) = rx.try_recv() {
    ///             visible.set(show);
    ///         }
    ///     })
    ///     .run(view, Size::new(390.0, 844.0), |_| {})?;
    /// ```
    pub fn on_update<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }

    /// Run until the [`QuitHandle`] is triggered. `on_frame` receives every
    /// painted frame.
    ///
    /// Reactive state and pending jobs of this thread are cleared when the
    /// loop ends.
    pub fn run<W: Widget>(
        mut self,
        mut root: W,
        viewport: Size,
        mut on_frame: impl FnMut(&PaintContext),
    ) -> Result<()> {
        let _ = env_logger::try_init();

        let result = self.drive(&mut root, viewport, &mut on_frame);

        // Dispose the tree before wiping the runtime it is registered in
        drop(root);
        reactive::reset_reactive();
        jobs::reset_jobs();
        result
    }

    fn drive<W: Widget>(
        &mut self,
        root: &mut W,
        viewport: Size,
        on_frame: &mut impl FnMut(&PaintContext),
    ) -> Result<()> {
        let mut event_loop: EventLoop<'_, ()> = EventLoop::try_new()?;
        let (ping, ping_source) = make_ping()?;
        event_loop
            .handle()
            .insert_source(ping_source, |_, _, _| {})
            .map_err(|err| AlertError::EventLoop(err.error))?;
        reactive::init_wakeup(ping);

        log::info!(
            "Alert loop running: viewport {}x{}, frame interval {:?}",
            viewport.width,
            viewport.height,
            self.frame_interval
        );

        let constraints = Constraints::loose(viewport);
        let mut paint_ctx = PaintContext::new();
        let mut frames: u64 = 0;

        loop {
            if let Some(ref mut callback) = self.on_update {
                callback();
            }
            if self.quit.is_quit_requested() {
                break;
            }

            take_frame_request();
            jobs::run_due_jobs();
            let animating = root.advance_animations();

            let mut flags = take_change_flags();
            if flags.contains(ChangeFlags::NEEDS_LAYOUT) {
                root.layout(constraints);
                // Layout may mount content or start an entrance
                flags |= take_change_flags();
            }
            if flags.contains(ChangeFlags::NEEDS_PAINT) {
                paint_ctx.clear();
                root.paint(&mut paint_ctx);
                on_frame(&paint_ctx);
                frames += 1;
            }

            let timeout = self.next_timeout(animating);
            event_loop.dispatch(timeout, &mut ())?;
        }

        log::info!("Alert loop stopped after {} frames", frames);
        Ok(())
    }

    /// How long to sleep before the next iteration; `None` waits for a ping.
    fn next_timeout(&self, animating: bool) -> Option<Duration> {
        let until_job = jobs::next_deadline()
            .map(|deadline| deadline.saturating_duration_since(jobs::now()));

        if animating {
            return Some(until_job.map_or(self.frame_interval, |d| d.min(self.frame_interval)));
        }
        if take_frame_request() {
            return Some(Duration::ZERO);
        }
        match (until_job, self.on_update.is_some()) {
            (Some(d), true) => Some(d.min(self.frame_interval)),
            (None, true) => Some(self.frame_interval),
            (until_job, false) => until_job,
        }
    }
}

impl Default for AlertLoop {
    fn default() -> Self {
        Self::new()
    }
}
