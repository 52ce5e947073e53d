//! Shows an alert, lets it sit for a moment, dismisses it from inside the
//! content and exits once the overlay is gone.
//!
//! Run with `RUST_LOG=debug cargo run --example alert_demo` to follow the
//! state transitions.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use guido_alert::prelude::*;

const SCREEN: Size = Size::new(390.0, 844.0);

struct Screen;

impl Widget for Screen {
    fn layout(&mut self, constraints: Constraints) -> Size {
        constraints.max_size()
    }

    fn paint(&self, ctx: &mut PaintContext) {
        ctx.fill_rect(Rect::from_size(SCREEN), Color::rgb(0.1, 0.1, 0.15));
    }
}

struct ConfirmDialog {
    dismiss: Option<Dismiss>,
}

impl Widget for ConfirmDialog {
    fn layout(&mut self, constraints: Constraints) -> Size {
        constraints.constrain(Size::new(constraints.max_width, 180.0))
    }

    fn paint(&self, ctx: &mut PaintContext) {
        ctx.fill_rect(Rect::new(0.0, 0.0, SCREEN.width - 32.0, 180.0), Color::WHITE);
    }

    fn event(&mut self, event: &Event) -> EventResponse {
        match (event, &self.dismiss) {
            (Event::KeyDown { key: Key::Enter }, Some(dismiss)) => {
                log::info!("Confirmed");
                dismiss.dismiss();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }
}

impl AlertView for ConfirmDialog {
    fn on_dismiss(mut self, dismiss: Dismiss) -> Self {
        self.dismiss = Some(dismiss);
        self
    }
}

fn main() -> Result<(), AlertError> {
    env_logger::init();

    let visible = create_signal(false);
    let presenter = HeadlessPresenter::new();
    let dismissed = Rc::new(Cell::new(false));

    let on_dismiss = {
        let dismissed = dismissed.clone();
        move || {
            log::info!("Alert dismissed");
            dismissed.set(true);
        }
    };
    let view = Screen
        .show_alert(visible.clone(), || ConfirmDialog { dismiss: None })
        .presenter(presenter.clone())
        .screen(HeadlessScreen::new(SCREEN.width, SCREEN.height))
        .on_dismiss(on_dismiss);

    // Simulate the user pressing Enter a second after the alert appears
    let pending_key = Rc::new(Cell::new(false));
    let app_loop = AlertLoop::new();
    let quit = app_loop.quit_handle();
    let started = Instant::now();
    let key_flag = pending_key.clone();
    let app_loop = app_loop.on_update(move || {
        let elapsed = started.elapsed();
        if elapsed >= Duration::from_millis(200) && !visible.get_untracked() && !dismissed.get() {
            visible.set(true);
        }
        if elapsed >= Duration::from_millis(1200) && visible.get_untracked() {
            key_flag.set(true);
        }
        if dismissed.get() {
            quit.quit();
        }
    });

    let root = KeyInjector {
        inner: view,
        pending: pending_key,
    };
    let mut frames = 0usize;
    app_loop.run(root, SCREEN, |ctx| {
        frames += 1;
        log::trace!("Frame {} with {} draw commands", frames, ctx.commands().len());
    })?;

    log::info!(
        "Done: {} frames, {} mount(s), {} unmount(s)",
        frames,
        presenter.mount_count(),
        presenter.unmount_count()
    );
    Ok(())
}

/// Forwards to the real view and delivers a queued Enter key press.
struct KeyInjector<W> {
    inner: W,
    pending: Rc<Cell<bool>>,
}

impl<W: Widget> Widget for KeyInjector<W> {
    fn advance_animations(&mut self) -> bool {
        if self.pending.replace(false) {
            self.inner.event(&Event::KeyDown { key: Key::Enter });
        }
        self.inner.advance_animations()
    }

    fn layout(&mut self, constraints: Constraints) -> Size {
        self.inner.layout(constraints)
    }

    fn paint(&self, ctx: &mut PaintContext) {
        self.inner.paint(ctx)
    }

    fn event(&mut self, event: &Event) -> EventResponse {
        self.inner.event(event)
    }
}
