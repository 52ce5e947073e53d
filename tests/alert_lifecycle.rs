use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use guido_alert::alert::offscreen_offset;
use guido_alert::jobs::{self, ManualClock};
use guido_alert::platform::headless::SYSTEM_BACKGROUND;
use guido_alert::prelude::*;

const VIEWPORT: Size = Size::new(400.0, 800.0);

/// Alert content with a fixed height that closes itself on Escape.
struct Card {
    height: f32,
    dismiss: Option<Dismiss>,
}

impl Card {
    fn new(height: f32) -> Self {
        Self {
            height,
            dismiss: None,
        }
    }
}

impl Widget for Card {
    fn layout(&mut self, constraints: Constraints) -> Size {
        constraints.constrain(Size::new(constraints.max_width, self.height))
    }

    fn paint(&self, ctx: &mut PaintContext) {
        ctx.fill_rect(Rect::new(0.0, 0.0, 10.0, self.height), Color::WHITE);
    }

    fn event(&mut self, event: &Event) -> EventResponse {
        match (event, &self.dismiss) {
            (Event::KeyDown { key: Key::Escape }, Some(dismiss)) => {
                dismiss.dismiss();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }
}

impl AlertView for Card {
    fn on_dismiss(mut self, dismiss: Dismiss) -> Self {
        self.dismiss = Some(dismiss);
        self
    }
}

/// The view the alert is attached to. Counts the events that reach it.
#[derive(Default)]
struct Page {
    events: Rc<Cell<usize>>,
}

impl Widget for Page {
    fn layout(&mut self, constraints: Constraints) -> Size {
        constraints.max_size()
    }

    fn paint(&self, ctx: &mut PaintContext) {
        ctx.fill_rect(Rect::from_size(VIEWPORT), Color::rgb(0.2, 0.2, 0.3));
    }

    fn event(&mut self, _event: &Event) -> EventResponse {
        self.events.set(self.events.get() + 1);
        EventResponse::Handled
    }
}

/// One loop iteration: jobs, animations, layout, paint.
fn frame(root: &mut impl Widget) -> PaintContext {
    jobs::run_due_jobs();
    root.advance_animations();
    root.layout(Constraints::loose(VIEWPORT));
    let mut ctx = PaintContext::new();
    root.paint(&mut ctx);
    ctx
}

fn run_for(clock: &ManualClock, root: &mut impl Widget, ms: u64) {
    let frames = ms / 16;
    for _ in 0..frames {
        clock.advance(Duration::from_millis(16));
        frame(root);
    }
}

fn counter() -> (Rc<Cell<usize>>, impl Fn() + 'static) {
    let count = Rc::new(Cell::new(0));
    let inner = count.clone();
    (count, move || inner.set(inner.get() + 1))
}

fn snapshot<W: Widget, C: AlertView, F: FnMut() -> C>(alert: &Alert<W, C, F>) -> AlertSnapshot {
    alert.snapshot().expect("controller is idle between frames")
}

#[test]
fn test_show_and_hide_timeline() {
    let clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let (dismissed, on_dismiss) = counter();

    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(300.0))
        .presenter(presenter.clone())
        .screen(HeadlessScreen::new(VIEWPORT.width, VIEWPORT.height))
        .on_dismiss(on_dismiss);
    frame(&mut alert);
    assert!(!snapshot(&alert).presented);
    assert!(!presenter.is_mounted());

    // Presentation follows the flag synchronously
    visible.set(true);
    let snap = snapshot(&alert);
    assert!(snap.presented);
    assert!(!snap.animating);
    assert!(presenter.is_mounted());

    // Entrance starts once the content has been laid out
    frame(&mut alert);
    let snap = snapshot(&alert);
    assert!(snap.animating);
    assert_eq!(snap.phase, AlertPhase::Showing);
    assert_eq!(snap.content_offset, 550.0);

    run_for(&clock, &mut alert, 2000);
    let snap = snapshot(&alert);
    assert_eq!(snap.phase, AlertPhase::Shown);
    assert!(snap.content_offset.abs() < 0.5, "offset {}", snap.content_offset);
    assert!((snap.backdrop_opacity - 1.0).abs() < 1e-3);

    // Hiding clears the animation state right away but keeps the overlay
    visible.set(false);
    let snap = snapshot(&alert);
    assert!(!snap.animating);
    assert!(snap.presented);
    assert_eq!(snap.phase, AlertPhase::Hiding);

    clock.advance(Duration::from_millis(449));
    frame(&mut alert);
    assert!(snapshot(&alert).presented);
    assert!(alert.content().is_some());
    assert_eq!(dismissed.get(), 0);

    clock.advance(Duration::from_millis(1));
    frame(&mut alert);
    let snap = snapshot(&alert);
    assert!(!snap.presented);
    assert_eq!(snap.phase, AlertPhase::Hidden);
    assert!(!presenter.is_mounted());
    assert!(alert.content().is_none());
    assert_eq!(dismissed.get(), 1);

    run_for(&clock, &mut alert, 1000);
    assert_eq!(dismissed.get(), 1);
}

#[test]
fn test_content_dismisses_itself() {
    let clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let (dismissed, on_dismiss) = counter();

    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(200.0))
        .presenter(presenter.clone())
        .on_dismiss(on_dismiss);
    visible.set(true);
    frame(&mut alert);
    run_for(&clock, &mut alert, 500);

    let response = alert.event(&Event::KeyDown { key: Key::Escape });
    assert_eq!(response, EventResponse::Handled);
    assert!(!visible.get_untracked());
    assert_eq!(snapshot(&alert).phase, AlertPhase::Hiding);

    run_for(&clock, &mut alert, 480);
    assert!(!snapshot(&alert).presented);
    assert_eq!(dismissed.get(), 1);
    assert_eq!(presenter.completed_unmounts(), 1);
}

#[test]
fn test_overlay_is_modal() {
    let clock = jobs::install_manual_clock();
    let visible = create_signal(false);
    let page = Page::default();
    let page_events = page.events.clone();

    let mut alert = page.show_alert(visible.clone(), || Card::new(200.0));
    frame(&mut alert);
    alert.event(&Event::MouseMove { x: 10.0, y: 10.0 });
    assert_eq!(page_events.get(), 1);

    visible.set(true);
    frame(&mut alert);
    run_for(&clock, &mut alert, 100);
    alert.event(&Event::MouseMove { x: 10.0, y: 10.0 });
    assert_eq!(page_events.get(), 1);
}

#[test]
fn test_offscreen_offset_without_screen() {
    let _clock = jobs::install_manual_clock();
    let visible = create_signal(false);
    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(300.0))
        .presenter(HeadlessPresenter::new())
        .screen(HeadlessScreen::unavailable());

    visible.set(true);
    frame(&mut alert);
    assert_eq!(snapshot(&alert).content_offset, 150.0);
    assert_eq!(offscreen_offset(300.0, None), 150.0);
}

#[test]
fn test_rapid_toggle_keeps_reshow_mounted() {
    let clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let (dismissed, on_dismiss) = counter();

    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(300.0))
        .presenter(presenter.clone())
        .screen(HeadlessScreen::new(VIEWPORT.width, VIEWPORT.height))
        .on_dismiss(on_dismiss);

    visible.set(true);
    frame(&mut alert);
    run_for(&clock, &mut alert, 96);

    visible.set(false);
    run_for(&clock, &mut alert, 192);
    visible.set(true);

    // Well past the first hide's unmount deadline
    run_for(&clock, &mut alert, 2000);
    let snap = snapshot(&alert);
    assert!(snap.presented);
    assert_eq!(snap.phase, AlertPhase::Shown);
    assert_eq!(snap.entrances, 2);
    assert_eq!(presenter.mount_count(), 1);
    assert_eq!(presenter.unmount_count(), 0);
    assert_eq!(presenter.max_concurrent_mounts(), 1);
    assert_eq!(dismissed.get(), 0);
}

#[test]
fn test_presentation_never_uses_host_transition() {
    let clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(120.0))
        .presenter(presenter.clone());

    for _ in 0..3 {
        visible.set(true);
        frame(&mut alert);
        run_for(&clock, &mut alert, 800);
        visible.set(false);
        run_for(&clock, &mut alert, 800);
    }

    let transactions = presenter.transactions();
    assert_eq!(transactions.len(), 6);
    assert!(transactions.iter().all(|t| t.disables_animations));
    assert_eq!(presenter.max_concurrent_mounts(), 1);
}

#[test]
fn test_entrance_runs_once_per_show() {
    let _clock = jobs::install_manual_clock();
    let visible = create_signal(false);
    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(200.0))
        .presenter(HeadlessPresenter::new());

    visible.set(true);
    for _ in 0..5 {
        frame(&mut alert);
    }
    assert_eq!(snapshot(&alert).entrances, 1);
}

#[test]
fn test_flag_set_before_attach_presents_on_first_frame() {
    let _clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(true);
    let mut alert = Page::default()
        .show_alert(visible, || Card::new(200.0))
        .presenter(presenter.clone());

    assert!(!presenter.is_mounted());
    frame(&mut alert);
    let snap = snapshot(&alert);
    assert!(snap.presented);
    assert!(snap.animating);
    assert_eq!(presenter.mount_count(), 1);
}

#[test]
fn test_flag_written_from_another_thread() {
    let clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(200.0))
        .presenter(presenter.clone());
    frame(&mut alert);

    let remote = visible.clone();
    std::thread::spawn(move || remote.set(true))
        .join()
        .expect("writer thread");
    assert!(!presenter.is_mounted());

    // The next frame picks the write up
    frame(&mut alert);
    assert!(snapshot(&alert).presented);
    assert!(alert.content().is_some());
    assert_eq!(presenter.mount_count(), 1);

    run_for(&clock, &mut alert, 1000);
    let remote = visible.clone();
    std::thread::spawn(move || remote.set(false))
        .join()
        .expect("writer thread");
    frame(&mut alert);
    assert_eq!(snapshot(&alert).phase, AlertPhase::Hiding);

    run_for(&clock, &mut alert, 500);
    assert!(!presenter.is_mounted());
    assert_eq!(presenter.unmount_count(), 1);
    assert!(alert.content().is_none());
}

#[test]
fn test_content_built_once_per_show() {
    let clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let builds = Rc::new(Cell::new(0usize));
    let build_count = builds.clone();
    // Show again as soon as the first show has been dismissed, before any
    // layout pass runs in between
    let reshow = visible.clone();
    let reshown = Cell::new(false);
    let mut alert = Page::default()
        .show_alert(visible.clone(), move || {
            build_count.set(build_count.get() + 1);
            Card::new(200.0)
        })
        .presenter(presenter.clone())
        .on_dismiss(move || {
            if !reshown.replace(true) {
                reshow.set(true);
            }
        });

    visible.set(true);
    frame(&mut alert);
    run_for(&clock, &mut alert, 1000);
    assert_eq!(builds.get(), 1);

    visible.set(false);
    run_for(&clock, &mut alert, 500);

    assert!(snapshot(&alert).presented);
    assert_eq!(presenter.mount_count(), 2);
    assert_eq!(builds.get(), presenter.mount_count());
}

#[test]
fn test_background_cleared_after_late_styling() {
    let _clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(200.0))
        .presenter(presenter.clone());

    visible.set(true);
    frame(&mut alert);
    frame(&mut alert);
    assert_eq!(presenter.container_background(), Some(Color::TRANSPARENT));
}

#[test]
fn test_immediate_policy_leaves_late_styling() {
    let _clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(200.0))
        .presenter(presenter.clone())
        .with_config(AlertConfig::default().background_policy(BackgroundPolicy::Immediate))
        .unwrap();

    visible.set(true);
    frame(&mut alert);
    // The host restyles on the iteration after the mount
    frame(&mut alert);
    assert_eq!(presenter.container_background(), Some(SYSTEM_BACKGROUND));
}

#[test]
fn test_with_config_rejects_invalid_config() {
    let visible = create_signal(false);
    let result = Page::default()
        .show_alert(visible, || Card::new(200.0))
        .with_config(AlertConfig::default().horizontal_padding(-4.0));
    assert!(matches!(result, Err(AlertError::InvalidConfig(_))));
}

#[test]
fn test_paints_backdrop_and_centred_content() {
    let clock = jobs::install_manual_clock();
    let visible = create_signal(false);
    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(300.0))
        .presenter(HeadlessPresenter::new())
        .screen(HeadlessScreen::new(VIEWPORT.width, VIEWPORT.height));

    visible.set(true);
    frame(&mut alert);
    run_for(&clock, &mut alert, 2000);
    let ctx = frame(&mut alert);

    let commands = ctx.commands();
    let overlay = commands
        .iter()
        .position(|c| *c == DrawCommand::BeginOverlay)
        .expect("overlay layer");
    assert_eq!(
        commands[overlay + 1],
        DrawCommand::Rect {
            rect: Rect::from_size(VIEWPORT),
            color: Color::rgba(0.0, 0.0, 0.0, 0.5),
        }
    );
    // Content is inset by the horizontal padding and centred vertically
    assert_eq!(
        commands[overlay + 2],
        DrawCommand::PushTranslation {
            dx: 16.0,
            dy: 250.0
        }
    );
    assert_eq!(commands.last(), Some(&DrawCommand::EndOverlay));
}

#[test]
fn test_drop_unmounts_presented_alert() {
    let _clock = jobs::install_manual_clock();
    let presenter = HeadlessPresenter::new();
    let visible = create_signal(false);
    let (dismissed, on_dismiss) = counter();
    let mut alert = Page::default()
        .show_alert(visible.clone(), || Card::new(200.0))
        .presenter(presenter.clone())
        .on_dismiss(on_dismiss);

    visible.set(true);
    frame(&mut alert);
    drop(alert);

    assert!(!presenter.is_mounted());
    assert_eq!(dismissed.get(), 1);

    // The flag is no longer observed
    visible.set(false);
    visible.set(true);
    assert_eq!(presenter.mount_count(), 1);
}
