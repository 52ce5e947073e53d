use std::rc::Rc;

use super::controller::{AlertController, AlertSnapshot, ControllerCell};
use super::{AlertView, Dismiss};
use crate::config::AlertConfig;
use crate::error::Result;
use crate::layout::{Constraints, Size};
use crate::platform::{ModalPresenter, ScreenMetrics};
use crate::reactive::{
    OwnerId, Signal, create_effect, dispose_owner, mark_needs_layout, on_cleanup, with_owner,
};
use crate::widgets::{Event, EventResponse, PaintContext, Rect, Widget};

/// A view with a modal alert attached, created by
/// [`ShowAlert::show_alert`](super::ShowAlert::show_alert).
///
/// The wrapped view is laid out, painted and fed input as usual. While the
/// alert is presented its content is painted above everything else on a
/// full-screen backdrop and receives all input.
pub struct Alert<W, C, F> {
    base: W,
    build: F,
    content: Option<C>,
    /// Mount the current content was built for.
    content_mount: usize,
    content_size: Size,
    viewport: Size,
    is_presented: Signal<bool>,
    controller: Rc<ControllerCell>,
    owner: Option<OwnerId>,
}

impl<W, C, F> Alert<W, C, F>
where
    W: Widget,
    C: AlertView,
    F: FnMut() -> C,
{
    pub(crate) fn new(base: W, is_presented: Signal<bool>, build: F) -> Self {
        Self {
            base,
            build,
            content: None,
            content_mount: 0,
            content_size: Size::zero(),
            viewport: Size::zero(),
            is_presented,
            controller: ControllerCell::new(AlertController::new(AlertConfig::default())),
            owner: None,
        }
    }

    /// Called once the overlay has been fully unmounted after a hide.
    pub fn on_dismiss(self, f: impl Fn() + 'static) -> Self {
        self.controller.with_mut(|c| c.set_on_dismiss(Rc::new(f)));
        self
    }

    /// The host's full-screen presentation primitive.
    pub fn presenter(self, presenter: impl ModalPresenter + 'static) -> Self {
        self.controller.with_mut(|c| c.set_presenter(Box::new(presenter)));
        self
    }

    pub fn screen(self, screen: impl ScreenMetrics + 'static) -> Self {
        self.controller.with_mut(|c| c.set_screen(Box::new(screen)));
        self
    }

    pub fn with_config(self, config: AlertConfig) -> Result<Self> {
        config.validate()?;
        self.controller.with_mut(|c| c.set_config(config));
        Ok(self)
    }

    pub fn snapshot(&self) -> Option<AlertSnapshot> {
        self.controller.with(|c| c.snapshot())
    }

    /// The wrapped view.
    pub fn base(&self) -> &W {
        &self.base
    }

    /// The alert content, while the overlay is mounted.
    pub fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    /// Start observing the visibility flag. The effect runs immediately, so
    /// a flag that is already set presents right away.
    fn attach(&mut self) {
        if self.owner.is_some() {
            return;
        }

        let flag = self.is_presented.clone();
        let controller = Rc::downgrade(&self.controller);
        let detach = controller.clone();
        let ((), owner) = with_owner(move || {
            let _ = create_effect(move || {
                let visible = flag.get();
                if let Some(controller) = controller.upgrade() {
                    controller.sync_visibility(visible);
                }
            });
            on_cleanup(move || {
                if let Some(controller) = detach.upgrade() {
                    controller.detach();
                }
            });
        });
        self.owner = Some(owner);
        log::debug!("Alert attached");
    }

    /// Pick up flag writes the observer could not see, such as writes made on
    /// another thread.
    fn sync_visibility(&self) {
        self.controller
            .sync_visibility(self.is_presented.get_untracked());
    }

    /// Build fresh content for every mount, drop it once unmounted.
    fn sync_content(&mut self) {
        let (presented, mount) = self
            .controller
            .with(|c| (c.is_presented(), c.mount_count()))
            .unwrap_or((false, self.content_mount));
        match (presented, self.content.is_some()) {
            (true, has_content) if !has_content || mount != self.content_mount => {
                let flag = self.is_presented.clone();
                let dismiss = Dismiss::new(move || flag.set(false));
                self.content = Some((self.build)().on_dismiss(dismiss));
                self.content_mount = mount;
                self.content_size = Size::zero();
            }
            (false, true) => {
                self.content = None;
                self.content_size = Size::zero();
                mark_needs_layout();
            }
            _ => {}
        }
    }

    fn padding(&self) -> f32 {
        self.controller
            .with(|c| c.config().horizontal_padding)
            .unwrap_or_default()
    }

    /// Top-left corner of the content at rest, centred in the viewport.
    fn content_origin(&self) -> (f32, f32) {
        (
            ((self.viewport.width - self.content_size.width) / 2.0).max(0.0),
            ((self.viewport.height - self.content_size.height) / 2.0).max(0.0),
        )
    }
}

impl<W, C, F> Widget for Alert<W, C, F>
where
    W: Widget,
    C: AlertView,
    F: FnMut() -> C,
{
    fn advance_animations(&mut self) -> bool {
        self.attach();
        self.sync_visibility();
        let base = self.base.advance_animations();
        let content = self
            .content
            .as_mut()
            .is_some_and(|content| content.advance_animations());
        let overlay = self.controller.advance();
        base || content || overlay
    }

    fn layout(&mut self, constraints: Constraints) -> Size {
        self.attach();
        self.sync_visibility();
        let size = self.base.layout(constraints);

        self.sync_content();
        self.viewport = self
            .controller
            .with(|c| c.screen_size())
            .flatten()
            .unwrap_or(size);

        let padding = self.padding();
        if let Some(content) = self.content.as_mut() {
            let content_constraints = Constraints::loose(self.viewport).inset_horizontal(padding);
            self.content_size = content.layout(content_constraints);
            self.controller.content_laid_out(self.content_size.height);
        }
        size
    }

    fn paint(&self, ctx: &mut PaintContext) {
        self.base.paint(ctx);

        let Some(content) = self.content.as_ref() else {
            return;
        };
        let Some((snapshot, backdrop)) = self
            .controller
            .with(|c| (c.snapshot(), c.config().backdrop_color))
        else {
            return;
        };
        if !snapshot.presented {
            return;
        }

        let (x, y) = self.content_origin();
        ctx.overlay(|ctx| {
            ctx.fill_rect(
                Rect::from_size(self.viewport),
                backdrop.with_opacity(snapshot.backdrop_opacity),
            );
            ctx.translated(x, y + snapshot.content_offset, |ctx| content.paint(ctx));
        });
    }

    fn event(&mut self, event: &Event) -> EventResponse {
        if self.content.is_none() {
            return self.base.event(event);
        }

        let offset = self
            .controller
            .with(|c| c.snapshot().content_offset)
            .unwrap_or_default();
        let (x, y) = self.content_origin();
        if let Some(content) = self.content.as_mut() {
            content.event(&event.translated(x, y + offset));
        }
        // The overlay is modal
        EventResponse::Handled
    }
}

impl<W, C, F> Drop for Alert<W, C, F> {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.take() {
            dispose_owner(owner);
        }
    }
}
