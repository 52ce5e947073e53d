//! The show/hide state machine.
//!
//! ```text
//!            show               content laid out          settled
//!  Hidden ─────────▶ Showing ─────────────────────▶ (animating) ─────▶ Shown
//!    ▲                  │                                               │
//!    │ unmount timer    │ hide                                     hide │
//!    └───────────── Hiding ◀────────────────────────────────────────────┘
//!                      │ show (supersedes the pending unmount)
//!                      └──────────▶ Showing
//! ```
//!
//! The machine only decides; [`AlertAction`]s are carried out by the
//! controller.

/// Lifecycle phase of one alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPhase {
    /// Nothing mounted.
    Hidden,
    /// Mounted, entrance pending or running.
    Showing,
    /// Mounted and at rest.
    Shown,
    /// Exit running, unmount scheduled.
    Hiding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEvent {
    /// The visibility flag now holds this value.
    VisibilityChanged(bool),
    /// The mounted content finished a layout pass.
    ContentLaidOut,
    /// The entrance animation came to rest.
    EntranceSettled,
    /// The unmount delay scheduled for this hide generation elapsed.
    HideElapsed(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    /// Mount the native overlay (animation suppressed).
    Mount,
    /// Start the entrance: opacity to full, offset to zero.
    AnimateIn,
    /// Start the exit: opacity to zero, offset below the screen.
    AnimateOut,
    /// Arm the unmount timer for `generation`.
    ScheduleUnmount { generation: u64 },
    /// Disarm the pending unmount timer.
    CancelUnmount,
    /// Unmount the native overlay (animation suppressed).
    Unmount,
}

/// Presentation and animation state of one alert.
///
/// Invariant: `animating` implies `presented`.
#[derive(Debug, Clone)]
pub struct AlertMachine {
    phase: AlertPhase,
    presented: bool,
    animating: bool,
    laid_out: bool,
    generation: u64,
}

impl Default for AlertMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertMachine {
    pub fn new() -> Self {
        Self {
            phase: AlertPhase::Hidden,
            presented: false,
            animating: false,
            laid_out: false,
            generation: 0,
        }
    }

    pub fn phase(&self) -> AlertPhase {
        self.phase
    }

    /// Whether the native overlay is mounted.
    pub fn is_presented(&self) -> bool {
        self.presented
    }

    /// Whether the content is (heading to) fully visible at rest.
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn handle(&mut self, event: AlertEvent) -> Vec<AlertAction> {
        use AlertAction::*;
        use AlertPhase::*;

        let actions = match (self.phase, event) {
            (Hidden, AlertEvent::VisibilityChanged(true)) => {
                self.presented = true;
                self.laid_out = false;
                self.phase = Showing;
                vec![Mount]
            }
            (Showing, AlertEvent::ContentLaidOut) => {
                self.laid_out = true;
                self.enter()
            }
            (Showing, AlertEvent::EntranceSettled) if self.animating => {
                self.phase = Shown;
                vec![]
            }
            (Showing | Shown, AlertEvent::VisibilityChanged(false)) => {
                self.animating = false;
                self.phase = Hiding;
                self.generation += 1;
                vec![
                    AnimateOut,
                    ScheduleUnmount {
                        generation: self.generation,
                    },
                ]
            }
            (Hiding, AlertEvent::ContentLaidOut) => {
                // Remember it for a re-show, but never animate in while hiding
                self.laid_out = true;
                vec![]
            }
            (Hiding, AlertEvent::VisibilityChanged(true)) => {
                self.generation += 1;
                self.phase = Showing;
                let mut actions = vec![CancelUnmount];
                if self.laid_out {
                    actions.extend(self.enter());
                }
                actions
            }
            (Hiding, AlertEvent::HideElapsed(generation)) if generation == self.generation => {
                self.presented = false;
                self.laid_out = false;
                self.phase = Hidden;
                vec![Unmount]
            }
            _ => vec![],
        };

        debug_assert!(!self.animating || self.presented);
        if !actions.is_empty() {
            log::debug!("Alert {:?} -> {:?}, actions {:?}", event, self.phase, actions);
        }
        actions
    }

    /// Trigger the entrance exactly once per show cycle.
    fn enter(&mut self) -> Vec<AlertAction> {
        if self.animating || !self.presented {
            return vec![];
        }
        self.animating = true;
        vec![AlertAction::AnimateIn]
    }
}
