use std::time::Instant;

use super::{Animatable, SpringState, TimingFunction, Transition};
use crate::jobs;

/// Distance from target (in normalized spring units) considered at rest.
const SETTLE_THRESHOLD: f32 = 0.001;

/// Result of advancing an animation, indicating whether the value changed
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceResult<T> {
    NoChange,
    Changed(T),
}

impl<T> AdvanceResult<T> {
    pub fn is_changed(&self) -> bool {
        matches!(self, AdvanceResult::Changed(_))
    }
}

/// A value that moves towards a target over time.
///
/// Time is read from [`jobs::now`], so animations follow whatever clock the
/// UI thread is using.
pub struct AnimationState<T: Animatable> {
    current: T,
    target: T,
    /// Value when the running animation started
    start: T,
    running: bool,
    start_time: Instant,
    transition: Transition,
    spring_state: Option<SpringState>,
}

impl<T: Animatable> AnimationState<T> {
    pub fn new(initial_value: T, transition: Transition) -> Self {
        Self {
            current: initial_value.clone(),
            target: initial_value.clone(),
            start: initial_value,
            running: false,
            start_time: jobs::now(),
            transition,
            spring_state: None,
        }
    }

    /// Start animating to a new target with the configured transition.
    pub fn animate_to(&mut self, new_target: T) {
        // Don't restart if we're already heading to this target
        if new_target == self.target {
            return;
        }
        self.restart(new_target);
    }

    /// Start animating to a new target with a different transition.
    pub fn animate_with(&mut self, new_target: T, transition: Transition) {
        self.transition = transition;
        if new_target == self.target && !self.running {
            return;
        }
        self.restart(new_target);
    }

    fn restart(&mut self, new_target: T) {
        self.start = self.current.clone();
        self.target = new_target;
        self.running = self.start != self.target;
        self.start_time = jobs::now();
        self.spring_state = match self.transition.timing {
            TimingFunction::Spring(_) => Some(SpringState::new()),
            _ => None,
        };
    }

    /// Advance the animation to the current time.
    pub fn advance(&mut self) -> AdvanceResult<T> {
        if !self.running {
            return AdvanceResult::NoChange;
        }

        let elapsed_ms = jobs::now()
            .saturating_duration_since(self.start_time)
            .as_secs_f32()
            * 1000.0;
        let active_ms = elapsed_ms - self.transition.delay_ms;
        if active_ms <= 0.0 {
            return AdvanceResult::NoChange;
        }

        let (eased_t, finished) = match (&mut self.spring_state, &self.transition.timing) {
            (Some(spring), TimingFunction::Spring(config)) => {
                let position = spring.step(active_ms / 1000.0, config);
                (position, spring.is_settled(SETTLE_THRESHOLD))
            }
            _ => {
                let duration = self.transition.duration_ms.max(f32::EPSILON);
                let t = (active_ms / duration).min(1.0);
                (self.transition.timing.evaluate(t), t >= 1.0)
            }
        };

        let new_value = if finished {
            self.running = false;
            self.target.clone()
        } else {
            T::lerp(&self.start, &self.target, eased_t)
        };

        if new_value == self.current {
            return AdvanceResult::NoChange;
        }
        self.current = new_value.clone();
        AdvanceResult::Changed(new_value)
    }

    pub fn is_animating(&self) -> bool {
        self.running
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Jump to `value` without animating.
    pub fn set_immediate(&mut self, value: T) {
        self.current = value.clone();
        self.target = value.clone();
        self.start = value;
        self.running = false;
        self.spring_state = None;
    }
}
