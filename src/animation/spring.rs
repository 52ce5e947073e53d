use std::f32::consts::PI;

/// Configuration for spring physics animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Mass of the spring (default: 1.0)
    pub mass: f32,
    /// Stiffness of the spring
    pub stiffness: f32,
    /// Damping coefficient
    pub damping: f32,
}

impl SpringConfig {
    /// Build a spring from a perceptual duration (seconds) and a bounce.
    ///
    /// `bounce` of 0 is critically damped (no overshoot); positive values
    /// overshoot more the closer they get to 1. Negative bounces are treated
    /// as 0.
    pub fn from_duration(duration_secs: f32, bounce: f32) -> Self {
        let mass = 1.0;
        let duration = duration_secs.max(f32::EPSILON);
        let bounce = bounce.clamp(0.0, 0.99);
        let omega = 2.0 * PI / duration;
        Self {
            mass,
            stiffness: omega * omega * mass,
            damping: 4.0 * PI * mass * (1.0 - bounce) / duration,
        }
    }

    /// Damping ratio: below 1.0 the spring overshoots its target.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

/// State for spring physics simulation
#[derive(Clone, Debug, Default)]
pub struct SpringState {
    /// Current position (0.0 = start, 1.0 = target)
    pub position: f32,
    /// Current velocity
    pub velocity: f32,
    /// Last evaluation time
    pub last_t: f32,
}

/// Largest integration step, for numerical stability (~30fps minimum)
const MAX_STEP: f32 = 1.0 / 30.0;

impl SpringState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step the simulation to `elapsed_secs` since the animation started.
    ///
    /// Long gaps between frames are integrated in several sub-steps so a
    /// stalled frame does not freeze or explode the spring.
    /// Returns the current position (can overshoot 1.0).
    pub fn step(&mut self, elapsed_secs: f32, config: &SpringConfig) -> f32 {
        let mut remaining = (elapsed_secs - self.last_t).max(0.0);
        self.last_t = self.last_t.max(elapsed_secs);

        while remaining > 1e-6 {
            let dt = remaining.min(MAX_STEP);
            remaining -= dt;

            let displacement = self.position - 1.0;
            let force = -config.stiffness * displacement - config.damping * self.velocity;
            let acceleration = force / config.mass;

            // Semi-implicit Euler
            self.velocity += acceleration * dt;
            self.position += self.velocity * dt;
        }

        self.position
    }

    /// Check if the spring has settled (position near target, velocity near zero)
    pub fn is_settled(&self, threshold: f32) -> bool {
        (self.position - 1.0).abs() < threshold && self.velocity.abs() < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate(config: &SpringConfig, secs: f32) -> (f32, f32) {
        let mut state = SpringState::new();
        let mut max_position: f32 = 0.0;
        let frames = (secs * 60.0) as usize;
        for i in 1..=frames {
            let pos = state.step(i as f32 / 60.0, config);
            max_position = max_position.max(pos);
        }
        (state.position, max_position)
    }

    #[test]
    fn test_bouncy_spring_overshoots_and_settles() {
        let config = SpringConfig::from_duration(0.4, 0.35);
        assert!(config.damping_ratio() < 1.0);

        let (position, max_position) = simulate(&config, 2.0);
        assert!(max_position > 1.0, "expected overshoot, max was {}", max_position);
        assert!((position - 1.0).abs() < 0.01, "got {}", position);
    }

    #[test]
    fn test_zero_bounce_never_overshoots() {
        let config = SpringConfig::from_duration(0.45, 0.0);
        assert!((config.damping_ratio() - 1.0).abs() < 1e-3);

        let (_, max_position) = simulate(&config, 2.0);
        assert!(max_position <= 1.0 + 1e-3, "max was {}", max_position);
    }

    #[test]
    fn test_large_gap_is_substepped() {
        let config = SpringConfig::from_duration(0.4, 0.0);
        let mut state = SpringState::new();
        let position = state.step(3.0, &config);
        assert!((position - 1.0).abs() < 0.01, "got {}", position);
        assert!(state.is_settled(0.01));
    }
}
