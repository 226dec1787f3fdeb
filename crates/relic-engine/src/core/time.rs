//! The simulation clock and the fixed-step pacing behind [`Engine::advance`].
//!
//! [`Engine::advance`]: crate::api::game::Engine::advance

/// Simulation clock handed to every system each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Seconds covered by this tick.
    pub delta: f32,
    /// Seconds since the simulation started.
    pub elapsed: f32,
}

impl Time {
    pub fn step(&mut self, dt: f32) {
        self.delta = dt;
        self.elapsed += dt;
    }

    /// This tick's delta in milliseconds. Keyframe lengths are stored in ms.
    pub fn delta_ms(&self) -> f32 {
        self.delta * 1000.0
    }
}

/// A long stall (loading hitch, backgrounded tab) must not snowball into
/// an unbounded catch-up burst; the backlog never holds more than this
/// many ticks.
const MAX_BACKLOG_TICKS: f32 = 10.0;

/// Converts variable render-frame deltas into whole simulation ticks.
/// Scripts and physics always see the same `dt` no matter how the host
/// frames are paced.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Bank `frame_dt` and return how many fixed ticks are now due.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator = (self.accumulator + frame_dt).min(self.dt * MAX_BACKLOG_TICKS);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Fraction of the next tick already banked, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_ticks_only() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
        // Half a tick banks; the next half releases it.
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
    }

    #[test]
    fn remainder_shows_up_as_alpha() {
        let mut ts = FixedTimestep::new(0.01);
        ts.accumulate(0.015);
        assert!((ts.alpha() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn stall_backlog_is_capped() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        // A full second owes sixty ticks; only the capped backlog runs.
        assert_eq!(ts.accumulate(1.0), 10);
    }

    #[test]
    fn time_tracks_elapsed() {
        let mut time = Time::default();
        time.step(0.05);
        time.step(0.05);
        assert!((time.elapsed - 0.1).abs() < 1e-6);
        assert!((time.delta_ms() - 50.0).abs() < 1e-4);
    }
}
