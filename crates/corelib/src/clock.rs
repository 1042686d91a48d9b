//! Frame clock driven by host-supplied timestamps.

/// Derives per-tick delta time from consecutive timestamps (milliseconds).
///
/// The first tick after construction or [`reset`](FrameClock::reset) yields
/// `dt = 0`; there is no previous timestamp to difference against, so no
/// update should run on that tick. Delta time is clamped to `[0, dt_max]`
/// so clock jumps backwards or long stalls cannot destabilize the
/// simulation.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    last_ms: Option<f64>,
    dt_max: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_ms: None,
            // Quarter second: anything longer is a stall, not a frame.
            dt_max: 0.25,
        }
    }

    /// Forgets the previous timestamp; the next tick yields `dt = 0`.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Records `now_ms` and returns the delta to the previous tick in
    /// seconds.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            None => 0.0,
            Some(prev) => (((now_ms - prev) / 1000.0) as f32).clamp(0.0, self.dt_max),
        };
        self.last_ms = Some(now_ms);
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
