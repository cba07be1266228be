use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Seconds of game time.
pub type Seconds = f64;

pub const fn ms(millis: f64) -> Seconds {
    millis / 1000.0
}

/// Countdown or count-up over `duration`. `current` may start negative to
/// delay an animation, and may overshoot before being normalized.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub duration: Seconds,
    pub current: Seconds,
}

impl Timer {
    pub const fn new(duration: Seconds) -> Self {
        Self {
            duration,
            current: 0.0,
        }
    }

    /// Starts `delay` seconds before zero.
    pub const fn delayed(duration: Seconds, delay: Seconds) -> Self {
        Self {
            duration,
            current: -delay,
        }
    }

    pub fn tick_up(&mut self, dt: Seconds) {
        self.current += dt;
    }

    pub fn tick_down(&mut self, dt: Seconds) {
        self.current -= dt;
    }

    /// `current / duration` clamped to `[0, 1]`. A zero-length timer is done
    /// as soon as it is not delayed.
    pub fn normalize(&self) -> f64 {
        self.normalize_unclamped().clamp(0.0, 1.0)
    }

    pub fn normalize_unclamped(&self) -> f64 {
        if self.duration <= 0.0 {
            return if self.current >= 0.0 { 1.0 } else { 0.0 };
        }
        self.current / self.duration
    }

    pub fn has_started(&self) -> bool {
        self.current >= 0.0
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.duration
    }

    pub fn finish(&mut self) {
        self.current = self.current.max(self.duration);
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }

    /// Normalized progress over the sub range `[start, end]` of the timer,
    /// each given as a fraction of the full duration.
    pub fn map_range(&self, start: f64, end: f64) -> f64 {
        let t = self.normalize_unclamped();
        if end <= start {
            return if t >= end { 1.0 } else { 0.0 };
        }
        ((t - start) / (end - start)).clamp(0.0, 1.0)
    }
}

/// Fixed-rate game clock. Advances by one tick of `1 / tps` per update.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    tps: f64,
    now: Seconds,
}

impl Clock {
    pub fn new(tps: f64) -> Self {
        let tps = if tps.is_finite() && tps > 0.0 {
            tps
        } else {
            log::warn!("Invalid tick rate {}, using 120", tps);
            120.0
        };
        Self { tps, now: 0.0 }
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }

    pub fn update_delta(&self) -> Seconds {
        1.0 / self.tps
    }

    pub fn tick(&mut self) {
        self.now += self.update_delta();
    }

    pub fn now(&self) -> Seconds {
        self.now
    }

    pub fn time_since(&self, then: Seconds) -> Seconds {
        self.now - then
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(120.0)
    }
}

/// Wall clock stopwatch that logs its elapsed time when reported.
#[derive(Debug)]
pub struct ProfTimer {
    name: &'static str,
    start: Instant,
}

impl ProfTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    pub fn report(&self) {
        log::info!("\"{}\" took {:?}", self.name, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delayed_timer_waits_then_progresses() {
        let mut timer = Timer::delayed(ms(100.0), ms(50.0));
        assert_eq!(timer.normalize(), 0.0);
        assert!(!timer.has_started());

        timer.tick_up(ms(100.0));
        assert!((timer.normalize() - 0.5).abs() < 1e-9);

        timer.tick_up(ms(60.0));
        assert!(timer.is_done());
        assert_eq!(timer.normalize(), 1.0);
        assert!(timer.normalize_unclamped() > 1.0);
    }

    #[test]
    fn finish_never_rewinds() {
        let mut timer = Timer::new(1.0);
        timer.tick_up(3.0);
        timer.finish();
        assert_eq!(timer.current, 3.0);

        let mut timer = Timer::delayed(1.0, 2.0);
        timer.finish();
        assert!(timer.is_done());
    }

    #[test]
    fn map_range_covers_sub_interval() {
        let mut timer = Timer::new(2.0);
        timer.tick_up(1.0);
        assert_eq!(timer.map_range(0.0, 0.25), 1.0);
        assert_eq!(timer.map_range(0.75, 1.0), 0.0);
        assert!((timer.map_range(0.25, 0.75) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_is_done_once_started() {
        let timer = Timer::new(0.0);
        assert!(timer.is_done());
        assert_eq!(timer.normalize(), 1.0);
        assert_eq!(Timer::delayed(0.0, 1.0).normalize(), 0.0);
    }

    #[test]
    fn clock_ticks_by_update_delta() {
        let mut clock = Clock::new(100.0);
        for _ in 0..50 {
            clock.tick();
        }
        assert!((clock.now() - 0.5).abs() < 1e-9);
        assert!((clock.time_since(0.25) - 0.25).abs() < 1e-9);

        assert_eq!(Clock::new(0.0).tps(), 120.0);
    }
}
