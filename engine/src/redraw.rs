use crate::timer::{Seconds, ms};

/// How long a redraw request keeps frames rendering.
pub const REDRAW_GRACE: Seconds = ms(100.0);

/// Skips render passes while nothing has changed recently. Mutators call
/// [`RedrawGovernor::set_redraw`]; the frame draws while the last request is
/// younger than [`REDRAW_GRACE`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RedrawGovernor {
    last_request: Seconds,
    always_draw: bool,
}

impl RedrawGovernor {
    /// Starts armed so the first frames draw.
    pub fn new(now: Seconds, always_draw: bool) -> Self {
        Self {
            last_request: now,
            always_draw,
        }
    }

    pub fn set_redraw(&mut self, now: Seconds) {
        self.last_request = self.last_request.max(now);
    }

    pub fn set_always_draw(&mut self, always_draw: bool) {
        self.always_draw = always_draw;
    }

    pub fn always_draw(&self) -> bool {
        self.always_draw
    }

    pub fn should_draw(&self, now: Seconds) -> bool {
        self.always_draw || now - self.last_request < REDRAW_GRACE
    }
}

impl Default for RedrawGovernor {
    fn default() -> Self {
        Self::new(0.0, false)
    }
}
