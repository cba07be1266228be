//! Pointer state machine shared by on-screen buttons.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geom::Rect;
use crate::input::{InputFrame, InputGroup, KeyRepeat, MouseButtons, TouchTable};
use crate::timer::{Seconds, ms};

pub const DEFAULT_FIRST_RATE: Seconds = ms(500.0);
pub const DEFAULT_REPEAT_RATE: Seconds = ms(100.0);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonState {
    #[default]
    Normal,
    Hover,
    Down,
}

/// When in a press a button reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonTiming {
    OnPress,
    /// Fires on press, then repeats while held.
    OnHold,
    /// Fires when a press that started on the button ends on it.
    OnRelease,
}

/// Which reports a caller acts on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonTrigger {
    Mouse(ButtonTiming),
    Touch(ButtonTiming),
    OnAny(ButtonTiming),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub group: InputGroup,
    pub timing: ButtonTiming,
}

impl ButtonEvent {
    pub fn fires(&self, trigger: ButtonTrigger) -> bool {
        match trigger {
            ButtonTrigger::Mouse(timing) => self.group == InputGroup::Mouse && self.timing == timing,
            ButtonTrigger::Touch(timing) => self.group == InputGroup::Touch && self.timing == timing,
            ButtonTrigger::OnAny(timing) => self.timing == timing,
        }
    }
}

pub type ButtonEvents = SmallVec<[ButtonEvent; 4]>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseButton {
    pub rect: Rect,
    pub disabled: bool,
    /// Emits [`ButtonTiming::OnHold`] reports while held.
    pub repeat_on_hold: bool,
    pub first_rate: Seconds,
    pub repeat_rate: Seconds,
    pub state: ButtonState,
    mouse_armed: bool,
}

impl Default for BaseButton {
    fn default() -> Self {
        Self {
            rect: Rect::ZERO,
            disabled: false,
            repeat_on_hold: false,
            first_rate: DEFAULT_FIRST_RATE,
            repeat_rate: DEFAULT_REPEAT_RATE,
            state: ButtonState::Normal,
            mouse_armed: false,
        }
    }
}

impl BaseButton {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }

    /// Updates the state from this tick's input and returns what fired.
    pub fn update(&mut self, frame: &InputFrame, touches: &TouchTable, repeat: &mut KeyRepeat, now: Seconds) -> ButtonEvents {
        let mut events = ButtonEvents::new();
        if self.disabled {
            self.state = ButtonState::Normal;
            self.mouse_armed = false;
            return events;
        }

        let mut push = |group, timing| events.push(ButtonEvent { group, timing });

        // mouse
        let left_down = frame.pressed.contains(MouseButtons::LEFT);
        let left_pressed = frame.just_pressed.contains(MouseButtons::LEFT);
        let left_released = frame.just_released.contains(MouseButtons::LEFT);
        let hovered = self.rect.contains(frame.cursor);

        if hovered {
            if left_pressed {
                self.mouse_armed = true;
                push(InputGroup::Mouse, ButtonTiming::OnPress);
            }
            if self.repeat_on_hold
                && repeat.handle(
                    InputGroup::Mouse,
                    0,
                    left_down,
                    left_pressed,
                    now,
                    self.first_rate,
                    self.repeat_rate,
                )
            {
                push(InputGroup::Mouse, ButtonTiming::OnHold);
            }
            if left_released && self.mouse_armed {
                push(InputGroup::Mouse, ButtonTiming::OnRelease);
            }
        } else if self.repeat_on_hold {
            repeat.handle(InputGroup::Mouse, 0, false, false, now, self.first_rate, self.repeat_rate);
        }
        if !left_down {
            self.mouse_armed = false;
        }

        // touch
        let mut touch_down = false;
        for touch in &frame.just_pressed_touches {
            if self.rect.contains(touch.pos) {
                push(InputGroup::Touch, ButtonTiming::OnPress);
            }
        }
        for touch in &frame.touches {
            let inside = self.rect.contains(touch.pos);
            touch_down |= inside;
            if self.repeat_on_hold {
                let just = frame.just_pressed_touches.iter().any(|t| t.id == touch.id);
                if repeat.handle(
                    InputGroup::Touch,
                    touch.id,
                    inside,
                    just,
                    now,
                    self.first_rate,
                    self.repeat_rate,
                ) {
                    push(InputGroup::Touch, ButtonTiming::OnHold);
                }
            }
        }
        for touch in &frame.just_released_touches {
            if self.repeat_on_hold {
                repeat.handle(InputGroup::Touch, touch.id, false, false, now, self.first_rate, self.repeat_rate);
            }
            let started_inside = touches
                .get(touch.id)
                .is_some_and(|info| self.rect.contains(info.started_pos));
            if started_inside && self.rect.contains(touch.pos) {
                push(InputGroup::Touch, ButtonTiming::OnRelease);
            }
        }

        self.state = if touch_down || (hovered && left_down) {
            ButtonState::Down
        } else if hovered {
            ButtonState::Hover
        } else {
            ButtonState::Normal
        };

        events
    }
}
