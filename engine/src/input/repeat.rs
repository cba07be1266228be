use serde::{Deserialize, Serialize};

use crate::timer::Seconds;

/// Sources that repeat independently of each other.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputGroup {
    Mouse,
    Touch,
}

/// Held-button repeat: the first fire happens on press, the second after
/// `first_rate`, then every `repeat_rate`.
#[derive(Clone, Debug, Default)]
pub struct KeyRepeat {
    next_fire: hashbrown::HashMap<(InputGroup, u64), Seconds>,
}

impl KeyRepeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a held button fires on this tick.
    pub fn handle(
        &mut self,
        group: InputGroup,
        button: u64,
        pressed: bool,
        just_pressed: bool,
        now: Seconds,
        first_rate: Seconds,
        repeat_rate: Seconds,
    ) -> bool {
        let key = (group, button);
        if !pressed {
            self.next_fire.remove(&key);
            return false;
        }

        match self.next_fire.get_mut(&key) {
            Some(last) if !just_pressed => {
                if now - *last >= repeat_rate {
                    *last = now;
                    true
                } else {
                    false
                }
            }
            _ => {
                // the stored time is pushed ahead so the first repeat waits longer
                self.next_fire.insert(key, now + first_rate - repeat_rate);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.next_fire.clear();
    }
}
