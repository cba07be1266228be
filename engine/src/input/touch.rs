use smallvec::SmallVec;
use tilesweeper_core::Coord2;

use crate::geom::{Point, Rect};
use crate::timer::Seconds;

use super::{InputFrame, TouchPoint};

/// Distance a touch must travel from its start before it counts as dragged.
pub const DRAG_THRESHOLD: f64 = 15.0;

/// Slots untouched for this long are dropped.
pub const IDLE_PRUNE: Seconds = 30.0 * 60.0;

/// What the table remembers about one touch id.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchInfo {
    pub id: u64,
    pub started_time: Seconds,
    pub started_pos: Point,
    pub last_pos: Point,
    pub prev_pos: Point,
    pub last_seen: Seconds,
    pub ended_time: Option<Seconds>,
    pub ended_pos: Option<Point>,
    pub did_end: bool,
    pub dragged: bool,
    pub max_touch_count: usize,
    /// Started inside a no-input zone; ignored for board input.
    pub discarded: bool,
    /// Board cell of an armed flag-by-drag gesture.
    pub flag_start: Option<Coord2>,
    pub flag_cancelled: bool,
    /// Moved far enough to pan the board.
    pub panning: bool,
}

impl TouchInfo {
    fn start(id: u64, pos: Point, now: Seconds, discarded: bool) -> Self {
        Self {
            id,
            started_time: now,
            started_pos: pos,
            last_pos: pos,
            prev_pos: pos,
            last_seen: now,
            ended_time: None,
            ended_pos: None,
            did_end: false,
            dragged: false,
            max_touch_count: 1,
            discarded,
            flag_start: None,
            flag_cancelled: false,
            panning: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.did_end
    }

    /// Ended slots live for exactly the tick they ended in.
    pub fn just_ended(&self) -> bool {
        self.did_end
    }

    /// Frame-to-frame movement.
    pub fn delta(&self) -> Point {
        self.last_pos - self.prev_pos
    }

    pub fn distance_from_start(&self) -> f64 {
        self.last_pos.distance(self.started_pos)
    }

    /// Where the touch is, or where it ended.
    pub fn pos(&self) -> Point {
        self.ended_pos.unwrap_or(self.last_pos)
    }
}

/// Dense array of touch slots keyed by id.
#[derive(Clone, Debug, Default)]
pub struct TouchTable {
    slots: SmallVec<[TouchInfo; 4]>,
}

impl TouchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<&TouchInfo> {
        self.slots.iter().find(|info| info.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut TouchInfo> {
        self.slots.iter_mut().find(|info| info.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchInfo> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TouchInfo> {
        self.slots.iter_mut()
    }

    pub fn active(&self) -> impl Iterator<Item = &TouchInfo> {
        self.slots.iter().filter(|info| info.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Folds one frame of touch events into the table.
    pub fn update(&mut self, frame: &InputFrame, now: Seconds, zones: &[Rect]) {
        self.slots
            .retain(|info| !info.did_end && now - info.last_seen <= IDLE_PRUNE);

        for &TouchPoint { id, pos } in &frame.just_pressed_touches {
            let discarded = zones.iter().any(|zone| zone.contains(pos));
            let info = TouchInfo::start(id, pos, now, discarded);
            if let Some(slot) = self.get_mut(id) {
                log::debug!("touch id {} reused, resetting its slot", id);
                *slot = info;
            } else {
                self.slots.push(info);
            }
        }

        for &TouchPoint { id, pos } in &frame.touches {
            match self.get_mut(id) {
                Some(info) if info.is_active() => {
                    info.prev_pos = info.last_pos;
                    info.last_pos = pos;
                    info.last_seen = now;
                }
                Some(_) => {}
                None => {
                    // missed the press event, start tracking from here
                    let discarded = zones.iter().any(|zone| zone.contains(pos));
                    self.slots.push(TouchInfo::start(id, pos, now, discarded));
                }
            }
        }

        for &TouchPoint { id, pos } in &frame.just_released_touches {
            if let Some(info) = self.get_mut(id) {
                info.prev_pos = info.last_pos;
                info.last_pos = pos;
                info.last_seen = now;
                info.ended_time = Some(now);
                info.ended_pos = Some(pos);
                info.did_end = true;
            }
        }

        let count = frame.touches.len();
        for info in &mut self.slots {
            if info.last_seen == now {
                info.max_touch_count = info.max_touch_count.max(count);
                if info.distance_from_start() > DRAG_THRESHOLD {
                    info.dragged = true;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
