use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tilesweeper_core::{Board, CellView, Coord, Coord2, Interaction};

use crate::geom::{Point, Rect};
use crate::timer::Seconds;
use crate::view::{WHEEL_ZOOM_STEP, screen_to_board, tile_rect};

pub use repeat::*;
pub use touch::*;

mod repeat;
mod touch;

/// Distance from its start after which a single touch pans the board.
pub const PAN_THRESHOLD: f64 = 20.0;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MouseButtons: u16 {
        const LEFT   = 1;
        const RIGHT  = 1 << 1;
        const MIDDLE = 1 << 2;
    }
}

impl Default for MouseButtons {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub pos: Point,
}

/// Developer hotkeys. Ignored unless dev mode is on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevKey {
    Reset,
    ResetSameSeed,
    InstantWin,
    DecorationBoard,
    ResourceEditor,
    ReloadAssets,
    SaveAssets,
    Screenshot,
}

/// Snapshot of raw input for one tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub cursor: Point,
    pub pressed: MouseButtons,
    pub just_pressed: MouseButtons,
    pub just_released: MouseButtons,
    /// Wheel steps, positive zooms in.
    pub wheel: f64,
    /// Touches still down at the end of the frame.
    pub touches: SmallVec<[TouchPoint; 4]>,
    pub just_pressed_touches: SmallVec<[TouchPoint; 4]>,
    /// Touches lifted this frame, with their final positions.
    pub just_released_touches: SmallVec<[TouchPoint; 4]>,
    pub keys: SmallVec<[DevKey; 2]>,
}

impl InputFrame {
    pub fn any_just_pressed(&self) -> bool {
        !self.just_pressed.is_empty() || !self.just_pressed_touches.is_empty()
    }

    pub fn any_pressed(&self) -> bool {
        !self.pressed.is_empty() || !self.touches.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    None,
    Step,
    Flag,
    Check,
    Hover,
    /// Chord preview.
    HL,
}

impl Default for InputKind {
    fn default() -> Self {
        Self::None
    }
}

/// What the player asks of the board this tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInput {
    pub kind: InputKind,
    pub board_x: Coord,
    pub board_y: Coord,
    pub by_touch: bool,
}

impl GameInput {
    pub const NONE: Self = Self {
        kind: InputKind::None,
        board_x: 0,
        board_y: 0,
        by_touch: false,
    };

    pub fn new(kind: InputKind, (board_x, board_y): Coord2, by_touch: bool) -> Self {
        Self {
            kind,
            board_x,
            board_y,
            by_touch,
        }
    }

    pub fn coords(&self) -> Coord2 {
        (self.board_x, self.board_y)
    }

    /// The rule-core interaction this input requests, if any.
    pub fn interaction(&self) -> Option<Interaction> {
        match self.kind {
            InputKind::Step => Some(Interaction::Step),
            InputKind::Flag => Some(Interaction::Flag),
            InputKind::Check => Some(Interaction::Check),
            InputKind::None | InputKind::Hover | InputKind::HL => None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == InputKind::None
    }
}

/// Zoom and pan requested by the player this tick.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewDelta {
    /// Zoom multiplier, `1` for none.
    pub zoom: f64,
    /// Screen point that stays fixed while zooming.
    pub anchor: Point,
    pub pan: Point,
}

impl Default for ViewDelta {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            anchor: Point::ZERO,
            pan: Point::ZERO,
        }
    }
}

impl ViewDelta {
    pub fn is_none(&self) -> bool {
        self.zoom == 1.0 && self.pan == Point::ZERO
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Pinch {
    ids: (u64, u64),
    distance: f64,
    center: Point,
}

/// Fuses mouse and touch into one [`GameInput`] and a [`ViewDelta`] per tick.
#[derive(Clone, Debug, Default)]
pub struct InputInterpreter {
    touches: TouchTable,
    pinch: Option<Pinch>,
}

impl InputInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touches(&self) -> &TouchTable {
        &self.touches
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn reset(&mut self) {
        self.touches.clear();
        self.pinch = None;
    }

    /// Interprets one frame. `board_rect` is the transformed board rect.
    pub fn update(
        &mut self,
        frame: &InputFrame,
        now: Seconds,
        board: &Board,
        board_rect: Rect,
        zones: &[Rect],
    ) -> (GameInput, ViewDelta) {
        self.touches.update(frame, now, zones);

        let delta = self.view_delta(frame);

        let input = if self.touches.is_empty() {
            mouse_input(frame, board, board_rect, zones)
        } else {
            self.touch_input(board, board_rect)
        };

        if !input.is_none() {
            log::trace!(
                "({}, {}) {:?}{}",
                input.board_x,
                input.board_y,
                input.kind,
                if input.by_touch { " by touch" } else { "" }
            );
        }
        (input, delta)
    }

    fn view_delta(&mut self, frame: &InputFrame) -> ViewDelta {
        let mut delta = ViewDelta::default();

        if self.touches.is_empty() && frame.wheel != 0.0 {
            delta.zoom = WHEEL_ZOOM_STEP.powf(frame.wheel);
            delta.anchor = frame.cursor;
        }

        let pinching: SmallVec<[TouchInfo; 2]> = self
            .touches
            .active()
            .filter(|info| !info.discarded)
            .copied()
            .collect();

        if let [a, b] = pinching.as_slice() {
            let distance = a.last_pos.distance(b.last_pos);
            let center = (a.last_pos + b.last_pos) * 0.5;
            match self.pinch {
                Some(prev) if prev.ids == (a.id, b.id) => {
                    if prev.distance > 0.0 && distance > 0.0 {
                        delta.zoom = distance / prev.distance;
                    }
                    delta.anchor = center;
                    delta.pan = center - prev.center;
                }
                _ => log::trace!("pinch start ({}, {})", a.id, b.id),
            }
            self.pinch = Some(Pinch {
                ids: (a.id, b.id),
                distance,
                center,
            });
            return delta;
        }
        self.pinch = None;

        for info in self.touches.iter_mut() {
            if !info.is_active() || info.discarded {
                continue;
            }
            if info.flag_start.is_some() && !info.flag_cancelled {
                continue;
            }
            if info.distance_from_start() > PAN_THRESHOLD {
                info.panning = true;
            }
            if info.panning {
                delta.pan += info.delta();
            }
        }
        delta
    }

    fn touch_input(&mut self, board: &Board, board_rect: Rect) -> GameInput {
        let size = board.size();
        let mut result = GameInput::NONE;

        for info in self.touches.iter_mut() {
            if info.discarded || info.max_touch_count > 1 {
                continue;
            }

            let start = screen_to_board(board_rect, size, info.started_pos);

            if info.is_active() {
                if info.flag_start.is_none() && !info.flag_cancelled && can_flag_from(board, start)
                {
                    log::trace!("({}, {}) flag gesture armed", start.0, start.1);
                    info.flag_start = Some(start);
                }
                let Some(flag_start) = info.flag_start else {
                    continue;
                };
                if info.flag_cancelled {
                    continue;
                }
                if !flag_area(board, board_rect, flag_start).contains(info.last_pos) {
                    log::trace!("({}, {}) flag gesture cancelled", start.0, start.1);
                    info.flag_cancelled = true;
                    continue;
                }
                result = GameInput::new(InputKind::HL, flag_start, true);
                continue;
            }

            let end_pos = info.pos();
            let end = screen_to_board(board_rect, size, end_pos);

            if let (Some(flag_start), false) = (info.flag_start, info.flag_cancelled) {
                if end != flag_start {
                    if let Some(target) = nearest_unrevealed_neighbor(board, board_rect, flag_start, end_pos) {
                        result = GameInput::new(InputKind::Flag, target, true);
                    }
                } else if !info.dragged {
                    result = GameInput::new(InputKind::Check, flag_start, true);
                }
                continue;
            }

            if info.dragged || !board_rect.contains(end_pos) {
                continue;
            }
            let kind = match board.cell_at(end) {
                Some(CellView::Revealed(_)) => InputKind::Check,
                Some(CellView::Flagged) => InputKind::Flag,
                Some(CellView::Hidden) => InputKind::Step,
                None => continue,
            };
            result = GameInput::new(kind, end, true);
        }

        result
    }
}

fn mouse_input(frame: &InputFrame, board: &Board, board_rect: Rect, zones: &[Rect]) -> GameInput {
    use InputKind::*;

    let cursor = frame.cursor;
    if !board_rect.contains(cursor) || zones.iter().any(|zone| zone.contains(cursor)) {
        return GameInput::NONE;
    }
    let coords = screen_to_board(board_rect, board.size(), cursor);
    if !board.contains(coords) {
        return GameInput::NONE;
    }

    let pressed = frame.pressed;
    let just = frame.just_pressed;
    let (l, r, m) = (
        pressed.contains(MouseButtons::LEFT),
        pressed.contains(MouseButtons::RIGHT),
        pressed.contains(MouseButtons::MIDDLE),
    );
    let (jl, jr, jm) = (
        just.contains(MouseButtons::LEFT),
        just.contains(MouseButtons::RIGHT),
        just.contains(MouseButtons::MIDDLE),
    );

    let kind = if (jl && r) || (l && jr) || jm {
        Check
    } else if jr {
        Flag
    } else if jl {
        Step
    } else if (l && r) || m {
        HL
    } else {
        Hover
    };
    GameInput::new(kind, coords, false)
}

/// A revealed number that still has neighbors to flag.
fn can_flag_from(board: &Board, coords: Coord2) -> bool {
    board.cell_at(coords).and_then(CellView::number).is_some() && board.has_open_neighbor(coords)
}

/// Area a flag gesture may wander in: the start tile and its unrevealed
/// neighbors, scaled 2× about the start tile center.
fn flag_area(board: &Board, board_rect: Rect, start: Coord2) -> Rect {
    let size = board.size();
    let start_rect = tile_rect(board_rect, size, start);
    board
        .iter_neighbors(start)
        .filter(|&pos| !board.is_revealed(pos))
        .fold(start_rect, |area, pos| area.union(&tile_rect(board_rect, size, pos)))
        .scale_about(start_rect.center(), 2.0)
}

fn nearest_unrevealed_neighbor(
    board: &Board,
    board_rect: Rect,
    start: Coord2,
    pos: Point,
) -> Option<Coord2> {
    let size = board.size();
    board
        .iter_neighbors(start)
        .filter(|&cell| !board.is_revealed(cell))
        .map(|cell| {
            let distance = tile_rect(board_rect, size, cell)
                .center()
                .distance(pos);
            (cell, distance)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(cell, _)| cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::pt;

    // 3×2 board in a 300×200 rect, 100 px tiles. (1, 0) is a revealed 2
    // between two hidden mines.
    fn board() -> Board {
        Board::from_layout(&["*@*", "@@@"]).unwrap()
    }

    fn board_rect() -> Rect {
        Rect::from_wh(300.0, 200.0)
    }

    fn touch(id: u64, x: f64, y: f64) -> TouchPoint {
        TouchPoint { id, pos: pt(x, y) }
    }

    fn press(id: u64, x: f64, y: f64) -> InputFrame {
        let mut frame = InputFrame::default();
        frame.just_pressed_touches.push(touch(id, x, y));
        frame.touches.push(touch(id, x, y));
        frame
    }

    fn hold(points: &[(u64, f64, f64)]) -> InputFrame {
        let mut frame = InputFrame::default();
        for &(id, x, y) in points {
            frame.touches.push(touch(id, x, y));
        }
        frame
    }

    fn release(id: u64, x: f64, y: f64) -> InputFrame {
        let mut frame = InputFrame::default();
        frame.just_released_touches.push(touch(id, x, y));
        frame
    }

    fn mouse(pressed: MouseButtons, just_pressed: MouseButtons) -> InputFrame {
        InputFrame {
            cursor: pt(50.0, 150.0),
            pressed,
            just_pressed,
            ..InputFrame::default()
        }
    }

    #[test]
    fn mouse_policy_precedence() {
        use MouseButtons as B;
        let mut input = InputInterpreter::new();
        let board = board();
        let mut kind = |frame: InputFrame| {
            input.update(&frame, 0.0, &board, board_rect(), &[]).0.kind
        };

        assert_eq!(kind(mouse(B::empty(), B::empty())), InputKind::Hover);
        assert_eq!(kind(mouse(B::LEFT, B::LEFT)), InputKind::Step);
        assert_eq!(kind(mouse(B::RIGHT, B::RIGHT)), InputKind::Flag);
        assert_eq!(kind(mouse(B::LEFT | B::RIGHT, B::LEFT)), InputKind::Check);
        assert_eq!(kind(mouse(B::LEFT | B::RIGHT, B::RIGHT)), InputKind::Check);
        assert_eq!(kind(mouse(B::MIDDLE, B::MIDDLE)), InputKind::Check);
        assert_eq!(kind(mouse(B::LEFT | B::RIGHT, B::empty())), InputKind::HL);
        assert_eq!(kind(mouse(B::MIDDLE, B::empty())), InputKind::HL);
    }

    #[test]
    fn mouse_in_zone_or_outside_board_is_ignored() {
        let mut input = InputInterpreter::new();
        let board = board();
        let frame = mouse(MouseButtons::LEFT, MouseButtons::LEFT);
        let zone = Rect::from_xywh(0.0, 100.0, 100.0, 100.0);
        let (result, _) = input.update(&frame, 0.0, &board, board_rect(), &[zone]);
        assert!(result.is_none());

        let frame = InputFrame {
            cursor: pt(400.0, 50.0),
            ..frame
        };
        let (result, _) = input.update(&frame, 0.0, &board, board_rect(), &[]);
        assert!(result.is_none());
    }

    #[test]
    fn taps_pick_interaction_by_cell() {
        let board = Board::from_layout(&["!@.", "..."]).unwrap();
        let cases = [
            ((50.0, 50.0), InputKind::Flag),
            ((150.0, 50.0), InputKind::Check),
            ((250.0, 150.0), InputKind::Step),
        ];
        for ((x, y), expected) in cases {
            let mut input = InputInterpreter::new();
            let (result, _) = input.update(&press(1, x, y), 0.0, &board, board_rect(), &[]);
            assert_ne!(result.kind, expected);
            let (result, _) = input.update(&release(1, x, y), 0.1, &board, board_rect(), &[]);
            assert_eq!(result.kind, expected);
            assert!(result.by_touch);
        }
    }

    #[test]
    fn touch_started_in_zone_never_acts() {
        let mut input = InputInterpreter::new();
        let board = board();
        let zone = Rect::from_xywh(0.0, 100.0, 100.0, 100.0);
        let (result, _) = input.update(&press(1, 50.0, 150.0), 0.0, &board, board_rect(), &[zone]);
        assert!(result.is_none());
        let (result, delta) =
            input.update(&release(1, 50.0, 150.0), 0.1, &board, board_rect(), &[zone]);
        assert!(result.is_none());
        assert!(delta.is_none());
    }

    #[test]
    fn flag_by_drag_flags_nearest_neighbor() {
        let mut input = InputInterpreter::new();
        let board = board();

        let (result, _) = input.update(&press(1, 150.0, 50.0), 0.0, &board, board_rect(), &[]);
        assert_eq!(result, GameInput::new(InputKind::HL, (1, 0), true));

        let (result, delta) =
            input.update(&hold(&[(1, 230.0, 40.0)]), 0.1, &board, board_rect(), &[]);
        assert_eq!(result.kind, InputKind::HL);
        assert!(delta.is_none(), "flag gestures do not pan");

        let (result, _) = input.update(&release(1, 230.0, 40.0), 0.2, &board, board_rect(), &[]);
        assert_eq!(result, GameInput::new(InputKind::Flag, (2, 0), true));
    }

    #[test]
    fn leaving_flag_area_cancels_gesture() {
        let mut input = InputInterpreter::new();
        let board = board();

        input.update(&press(1, 150.0, 50.0), 0.0, &board, board_rect(), &[]);
        let (_, delta) = input.update(&hold(&[(1, 150.0, 190.0)]), 0.1, &board, board_rect(), &[]);
        assert!(delta.is_none());
        // cancelled on the tick it left, pans from the next one on
        let (_, delta) = input.update(&hold(&[(1, 150.0, 180.0)]), 0.2, &board, board_rect(), &[]);
        assert_eq!(delta.pan, pt(0.0, -10.0));

        let (result, _) = input.update(&release(1, 230.0, 40.0), 0.3, &board, board_rect(), &[]);
        assert!(result.is_none());
    }

    #[test]
    fn tap_on_number_checks() {
        let mut input = InputInterpreter::new();
        let board = board();
        input.update(&press(1, 150.0, 50.0), 0.0, &board, board_rect(), &[]);
        let (result, _) = input.update(&release(1, 152.0, 52.0), 0.1, &board, board_rect(), &[]);
        assert_eq!(result, GameInput::new(InputKind::Check, (1, 0), true));
    }

    #[test]
    fn pinch_translation_only_pans() {
        let mut input = InputInterpreter::new();
        let board = board();

        let mut frame = press(1, 100.0, 100.0);
        frame.just_pressed_touches.push(touch(2, 200.0, 100.0));
        frame.touches.push(touch(2, 200.0, 100.0));
        let (_, delta) = input.update(&frame, 0.0, &board, board_rect(), &[]);
        assert!(delta.is_none());
        assert!(input.is_pinching());

        let frame = hold(&[(1, 110.0, 105.0), (2, 210.0, 105.0)]);
        let (result, delta) = input.update(&frame, 0.1, &board, board_rect(), &[]);
        assert!(result.is_none());
        assert_eq!(delta.zoom, 1.0);
        assert_eq!(delta.pan, pt(10.0, 5.0));
    }

    #[test]
    fn pinch_spread_zooms_about_center() {
        let mut input = InputInterpreter::new();
        let board = board();

        input.update(&hold(&[(1, 100.0, 100.0), (2, 200.0, 100.0)]), 0.0, &board, board_rect(), &[]);
        let frame = hold(&[(1, 50.0, 100.0), (2, 250.0, 100.0)]);
        let (_, delta) = input.update(&frame, 0.1, &board, board_rect(), &[]);
        assert_eq!(delta.zoom, 2.0);
        assert_eq!(delta.anchor, pt(150.0, 100.0));
        assert_eq!(delta.pan, Point::ZERO);
    }

    #[test]
    fn pinch_zooms_and_pans_in_one_tick() {
        let mut input = InputInterpreter::new();
        let board = board();

        input.update(&hold(&[(1, 100.0, 100.0), (2, 200.0, 100.0)]), 0.0, &board, board_rect(), &[]);
        // both fingers travel past the single-touch pan threshold
        let frame = hold(&[(1, 60.0, 130.0), (2, 260.0, 130.0)]);
        let (result, delta) = input.update(&frame, 0.1, &board, board_rect(), &[]);

        assert!(result.is_none());
        assert_eq!(delta.zoom, 2.0);
        assert_eq!(delta.anchor, pt(160.0, 130.0));
        assert_eq!(delta.pan, pt(10.0, 30.0));
        assert!(input.touches().iter().all(|info| !info.panning));
    }

    #[test]
    fn second_finger_never_arms_flag_gesture() {
        let mut input = InputInterpreter::new();
        // (2, 1) is a zero, (1, 0) a number next to the hidden mine
        let board = Board::from_layout(&["*@@", "@@@"]).unwrap();

        let (result, _) = input.update(&press(1, 250.0, 150.0), 0.0, &board, board_rect(), &[]);
        assert!(result.is_none());

        let mut frame = press(2, 150.0, 50.0);
        frame.touches.push(touch(1, 250.0, 150.0));
        let (result, _) = input.update(&frame, 0.1, &board, board_rect(), &[]);
        assert!(result.is_none());
        assert_eq!(input.touches().get(2).unwrap().max_touch_count, 2);
        assert_eq!(input.touches().get(2).unwrap().flag_start, None);

        let mut frame = release(1, 250.0, 150.0);
        frame.touches.push(touch(2, 150.0, 50.0));
        let (result, _) = input.update(&frame, 0.2, &board, board_rect(), &[]);
        assert!(result.is_none());
        assert_eq!(input.touches().get(2).unwrap().flag_start, None);

        let (result, _) = input.update(&release(2, 50.0, 50.0), 0.3, &board, board_rect(), &[]);
        assert!(result.is_none());
    }

    #[test]
    fn wheel_zooms_at_cursor() {
        let mut input = InputInterpreter::new();
        let board = board();
        let frame = InputFrame {
            cursor: pt(20.0, 30.0),
            wheel: 1.0,
            ..InputFrame::default()
        };
        let (_, delta) = input.update(&frame, 0.0, &board, board_rect(), &[]);
        assert_eq!(delta.zoom, WHEEL_ZOOM_STEP);
        assert_eq!(delta.anchor, pt(20.0, 30.0));
    }
}
