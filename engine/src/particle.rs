use serde::{Deserialize, Serialize};
use tilesweeper_core::Coord2;

use crate::color::Nrgba;
use crate::ease::ease_in_quint;
use crate::geom::{Point, Rect, pt};
use crate::render::SubView;
use crate::render::batch::{ViBuffer, rect_corners};
use crate::timer::{Seconds, Timer};
use crate::view::{tile_rect, tile_size};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorCurve {
    Linear,
    EaseInQuint,
}

impl ColorCurve {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseInQuint => ease_in_quint(t),
        }
    }
}

/// A short-lived sprite anchored at a board cell. Everything but rotation is
/// in tile units, one unit being `min(tile_w, tile_h)` pixels. Physics advance
/// once per tick.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub sprite: SubView,
    pub color_start: Nrgba,
    pub color_end: Nrgba,
    pub color_curve: ColorCurve,
    pub board_x: i32,
    pub board_y: i32,
    pub width: f64,
    pub height: f64,
    pub offset: Point,
    pub velocity: Point,
    pub gravity: Point,
    pub rotation: f64,
    pub rot_velocity: f64,
    /// Drives the color only.
    pub timer: Timer,
    pub dead: bool,
}

impl Particle {
    pub fn color(&self) -> Nrgba {
        let t = self.color_curve.apply(self.timer.normalize());
        self.color_start.lerp(self.color_end, t)
    }
}

/// Converts particle units to screen pixels for one board layout.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UnitConverter {
    pub board_size: Coord2,
    pub board_rect: Rect,
}

impl UnitConverter {
    pub fn to_px(&self, v: f64) -> f64 {
        let (tile_w, tile_h) = tile_size(self.board_rect, self.board_size);
        tile_w.min(tile_h) * v
    }

    pub fn from_px(&self, px: f64) -> f64 {
        let (tile_w, tile_h) = tile_size(self.board_rect, self.board_size);
        px / tile_w.min(tile_h)
    }

    /// Screen position of a particle's center.
    pub fn to_screen(&self, p: &Particle) -> Point {
        let center = tile_rect(self.board_rect, self.board_size, (p.board_x, p.board_y)).center();
        center + pt(self.to_px(p.offset.x), self.to_px(p.offset.y))
    }
}

/// Particle storage that reuses dead slots.
#[derive(Clone, Debug, Default)]
pub struct Particles {
    items: Vec<Particle>,
}

impl Particles {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, particle: Particle) {
        match self.items.iter_mut().find(|p| p.dead) {
            Some(slot) => *slot = particle,
            None => self.items.push(particle),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.items.iter().filter(|p| !p.dead)
    }

    pub fn alive_count(&self) -> usize {
        self.iter().count()
    }

    pub fn slot_count(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Advances every live particle one tick. Returns whether any was alive.
    pub fn step(&mut self, dt: Seconds, units: &UnitConverter, screen_height: f64) -> bool {
        let mut found_alive = false;
        for p in self.items.iter_mut().filter(|p| !p.dead) {
            found_alive = true;

            p.offset += p.velocity;
            p.velocity += p.gravity;
            p.rotation += p.rot_velocity;
            p.timer.tick_up(dt);

            let extent = units.to_px(p.width.max(p.height));
            if units.to_screen(p).y > screen_height + extent {
                p.dead = true;
            }
        }
        found_alive
    }

    /// Appends a rotated quad per live particle.
    pub fn append_to(&self, buffer: &mut ViBuffer, units: &UnitConverter) {
        for p in self.iter() {
            let center = units.to_screen(p);
            let half = pt(units.to_px(p.width), units.to_px(p.height)) * 0.5;
            let dst = rect_corners(Rect {
                min: -half,
                max: half,
            })
            .map(|corner| center + corner.rotate(p.rotation));
            let src = rect_corners(p.sprite.rect);
            buffer.push_quad(dst, src, p.color().to_premultiplied_f32());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ImageId;

    fn particle() -> Particle {
        Particle {
            sprite: SubView {
                image: ImageId(1),
                rect: Rect::from_wh(8.0, 8.0),
            },
            color_start: Nrgba::WHITE,
            color_end: Nrgba::WHITE.fade(0.0),
            color_curve: ColorCurve::Linear,
            board_x: 0,
            board_y: 0,
            width: 1.0,
            height: 1.0,
            offset: Point::ZERO,
            velocity: pt(0.0, 1.0),
            gravity: Point::ZERO,
            rotation: 0.0,
            rot_velocity: 0.0,
            timer: Timer::new(1.0),
            dead: false,
        }
    }

    fn units() -> UnitConverter {
        UnitConverter {
            board_size: (2, 2),
            board_rect: Rect::from_wh(20.0, 20.0),
        }
    }

    #[test]
    fn falls_off_screen_and_dies() {
        let mut particles = Particles::default();
        particles.add(particle());

        // center starts at y = 5, moves 10 px per tick
        assert!(particles.step(0.1, &units(), 30.0));
        assert!(particles.step(0.1, &units(), 30.0));
        assert_eq!(particles.alive_count(), 1);
        assert!(particles.step(0.1, &units(), 30.0));
        assert_eq!(particles.alive_count(), 1);
        assert!(particles.step(0.1, &units(), 30.0));
        assert_eq!(particles.alive_count(), 0);
        assert!(!particles.step(0.1, &units(), 30.0));
    }

    #[test]
    fn dead_slots_are_reused() {
        let mut particles = Particles::default();
        particles.add(Particle {
            dead: true,
            ..particle()
        });
        particles.add(particle());
        assert_eq!(particles.slot_count(), 1);
        particles.add(particle());
        assert_eq!(particles.slot_count(), 2);
    }

    #[test]
    fn color_follows_timer() {
        let mut p = particle();
        assert_eq!(p.color(), Nrgba::WHITE);
        p.timer.current = 1.0;
        assert_eq!(p.color().a, 0);
    }

    #[test]
    fn quads_land_at_tile_center() {
        let mut particles = Particles::default();
        particles.add(particle());
        let mut buffer = ViBuffer::default();
        particles.append_to(&mut buffer, &units());
        assert_eq!(buffer.quad_count(), 1);
        assert_eq!(buffer.vertices[0].dst, [0.0, 0.0]);
        assert_eq!(buffer.vertices[2].dst, [10.0, 10.0]);
    }
}
