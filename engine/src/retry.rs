//! The round button that starts a new board after a game ends.

use crate::assets::Assets;
use crate::button::{BaseButton, ButtonState, ButtonTiming, ButtonTrigger};
use crate::color::Nrgba;
use crate::ease::{clamp01, close_to, lerp};
use crate::geom::{Point, Rect, pt};
use crate::input::{InputFrame, KeyRepeat, TouchTable};
use crate::render::batch::ViBuffer;
use crate::render::shapes::{ROUND_RECT_RADIUS, ROUND_RECT_SEGMENTS, push_round_rect};
use crate::render::water::{WaterPass, begin_water, finish_water, water_call};
use crate::render::{Surface, Target, TriangleOptions};
use crate::sound::{SoundName, SoundQueue};
use crate::sprite::UI_RETRY;
use crate::tables::{ColorName, Tables};
use crate::timer::Seconds;

pub const HOVER_EASE: f64 = 0.3;
pub const RETRY_SOUND_VOLUME: f64 = 0.8;

/// The untransformed button: a `size` square centered on the board.
pub fn retry_button_rect(board_rect: Rect, size: f64) -> Rect {
    Rect::from_wh(size, size).centered_at(board_rect.center())
}

/// The button as animated by the end-of-game sequence.
pub fn transformed_retry_button_rect(board_rect: Rect, size: f64, scale: f64, offset: Point) -> Rect {
    retry_button_rect(board_rect, size)
        .scale_centered(scale, scale)
        .translate(offset)
}

/// What happened to the button this tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RetryOutcome {
    pub retry: bool,
    pub redraw: bool,
}

#[derive(Clone, Debug, Default)]
pub struct RetryButton {
    pub base: BaseButton,
    /// Eases toward 1 while hovered.
    pub hover_offset: f64,
    shapes: ViBuffer,
    icons: ViBuffer,
}

impl RetryButton {
    pub fn new() -> Self {
        let mut base = BaseButton::default();
        base.disabled = true;
        Self {
            base,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ButtonState {
        self.base.state
    }

    /// Mouse retries on press and touch on release. Both make the press
    /// click.
    pub fn update(
        &mut self,
        rect: Rect,
        disabled: bool,
        frame: &InputFrame,
        touches: &TouchTable,
        repeat: &mut KeyRepeat,
        now: Seconds,
        sounds: &mut SoundQueue,
    ) -> RetryOutcome {
        let prev_state = self.base.state;
        let prev_hover = self.hover_offset;

        self.base.rect = rect;
        self.base.disabled = disabled;
        let events = self.base.update(frame, touches, repeat, now);

        let mut outcome = RetryOutcome::default();
        for event in &events {
            if event.fires(ButtonTrigger::OnAny(ButtonTiming::OnPress)) {
                sounds.play_once_per_tick(SoundName::RetryPress, RETRY_SOUND_VOLUME);
            }
            if event.fires(ButtonTrigger::Mouse(ButtonTiming::OnPress))
                || event.fires(ButtonTrigger::Touch(ButtonTiming::OnRelease))
            {
                outcome.retry = true;
            }
        }
        if outcome.retry {
            log::debug!("Retry button fired");
            sounds.play_once_per_tick(SoundName::Retry, RETRY_SOUND_VOLUME);
        }

        self.hover_offset = match self.base.state {
            ButtonState::Hover => lerp(self.hover_offset, 1.0, HOVER_EASE),
            ButtonState::Down => 0.0,
            ButtonState::Normal => lerp(self.hover_offset, 0.0, HOVER_EASE),
        };
        if self.base.disabled {
            self.hover_offset = 0.0;
        }

        outcome.redraw = prev_state != self.base.state || !close_to(prev_hover, self.hover_offset, 0.05);
        outcome
    }

    /// Face and base rects for the current state.
    pub fn layout(&self) -> (Rect, Rect) {
        let rect = self.base.rect;
        let body = Rect::from_wh(rect.width(), rect.height() * 0.95);
        let bottom = body.move_to(pt(rect.min.x, rect.max.y - body.height()));
        let mut top = body.move_to(rect.min);

        match self.base.state {
            ButtonState::Down => top = top.move_to(bottom.min),
            ButtonState::Hover => top = top.translate(pt(0.0, -top.height() * 0.025 * self.hover_offset)),
            ButtonState::Normal => {}
        }
        (top, bottom)
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, assets: &Assets, tables: &Tables, water: Option<WaterPass>) {
        let (top, bottom) = self.layout();
        if top.is_empty() {
            return;
        }

        let water = match (water, assets.water) {
            (Some(pass), Some(water_assets)) if pass.is_visible() => Some((pass, water_assets)),
            _ => None,
        };
        let t = water.map_or(0.0, |(pass, _)| clamp01(pass.alpha));
        let color = |a, b| tables.color(a).lerp(tables.color(b), t);
        let colors = [
            color(ColorName::RetryA1, ColorName::RetryB1),
            color(ColorName::RetryA2, ColorName::RetryB2),
            color(ColorName::RetryA3, ColorName::RetryB3),
            color(ColorName::RetryA4, ColorName::RetryB4),
        ];

        self.shapes.reset();
        push_round_rect(
            &mut self.shapes,
            bottom,
            ROUND_RECT_RADIUS,
            ROUND_RECT_SEGMENTS,
            colors[0].to_premultiplied_f32(),
        );
        push_round_rect(
            &mut self.shapes,
            top,
            ROUND_RECT_RADIUS,
            ROUND_RECT_SEGMENTS,
            colors[1].to_premultiplied_f32(),
        );

        let target = if water.is_some() {
            begin_water(surface);
            Target::Water
        } else {
            Target::Screen
        };
        surface.triangles(
            target,
            &self.shapes.vertices,
            &self.shapes.indices,
            None,
            &TriangleOptions::default(),
        );

        if let Some((pass, water_assets)) = water {
            let water_colors: [Nrgba; 4] = [
                tables.color(ColorName::RetryWater1),
                tables.color(ColorName::RetryWater2),
                tables.color(ColorName::RetryWater3),
                tables.color(ColorName::RetryWater4),
            ];
            let (_, screen_h) = surface.screen_size();
            let call = water_call(&water_assets, bottom.union(&top), water_colors, &pass, screen_h as f64);
            finish_water(surface, &call);
        }

        let icon = assets.ui.rect(UI_RETRY);
        let unit = top.width().min(top.height());
        let scale = unit / icon.width().max(icon.height()) * 0.6;
        let fit = Rect::from_wh(icon.width() * scale, icon.height() * scale);
        let center = top.center();

        self.icons.reset();
        for (offset, color) in [(-0.02, colors[2]), (0.02, colors[3])] {
            let at = center + pt(0.0, top.height() * offset);
            self.icons
                .push_rect(fit.centered_at(at), icon, color.to_premultiplied_f32());
        }
        surface.triangles(
            Target::Screen,
            &self.icons.vertices,
            &self.icons.indices,
            Some(assets.ui.image.id),
            &TriangleOptions::default(),
        );
    }
}
