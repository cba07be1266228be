use crate::assets::WaterAssets;
use crate::color::Nrgba;
use crate::geom::Rect;
use crate::timer::Seconds;

use super::{Blend, Filter, RectShaderCall, Surface, Target, WaterUniforms};

/// How far the water spills past the shape it is composed over.
pub const WATER_BLEED: f64 = 3.0;

/// Water shader inputs for one pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WaterPass {
    pub alpha: f64,
    /// Seconds added to the shader clock.
    pub flow_offset: Seconds,
    pub time: Seconds,
}

impl WaterPass {
    pub fn is_visible(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Builds the shader call that paints `colors`, faded by `pass.alpha`, over
/// `rect`.
pub fn water_call(
    assets: &WaterAssets,
    rect: Rect,
    colors: [Nrgba; 4],
    pass: &WaterPass,
    screen_height: f64,
) -> RectShaderCall {
    let colors = colors.map(|color| {
        let [r, g, b, a] = color.fade(pass.alpha).to_normalized(true);
        [r as f32, g as f32, b as f32, a as f32]
    });
    RectShaderCall {
        shader: assets.shader,
        rect: rect.inset(-WATER_BLEED),
        images: assets.noise,
        uniforms: WaterUniforms {
            time: (pass.time + pass.flow_offset) as f32,
            offset: [0.0, 0.0],
            colors,
            screen_height: screen_height as f32,
        },
        blend: Blend::SourceAtop,
    }
}

/// Starts a water composition: shapes drawn into [`Target::Water`] until
/// [`finish_water`] is called.
pub fn begin_water(surface: &mut dyn Surface) {
    let (w, h) = surface.screen_size();
    surface.ensure_offscreen(Target::Water, w, h);
    surface.clear(Target::Water);
}

/// Paints the water over what was drawn since [`begin_water`] and composites
/// the result onto the screen.
pub fn finish_water(surface: &mut dyn Surface, call: &RectShaderCall) {
    surface.rect_shader(Target::Water, call);
    surface.draw_target(Target::Screen, Target::Water, Filter::Nearest);
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb;
    use crate::render::{ImageId, ShaderId};

    #[test]
    fn call_fades_colors_and_grows_rect() {
        let assets = WaterAssets {
            shader: ShaderId(7),
            noise: [ImageId(1), ImageId(2)],
        };
        let pass = WaterPass {
            alpha: 0.0,
            flow_offset: 2.0,
            time: 1.0,
        };
        let call = water_call(&assets, Rect::from_wh(10.0, 10.0), [rgb(255, 0, 0); 4], &pass, 600.0);
        assert_eq!(call.rect, Rect::new(-3.0, -3.0, 13.0, 13.0));
        assert_eq!(call.uniforms.time, 3.0);
        assert_eq!(call.uniforms.colors[0], [0.0; 4]);
        assert_eq!(call.blend, Blend::SourceAtop);
        assert!(!pass.is_visible());
    }
}
