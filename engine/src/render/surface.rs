use serde::{Deserialize, Serialize};

use crate::color::Nrgba;
use crate::geom::{Point, Rect};

use super::batch::Vertex;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontId(pub u32);

/// An image the embedder decoded, with known pixel dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: ImageId,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn bounds(&self) -> Rect {
        Rect::from_wh(self.width as f64, self.height as f64)
    }
}

/// Part of an image, in source pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubView {
    pub image: ImageId,
    pub rect: Rect,
}

/// Where a draw call lands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Screen,
    /// Offscreen target the water effect composes into.
    Water,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blend {
    SourceOver,
    SourceAtop,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillRule {
    FillAll,
    NonZero,
    EvenOdd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScaleMode {
    Straight,
    Premultiplied,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleOptions {
    pub blend: Blend,
    pub filter: Filter,
    pub antialias: bool,
    pub fill_rule: FillRule,
    pub color_scale_mode: ColorScaleMode,
}

impl Default for TriangleOptions {
    fn default() -> Self {
        Self {
            blend: Blend::SourceOver,
            filter: Filter::Linear,
            antialias: false,
            fill_rule: FillRule::FillAll,
            color_scale_mode: ColorScaleMode::Premultiplied,
        }
    }
}

/// Uniforms of the water shader. Colors are premultiplied.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterUniforms {
    pub time: f32,
    pub offset: [f32; 2],
    pub colors: [[f32; 4]; 4],
    pub screen_height: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectShaderCall {
    pub shader: ShaderId,
    pub rect: Rect,
    pub images: [ImageId; 2],
    pub uniforms: WaterUniforms,
    pub blend: Blend,
}

/// How a string is placed by [`Surface::draw_text`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLayout {
    /// Center of the text box.
    pub center: Point,
    /// Glyph height in pixels.
    pub size: f64,
    /// Extra scale applied after layout.
    pub scale: f64,
    /// Premultiplied.
    pub color: [f32; 4],
}

/// The drawing backend the engine renders into.
pub trait Surface {
    fn screen_size(&self) -> (u32, u32);

    fn fill(&mut self, target: Target, color: Nrgba);

    fn clear(&mut self, target: Target);

    /// Makes sure the offscreen `target` exists with at least the given size.
    fn ensure_offscreen(&mut self, target: Target, width: u32, height: u32);

    /// Untextured when `image` is `None`.
    fn triangles(
        &mut self,
        target: Target,
        vertices: &[Vertex],
        indices: &[u32],
        image: Option<ImageId>,
        options: &TriangleOptions,
    );

    fn rect_shader(&mut self, target: Target, call: &RectShaderCall);

    /// Composites the whole of `src` onto `dst`.
    fn draw_target(&mut self, dst: Target, src: Target, filter: Filter);

    fn draw_text(&mut self, target: Target, font: FontId, text: &str, layout: &TextLayout);
}
