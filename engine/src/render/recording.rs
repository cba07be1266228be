use crate::color::Nrgba;

use super::batch::Vertex;
use super::{Filter, FontId, ImageId, RectShaderCall, Surface, Target, TextLayout, TriangleOptions};

/// One call received by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Fill {
        target: Target,
        color: Nrgba,
    },
    Clear {
        target: Target,
    },
    EnsureOffscreen {
        target: Target,
        width: u32,
        height: u32,
    },
    Triangles {
        target: Target,
        vertices: usize,
        indices: usize,
        image: Option<ImageId>,
        options: TriangleOptions,
    },
    RectShader {
        target: Target,
        call: RectShaderCall,
    },
    DrawTarget {
        dst: Target,
        src: Target,
        filter: Filter,
    },
    Text {
        target: Target,
        font: FontId,
        text: String,
        layout: TextLayout,
    },
}

/// A [`Surface`] that only remembers what it was asked to draw. Used by the
/// headless driver and in tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Total triangles across all batches.
    pub fn triangle_count(&self) -> usize {
        self.calls
            .iter()
            .map(|call| match call {
                DrawCall::Triangles { indices, .. } => indices / 3,
                _ => 0,
            })
            .sum()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn shader_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::RectShader { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill(&mut self, target: Target, color: Nrgba) {
        self.calls.push(DrawCall::Fill { target, color });
    }

    fn clear(&mut self, target: Target) {
        self.calls.push(DrawCall::Clear { target });
    }

    fn ensure_offscreen(&mut self, target: Target, width: u32, height: u32) {
        self.calls.push(DrawCall::EnsureOffscreen {
            target,
            width,
            height,
        });
    }

    fn triangles(
        &mut self,
        target: Target,
        vertices: &[Vertex],
        indices: &[u32],
        image: Option<ImageId>,
        options: &TriangleOptions,
    ) {
        if let Some(&max) = indices.iter().max() {
            assert!(
                (max as usize) < vertices.len(),
                "index {} out of range for {} vertices",
                max,
                vertices.len()
            );
        }
        self.calls.push(DrawCall::Triangles {
            target,
            vertices: vertices.len(),
            indices: indices.len(),
            image,
            options: *options,
        });
    }

    fn rect_shader(&mut self, target: Target, call: &RectShaderCall) {
        self.calls.push(DrawCall::RectShader {
            target,
            call: *call,
        });
    }

    fn draw_target(&mut self, dst: Target, src: Target, filter: Filter) {
        self.calls.push(DrawCall::DrawTarget { dst, src, filter });
    }

    fn draw_text(&mut self, target: Target, font: FontId, text: &str, layout: &TextLayout) {
        self.calls.push(DrawCall::Text {
            target,
            font,
            text: text.to_string(),
            layout: *layout,
        });
    }
}
