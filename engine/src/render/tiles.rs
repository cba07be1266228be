use ndarray::Array2;
use tilesweeper_core::{Board, BoardIter, Coord2, ToNdIndex, grid_shape};

use crate::assets::Assets;
use crate::color::mod_color;
use crate::ease::clamp01;
use crate::geom::{Point, Rect, pt};
use crate::sprite::{TILE_MINE, TILE_RECT, TILE_ROUND_ALL, round_tile};
use crate::style::{FgType, TileStyle};
use crate::tables::{ColorName, Tables};
use crate::view::{tile_rect, tile_size};

use super::batch::ViBuffer;
use super::water::{WaterPass, begin_water, finish_water, water_call};
use super::{Filter, Surface, Target, TextLayout, TriangleOptions};

/// Glyph size the digit face is laid out at while zooming, then rescaled.
pub const ZOOM_DIGIT_SIZE: f64 = 64.0;
/// Digit height relative to the foreground rect.
pub const DIGIT_HEIGHT: f64 = 0.7;

/// One board frame as the renderer sees it.
#[derive(Copy, Clone, Debug)]
pub struct BoardFrame<'a> {
    pub board: &'a Board,
    /// Transformed board rect.
    pub board_rect: Rect,
    pub styles: &'a Array2<TileStyle>,
    /// Present while the water effect should run.
    pub water: Option<WaterPass>,
    /// The view is changing scale this frame.
    pub zooming: bool,
}

/// Per-tile geometry derived from the render styles.
#[derive(Clone, Debug)]
struct TileCache {
    size: Coord2,
    draw_bg: Array2<bool>,
    draw_tile: Array2<bool>,
    draw_fg: Array2<bool>,
    bg_rects: Array2<Rect>,
    stroke_rects: Array2<Rect>,
    fill_rects: Array2<Rect>,
    firm: Array2<bool>,
    round: Array2<[bool; 4]>,
}

impl TileCache {
    fn new(size: Coord2) -> Self {
        let shape = grid_shape(size);
        Self {
            size,
            draw_bg: Array2::default(shape),
            draw_tile: Array2::default(shape),
            draw_fg: Array2::default(shape),
            bg_rects: Array2::from_elem(shape, Rect::ZERO),
            stroke_rects: Array2::from_elem(shape, Rect::ZERO),
            fill_rects: Array2::from_elem(shape, Rect::ZERO),
            firm: Array2::default(shape),
            round: Array2::from_elem(shape, [true; 4]),
        }
    }

    fn rebuild(&mut self, board_rect: Rect, styles: &Array2<TileStyle>) {
        let size = self.size;
        let (tile_w, tile_h) = tile_size(board_rect, size);
        let unit = tile_w.min(tile_h);
        let inset = (unit * 0.065).round().max(2.0);
        let lift = (unit * 0.015).round().max(1.0);

        for coords in BoardIter::whole(size) {
            let idx = coords.to_nd_index();
            let style = &styles[idx];
            let rect = tile_rect(board_rect, size, coords);

            self.draw_bg[idx] = style.should_draw_bg();
            self.draw_tile[idx] = style.should_draw_tile();
            self.draw_fg[idx] = style.should_draw_fg();

            if self.draw_bg[idx] {
                self.bg_rects[idx] = rect
                    .translate(pt(style.bg_offset_x, style.bg_offset_y))
                    .scale_centered(style.bg_scale, style.bg_scale);
            }

            if self.draw_tile[idx] || self.draw_fg[idx] {
                let moved = rect
                    .translate(pt(style.tile_offset_x, style.tile_offset_y))
                    .scale_centered(style.tile_scale, style.tile_scale);
                self.stroke_rects[idx] = moved.inset(-inset);
                self.fill_rects[idx] = moved.translate(pt(0.0, -lift));
            }

            self.firm[idx] = style.is_firmly_placed();
        }

        // corners of a firm tile flatten where a firm neighbor touches it
        for coords in BoardIter::whole(size) {
            let idx = coords.to_nd_index();
            let mut round = [true; 4];
            if self.firm[idx] {
                let (x, y) = coords;
                let sides = [(x, y - 1), (x + 1, y), (x, y + 1), (x - 1, y)];
                for (i, side) in sides.into_iter().enumerate() {
                    if self.contains(side) && self.firm[side.to_nd_index()] {
                        round[i] = false;
                        round[(i + 1) % 4] = false;
                    }
                }
            }
            self.round[idx] = round;
        }
    }

    fn contains(&self, (x, y): Coord2) -> bool {
        0 <= x && x < self.size.0 && 0 <= y && y < self.size.1
    }
}

/// Draws the board from its render styles. Buffers and the tile cache are
/// reused between frames and only reallocated when the board size changes.
#[derive(Clone, Debug)]
pub struct TileRenderer {
    shapes: ViBuffer,
    sprites: ViBuffer,
    flags: ViBuffer,
    cache: TileCache,
}

impl Default for TileRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRenderer {
    pub fn new() -> Self {
        Self {
            shapes: ViBuffer::with_capacity(1024),
            sprites: ViBuffer::with_capacity(512),
            flags: ViBuffer::with_capacity(512),
            cache: TileCache::new((0, 0)),
        }
    }

    /// Corner roundness of `coords` as of the last draw, clockwise from the
    /// top left.
    pub fn roundness(&self, coords: Coord2) -> Option<[bool; 4]> {
        self.cache
            .contains(coords)
            .then(|| self.cache.round[coords.to_nd_index()])
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, assets: &Assets, tables: &Tables, frame: &BoardFrame<'_>) {
        let size = frame.board.size();
        if self.cache.size != size {
            log::debug!("Tile cache resized to {}x{}", size.0, size.1);
            self.cache = TileCache::new(size);
        }
        self.cache.rebuild(frame.board_rect, frame.styles);

        self.shapes.reset();
        self.sprites.reset();
        self.flags.reset();

        self.push_backgrounds(assets, tables, frame.styles);
        self.push_tiles(assets, tables, frame.styles);
        self.push_flags(assets, tables, frame.styles);

        let water = match (frame.water, assets.water) {
            (Some(pass), Some(water_assets)) if pass.is_visible() => Some((pass, water_assets)),
            _ => None,
        };

        let options = TriangleOptions {
            filter: Filter::Linear,
            ..TriangleOptions::default()
        };
        let shape_target = if water.is_some() {
            begin_water(surface);
            Target::Water
        } else {
            Target::Screen
        };
        surface.triangles(
            shape_target,
            &self.shapes.vertices,
            &self.shapes.indices,
            Some(assets.tiles.image.id),
            &options,
        );

        if let Some((pass, water_assets)) = water {
            let colors = [
                tables.color(ColorName::Water1),
                tables.color(ColorName::Water2),
                tables.color(ColorName::Water3),
                tables.color(ColorName::Water4),
            ];
            let (_, screen_h) = surface.screen_size();
            let call = water_call(&water_assets, frame.board_rect, colors, &pass, screen_h as f64);
            finish_water(surface, &call);
        }

        if !self.sprites.is_empty() {
            surface.triangles(
                Target::Screen,
                &self.sprites.vertices,
                &self.sprites.indices,
                Some(assets.tiles.image.id),
                &options,
            );
        }
        if !self.flags.is_empty() {
            surface.triangles(
                Target::Screen,
                &self.flags.vertices,
                &self.flags.indices,
                Some(assets.flags.image.id),
                &options,
            );
        }

        self.draw_digits(surface, assets, tables, frame);
    }

    fn push_backgrounds(&mut self, assets: &Assets, tables: &Tables, styles: &Array2<TileStyle>) {
        let cache = &self.cache;
        let highlight = tables.color(ColorName::BgHighlight);
        let rect_tile = assets.tiles.rect(TILE_RECT);
        let round_tile_all = assets.tiles.rect(TILE_ROUND_ALL);
        let mine = assets.tiles.rect(TILE_MINE);

        for coords in BoardIter::whole(cache.size) {
            let idx = coords.to_nd_index();
            if !cache.draw_bg[idx] {
                continue;
            }
            let style = &styles[idx];
            let bg = cache.bg_rects[idx];

            self.shapes.push_rect(
                bg,
                rect_tile,
                mod_color(style.bg_fill_color, style.bg_alpha, style.highlight, highlight),
            );

            if style.bg_bomb_anim > 0.0 {
                let t = clamp01(style.bg_bomb_anim);
                let unit = bg.width().min(bg.height());
                let outer_margin = (unit * 0.04).max(1.0);
                let inner_margin = (unit * 0.06).max(1.0);

                let outer = bg.inset(outer_margin);
                let outer = outer.inset(outer.width().min(outer.height()) * 0.5 * (1.0 - t));
                let inner = outer.inset(inner_margin).translate(pt(0.0, inner_margin));

                let color = |name| mod_color(tables.color(name), style.bg_alpha, style.highlight, highlight);
                self.shapes
                    .push_rect(outer, round_tile_all, color(ColorName::MineBg1));
                self.shapes
                    .push_rect(inner, round_tile_all, color(ColorName::MineBg2));
                self.sprites
                    .push_sprite_in(inner, 1.0, Point::ZERO, mine, color(ColorName::Mine));
            }
        }
    }

    fn push_tiles(&mut self, assets: &Assets, tables: &Tables, styles: &Array2<TileStyle>) {
        let cache = &self.cache;
        let highlight = tables.color(ColorName::TileHighlight);

        // strokes first so no stroke covers a neighboring fill
        for coords in BoardIter::whole(cache.size) {
            let idx = coords.to_nd_index();
            if !cache.draw_tile[idx] {
                continue;
            }
            let style = &styles[idx];
            let (sprite, turns) = round_tile(cache.round[idx]);
            self.shapes.push_rotated_quad(
                cache.stroke_rects[idx],
                assets.tiles.rect(sprite),
                turns,
                style
                    .tile_stroke_color
                    .fade(style.tile_alpha)
                    .to_premultiplied_f32(),
            );
        }

        for coords in BoardIter::whole(cache.size) {
            let idx = coords.to_nd_index();
            if !cache.draw_tile[idx] {
                continue;
            }
            let style = &styles[idx];
            let (sprite, turns) = round_tile(cache.round[idx]);
            self.shapes.push_rotated_quad(
                cache.fill_rects[idx],
                assets.tiles.rect(sprite),
                turns,
                mod_color(style.tile_fill_color, style.tile_alpha, style.highlight, highlight),
            );
        }
    }

    fn push_flags(&mut self, assets: &Assets, tables: &Tables, styles: &Array2<TileStyle>) {
        let cache = &self.cache;
        let highlight = tables.color(ColorName::FgHighlight);

        for coords in BoardIter::whole(cache.size) {
            let idx = coords.to_nd_index();
            let style = &styles[idx];
            if !cache.draw_fg[idx] || style.fg_type != FgType::Flag {
                continue;
            }
            let frame = assets.flags.frame_at(style.fg_flag_anim);
            self.flags.push_sprite_in(
                cache.fill_rects[idx],
                style.fg_scale,
                pt(style.fg_offset_x, style.fg_offset_y),
                assets.flags.rect(frame),
                mod_color(style.fg_color, style.fg_alpha, style.highlight, highlight),
            );
        }
    }

    fn draw_digits(&self, surface: &mut dyn Surface, assets: &Assets, tables: &Tables, frame: &BoardFrame<'_>) {
        let cache = &self.cache;
        let highlight = tables.color(ColorName::FgHighlight);
        let mut text = String::with_capacity(1);

        for coords in BoardIter::whole(cache.size) {
            let idx = coords.to_nd_index();
            let style = &frame.styles[idx];
            if !cache.draw_fg[idx] || style.fg_type != FgType::Number {
                continue;
            }
            if !(1..=8).contains(&style.fg_number) {
                continue;
            }

            let rect = cache.fill_rects[idx];
            let height = rect.width().min(rect.height()) * DIGIT_HEIGHT * style.fg_scale;
            let (size, scale) = if frame.zooming {
                (ZOOM_DIGIT_SIZE, height / ZOOM_DIGIT_SIZE)
            } else {
                (height.round().max(1.0), 1.0)
            };

            text.clear();
            text.push(char::from(b'0' + style.fg_number));
            surface.draw_text(
                Target::Screen,
                assets.digit_font,
                &text,
                &TextLayout {
                    center: rect.center() + pt(style.fg_offset_x, style.fg_offset_y),
                    size,
                    scale,
                    color: mod_color(style.fg_color, style.fg_alpha, style.highlight, highlight),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::render::{DrawCall, RecordingSurface};
    use crate::style::target_styles;

    struct Scene {
        board: Board,
        tables: Tables,
        assets: Assets,
        styles: Array2<TileStyle>,
    }

    impl Scene {
        fn new(layout: &[&str]) -> Self {
            let board = Board::from_layout(layout).unwrap();
            let tables = Tables::default();
            let styles = target_styles(&board, &tables);
            Self {
                board,
                tables,
                assets: Assets::load(&MemoryAssets::builtin()).unwrap(),
                styles,
            }
        }

        fn draw(&self, renderer: &mut TileRenderer, water: Option<WaterPass>, zooming: bool) -> RecordingSurface {
            let mut surface = RecordingSurface::new(400, 400);
            let (w, h) = self.board.size();
            let frame = BoardFrame {
                board: &self.board,
                board_rect: Rect::from_wh(w as f64 * 40.0, h as f64 * 40.0),
                styles: &self.styles,
                water,
                zooming,
            };
            renderer.draw(&mut surface, &self.assets, &self.tables, &frame);
            surface
        }
    }

    #[test]
    fn revealed_region_merges_corners() {
        let scene = Scene::new(&["@@.", "@@.", "..*"]);
        let mut renderer = TileRenderer::new();
        scene.draw(&mut renderer, None, false);

        // every corner of the top left tile touches another firm tile
        assert_eq!(renderer.roundness((0, 0)), Some([true, false, false, false]));
        assert_eq!(renderer.roundness((1, 1)), Some([false, false, true, false]));
        // hidden tiles stay round
        assert_eq!(renderer.roundness((2, 2)), Some([true; 4]));
        assert_eq!(renderer.roundness((3, 0)), None);
    }

    #[test]
    fn animating_tile_is_isolated() {
        let mut scene = Scene::new(&["@@", ".*"]);
        scene.styles[(1, 0).to_nd_index()].tile_offset_y = 5.0;
        let mut renderer = TileRenderer::new();
        scene.draw(&mut renderer, None, false);
        assert_eq!(renderer.roundness((0, 0)), Some([true; 4]));
        assert_eq!(renderer.roundness((1, 0)), Some([true; 4]));
    }

    #[test]
    fn digits_go_through_text() {
        let scene = Scene::new(&["@*", "@@"]);
        let mut renderer = TileRenderer::new();
        let surface = scene.draw(&mut renderer, None, false);
        let texts: Vec<_> = surface.texts().collect();
        assert_eq!(texts, ["1", "1", "1"]);

        let zooming = scene.draw(&mut renderer, None, true);
        let sizes: Vec<_> = zooming
            .calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { layout, .. } => Some(layout.size),
                _ => None,
            })
            .collect();
        assert!(sizes.iter().all(|&size| size == ZOOM_DIGIT_SIZE));
    }

    #[test]
    fn water_composes_offscreen() {
        let scene = Scene::new(&["@*"]);
        let mut renderer = TileRenderer::new();
        let pass = WaterPass {
            alpha: 0.5,
            flow_offset: 0.0,
            time: 0.0,
        };
        let surface = scene.draw(&mut renderer, Some(pass), false);
        assert_eq!(surface.shader_calls(), 1);
        assert!(surface.calls.iter().any(|call| matches!(
            call,
            DrawCall::Triangles {
                target: Target::Water,
                ..
            }
        )));

        let dry = scene.draw(&mut renderer, None, false);
        assert_eq!(dry.shader_calls(), 0);
    }

    #[test]
    fn bomb_flash_adds_mine_sprite() {
        let mut scene = Scene::new(&["*."]);
        scene.styles[(0, 0).to_nd_index()].bg_bomb_anim = 1.0;
        let mut renderer = TileRenderer::new();
        let surface = scene.draw(&mut renderer, None, false);
        let batches: Vec<_> = surface
            .calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Triangles { indices, image, .. } => Some((*indices, *image)),
                _ => None,
            })
            .collect();
        // two backgrounds plus two flash layers, then the mine icon
        assert_eq!(batches[0].0, 4 * 6);
        assert_eq!(batches[1], (6, Some(scene.assets.tiles.image.id)));
    }
}
