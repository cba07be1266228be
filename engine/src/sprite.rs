use serde::{Deserialize, Serialize};

use crate::error::{AssetError, AssetResult};
use crate::geom::Rect;
use crate::render::{ImageInfo, SubView};

/// Tile sheet: digits `1..=8` live at `n - 1`.
pub const TILE_MINE: usize = 9;
pub const TILE_RECT: usize = 20;
pub const TILE_ROUND_ONE: usize = 21;
pub const TILE_ROUND_TWO: usize = 22;
pub const TILE_ROUND_THREE: usize = 23;
pub const TILE_ROUND_ALL: usize = 24;

/// UI sheet frames.
pub const UI_CURSOR: usize = 0;
pub const UI_DRAG_SIGN: usize = 1;
pub const UI_RETRY: usize = 2;

/// Sprite sheet metadata as stored next to the image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpriteMetadata {
    pub sprite_width: u32,
    pub sprite_height: u32,
    pub sprite_count: u32,
    pub sprite_margin: u32,
}

/// Equal-sized sprites laid out row-major with a margin after each one.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub image: ImageInfo,
    pub width: u32,
    pub height: u32,
    pub count: u32,
    pub margin: u32,
}

impl SpriteSheet {
    pub fn new(image: ImageInfo, metadata: SpriteMetadata) -> Self {
        Self {
            image,
            width: metadata.sprite_width,
            height: metadata.sprite_height,
            count: metadata.sprite_count,
            margin: metadata.sprite_margin,
        }
    }

    /// Parses the JSON metadata for `image`.
    pub fn parse(name: &'static str, image: ImageInfo, json: &[u8]) -> AssetResult<Self> {
        let metadata: SpriteMetadata =
            serde_json::from_slice(json).map_err(|source| AssetError::Json { name, source })?;
        if metadata.sprite_width == 0 || metadata.sprite_height == 0 {
            return Err(AssetError::InvalidSprite {
                name,
                reason: "zero sized sprite".to_string(),
            });
        }
        if metadata.sprite_count == 0 {
            return Err(AssetError::InvalidSprite {
                name,
                reason: "no sprites".to_string(),
            });
        }
        Ok(Self::new(image, metadata))
    }

    /// Source rect of sprite `n`. Panics when `n` is out of range.
    pub fn rect(&self, n: usize) -> Rect {
        assert!(
            n < self.count as usize,
            "sprite index out of range [{}] with length {}",
            n,
            self.count
        );

        let w = self.width + self.margin;
        let h = self.height + self.margin;
        let cols = (self.image.width / w).max(1) as usize;

        let col = (n % cols) as u32;
        let row = (n / cols) as u32;

        Rect::from_xywh(
            (col * w) as f64,
            (row * h) as f64,
            self.width as f64,
            self.height as f64,
        )
    }

    pub fn subview(&self, n: usize) -> SubView {
        SubView {
            image: self.image.id,
            rect: self.rect(n),
        }
    }

    /// Animation frame for progress `t ∈ [0, 1]`.
    pub fn frame_at(&self, t: f64) -> usize {
        let last = self.count.saturating_sub(1) as f64;
        (t.clamp(0.0, 1.0) * last).round() as usize
    }
}

/// Tile sprite and quarter turns for the corner roundness mask, corners
/// clockwise from the top left.
pub fn round_tile(is_round: [bool; 4]) -> (usize, u8) {
    const D0: u8 = 0;
    const D90: u8 = 1;
    const D180: u8 = 2;
    const D270: u8 = 3;

    let [r0, r1, r2, r3] = is_round;
    match is_round.iter().filter(|&&round| round).count() {
        0 => (TILE_RECT, D0),
        1 => {
            let turns = if r0 {
                D0
            } else if r1 {
                D90
            } else if r2 {
                D180
            } else {
                D270
            };
            (TILE_ROUND_ONE, turns)
        }
        2 => {
            let turns = if !r0 && !r1 {
                D180
            } else if !r1 && !r2 {
                D270
            } else if !r2 && !r3 {
                D0
            } else if !r3 && !r0 {
                D90
            } else {
                // opposite corners have no sprite, fall back to fully round
                return (TILE_ROUND_ALL, D0);
            };
            (TILE_ROUND_TWO, turns)
        }
        3 => {
            let turns = if !r0 {
                D90
            } else if !r1 {
                D180
            } else if !r2 {
                D270
            } else {
                D0
            };
            (TILE_ROUND_THREE, turns)
        }
        _ => (TILE_ROUND_ALL, D0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ImageId;

    fn sheet(image_w: u32, count: u32) -> SpriteSheet {
        SpriteSheet::new(
            ImageInfo {
                id: ImageId(1),
                width: image_w,
                height: 64,
            },
            SpriteMetadata {
                sprite_width: 10,
                sprite_height: 12,
                sprite_count: count,
                sprite_margin: 2,
            },
        )
    }

    #[test]
    fn metadata_uses_pascal_case_keys() {
        let json = br#"{"SpriteWidth": 10, "SpriteHeight": 12, "SpriteCount": 5, "SpriteMargin": 2}"#;
        let image = sheet(36, 1).image;
        let parsed = SpriteSheet::parse("tiles", image, json).unwrap();
        assert_eq!(parsed, sheet(36, 5));
    }

    #[test]
    fn invalid_metadata_is_rejected() {
        let image = sheet(36, 1).image;
        assert!(matches!(
            SpriteSheet::parse("tiles", image, b"{}"),
            Err(AssetError::Json { .. })
        ));
        let zero = br#"{"SpriteWidth": 0, "SpriteHeight": 12, "SpriteCount": 5, "SpriteMargin": 0}"#;
        assert!(matches!(
            SpriteSheet::parse("tiles", image, zero),
            Err(AssetError::InvalidSprite { .. })
        ));
    }

    #[test]
    fn rects_wrap_rows() {
        let sheet = sheet(36, 6);
        assert_eq!(sheet.rect(0), Rect::from_xywh(0.0, 0.0, 10.0, 12.0));
        assert_eq!(sheet.rect(2), Rect::from_xywh(24.0, 0.0, 10.0, 12.0));
        assert_eq!(sheet.rect(4), Rect::from_xywh(12.0, 14.0, 10.0, 12.0));
    }

    #[test]
    fn narrow_image_still_has_one_column() {
        let sheet = sheet(5, 3);
        assert_eq!(sheet.rect(2), Rect::from_xywh(0.0, 28.0, 10.0, 12.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_panics() {
        sheet(36, 3).rect(3);
    }

    #[test]
    fn frames_round_to_nearest() {
        let sheet = sheet(36, 5);
        assert_eq!(sheet.frame_at(0.0), 0);
        assert_eq!(sheet.frame_at(0.6), 2);
        assert_eq!(sheet.frame_at(1.0), 4);
    }

    #[test]
    fn round_tile_orientation() {
        assert_eq!(round_tile([false; 4]), (TILE_RECT, 0));
        assert_eq!(round_tile([true; 4]), (TILE_ROUND_ALL, 0));
        assert_eq!(round_tile([false, false, true, false]), (TILE_ROUND_ONE, 2));
        assert_eq!(round_tile([false, false, true, true]), (TILE_ROUND_TWO, 2));
        assert_eq!(round_tile([true, false, false, true]), (TILE_ROUND_TWO, 3));
        assert_eq!(round_tile([true, true, false, true]), (TILE_ROUND_THREE, 3));
    }
}
