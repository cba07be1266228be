use crate::error::{AssetError, AssetResult};
use crate::render::{FontId, ImageId, ImageInfo, ShaderId};
use crate::sprite::SpriteSheet;
use crate::tables::{BezierTable, ColorTable, HsvTable, Table, TableKey, Tables};

pub const TILE_SHEET: &str = "tiles";
pub const FLAG_SHEET: &str = "flags";
pub const UI_SHEET: &str = "ui";
pub const DIGIT_FONT: &str = "digits";
pub const WATER_SHADER: &str = "water";
pub const WATER_NOISE: [&str; 2] = ["water_noise1", "water_noise2"];
pub const COLOR_TABLE: &str = "color_table.json";
pub const BEZIER_TABLE: &str = "bezier_table.json";
pub const HSV_TABLE: &str = "hsv_table.json";

/// Decoding and lookup of raw assets, provided by the embedder.
pub trait AssetSource {
    fn bytes(&self, name: &str) -> Option<Vec<u8>>;

    fn image(&self, name: &str) -> Option<ImageInfo>;

    fn shader(&self, name: &str) -> Option<ShaderId>;

    fn font(&self, name: &str) -> Option<FontId>;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WaterAssets {
    pub shader: ShaderId,
    pub noise: [ImageId; 2],
}

/// Everything the renderer draws with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Assets {
    pub tiles: SpriteSheet,
    pub flags: SpriteSheet,
    pub ui: SpriteSheet,
    pub digit_font: FontId,
    /// Absent when the shader or its noise textures are missing.
    pub water: Option<WaterAssets>,
}

fn load_sheet(source: &dyn AssetSource, name: &'static str) -> AssetResult<SpriteSheet> {
    let image = source.image(name).ok_or(AssetError::Missing(name))?;
    let metadata_name = format!("{name}.json");
    let metadata = source
        .bytes(&metadata_name)
        .ok_or(AssetError::Missing(name))?;
    SpriteSheet::parse(name, image, &metadata)
}

fn load_water(source: &dyn AssetSource) -> Option<WaterAssets> {
    let Some(shader) = source.shader(WATER_SHADER) else {
        log::warn!("Water shader is missing, water effect disabled");
        return None;
    };
    let mut noise = [ImageId(0); 2];
    for (slot, name) in noise.iter_mut().zip(WATER_NOISE) {
        let Some(image) = source.image(name) else {
            log::warn!("Water noise {:?} is missing, water effect disabled", name);
            return None;
        };
        *slot = image.id;
    }
    Some(WaterAssets { shader, noise })
}

fn load_table<K: TableKey>(source: &dyn AssetSource, name: &str) -> Table<K> {
    let Some(bytes) = source.bytes(name) else {
        log::warn!("{} is missing, using built-in defaults", name);
        return Table::new();
    };
    let text = String::from_utf8_lossy(&bytes);
    match Table::from_json(&text) {
        Ok(table) => table,
        Err(err) => {
            log::warn!("{} is malformed ({}), using built-in defaults", name, err);
            Table::new()
        }
    }
}

impl Assets {
    /// Loads the mandatory assets. Fails on the first one missing.
    pub fn load(source: &dyn AssetSource) -> AssetResult<Self> {
        let tiles = load_sheet(source, TILE_SHEET)?;
        let flags = load_sheet(source, FLAG_SHEET)?;
        let ui = load_sheet(source, UI_SHEET)?;
        let digit_font = source
            .font(DIGIT_FONT)
            .ok_or(AssetError::Missing(DIGIT_FONT))?;
        let water = load_water(source);

        log::info!(
            "Loaded assets: {} tiles, {} flag frames, water {}",
            tiles.count,
            flags.count,
            if water.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            tiles,
            flags,
            ui,
            digit_font,
            water,
        })
    }
}

impl Tables {
    /// Loads the tuning tables. Every table is optional.
    pub fn load(source: &dyn AssetSource) -> Self {
        let colors: ColorTable = load_table(source, COLOR_TABLE);
        let curves: BezierTable = load_table(source, BEZIER_TABLE);
        let hsv: HsvTable = load_table(source, HSV_TABLE);
        Self {
            colors,
            curves,
            hsv,
        }
    }

    /// Serializes every table under its asset name.
    pub fn save(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        Ok(vec![
            (COLOR_TABLE, self.colors.to_json()?),
            (BEZIER_TABLE, self.curves.to_json()?),
            (HSV_TABLE, self.hsv.to_json()?),
        ])
    }
}

/// In-memory [`AssetSource`], for headless runs and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    pub bytes: hashbrown::HashMap<String, Vec<u8>>,
    pub images: hashbrown::HashMap<String, ImageInfo>,
    pub shaders: hashbrown::HashMap<String, ShaderId>,
    pub fonts: hashbrown::HashMap<String, FontId>,
}

impl MemoryAssets {
    /// A bundle with every mandatory asset and the water effect.
    pub fn builtin() -> Self {
        let mut assets = Self::default();
        let sheets = [
            (TILE_SHEET, 1, 32, 25, 34 * 5),
            (FLAG_SHEET, 2, 32, 8, 34 * 8),
            (UI_SHEET, 3, 64, 3, 66 * 3),
        ];
        for (name, id, size, count, image_width) in sheets {
            assets.images.insert(
                name.to_string(),
                ImageInfo {
                    id: ImageId(id),
                    width: image_width,
                    height: (size + 2) * 5,
                },
            );
            let metadata = format!(
                r#"{{"SpriteWidth": {size}, "SpriteHeight": {size}, "SpriteCount": {count}, "SpriteMargin": 2}}"#
            );
            assets
                .bytes
                .insert(format!("{name}.json"), metadata.into_bytes());
        }
        for (i, name) in WATER_NOISE.iter().enumerate() {
            assets.images.insert(
                name.to_string(),
                ImageInfo {
                    id: ImageId(10 + i as u32),
                    width: 256,
                    height: 256,
                },
            );
        }
        assets.shaders.insert(WATER_SHADER.to_string(), ShaderId(1));
        assets.fonts.insert(DIGIT_FONT.to_string(), FontId(1));
        assets
    }
}

impl AssetSource for MemoryAssets {
    fn bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.bytes.get(name).cloned()
    }

    fn image(&self, name: &str) -> Option<ImageInfo> {
        self.images.get(name).copied()
    }

    fn shader(&self, name: &str) -> Option<ShaderId> {
        self.shaders.get(name).copied()
    }

    fn font(&self, name: &str) -> Option<FontId> {
        self.fonts.get(name).copied()
    }
}
