//! Tuning tables: colors, Bezier curves and HSV modifiers keyed by stable
//! names. Persisted as JSON objects mapping each name to its value.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::color::{HsvMod, Nrgba, rgb, rgba};
use crate::ease::BezierCurve;
use crate::geom::pt;

/// Keys of a tuning table. Names are stable across versions.
pub trait TableKey: Copy + fmt::Debug + PartialEq + 'static {
    type Value: Copy + fmt::Debug + PartialEq + Serialize + DeserializeOwned;

    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn index(self) -> usize;

    fn default_value(self) -> Self::Value;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }
}

macro_rules! table_key {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $value:ty {
            $($variant:ident => $default:expr,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)*
        }

        impl TableKey for $name {
            type Value = $value;

            const ALL: &'static [Self] = &[$(Self::$variant,)*];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            fn index(self) -> usize {
                self as usize
            }

            fn default_value(self) -> $value {
                match self {
                    $(Self::$variant => $default,)*
                }
            }
        }
    };
}

table_key! {
    /// Palette entries.
    pub enum ColorName: Nrgba {
        Bg => rgb(24, 26, 33),
        TileNormal1 => rgb(120, 174, 96),
        TileNormal2 => rgb(108, 160, 86),
        TileRevealed1 => rgb(240, 229, 205),
        TileRevealed2 => rgb(230, 217, 190),
        TileRevealedStroke => rgb(180, 160, 128),
        BgHighlight => rgba(255, 255, 255, 110),
        TileHighlight => rgba(255, 255, 255, 90),
        FgHighlight => rgba(255, 255, 255, 60),
        MineBg1 => rgb(232, 78, 72),
        MineBg2 => rgb(196, 44, 52),
        Mine => rgb(48, 22, 24),
        Flag => rgb(236, 64, 52),
        Number1 => rgb(28, 118, 210),
        Number2 => rgb(56, 142, 60),
        Number3 => rgb(211, 47, 47),
        Number4 => rgb(123, 31, 162),
        Number5 => rgb(255, 143, 0),
        Number6 => rgb(0, 151, 167),
        Number7 => rgb(66, 66, 66),
        Number8 => rgb(158, 158, 158),
        ElementWon => rgb(255, 255, 255),
        Water1 => rgba(52, 152, 219, 255),
        Water2 => rgba(41, 128, 185, 255),
        Water3 => rgba(93, 173, 226, 255),
        Water4 => rgba(174, 214, 241, 255),
        RetryA1 => rgb(40, 44, 52),
        RetryA2 => rgb(105, 223, 145),
        RetryA3 => rgb(40, 44, 52),
        RetryA4 => rgb(255, 255, 255),
        RetryB1 => rgb(20, 60, 110),
        RetryB2 => rgb(93, 173, 226),
        RetryB3 => rgb(20, 60, 110),
        RetryB4 => rgb(255, 255, 255),
        RetryWater1 => rgba(52, 152, 219, 255),
        RetryWater2 => rgba(41, 128, 185, 255),
        RetryWater3 => rgba(93, 173, 226, 255),
        RetryWater4 => rgba(174, 214, 241, 255),
        TutorialCursor => rgb(255, 255, 255),
        TutorialDragSign => rgb(255, 255, 255),
    }
}

impl ColorName {
    /// Digit color for a neighbor count in `1..=8`.
    pub fn number(n: u8) -> Self {
        use ColorName::*;
        match n {
            1 => Number1,
            2 => Number2,
            3 => Number3,
            4 => Number4,
            5 => Number5,
            6 => Number6,
            7 => Number7,
            _ => Number8,
        }
    }
}

table_key! {
    /// Animation curves.
    pub enum BezierName: BezierCurve {
        TileRevealScale => BezierCurve::new([pt(0.0, 0.0), pt(0.3, 1.4), pt(0.7, 1.1), pt(1.0, 1.0)]),
        TileRevealOffsetY => BezierCurve::new([pt(0.0, -1.0), pt(0.3, -1.0), pt(0.7, 0.0), pt(1.0, 0.0)]),
        BoardHideTile => BezierCurve::DEFAULT,
        BoardHideTileAlpha => BezierCurve::new([pt(0.0, 1.0), pt(0.3, 1.0), pt(0.7, 0.0), pt(1.0, 0.0)]),
        BoardHideButton => BezierCurve::DEFAULT,
        BoardShowTileOffsetY => BezierCurve::new([pt(0.0, 1.0), pt(0.2, 0.0), pt(0.6, 0.0), pt(1.0, 0.0)]),
        BoardShowTileAlpha => BezierCurve::DEFAULT,
        BoardShowTileScale => BezierCurve::new([pt(0.0, 0.0), pt(0.3, 1.3), pt(0.7, 1.0), pt(1.0, 1.0)]),
        BoardZoomOut => BezierCurve::DEFAULT,
    }
}

table_key! {
    /// HSV shifts applied to palette entries.
    pub enum HsvName: HsvMod {
        Bg => HsvMod::default(),
    }
}

/// One value per key of `K`, defaulted.
#[derive(Clone, Debug, PartialEq)]
pub struct Table<K: TableKey> {
    values: Vec<K::Value>,
}

impl<K: TableKey> Table<K> {
    pub fn new() -> Self {
        Self {
            values: K::ALL.iter().map(|key| key.default_value()).collect(),
        }
    }

    /// Reads a name to value map. Unknown names are ignored, missing ones
    /// keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let map: BTreeMap<String, K::Value> = serde_json::from_str(text)?;
        let mut table = Self::new();
        for (name, value) in map {
            match K::from_name(&name) {
                Some(key) => table[key] = value,
                None => log::warn!("Ignoring unknown table entry {:?}", name),
            }
        }
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let map: BTreeMap<&'static str, K::Value> = K::ALL
            .iter()
            .map(|&key| (key.name(), self[key]))
            .collect();
        serde_json::to_string_pretty(&map)
    }
}

impl<K: TableKey> Default for Table<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TableKey> Index<K> for Table<K> {
    type Output = K::Value;

    fn index(&self, key: K) -> &K::Value {
        &self.values[key.index()]
    }
}

impl<K: TableKey> IndexMut<K> for Table<K> {
    fn index_mut(&mut self, key: K) -> &mut K::Value {
        &mut self.values[key.index()]
    }
}

pub type ColorTable = Table<ColorName>;
pub type BezierTable = Table<BezierName>;
pub type HsvTable = Table<HsvName>;

/// Every tuning table the engine reads. Immutable while a game runs; swapped
/// as a whole by [`crate::Game::set_tables`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tables {
    pub colors: ColorTable,
    pub curves: BezierTable,
    pub hsv: HsvTable,
}

impl Tables {
    pub fn color(&self, name: ColorName) -> Nrgba {
        self.colors[name]
    }

    pub fn curve(&self, name: BezierName) -> &BezierCurve {
        &self.curves[name]
    }

    /// Reads the curve `name` as a graph at `x`.
    pub fn graph(&self, name: BezierName, x: f64) -> f64 {
        self.curves[name].graph(x)
    }

    pub fn hsv(&self, name: HsvName) -> HsvMod {
        self.hsv[name]
    }

    /// Background fill with its HSV modifier applied.
    pub fn background(&self) -> Nrgba {
        self.hsv(HsvName::Bg).apply(self.color(ColorName::Bg))
    }
}
