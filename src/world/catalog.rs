//! Furniture catalog
//!
//! Default size, color and material for every furniture type the editor can
//! place, plus hex color parsing shared by the renderer.

use serde::{Deserialize, Serialize};
use super::BoxSize;

/// Fallback color for unparsable color strings
pub const FALLBACK_COLOR: u32 = 0x9c_a3_af;

/// Furniture type. Persisted as its lowercase name; a name this build does
/// not know is kept verbatim and placed with the table's geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FurnitureKind {
    Sofa,
    Bed,
    #[default]
    Table,
    Chair,
    Desk,
    Wardrobe,
    Other(String),
}

impl From<String> for FurnitureKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "sofa" => FurnitureKind::Sofa,
            "bed" => FurnitureKind::Bed,
            "table" => FurnitureKind::Table,
            "chair" => FurnitureKind::Chair,
            "desk" => FurnitureKind::Desk,
            "wardrobe" => FurnitureKind::Wardrobe,
            _ => FurnitureKind::Other(name),
        }
    }
}

impl From<FurnitureKind> for String {
    fn from(kind: FurnitureKind) -> Self {
        match kind {
            FurnitureKind::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

/// Catalog entry for a furniture type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurnitureDefaults {
    pub dimensions: BoxSize,
    pub color: &'static str,
    pub material: &'static str,
}

impl FurnitureKind {
    /// Persisted type name
    pub fn name(&self) -> &str {
        match self {
            FurnitureKind::Sofa => "sofa",
            FurnitureKind::Bed => "bed",
            FurnitureKind::Table => "table",
            FurnitureKind::Chair => "chair",
            FurnitureKind::Desk => "desk",
            FurnitureKind::Wardrobe => "wardrobe",
            FurnitureKind::Other(name) => name,
        }
    }

    pub fn defaults(&self) -> FurnitureDefaults {
        let (w, h, d, color, material) = match self {
            FurnitureKind::Sofa => (2.0, 0.8, 1.0, "#8b5cf6", "fabric"),
            FurnitureKind::Bed => (2.0, 0.6, 1.5, "#06b6d4", "fabric"),
            FurnitureKind::Chair => (0.6, 1.0, 0.6, "#10b981", "plastic"),
            FurnitureKind::Desk => (1.2, 0.8, 0.6, "#3b82f6", "wood"),
            FurnitureKind::Wardrobe => (1.0, 2.0, 0.6, "#ef4444", "wood"),
            FurnitureKind::Table | FurnitureKind::Other(_) => (1.5, 0.8, 1.0, "#f59e0b", "wood"),
        };
        FurnitureDefaults { dimensions: BoxSize::new(w, h, d), color, material }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FurnitureKind::Sofa => "Sofa",
            FurnitureKind::Bed => "Bed",
            FurnitureKind::Table => "Table",
            FurnitureKind::Chair => "Chair",
            FurnitureKind::Desk => "Desk",
            FurnitureKind::Wardrobe => "Wardrobe",
            FurnitureKind::Other(_) => "Furniture",
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional) into 0xRRGGBB
pub fn parse_hex_color(color: &str) -> Option<u32> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Parse a color string, falling back to neutral gray
pub fn color_or_fallback(color: &str) -> u32 {
    parse_hex_color(color).unwrap_or(FALLBACK_COLOR)
}
