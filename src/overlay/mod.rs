pub mod placement;

pub use placement::compute_placement;

use serde::{Deserialize, Serialize};

/// Fixed pixel dimensions for the statistics graphic. Medium and large are
/// the small footprint scaled 1.5x and 2x, same aspect throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    Small,
    Medium,
    Large,
}

impl SizePreset {
    pub const ALL: [SizePreset; 3] = [SizePreset::Small, SizePreset::Medium, SizePreset::Large];

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SizePreset::Small => (250, 166),
            SizePreset::Medium => (375, 250),
            SizePreset::Large => (500, 333),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizePreset::Small => "Small",
            SizePreset::Medium => "Medium",
            SizePreset::Large => "Large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionPreset {
    TopLeft,
    TopRight,
    Center,
    BottomLeft,
    BottomRight,
}

impl PositionPreset {
    pub const ALL: [PositionPreset; 5] = [
        PositionPreset::TopLeft,
        PositionPreset::TopRight,
        PositionPreset::Center,
        PositionPreset::BottomLeft,
        PositionPreset::BottomRight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PositionPreset::TopLeft => "Top left",
            PositionPreset::TopRight => "Top right",
            PositionPreset::Center => "Center",
            PositionPreset::BottomLeft => "Bottom left",
            PositionPreset::BottomRight => "Bottom right",
        }
    }
}

/// Wire parameters for the backend compositor, built fresh per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphParams {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
    pub start_date: String,
    pub end_date: String,
}

impl GraphParams {
    /// Resolves the active presets against the image about to be submitted.
    pub fn resolve(
        size: SizePreset,
        position: PositionPreset,
        image_dimensions: (u32, u32),
        start_date: String,
        end_date: String,
    ) -> Self {
        let (width, height) = size.dimensions();
        let (x, y) = compute_placement(position, image_dimensions, (width, height));
        Self {
            width,
            height,
            x,
            y,
            start_date,
            end_date,
        }
    }
}
