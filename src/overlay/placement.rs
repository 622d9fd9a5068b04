use super::PositionPreset;

/// Margin, in pixels, between the overlay and the photo edge for every
/// non-centered position.
pub const EDGE_MARGIN: u32 = 20;

/// Computes the top-left offset of the overlay inside the image. Coordinates
/// are floored at zero, so an overlay larger than the photo pins to the
/// top-left corner instead of going negative.
pub fn compute_placement(
    position: PositionPreset,
    image: (u32, u32),
    overlay: (u32, u32),
) -> (u32, u32) {
    let (iw, ih) = (image.0 as i64, image.1 as i64);
    let (ow, oh) = (overlay.0 as i64, overlay.1 as i64);
    let margin = EDGE_MARGIN as i64;

    let (x, y) = match position {
        PositionPreset::TopLeft => (margin, margin),
        PositionPreset::TopRight => (iw - ow - margin, margin),
        PositionPreset::Center => ((iw - ow) / 2, (ih - oh) / 2),
        PositionPreset::BottomLeft => (margin, ih - oh - margin),
        PositionPreset::BottomRight => (iw - ow - margin, ih - oh - margin),
    };

    (x.max(0) as u32, y.max(0) as u32)
}
