use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::error::AppError;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encodes a bitmap into the `data:image/png;base64,` form the backend
/// expects for the `image` field.
pub fn to_png_data_url(image: &DynamicImage) -> Result<String, AppError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| AppError::Image(e.to_string()))?;
    Ok(format!(
        "{}{}",
        PNG_DATA_URL_PREFIX,
        STANDARD.encode(buffer.into_inner())
    ))
}

/// Decodes a data URL back into a bitmap. The header is optional, matching
/// the backend's own tolerance for headerless payloads.
pub fn from_data_url(data_url: &str) -> Result<DynamicImage, AppError> {
    let payload = match data_url.split_once(',') {
        Some((_, rest)) => rest,
        None => data_url,
    };
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| AppError::Image(e.to_string()))?;
    image::load_from_memory(&bytes).map_err(|e| AppError::Image(e.to_string()))
}
