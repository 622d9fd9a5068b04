use std::path::PathBuf;

use crate::common::{Snapshot, SnapshotSource};
use crate::error::AppError;

/// Reads and decodes a user-selected file off the UI thread. From here on
/// the decoded bitmap is indistinguishable from a camera snapshot.
pub async fn decode_file(path: PathBuf) -> Result<Snapshot, AppError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Image(format!("failed to read {}: {}", path.display(), e)))?;

    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| AppError::Image(format!("decode task failed: {e}")))?
        .map_err(|e| AppError::Image(e.to_string()))?;

    Ok(Snapshot::new(image, SnapshotSource::Upload))
}
