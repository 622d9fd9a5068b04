use chrono::{DateTime, Utc};
use image::DynamicImage;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Camera,
    Upload,
}

/// A captured photo owned by one flow instance. The pixel buffer is shared,
/// so cloning a snapshot never copies image data.
#[derive(Clone)]
pub struct Snapshot {
    image: Arc<DynamicImage>,
    source: SnapshotSource,
    captured_at: DateTime<Utc>,
    snapshot_id: Uuid,
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("id", &self.snapshot_id)
            .field("source", &self.source)
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

impl Snapshot {
    pub fn new(image: DynamicImage, source: SnapshotSource) -> Self {
        Self {
            image: Arc::new(image),
            source,
            captured_at: Utc::now(),
            snapshot_id: Uuid::new_v4(),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn source(&self) -> SnapshotSource {
        self.source
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn id(&self) -> Uuid {
        self.snapshot_id
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}
