pub mod camera;
pub mod upload;

pub use camera::{CameraClient, CameraEvent, FacingMode};
pub use upload::decode_file;
