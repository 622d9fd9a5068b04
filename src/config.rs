use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub camera: CameraSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraSettings {
    pub frame_buffer_size: usize,
    pub default_facing: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                base_url: "http://127.0.0.1:5000".to_string(),
                request_timeout_secs: 30,
            },
            camera: CameraSettings {
                frame_buffer_size: 60,
                default_facing: "user".to_string(),
            },
        }
    }
}

impl Settings {
    // Layered load: optional mulambo.toml next to the binary, then
    // MULAMBO_* environment overrides (MULAMBO_SERVER__BASE_URL etc).
    pub fn load() -> Result<Self, AppError> {
        let defaults = Settings::default();
        let settings = Config::builder()
            .set_default("server.base_url", defaults.server.base_url)?
            .set_default(
                "server.request_timeout_secs",
                defaults.server.request_timeout_secs,
            )?
            .set_default(
                "camera.frame_buffer_size",
                defaults.camera.frame_buffer_size as u64,
            )?
            .set_default("camera.default_facing", defaults.camera.default_facing)?
            .add_source(File::with_name("mulambo").required(false))
            .add_source(Environment::with_prefix("MULAMBO").separator("__"))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let settings = Settings::default();
        assert_eq!(settings.server.request_timeout_secs, 30);
        assert_eq!(settings.camera.frame_buffer_size, 60);
        assert_eq!(settings.camera.default_facing, "user");
    }

    #[test]
    fn load_without_file_falls_back_to_defaults() {
        let settings = Settings::load().expect("defaults should satisfy the schema");
        assert_eq!(settings.server.base_url, "http://127.0.0.1:5000");
    }
}
