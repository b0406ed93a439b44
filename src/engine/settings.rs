use crate::engine::error::{ DemoError, Result };
use log::{ info, warn };
use serde::{ de::DeserializeOwned, Deserialize, Serialize };
use std::path::Path;

pub const CONFIG_DIR: &str = "config";

/// Window options shared by every demo binary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 920,
            vsync: true,
        }
    }
}

/// Load `config/<name>.json`, falling back to defaults.
pub fn load_named<T>(name: &str) -> Result<T> where T: Serialize + DeserializeOwned + Default {
    load_settings(Path::new(CONFIG_DIR).join(format!("{}.json", name)))
}

/// Read settings from `path`. A missing file yields `T::default()`, which is then
/// written out as a starting point. An existing file is never rewritten.
pub fn load_settings<T>(path: impl AsRef<Path>) -> Result<T>
    where T: Serialize + DeserializeOwned + Default
{
    let path = path.as_ref();
    info!("Reading settings from {}", path.display());
    if path.is_file() {
        let settings_error = |message: String| DemoError::Settings {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
        return serde_json::from_str(&text).map_err(|e| settings_error(e.to_string()));
    }

    let settings = T::default();
    if let Err(e) = write_defaults(path, &settings) {
        warn!("Could not write default settings to {}: {}", path.display(), e);
    }
    Ok(settings)
}

fn write_defaults<T: Serialize>(path: &Path, settings: &T) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let text = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("harbor-gl-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = scratch_dir("missing");
        let path = dir.join("window.json");

        let settings: WindowSettings = load_settings(&path).unwrap();
        assert_eq!(settings, WindowSettings::default());

        let written: WindowSettings = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, settings);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = scratch_dir("partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("window.json");
        std::fs::write(&path, r#"{ "width": 640 }"#).unwrap();

        let settings: WindowSettings = load_settings(&path).unwrap();
        assert_eq!(settings.width, 640);
        assert_eq!(settings.height, WindowSettings::default().height);
        assert!(settings.vsync);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn existing_file_is_left_untouched() {
        let dir = scratch_dir("untouched");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("window.json");
        std::fs::write(&path, r#"{ "width": 640 }"#).unwrap();

        let _: WindowSettings = load_settings(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{ "width": 640 }"#);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unwritable_location_still_yields_defaults() {
        let dir = scratch_dir("unwritable");
        std::fs::create_dir_all(&dir).unwrap();
        // a plain file where the config directory should be
        let blocker = dir.join("config");
        std::fs::write(&blocker, "").unwrap();

        let settings: WindowSettings = load_settings(blocker.join("window.json")).unwrap();
        assert_eq!(settings, WindowSettings::default());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = scratch_dir("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("window.json");
        std::fs::write(&path, "{ width: ").unwrap();

        let result: Result<WindowSettings> = load_settings(&path);
        assert!(matches!(result, Err(DemoError::Settings { .. })));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
