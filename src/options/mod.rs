//! Centralized viewer/thumbnail options with TOML preset support.
//!
//! All tweakable settings (camera framing, orbit controls, lighting, render
//! output, material normalization, thumbnail output, keybindings) are
//! consolidated here. Options serialize to/from TOML so a deployment can
//! ship presets next to the binary.

mod camera;
mod controls;
mod keybindings;
mod lighting;
mod material;
mod render;
mod thumbnail;

use std::path::Path;

pub use camera::CameraOptions;
pub use controls::ControlOptions;
pub use keybindings::KeybindingOptions;
pub use lighting::{DirectionalLightOptions, LightingOptions};
pub use material::MaterialOptions;
pub use render::{PowerPreference, RenderOptions, ToneMapping};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use thumbnail::ThumbnailOptions;

use crate::error::VitrineError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and auto-framing parameters.
    pub camera: CameraOptions,
    /// Orbit control behaviour.
    pub controls: ControlOptions,
    /// Viewer light rig.
    pub lighting: LightingOptions,
    /// Renderer output parameters.
    pub render: RenderOptions,
    /// Material normalization.
    pub material: MaterialOptions,
    /// Thumbnail output parameters.
    pub thumbnail: ThumbnailOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, VitrineError> {
        let mut options: Self = toml::from_str(content)
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))?;
        options.keybindings.rebuild_reverse_map();
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, VitrineError> {
        let content = std::fs::read_to_string(path).map_err(VitrineError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), VitrineError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VitrineError::Io)?;
        }
        std::fs::write(path, content).map_err(VitrineError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[camera]
margin = 2.0

[thumbnail]
width = 640
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.camera.margin, 2.0);
        assert_eq!(opts.camera.fovy, 45.0);
        assert_eq!(opts.thumbnail.width, 640);
        assert_eq!(opts.thumbnail.height, 220);
        assert_eq!(opts.lighting.lights.len(), 4);
        assert_eq!(opts.thumbnail.lighting.lights.len(), 1);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("camera = 3").unwrap_err();
        assert!(matches!(err, VitrineError::OptionsParse(_)));
    }

    #[test]
    fn keybinding_lookup_survives_reload() {
        use crate::input::KeyAction;
        let toml_str =
            toml::to_string_pretty(&Options::default()).unwrap();
        let opts = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts.keybindings.lookup("KeyR"), Some(KeyAction::ResetView));
        assert_eq!(opts.keybindings.lookup("Escape"), Some(KeyAction::Close));
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn save_and_list_presets() {
        let dir = std::env::temp_dir().join(format!(
            "vitrine-presets-{}",
            std::process::id()
        ));
        let mut opts = Options::default();
        opts.render.exposure = 1.3;
        opts.save(&dir.join("bright.toml")).unwrap();
        Options::default().save(&dir.join("default.toml")).unwrap();

        assert_eq!(Options::list_presets(&dir), vec!["bright", "default"]);
        let loaded = Options::load(&dir.join("bright.toml")).unwrap();
        assert_eq!(loaded.render.exposure, 1.3);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let render = RenderOptions::default();
        assert_eq!(render.pixel_ratio(3.0), 2.0);
        assert_eq!(render.pixel_ratio(1.5), 1.5);
        assert_eq!(render.pixel_ratio(0.0), 1.0);
        assert_eq!(render.pixel_ratio(f64::NAN), 1.0);
    }

    #[test]
    fn thumbnail_pixel_size_scales_with_ratio() {
        let mut thumb = ThumbnailOptions::default();
        assert_eq!(thumb.pixel_size(), (300, 220));
        thumb.pixel_ratio = 2.0;
        assert_eq!(thumb.pixel_size(), (600, 440));
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("controls"));
        assert!(props.contains_key("lighting"));
        assert!(props.contains_key("thumbnail"));
        assert!(!props.contains_key("keybindings"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("fovy").is_some());
        assert!(camera.get("margin").is_some());
        assert!(camera.get("znear").is_none());
    }
}
