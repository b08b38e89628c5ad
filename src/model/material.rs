//! Material parameters.

use crate::options::MaterialOptions;

/// How a material's alpha channel is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    /// Alpha ignored; fully opaque.
    #[default]
    Opaque,
    /// Fragments with alpha below `cutoff` are discarded.
    Mask {
        /// Alpha threshold.
        cutoff: f32,
    },
    /// Alpha-blended.
    Blend,
}

impl From<gltf::material::AlphaMode> for AlphaMode {
    fn from(mode: gltf::material::AlphaMode) -> Self {
        match mode {
            gltf::material::AlphaMode::Opaque => Self::Opaque,
            gltf::material::AlphaMode::Mask => Self::Mask { cutoff: 0.5 },
            gltf::material::AlphaMode::Blend => Self::Blend,
        }
    }
}

/// Metallic-roughness material parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name from the source document, if any.
    pub name: Option<String>,
    /// Linear RGBA base color factor.
    pub base_color: [f32; 4],
    /// Index into [`ModelData::images`](super::ModelData::images).
    pub base_color_texture: Option<usize>,
    /// Metalness factor.
    pub metallic: f32,
    /// Roughness factor.
    pub roughness: f32,
    /// Linear RGB emissive factor.
    pub emissive: [f32; 3],
    /// Alpha interpretation.
    pub alpha_mode: AlphaMode,
    /// Render both faces.
    pub double_sided: bool,
    /// Multiplier on the environment light term.
    pub env_intensity: f32,
}

impl Default for Material {
    /// The glTF default material: white, fully metallic and rough.
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0; 4],
            base_color_texture: None,
            metallic: 1.0,
            roughness: 1.0,
            emissive: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            double_sided: false,
            env_intensity: 1.0,
        }
    }
}

impl Material {
    /// Read a glTF material.
    #[must_use]
    pub fn from_gltf(material: &gltf::Material<'_>) -> Self {
        let pbr = material.pbr_metallic_roughness();
        let alpha_mode = match AlphaMode::from(material.alpha_mode()) {
            AlphaMode::Mask { .. } => AlphaMode::Mask {
                cutoff: material.alpha_cutoff().unwrap_or(0.5),
            },
            other => other,
        };
        Self {
            name: material.name().map(str::to_owned),
            base_color: pbr.base_color_factor(),
            base_color_texture: pbr
                .base_color_texture()
                .map(|info| info.texture().source().index()),
            metallic: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
            emissive: material.emissive_factor(),
            alpha_mode,
            double_sided: material.double_sided(),
            env_intensity: 1.0,
        }
    }

    /// Pull the material into the ranges the viewer's lighting is tuned
    /// for. No-op when normalization is disabled.
    pub fn normalize(&mut self, options: &MaterialOptions) {
        if !options.normalize {
            return;
        }
        self.env_intensity = options.env_intensity;
        self.roughness = clamp_range(self.roughness, options.roughness_range);
        self.metallic = clamp_range(self.metallic, options.metalness_range);
    }
}

/// Clamp into `[lo, hi]`, tolerating a reversed range and NaN input (which
/// maps to `lo`).
fn clamp_range(value: f32, [lo, hi]: [f32; 2]) -> f32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if value.is_nan() {
        return lo;
    }
    value.clamp(lo, hi)
}

/// A decoded texture image, always RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Convert a decoded glTF image to RGBA8. Returns `None` for pixel
    /// formats that cannot be displayed as color.
    #[must_use]
    pub fn from_gltf(data: &gltf::image::Data) -> Option<Self> {
        use gltf::image::Format;

        let px = &data.pixels;
        let rgba: Vec<u8> = match data.format {
            Format::R8 => px.iter().flat_map(|&r| [r, r, r, 255]).collect(),
            Format::R8G8 => px
                .chunks_exact(2)
                .flat_map(|c| [c[0], c[0], c[0], c[1]])
                .collect(),
            Format::R8G8B8 => px
                .chunks_exact(3)
                .flat_map(|c| [c[0], c[1], c[2], 255])
                .collect(),
            Format::R8G8B8A8 => px.clone(),
            // 16-bit little-endian channels: keep the high byte.
            Format::R16G16B16 => px
                .chunks_exact(6)
                .flat_map(|c| [c[1], c[3], c[5], 255])
                .collect(),
            Format::R16G16B16A16 => px
                .chunks_exact(8)
                .flat_map(|c| [c[1], c[3], c[5], c[7]])
                .collect(),
            Format::R32G32B32FLOAT => px
                .chunks_exact(12)
                .flat_map(|c| {
                    [unorm(&c[0..4]), unorm(&c[4..8]), unorm(&c[8..12]), 255]
                })
                .collect(),
            Format::R32G32B32A32FLOAT => px
                .chunks_exact(16)
                .flat_map(|c| {
                    [
                        unorm(&c[0..4]),
                        unorm(&c[4..8]),
                        unorm(&c[8..12]),
                        unorm(&c[12..16]),
                    ]
                })
                .collect(),
            other => {
                log::warn!("unsupported texture format {other:?}, skipping");
                return None;
            }
        };

        let expected = data.width as usize * data.height as usize * 4;
        if rgba.len() != expected {
            log::warn!(
                "texture {}x{} has {} bytes after conversion, expected {expected}",
                data.width,
                data.height,
                rgba.len()
            );
            return None;
        }

        Some(Self {
            width: data.width,
            height: data.height,
            rgba,
        })
    }
}

fn unorm(bytes: &[u8]) -> u8 {
    let v = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_clamps_into_configured_ranges() {
        let mut shiny = Material {
            roughness: 0.02,
            metallic: 1.7,
            ..Material::default()
        };
        shiny.normalize(&MaterialOptions::default());
        assert_eq!(shiny.roughness, 0.25);
        assert_eq!(shiny.metallic, 1.0);
        assert_eq!(shiny.env_intensity, 0.85);
    }

    #[test]
    fn normalization_can_be_disabled() {
        let mut mat = Material {
            roughness: 0.02,
            ..Material::default()
        };
        mat.normalize(&MaterialOptions {
            normalize: false,
            ..MaterialOptions::default()
        });
        assert_eq!(mat.roughness, 0.02);
        assert_eq!(mat.env_intensity, 1.0);
    }

    #[test]
    fn nan_factors_fall_to_range_floor() {
        assert_eq!(clamp_range(f32::NAN, [0.25, 1.0]), 0.25);
        assert_eq!(clamp_range(0.5, [1.0, 0.0]), 0.5);
    }
}
