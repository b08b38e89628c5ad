//! PNG encoding and data URLs for thumbnails.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};

use crate::error::VitrineError;

/// Prefix of every thumbnail data URL.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Convert premultiplied RGBA8 (as rendered) to straight alpha in place.
pub fn unpremultiply(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            px[..3].fill(0);
        } else if a < 255 {
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
            }
        }
    }
}

/// Encode straight-alpha RGBA8 pixels as a PNG.
///
/// # Errors
///
/// [`VitrineError::Encode`] if the buffer does not match the dimensions or
/// the encoder fails.
pub fn encode_png(width: u32, height: u32, rgba: Vec<u8>) -> Result<Vec<u8>, VitrineError> {
    let len = rgba.len();
    let img = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        VitrineError::Encode(format!(
            "{len} bytes do not form a {width}x{height} RGBA image"
        ))
    })?;
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .map_err(|e| VitrineError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// `data:image/png;base64,...` for a PNG.
#[must_use]
pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::from(PNG_DATA_URL_PREFIX);
    general_purpose::STANDARD.encode_string(png, &mut url);
    url
}

/// Decode a PNG data URL produced by [`png_data_url`].
///
/// # Errors
///
/// [`VitrineError::Encode`] if the prefix or base64 payload is invalid.
pub fn decode_png_data_url(url: &str) -> Result<Vec<u8>, VitrineError> {
    let payload = url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| VitrineError::Encode("not a PNG data URL".into()))?;
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| VitrineError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_keeps_transparency() {
        // 2x1: one opaque red pixel, one fully transparent pixel.
        let rgba = vec![255, 0, 0, 255, 0, 0, 0, 0];
        let png = encode_png(2, 1, rgba.clone()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.into_raw(), rgba);
    }

    #[test]
    fn data_url_has_png_prefix_and_decodes() {
        let png = encode_png(1, 1, vec![1, 2, 3, 4]).unwrap();
        let url = png_data_url(&png);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_png_data_url(&url).unwrap(), png);
        assert!(decode_png_data_url("data:image/jpeg;base64,AAAA").is_err());
    }

    #[test]
    fn size_mismatch_is_an_encode_error() {
        let err = encode_png(4, 4, vec![0; 7]).unwrap_err();
        assert!(matches!(err, VitrineError::Encode(_)));
    }

    #[test]
    fn unpremultiply_restores_straight_color() {
        let mut px = vec![64, 32, 0, 128, 10, 10, 10, 0, 200, 100, 50, 255];
        unpremultiply(&mut px);
        assert_eq!(&px[..4], &[128, 64, 0, 128]);
        assert_eq!(&px[4..8], &[0, 0, 0, 0]);
        assert_eq!(&px[8..], &[200, 100, 50, 255]);
    }
}
