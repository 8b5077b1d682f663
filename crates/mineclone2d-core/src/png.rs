//! PNG save and load.
//!
//! Encoding uses fixed compression settings so the same canvas always yields
//! byte-identical save files. Decoding accepts any PNG color type and expands
//! it to RGBA8.

use std::io::{Cursor, Write};
use std::path::Path;

use ::png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::canvas::Canvas;

/// Errors from PNG operations.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] ::png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] image::ImageError),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// PNG export configuration.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for reproducible output.
    pub compression: Compression,
    /// Filter type. Use a fixed value for reproducible output.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Create config optimized for file size.
    pub fn best_compression() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        }
    }
}

/// Write a canvas to a PNG file.
pub fn write_canvas(canvas: &Canvas, path: &Path, config: &PngConfig) -> Result<(), PngError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);

    write_canvas_to_writer(canvas, writer, config)
}

/// Write a canvas to any writer.
pub fn write_canvas_to_writer<W: Write>(
    canvas: &Canvas,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(PngError::InvalidDimensions(format!(
            "cannot encode a {}x{} canvas",
            canvas.width, canvas.height
        )));
    }

    let mut encoder = Encoder::new(writer, canvas.width, canvas.height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&canvas.to_rgba8())?;

    Ok(())
}

/// Encode a canvas to PNG bytes.
pub fn encode_canvas(canvas: &Canvas, config: &PngConfig) -> Result<Vec<u8>, PngError> {
    let mut data = Vec::new();
    write_canvas_to_writer(canvas, &mut data, config)?;
    Ok(data)
}

/// Decode PNG bytes of any color type into an RGBA8 canvas.
pub fn decode_png(bytes: &[u8]) -> Result<Canvas, PngError> {
    let reader = image::ImageReader::with_format(Cursor::new(bytes), image::ImageFormat::Png);
    let rgba = reader.decode()?.to_rgba8();
    let (width, height) = rgba.dimensions();

    Canvas::from_rgba8(width, height, rgba.as_raw()).ok_or_else(|| {
        PngError::InvalidDimensions(format!("decoded buffer does not match {}x{}", width, height))
    })
}

/// Read a PNG file into a canvas.
pub fn read_canvas(path: &Path) -> Result<Canvas, PngError> {
    let bytes = std::fs::read(path)?;
    decode_png(&bytes)
}

/// Compute the BLAKE3 hash of PNG data.
pub fn hash_png(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Encode to bytes and return the hash alongside.
pub fn encode_canvas_with_hash(
    canvas: &Canvas,
    config: &PngConfig,
) -> Result<(Vec<u8>, String), PngError> {
    let data = encode_canvas(canvas, config)?;
    let hash = hash_png(&data);
    Ok((data, hash))
}

/// Save file name for a snapshot taken at `at`, e.g.
/// `mineclone2d-2024-05-01--13-37-00.png`.
pub fn save_file_name(at: DateTime<Utc>) -> String {
    format!("mineclone2d-{}.png", at.format("%Y-%m-%d--%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgba, SKY};
    use chrono::TimeZone;

    fn gradient() -> Canvas {
        let mut canvas = Canvas::new_sky(32, 16);
        for y in 0..16 {
            for x in 0..32 {
                canvas.set(x, y, Rgba::rgba((x * 8) as u8, (y * 16) as u8, 50, 200));
            }
        }
        canvas
    }

    #[test]
    fn test_encode_deterministic() {
        let canvas = gradient();
        let config = PngConfig::default();

        let (data1, hash1) = encode_canvas_with_hash(&canvas, &config).unwrap();
        let (data2, hash2) = encode_canvas_with_hash(&canvas, &config).unwrap();

        assert_eq!(data1, data2, "PNG data should be identical");
        assert_eq!(hash1, hash2, "PNG hashes should be identical");
    }

    #[test]
    fn test_decode_restores_pixels() {
        let canvas = gradient();
        let data = encode_canvas(&canvas, &PngConfig::best_compression()).unwrap();
        let decoded = decode_png(&data).unwrap();
        assert_eq!(decoded, canvas);
    }

    #[test]
    fn test_decode_rgb_expands_alpha() {
        let mut data = Vec::new();
        {
            let mut encoder = Encoder::new(&mut data, 2, 1);
            encoder.set_color(ColorType::Rgb);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 107, 196, 1, 2, 3]).unwrap();
        }
        let decoded = decode_png(&data).unwrap();
        assert_eq!(decoded.get(0, 0), SKY);
        assert_eq!(decoded.get(1, 0), Rgba::rgb(1, 2, 3));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_png(b"definitely not a png").is_err());
    }

    #[test]
    fn test_empty_canvas_rejected() {
        let canvas = Canvas::new_sky(0, 4);
        assert!(matches!(
            encode_canvas(&canvas, &PngConfig::default()),
            Err(PngError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.png");
        let canvas = gradient();
        write_canvas(&canvas, &path, &PngConfig::default()).unwrap();
        assert_eq!(read_canvas(&path).unwrap(), canvas);
    }

    #[test]
    fn test_save_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 13, 37, 0).unwrap();
        assert_eq!(save_file_name(at), "mineclone2d-2024-05-01--13-37-00.png");
    }
}
