//! Cutout engine and image encoder collaborator interfaces
//!
//! Pixel-level cutout computation (WCS projection, reprojection) and
//! raster encoding are owned by external collaborators behind these
//! traits. The engine is also responsible for classifying its failures:
//! a position with no overlap is the caller's problem, an unreachable
//! archive is not.

use crate::error::{Result, SisError};
use crate::format::ImageFormat;
use crate::request::AngularSize;
use async_trait::async_trait;
use bytes::Bytes;

/// FITS record size in bytes
const FITS_RECORD: usize = 2880;

/// FITS header card width in bytes
const FITS_CARD: usize = 80;

/// A rectangular grid of pixel samples
#[derive(Debug, Clone, PartialEq)]
pub struct PixelData {
    pub width: u32,
    pub height: u32,
    /// Row-major samples, `width * height` entries
    pub samples: Vec<f32>,
}

impl PixelData {
    pub fn new(width: u32, height: u32, samples: Vec<f32>) -> Result<Self> {
        if samples.len() != (width as usize) * (height as usize) {
            return Err(SisError::EncodingError(format!(
                "pixel grid {}x{} expects {} samples, got {}",
                width,
                height,
                (width as usize) * (height as usize),
                samples.len()
            )));
        }
        Ok(PixelData {
            width,
            height,
            samples,
        })
    }
}

/// A cutout returned by the engine: pixels plus the positional header
/// cards updated for the sub-image
#[derive(Debug, Clone)]
pub struct Cutout {
    pub pixels: PixelData,
    /// Header keyword/value pairs, e.g. `("CRPIX1", "286.5")`
    pub header: Vec<(String, String)>,
}

impl Cutout {
    /// Serialize the cutout in the archive-native FITS container.
    ///
    /// Writes a single 32-bit-float image HDU: 80-character header
    /// cards padded to 2880-byte records, followed by big-endian
    /// samples padded the same way. Used on the native-format path,
    /// which bypasses the raster encoder entirely.
    pub fn to_fits(&self) -> Bytes {
        let mut cards: Vec<String> = vec![
            card("SIMPLE", "T"),
            card("BITPIX", "-32"),
            card("NAXIS", "2"),
            card("NAXIS1", &self.pixels.width.to_string()),
            card("NAXIS2", &self.pixels.height.to_string()),
        ];
        for (key, value) in &self.header {
            cards.push(card(key, value));
        }
        cards.push(format!("{:<width$}", "END", width = FITS_CARD));

        let mut out: Vec<u8> = cards.concat().into_bytes();
        pad_to_record(&mut out, b' ');

        for sample in &self.pixels.samples {
            out.extend_from_slice(&sample.to_be_bytes());
        }
        pad_to_record(&mut out, 0);

        Bytes::from(out)
    }
}

fn card(key: &str, value: &str) -> String {
    let mut key = key.to_string();
    key.truncate(8);
    format!("{:<8}= {:>20}{:<pad$}", key, value, "", pad = FITS_CARD - 30)
}

fn pad_to_record(out: &mut Vec<u8>, fill: u8) {
    let remainder = out.len() % FITS_RECORD;
    if remainder != 0 {
        out.resize(out.len() + FITS_RECORD - remainder, fill);
    }
}

/// Fetches a source image and extracts a cutout around a sky position
#[async_trait]
pub trait CutoutEngine: Send + Sync {
    /// Fetch the image at `url` and cut out a square of `size` around
    /// `(ra_deg, dec_deg)`.
    ///
    /// Implementations classify failures: positions outside the image
    /// or missing products surface as `UpstreamClientError`, archive
    /// transport failures as `UpstreamServerError`.
    async fn fetch_and_cut(
        &self,
        url: &str,
        ra_deg: f64,
        dec_deg: f64,
        size: &AngularSize,
    ) -> Result<Cutout>;
}

/// Quantizes astronomical pixel data into 8-bit raster imagery
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    /// Encode the pixel grid into `format`. Never called for the
    /// archive-native format.
    async fn encode(&self, pixels: &PixelData, format: ImageFormat) -> Result<Bytes>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cutout() -> Cutout {
        Cutout {
            pixels: PixelData::new(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(),
            header: vec![
                ("CRPIX1".to_string(), "286.5".to_string()),
                ("CRPIX2".to_string(), "-274.5".to_string()),
            ],
        }
    }

    #[test]
    fn test_pixel_data_rejects_mismatched_samples() {
        assert!(PixelData::new(3, 2, vec![0.0; 5]).is_err());
        assert!(PixelData::new(3, 2, vec![0.0; 6]).is_ok());
    }

    #[test]
    fn test_fits_output_is_record_aligned() {
        let bytes = cutout().to_fits();
        assert_eq!(bytes.len() % FITS_RECORD, 0);
        // One header record plus one data record for six samples.
        assert_eq!(bytes.len(), 2 * FITS_RECORD);
    }

    #[test]
    fn test_fits_header_cards() {
        let bytes = cutout().to_fits();
        let header = std::str::from_utf8(&bytes[..FITS_RECORD]).unwrap();
        assert!(header.starts_with("SIMPLE  ="));
        assert!(header.contains("BITPIX"));
        assert!(header.contains("NAXIS1"));
        assert!(header.contains("CRPIX1"));
        assert!(header.contains("END"));
    }

    #[test]
    fn test_fits_samples_are_big_endian() {
        let bytes = cutout().to_fits();
        let data = &bytes[FITS_RECORD..];
        assert_eq!(&data[..4], &0.0_f32.to_be_bytes());
        assert_eq!(&data[4..8], &1.0_f32.to_be_bytes());
    }

    #[test]
    fn test_fits_serialization_is_deterministic() {
        assert_eq!(cutout().to_fits(), cutout().to_fits());
    }
}
