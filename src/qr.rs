//! QR artifact synthesis.
//!
//! Encodes a URL into a square black-on-white raster, error-correction
//! level M, with the standard 4-module quiet zone. The matrix is rastered
//! at a whole number of pixels per module and then resampled with Lanczos3
//! to the fixed embed size.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color as Module, EcLevel, QrCode};

use crate::error::Result;

/// Edge length of the embedded raster in pixels. Rendered at 90 pt on the
/// page, this leaves 4 px per point for clean scanning off paper.
pub const QR_SIZE_PX: u32 = 360;

const QUIET_ZONE_MODULES: u32 = 4;
const PX_PER_MODULE: u32 = 8;

/// An in-memory QR image together with the URL it encodes. Ephemeral:
/// exists only between generation and embedding into a render pass.
#[derive(Debug, Clone)]
pub struct QrArtifact {
    payload: String,
    png: Vec<u8>,
}

impl QrArtifact {
    /// Encode `url` into a [`QR_SIZE_PX`]² PNG.
    pub fn encode(url: &str) -> Result<Self> {
        let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)?;
        let modules = code.width() as u32;
        let colors = code.to_colors();

        let native = (modules + 2 * QUIET_ZONE_MODULES) * PX_PER_MODULE;
        let mut img = GrayImage::from_pixel(native, native, Luma([255u8]));
        for (idx, module) in colors.iter().enumerate() {
            if *module != Module::Dark {
                continue;
            }
            let mx = idx as u32 % modules + QUIET_ZONE_MODULES;
            let my = idx as u32 / modules + QUIET_ZONE_MODULES;
            for dy in 0..PX_PER_MODULE {
                for dx in 0..PX_PER_MODULE {
                    img.put_pixel(
                        mx * PX_PER_MODULE + dx,
                        my * PX_PER_MODULE + dy,
                        Luma([0u8]),
                    );
                }
            }
        }

        let img = if native != QR_SIZE_PX {
            DynamicImage::ImageLuma8(img).resize_exact(
                QR_SIZE_PX,
                QR_SIZE_PX,
                FilterType::Lanczos3,
            )
        } else {
            DynamicImage::ImageLuma8(img)
        };

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(Self {
            payload: url.to_string(),
            png,
        })
    }

    /// The URL this artifact encodes.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }
}
