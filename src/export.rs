use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use crate::error::ExportError;
use crate::qr_generator::{Symbol, QUIET_ZONE};

pub const SVG_MIME: &str = "image/svg+xml";
pub const PNG_MIME: &str = "image/png";

/// Largest PNG edge we are willing to allocate.
pub const MAX_RASTER_SIDE: u32 = 8192;

/// A file ready to be handed to the browser for download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

pub fn file_name(timestamp_ms: u64, extension: &str) -> String {
    format!("qrcode-{}.{}", timestamp_ms, extension)
}

/// The displayed SVG, byte for byte.
pub fn vector_file(symbol: &Symbol, timestamp_ms: u64) -> ExportFile {
    ExportFile {
        name: file_name(timestamp_ms, "svg"),
        mime: SVG_MIME,
        bytes: symbol.svg().as_bytes().to_vec(),
    }
}

/// Rasterizes the symbol at its module size onto an opaque white background.
pub fn raster_file(symbol: &Symbol, timestamp_ms: u64) -> Result<ExportFile, ExportError> {
    let side = symbol
        .pixel_size()
        .filter(|side| *side <= MAX_RASTER_SIDE)
        .ok_or_else(|| {
            ExportError::Rasterize(format!(
                "image would be larger than {0}x{0} pixels, pick a smaller module size",
                MAX_RASTER_SIDE
            ))
        })?;
    let image = rasterize(symbol, side);
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| ExportError::Rasterize(err.to_string()))?;

    Ok(ExportFile {
        name: file_name(timestamp_ms, "png"),
        mime: PNG_MIME,
        bytes,
    })
}

fn rasterize(symbol: &Symbol, side: u32) -> RgbImage {
    let scale = symbol.module_size();
    let mut image = RgbImage::from_pixel(side, side, Rgb([255, 255, 255]));

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let module_x = (x / scale) as i32 - QUIET_ZONE;
        let module_y = (y / scale) as i32 - QUIET_ZONE;
        if symbol.is_dark(module_x, module_y) {
            *pixel = Rgb([0, 0, 0]);
        }
    }
    image
}
