use std::fmt::Write;
use std::ops::RangeInclusive;

use qrcodegen::{QrCode, QrCodeEcc, QrSegment, Version};
use serde::Deserialize;

use crate::error::EncodingError;

/// Light modules around the symbol, in modules.
pub const QUIET_ZONE: i32 = 4;

/// Selectable edge lengths of one module, in pixels.
pub const MODULE_SIZE_RANGE: RangeInclusive<u32> = 1..=64;

pub fn clamp_module_size(module_size: u32) -> u32 {
    module_size.max(*MODULE_SIZE_RANGE.start()).min(*MODULE_SIZE_RANGE.end())
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
pub enum EccLevel {
    #[serde(rename = "L")]
    Low,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "Q")]
    Quartile,
    #[serde(rename = "H")]
    High,
}

impl EccLevel {
    pub const ALL: [EccLevel; 4] = [
        EccLevel::Low,
        EccLevel::Medium,
        EccLevel::Quartile,
        EccLevel::High,
    ];

    pub fn code(self) -> &'static str {
        match self {
            EccLevel::Low => "L",
            EccLevel::Medium => "M",
            EccLevel::Quartile => "Q",
            EccLevel::High => "H",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        EccLevel::ALL.iter().copied().find(|level| level.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            EccLevel::Low => "Low (7%)",
            EccLevel::Medium => "Medium (15%)",
            EccLevel::Quartile => "Quartile (25%)",
            EccLevel::High => "High (30%)",
        }
    }

    fn to_qrcodegen(self) -> QrCodeEcc {
        match self {
            EccLevel::Low => QrCodeEcc::Low,
            EccLevel::Medium => QrCodeEcc::Medium,
            EccLevel::Quartile => QrCodeEcc::Quartile,
            EccLevel::High => QrCodeEcc::High,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RenderConfig {
    /// Edge length of one module in pixels.
    pub module_size: u32,
    pub ecc: EccLevel,
}

/// A successfully encoded QR code together with the payload it encodes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    payload: String,
    ecc: EccLevel,
    downgraded: bool,
    version: u8,
    size: i32,
    module_size: u32,
    modules: Vec<bool>,
    svg: String,
}

impl Symbol {
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The level actually used, which may be lower than the configured one.
    pub fn ecc(&self) -> EccLevel {
        self.ecc
    }

    pub fn downgraded(&self) -> bool {
        self.downgraded
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Width of the symbol in modules, without quiet zone.
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn module_size(&self) -> u32 {
        self.module_size
    }

    /// Width of the rendered image in pixels, quiet zone included.
    pub fn pixel_size(&self) -> Option<u32> {
        ((self.size + 2 * QUIET_ZONE) as u32).checked_mul(self.module_size)
    }

    /// Dark module at (x, y); everything outside the symbol is light.
    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.size || y >= self.size {
            return false;
        }
        self.modules[(y * self.size + x) as usize]
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }
}

/// Payload length as the page counts it.
pub fn payload_length(payload: &str) -> usize {
    payload.encode_utf16().count()
}

/// The level used for `payload`, and whether it had to be lowered.
pub fn effective_ecc(payload: &str, config: &RenderConfig, threshold: usize) -> (EccLevel, bool) {
    if payload_length(payload) > threshold {
        (EccLevel::Low, config.ecc != EccLevel::Low)
    } else {
        (config.ecc, false)
    }
}

pub fn encode_text(
    payload: &str,
    config: &RenderConfig,
    threshold: usize,
) -> Result<Symbol, EncodingError> {
    let (ecc, downgraded) = effective_ecc(payload, config, threshold);
    let segments = QrSegment::make_segments(payload);
    let qr = QrCode::encode_segments_advanced(
        &segments,
        ecc.to_qrcodegen(),
        Version::MIN,
        Version::MAX,
        None,
        false,
    )
    .map_err(|_| EncodingError::DataTooLong {
        length: payload_length(payload),
    })?;

    let size = qr.size();
    let modules = (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .map(|(x, y)| qr.get_module(x, y))
        .collect();
    let module_size = clamp_module_size(config.module_size);

    let mut symbol = Symbol {
        payload: payload.to_owned(),
        ecc,
        downgraded,
        version: qr.version().value(),
        size,
        module_size,
        modules,
        svg: String::new(),
    };
    symbol.svg = to_svg_string(&symbol);
    Ok(symbol)
}

// No background rect: the light modules stay transparent in the page.
fn to_svg_string(symbol: &Symbol) -> String {
    let dimension = symbol.size + 2 * QUIET_ZONE;
    // module size is clamped
    let pixels = symbol.pixel_size().unwrap_or(u32::MAX);
    let mut result = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {1} {1}\" shape-rendering=\"crispEdges\">",
        pixels, dimension
    );
    result.push_str("<path d=\"");
    let mut first = true;
    for y in 0..symbol.size {
        for x in 0..symbol.size {
            if symbol.is_dark(x, y) {
                if !first {
                    result.push(' ');
                }
                first = false;
                let _ = write!(result, "M{},{}h1v1h-1z", x + QUIET_ZONE, y + QUIET_ZONE);
            }
        }
    }
    result.push_str("\" fill=\"#000000\"/></svg>");
    result
}
