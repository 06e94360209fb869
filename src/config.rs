use serde::Deserialize;

use crate::payload::DataType;
use crate::qr_generator::{EccLevel, MODULE_SIZE_RANGE};

/// Page-level settings. A host page can override any of them by defining
/// `window.QR_GENERATOR_CONFIG` before the module loads.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub debounce_ms: u32,
    /// Payloads longer than this (in UTF-16 units) are always encoded with
    /// error correction level L.
    pub long_payload_threshold: usize,
    pub module_size: u32,
    pub module_sizes: Vec<u32>,
    pub error_correction: EccLevel,
    pub flash_ms: u32,
    pub initial_type: DataType,
    pub initial_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            long_payload_threshold: 1000,
            module_size: 8,
            module_sizes: vec![4, 6, 8, 10, 12],
            error_correction: EccLevel::Medium,
            flash_ms: 2000,
            initial_type: DataType::Url,
            initial_url: Some("https://example.com".to_owned()),
        }
    }
}

impl Settings {
    /// Drops module sizes outside `MODULE_SIZE_RANGE` and makes sure the
    /// default size is one of the selectable choices.
    pub fn sanitized(mut self) -> Self {
        self.module_sizes.retain(|size| MODULE_SIZE_RANGE.contains(size));
        if !MODULE_SIZE_RANGE.contains(&self.module_size) {
            self.module_size = Settings::default().module_size;
        }
        if !self.module_sizes.contains(&self.module_size) {
            self.module_sizes.push(self.module_size);
        }
        self.module_sizes.sort_unstable();
        self.module_sizes.dedup();
        self
    }
}
