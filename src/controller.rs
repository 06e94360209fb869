//! State owned by the page: what is selected, what was typed, what is on
//! screen and what the export buttons are doing.

use crate::config::Settings;
use crate::error::{EncodingError, ExportError, FieldReadError};
use crate::payload::{build_payload, DataType, Field, FieldSet};
use crate::qr_generator::{clamp_module_size, encode_text, EccLevel, RenderConfig, Symbol};
use crate::share::ShareOutcome;

pub const GENERATE_FIRST: &str = "Please generate a QR code first!";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatusLevel {
    Success,
    Warning,
    Error,
}

impl StatusLevel {
    pub fn class(self) -> &'static str {
        match self {
            StatusLevel::Success => "success",
            StatusLevel::Warning => "warning",
            StatusLevel::Error => "error",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            message: message.into(),
        }
    }
}

/// What the display area shows.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DisplayState {
    Empty,
    Rendered(Symbol),
    Failed(EncodingError),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ExportAction {
    Raster,
    Vector,
    Share,
}

impl ExportAction {
    pub const ALL: [ExportAction; 3] = [ExportAction::Raster, ExportAction::Vector, ExportAction::Share];

    fn index(self) -> usize {
        match self {
            ExportAction::Raster => 0,
            ExportAction::Vector => 1,
            ExportAction::Share => 2,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            ExportAction::Raster => "download-png",
            ExportAction::Vector => "download-svg",
            ExportAction::Share => "share-btn",
        }
    }

    fn format(self) -> &'static str {
        match self {
            ExportAction::Raster => "PNG",
            ExportAction::Vector => "SVG",
            ExportAction::Share => "Share",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ButtonState {
    Ready,
    InProgress,
    /// Outcome label shown for a moment after a download.
    Flash { succeeded: bool },
}

impl ButtonState {
    pub fn label(self, action: ExportAction) -> String {
        match (self, action) {
            (ButtonState::InProgress, _) => "Generating...".to_owned(),
            (ButtonState::Flash { succeeded: true }, _) => format!("{} Downloaded!", action.format()),
            (ButtonState::Flash { succeeded: false }, _) => format!("{} Failed!", action.format()),
            (ButtonState::Ready, ExportAction::Share) => "Share / Copy".to_owned(),
            (ButtonState::Ready, _) => format!("Download {}", action.format()),
        }
    }

    pub fn disabled(self) -> bool {
        self == ButtonState::InProgress
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExportRefusal {
    NothingGenerated,
    InProgress,
}

pub struct Controller {
    settings: Settings,
    kind: DataType,
    fields: FieldSet,
    config: RenderConfig,
    payload: String,
    display: DisplayState,
    status: Option<Status>,
    buttons: [ButtonState; 3],
}

impl Controller {
    pub fn new(settings: Settings) -> Self {
        let mut fields = FieldSet::new().with(Field::WifiSecurity, "WPA");
        if let Some(url) = &settings.initial_url {
            fields.set(Field::Url, url.clone());
        }
        Self {
            kind: settings.initial_type,
            fields,
            config: RenderConfig {
                module_size: clamp_module_size(settings.module_size),
                ecc: settings.error_correction,
            },
            payload: String::new(),
            display: DisplayState::Empty,
            status: None,
            buttons: [ButtonState::Ready; 3],
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn kind(&self) -> DataType {
        self.kind
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn config(&self) -> RenderConfig {
        self.config
    }

    /// Payload behind the last regeneration.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn button(&self, action: ExportAction) -> ButtonState {
        self.buttons[action.index()]
    }

    /// Returns whether the selection changed.
    pub fn select_type(&mut self, kind: DataType) -> bool {
        let changed = self.kind != kind;
        self.kind = kind;
        changed
    }

    pub fn edit_field(&mut self, field: Field, value: Result<String, FieldReadError>) {
        match value {
            Ok(value) => self.fields.set(field, value),
            Err(_) => self.fields.mark_unreadable(field),
        }
    }

    pub fn set_module_size(&mut self, module_size: u32) {
        self.config.module_size = clamp_module_size(module_size);
    }

    pub fn set_ecc(&mut self, ecc: EccLevel) {
        self.config.ecc = ecc;
    }

    /// Rebuilds the payload and the symbol from the current inputs.
    pub fn regenerate(&mut self) -> &DisplayState {
        self.payload = build_payload(self.kind, &self.fields);

        if self.payload.is_empty() {
            self.display = DisplayState::Empty;
            self.status = None;
            return &self.display;
        }

        match encode_text(&self.payload, &self.config, self.settings.long_payload_threshold) {
            Ok(symbol) => {
                self.status = Some(if symbol.downgraded() {
                    Status::warning("Data too long, using lower error correction")
                } else {
                    Status::success("QR code generated successfully")
                });
                self.display = DisplayState::Rendered(symbol);
            }
            Err(err) => {
                self.status = Some(Status::error("Generation failed: data might be too long"));
                self.display = DisplayState::Failed(err);
            }
        }
        &self.display
    }

    /// Claims the button for `action` and hands out the symbol on screen.
    pub fn begin_export(&mut self, action: ExportAction) -> Result<Symbol, ExportRefusal> {
        if self.button(action) == ButtonState::InProgress {
            return Err(ExportRefusal::InProgress);
        }
        let symbol = match &self.display {
            DisplayState::Rendered(symbol) => symbol.clone(),
            _ => {
                self.status = Some(Status::warning(GENERATE_FIRST));
                return Err(ExportRefusal::NothingGenerated);
            }
        };
        self.buttons[action.index()] = ButtonState::InProgress;
        Ok(symbol)
    }

    pub fn finish_download(&mut self, action: ExportAction, result: Result<(), ExportError>) {
        self.buttons[action.index()] = ButtonState::Flash {
            succeeded: result.is_ok(),
        };
        self.status = Some(match result {
            Ok(()) => Status::success(format!("{} downloaded!", action.format())),
            Err(err) => Status::error(format!("{} export failed: {}", action.format(), err)),
        });
    }

    pub fn finish_share(&mut self, outcome: &ShareOutcome) {
        self.buttons[ExportAction::Share.index()] = ButtonState::Ready;
        if let Some(status) = outcome.status() {
            self.status = Some(status);
        }
    }

    /// Ends the flash label of a finished download.
    pub fn reset_button(&mut self, action: ExportAction) {
        let button = &mut self.buttons[action.index()];
        if let ButtonState::Flash { .. } = button {
            *button = ButtonState::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::Debouncer;
    use crate::error::ShareError;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn controller() -> Controller {
        Controller::new(Settings::default())
    }

    fn type_into(controller: &mut Controller, field: Field, value: &str) {
        controller.edit_field(field, Ok(value.to_owned()));
    }

    #[test]
    fn starts_empty() {
        let controller = controller();
        assert_eq!(controller.kind(), DataType::Url);
        assert_eq!(*controller.display(), DisplayState::Empty);
        assert_eq!(controller.status(), None);
        assert_eq!(controller.fields().value(Field::WifiSecurity), "WPA");
    }

    #[test]
    fn default_page_shows_sample_url() {
        let mut controller = controller();
        controller.regenerate();
        assert_eq!(controller.payload(), "https://example.com");
        assert!(matches!(controller.display(), DisplayState::Rendered(_)));
    }

    #[test]
    fn initial_url_renders_on_first_regeneration() {
        let mut controller = Controller::new(Settings {
            initial_url: Some("example.com".to_owned()),
            ..Settings::default()
        });
        controller.regenerate();
        assert_eq!(controller.payload(), "https://example.com");
        assert!(matches!(controller.display(), DisplayState::Rendered(_)));
    }

    #[test]
    fn render_then_clear() {
        let mut controller = controller();
        type_into(&mut controller, Field::Url, "example.com");
        controller.regenerate();
        match controller.display() {
            DisplayState::Rendered(symbol) => assert_eq!(symbol.payload(), "https://example.com"),
            other => panic!("unexpected display {:?}", other),
        }
        assert_eq!(
            controller.status(),
            Some(&Status::success("QR code generated successfully"))
        );

        type_into(&mut controller, Field::Url, "");
        controller.regenerate();
        assert_eq!(*controller.display(), DisplayState::Empty);
        assert_eq!(controller.status(), None);
    }

    #[test]
    fn empty_vcard_is_empty_not_error() {
        let mut controller = controller();
        controller.select_type(DataType::Vcard);
        controller.regenerate();
        assert_eq!(*controller.display(), DisplayState::Empty);
    }

    #[test]
    fn long_payload_warns_and_renders() {
        let mut controller = controller();
        controller.set_ecc(EccLevel::High);
        controller.select_type(DataType::Text);
        type_into(&mut controller, Field::Text, &"a".repeat(1200));
        controller.regenerate();
        match controller.display() {
            DisplayState::Rendered(symbol) => assert_eq!(symbol.ecc(), EccLevel::Low),
            other => panic!("unexpected display {:?}", other),
        }
        assert_eq!(controller.status().map(|s| s.level), Some(StatusLevel::Warning));
    }

    #[test]
    fn oversized_payload_fails_and_recovers() {
        let mut controller = controller();
        controller.select_type(DataType::Text);
        type_into(&mut controller, Field::Text, &"z".repeat(4000));
        controller.regenerate();
        assert!(matches!(controller.display(), DisplayState::Failed(_)));
        assert_eq!(controller.status().map(|s| s.level), Some(StatusLevel::Error));
        assert_eq!(
            controller.begin_export(ExportAction::Vector),
            Err(ExportRefusal::NothingGenerated)
        );

        type_into(&mut controller, Field::Text, "short");
        controller.regenerate();
        assert!(matches!(controller.display(), DisplayState::Rendered(_)));
    }

    #[test]
    fn unreadable_field_empties_display() {
        let mut controller = controller();
        type_into(&mut controller, Field::Url, "example.com");
        controller.regenerate();
        controller.edit_field(
            Field::Url,
            Err(FieldReadError {
                field: Field::Url,
                reason: "detached".to_owned(),
            }),
        );
        controller.regenerate();
        assert_eq!(*controller.display(), DisplayState::Empty);
    }

    #[test]
    fn exports_refuse_before_generation() {
        let mut controller = controller();
        for action in ExportAction::ALL.iter().copied() {
            assert_eq!(controller.begin_export(action), Err(ExportRefusal::NothingGenerated));
            assert_eq!(controller.status(), Some(&Status::warning(GENERATE_FIRST)));
            assert_eq!(controller.button(action), ButtonState::Ready);
        }
    }

    #[test]
    fn download_button_lifecycle() {
        let mut controller = controller();
        type_into(&mut controller, Field::Url, "example.com");
        controller.regenerate();

        let symbol = controller.begin_export(ExportAction::Raster).unwrap();
        assert_eq!(symbol.payload(), "https://example.com");
        assert_eq!(controller.button(ExportAction::Raster), ButtonState::InProgress);
        assert!(controller.button(ExportAction::Raster).disabled());
        assert_eq!(
            controller.button(ExportAction::Raster).label(ExportAction::Raster),
            "Generating..."
        );
        assert_eq!(
            controller.begin_export(ExportAction::Raster),
            Err(ExportRefusal::InProgress)
        );
        // other buttons are independent
        assert!(controller.begin_export(ExportAction::Vector).is_ok());

        controller.finish_download(ExportAction::Raster, Ok(()));
        assert_eq!(
            controller.button(ExportAction::Raster).label(ExportAction::Raster),
            "PNG Downloaded!"
        );
        assert_eq!(controller.status(), Some(&Status::success("PNG downloaded!")));

        controller.reset_button(ExportAction::Raster);
        assert_eq!(
            controller.button(ExportAction::Raster).label(ExportAction::Raster),
            "Download PNG"
        );
    }

    #[test]
    fn failed_download_flashes_failure() {
        let mut controller = controller();
        type_into(&mut controller, Field::Url, "example.com");
        controller.regenerate();
        controller.begin_export(ExportAction::Vector).unwrap();
        controller.finish_download(
            ExportAction::Vector,
            Err(ExportError::Download("no document".to_owned())),
        );
        assert_eq!(
            controller.button(ExportAction::Vector),
            ButtonState::Flash { succeeded: false }
        );
        assert_eq!(controller.status().map(|s| s.level), Some(StatusLevel::Error));
    }

    #[test]
    fn cancelled_share_keeps_status() {
        let mut controller = controller();
        type_into(&mut controller, Field::Url, "example.com");
        controller.regenerate();
        let before = controller.status().cloned();

        controller.begin_export(ExportAction::Share).unwrap();
        controller.finish_share(&ShareOutcome::Cancelled);
        assert_eq!(controller.status().cloned(), before);
        assert_eq!(controller.button(ExportAction::Share), ButtonState::Ready);

        controller.begin_export(ExportAction::Share).unwrap();
        controller.finish_share(&ShareOutcome::Failed(ShareError::NotCopied));
        assert_eq!(controller.status(), Some(&Status::error("Could not copy data")));
    }

    #[test]
    fn debounced_burst_regenerates_once_with_final_state() {
        let mut controller = controller();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        for typed in &["e", "ex", "exa", "example.com"] {
            type_into(&mut controller, Field::Url, typed);
            debouncer.restart(|generation, _| generation);
        }

        let mut regenerations = 0;
        for generation in 1..=4 {
            if debouncer.fire(generation) {
                controller.regenerate();
                regenerations += 1;
            }
        }
        assert_eq!(regenerations, 1);
        assert_eq!(controller.payload(), "https://example.com");
    }
}
