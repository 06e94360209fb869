use std::collections::HashMap;
use std::time::Duration;

use wasm_bindgen::JsValue;
use web_sys::console;
use yew::prelude::*;
use yew::services::timeout::{TimeoutService, TimeoutTask};

use crate::browser::{self, BrowserShare};
use crate::controller::{Controller, DisplayState, ExportAction, ExportRefusal, GENERATE_FIRST};
use crate::debounce::Debouncer;
use crate::error::{ExportError, FieldReadError};
use crate::export;
use crate::payload::{DataType, Field, Widget};
use crate::qr_generator::{EccLevel, MODULE_SIZE_RANGE};
use crate::share::{self, ShareOutcome, ShareRequest};

pub struct Main {
    link: ComponentLink<Self>,
    controller: Controller,
    debounce: Debouncer<TimeoutTask>,
    flash: HashMap<ExportAction, TimeoutTask>,
    qr_display: NodeRef,
    svg_dirty: bool,
}

pub enum Msg {
    SelectType(DataType),
    Edit(Field, Result<String, FieldReadError>),
    ModuleSize(String),
    ErrorLevel(String),
    Regenerate(u64),
    Export(ExportAction),
    ShareDone(ShareOutcome),
    ResetButton(ExportAction),
}

fn select_value(field: Field, data: ChangeData) -> Result<String, FieldReadError> {
    match data {
        ChangeData::Select(select) => Ok(select.value()),
        ChangeData::Value(value) => Ok(value),
        ChangeData::Files(_) => Err(FieldReadError {
            field,
            reason: "expected a value, got files".to_owned(),
        }),
    }
}

fn change_value(data: ChangeData) -> Option<String> {
    match data {
        ChangeData::Select(select) => Some(select.value()),
        ChangeData::Value(value) => Some(value),
        ChangeData::Files(_) => None,
    }
}

/// Switches to `kind` right away: a pending edit timer is dropped because the
/// regeneration it would trigger happens now.
fn switch_type<T>(controller: &mut Controller, debounce: &mut Debouncer<T>, kind: DataType) -> bool {
    if !controller.select_type(kind) {
        return false;
    }
    debounce.cancel();
    controller.regenerate();
    true
}

impl Main {
    fn schedule_regeneration(&mut self) {
        let link = self.link.clone();
        self.debounce.restart(|generation, delay| {
            TimeoutService::spawn(delay, link.callback(move |_| Msg::Regenerate(generation)))
        });
    }

    fn regenerate(&mut self) {
        self.controller.regenerate();
        self.svg_dirty = true;
    }

    fn export(&mut self, action: ExportAction) -> ShouldRender {
        let symbol = match self.controller.begin_export(action) {
            Ok(symbol) => symbol,
            Err(ExportRefusal::NothingGenerated) => {
                browser::alert(GENERATE_FIRST);
                return true;
            }
            Err(ExportRefusal::InProgress) => return false,
        };

        match action {
            ExportAction::Raster | ExportAction::Vector => {
                let timestamp = browser::now_ms();
                let file = if action == ExportAction::Raster {
                    export::raster_file(&symbol, timestamp)
                } else {
                    Ok(export::vector_file(&symbol, timestamp))
                };
                let result: Result<(), ExportError> = file.and_then(|file| browser::download(&file));
                if let Err(err) = &result {
                    console::error_2(&JsValue::from_str("Export failed:"), &JsValue::from_str(&err.to_string()));
                }
                self.controller.finish_download(action, result);

                let delay = Duration::from_millis(self.controller.settings().flash_ms.into());
                let task = TimeoutService::spawn(delay, self.link.callback(move |_| Msg::ResetButton(action)));
                self.flash.insert(action, task);
            }
            ExportAction::Share => {
                let request = ShareRequest::for_payload(symbol.payload());
                let link = self.link.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = share::share(&BrowserShare, &request).await;
                    link.send_message(Msg::ShareDone(outcome));
                });
            }
        }
        true
    }

    fn view_type_button(&self, kind: DataType) -> Html {
        let class = if kind == self.controller.kind() {
            "type-btn active"
        } else {
            "type-btn"
        };
        html! {
            <button class=class onclick=self.link.callback(move |_| Msg::SelectType(kind))>
                { kind.label() }
            </button>
        }
    }

    fn view_section(&self, kind: DataType) -> Html {
        let class = if kind == self.controller.kind() {
            "input-section active"
        } else {
            "input-section"
        };
        html! {
            <div class=class id=format!("{}-section", kind)>
                { for kind.fields().iter().map(|field| self.view_field(*field)) }
            </div>
        }
    }

    fn view_field(&self, field: Field) -> Html {
        let value = self.controller.fields().value(field).to_owned();
        let control = match field.widget() {
            Widget::Input { input_type } => html! {
                <input id=field.id() class="input" type=input_type value=value
                    oninput=self.link.callback(move |e: InputData| Msg::Edit(field, Ok(e.value))) />
            },
            Widget::TextArea => html! {
                <textarea id=field.id() class="textarea" value=value
                    oninput=self.link.callback(move |e: InputData| Msg::Edit(field, Ok(e.value)))>
                </textarea>
            },
            Widget::Select { options } => html! {
                <select id=field.id() class="select"
                    onchange=self.link.callback(move |data: ChangeData| Msg::Edit(field, select_value(field, data)))>
                    { for options.iter().map(|option| html! {
                        <option value=*option selected=(value == *option)>{ option }</option>
                    }) }
                </select>
            },
        };
        html! {
            <label class="field">
                <span>{ field.label() }</span>
                { control }
            </label>
        }
    }

    fn view_options(&self) -> Html {
        let config = self.controller.config();
        html! {
            <div class="options">
                <label class="field">
                    <span>{ "Module size" }</span>
                    <select id="qr-size" class="select"
                        onchange=self.link.callback(|data: ChangeData| Msg::ModuleSize(change_value(data).unwrap_or_default()))>
                        { for self.controller.settings().module_sizes.iter().map(|size| html! {
                            <option value=size.to_string() selected=(*size == config.module_size)>{ format!("{} px", size) }</option>
                        }) }
                    </select>
                </label>
                <label class="field">
                    <span>{ "Error correction" }</span>
                    <select id="error-level" class="select"
                        onchange=self.link.callback(|data: ChangeData| Msg::ErrorLevel(change_value(data).unwrap_or_default()))>
                        { for EccLevel::ALL.iter().map(|level| html! {
                            <option value=level.code() selected=(*level == config.ecc)>{ level.label() }</option>
                        }) }
                    </select>
                </label>
            </div>
        }
    }

    fn view_display(&self) -> Html {
        let (class, placeholder) = match self.controller.display() {
            DisplayState::Empty => (
                "qr-display",
                html! {
                    <div class="qr-placeholder">
                        <div class="qr-icon">{ "📱" }</div>
                        <div>{ "Enter data to generate QR code" }</div>
                    </div>
                },
            ),
            DisplayState::Failed(_) => (
                "qr-display",
                html! {
                    <div class="qr-error">
                        <div class="qr-icon">{ "❌" }</div>
                        <div>{ "Error generating QR code" }</div>
                        <div class="hint">{ "Data might be too long" }</div>
                    </div>
                },
            ),
            DisplayState::Rendered(_) => ("qr-display has-qr", html! {}),
        };
        html! {
            <div id="qr-display" class=class>
                { placeholder }
                <div class="qr-code" ref=self.qr_display.clone()></div>
            </div>
        }
    }

    fn view_action(&self, action: ExportAction) -> Html {
        let state = self.controller.button(action);
        let class = if state.disabled() { "btn loading" } else { "btn" };
        html! {
            <button id=action.id() class=class disabled=state.disabled()
                onclick=self.link.callback(move |_| Msg::Export(action))>
                { state.label(action) }
            </button>
        }
    }

    fn view_status(&self) -> Html {
        match self.controller.status() {
            Some(status) => html! {
                <div id="status"><div class=status.level.class()>{ &status.message }</div></div>
            },
            None => html! { <div id="status"></div> },
        }
    }
}

impl Component for Main {
    type Message = Msg;
    type Properties = ();

    fn create(_: Self::Properties, link: ComponentLink<Self>) -> Self {
        let settings = browser::load_settings();
        let delay = Duration::from_millis(settings.debounce_ms.into());
        let mut main = Self {
            link,
            controller: Controller::new(settings),
            debounce: Debouncer::new(delay),
            flash: HashMap::new(),
            qr_display: NodeRef::default(),
            svg_dirty: false,
        };
        main.regenerate();
        main
    }

    fn update(&mut self, msg: Self::Message) -> ShouldRender {
        match msg {
            Msg::SelectType(kind) => {
                if !switch_type(&mut self.controller, &mut self.debounce, kind) {
                    return false;
                }
                self.svg_dirty = true;
                true
            }
            Msg::Edit(field, value) => {
                if let Err(err) = &value {
                    console::warn_1(&JsValue::from_str(&err.to_string()));
                }
                self.controller.edit_field(field, value);
                self.schedule_regeneration();
                false
            }
            Msg::ModuleSize(value) => {
                match value.parse::<u32>() {
                    Ok(size) if MODULE_SIZE_RANGE.contains(&size) => {
                        self.controller.set_module_size(size);
                        self.schedule_regeneration();
                    }
                    _ => console::warn_1(&JsValue::from_str(&format!("Ignoring module size `{}`", value))),
                }
                false
            }
            Msg::ErrorLevel(value) => {
                match EccLevel::from_code(&value) {
                    Some(level) => {
                        self.controller.set_ecc(level);
                        self.schedule_regeneration();
                    }
                    None => console::warn_1(&JsValue::from_str(&format!("Ignoring error correction level `{}`", value))),
                }
                false
            }
            Msg::Regenerate(generation) => {
                if !self.debounce.fire(generation) {
                    return false;
                }
                self.regenerate();
                true
            }
            Msg::Export(action) => self.export(action),
            Msg::ShareDone(outcome) => {
                self.controller.finish_share(&outcome);
                true
            }
            Msg::ResetButton(action) => {
                self.flash.remove(&action);
                self.controller.reset_button(action);
                true
            }
        }
    }

    fn change(&mut self, _props: Self::Properties) -> ShouldRender {
        false
    }

    fn rendered(&mut self, _first_render: bool) {
        if !self.svg_dirty {
            return;
        }
        if let Some(qr_div) = self.qr_display.cast::<web_sys::Element>() {
            match self.controller.display() {
                DisplayState::Rendered(symbol) => qr_div.set_inner_html(symbol.svg()),
                _ => qr_div.set_inner_html(""),
            }
            self.svg_dirty = false;
        }
    }

    fn view(&self) -> Html {
        html! {
            <div class="container">
                <div class="type-selector">
                    { for DataType::ALL.iter().map(|kind| self.view_type_button(*kind)) }
                </div>
                <div class="inputs">
                    { for DataType::ALL.iter().map(|kind| self.view_section(*kind)) }
                </div>
                { self.view_options() }
                { self.view_display() }
                <div class="actions">
                    { for ExportAction::ALL.iter().map(|action| self.view_action(*action)) }
                </div>
                { self.view_status() }
            </div>
        }
    }
}
