use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Array, Function, Object, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, Blob, HtmlDocument, HtmlTextAreaElement, Url};

use crate::config::Settings;
use crate::error::{ExportError, ShareError};
use crate::export::ExportFile;
use crate::share::{Attempt, SharePlatform, ShareRequest, ShareTier};

const CONFIG_GLOBAL: &str = "QR_GENERATOR_CONFIG";

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn error_text(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Reads `window.QR_GENERATOR_CONFIG`, falling back to defaults.
pub fn load_settings() -> Settings {
    let config = match web_sys::window() {
        Some(window) => Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)).unwrap_or(JsValue::UNDEFINED),
        None => JsValue::UNDEFINED,
    };
    if config.is_undefined() || config.is_null() {
        return Settings::default();
    }
    match config.into_serde::<Settings>() {
        Ok(settings) => settings.sanitized(),
        Err(err) => {
            console::warn_2(
                &JsValue::from_str("Ignoring invalid QR_GENERATOR_CONFIG:"),
                &JsValue::from_str(&err.to_string()),
            );
            Settings::default()
        }
    }
}

pub fn download(file: &ExportFile) -> Result<(), ExportError> {
    trigger_download(file).map_err(|err| ExportError::Download(error_text(&err)))
}

fn trigger_download(file: &ExportFile) -> Result<(), JsValue> {
    let mut options = web_sys::BlobPropertyBag::new();
    options.type_(file.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(
        &Array::of1(&Uint8Array::from(file.bytes.as_slice())),
        &options,
    )?;

    let blob_url = Url::create_object_url_with_blob(&blob)?;

    let a: web_sys::HtmlAnchorElement = document()?.create_element("A")?.unchecked_into();
    a.set_href(&blob_url);
    a.set_download(&file.name);
    a.click();

    Url::revoke_object_url(&blob_url)
}

/// The share/copy tiers as the browser provides them.
pub struct BrowserShare;

impl BrowserShare {
    async fn native(&self, request: &ShareRequest) -> Result<Attempt, JsValue> {
        let navigator = match web_sys::window() {
            Some(window) => window.navigator(),
            None => return Ok(Attempt::Unavailable),
        };
        let share = Reflect::get(&navigator, &JsValue::from_str("share"))?;
        let share: Function = match share.dyn_into() {
            Ok(share) => share,
            Err(_) => return Ok(Attempt::Unavailable),
        };

        let data = Object::new();
        Reflect::set(&data, &JsValue::from_str("title"), &JsValue::from_str(&request.title))?;
        Reflect::set(&data, &JsValue::from_str("text"), &JsValue::from_str(&request.text))?;

        let promise = share.call1(&navigator, &data)?;
        match JsFuture::from(js_sys::Promise::resolve(&promise)).await {
            Ok(_) => Ok(Attempt::Succeeded),
            Err(err) => {
                let name = Reflect::get(&err, &JsValue::from_str("name"))?.as_string();
                if name.as_deref() == Some("AbortError") {
                    Ok(Attempt::Cancelled)
                } else {
                    Ok(Attempt::Failed(ShareError::Platform(error_text(&err))))
                }
            }
        }
    }

    async fn clipboard(&self, request: &ShareRequest) -> Result<Attempt, JsValue> {
        let navigator = match web_sys::window() {
            Some(window) => window.navigator(),
            None => return Ok(Attempt::Unavailable),
        };
        let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return Ok(Attempt::Unavailable);
        }
        let write_text: Function = match Reflect::get(&clipboard, &JsValue::from_str("writeText"))?.dyn_into() {
            Ok(write_text) => write_text,
            Err(_) => return Ok(Attempt::Unavailable),
        };

        let promise = write_text.call1(&clipboard, &JsValue::from_str(&request.payload))?;
        JsFuture::from(js_sys::Promise::resolve(&promise)).await?;
        Ok(Attempt::Succeeded)
    }

    fn selection(&self, request: &ShareRequest) -> Result<Attempt, JsValue> {
        let document = document()?;
        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

        let text_area: HtmlTextAreaElement = document.create_element("textarea")?.unchecked_into();
        text_area.set_value(&request.payload);
        let style = text_area.style();
        style.set_property("position", "fixed")?;
        style.set_property("left", "-999999px")?;
        style.set_property("top", "-999999px")?;
        body.append_child(&text_area)?;

        let copy = || -> Result<bool, JsValue> {
            text_area.focus()?;
            text_area.select();
            document.unchecked_ref::<HtmlDocument>().exec_command("copy")
        };
        let copied = copy();
        // the textarea goes away whether or not copying worked
        body.remove_child(&text_area)?;

        Ok(if copied? {
            Attempt::Succeeded
        } else {
            Attempt::Failed(ShareError::NotCopied)
        })
    }
}

impl SharePlatform for BrowserShare {
    fn attempt<'a>(&'a self, tier: ShareTier, request: &'a ShareRequest) -> LocalBoxFuture<'a, Attempt> {
        async move {
            let result = match tier {
                ShareTier::Native => self.native(request).await,
                ShareTier::Clipboard => self.clipboard(request).await,
                ShareTier::Selection => self.selection(request),
            };
            result.unwrap_or_else(|err| {
                console::warn_2(&JsValue::from_str(&format!("{:?} share failed:", tier)), &err);
                Attempt::Failed(ShareError::Platform(error_text(&err)))
            })
        }
        .boxed_local()
    }
}
