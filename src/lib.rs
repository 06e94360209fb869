#![recursion_limit = "512"]

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, KeyboardEvent};

pub mod app;
mod browser;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod export;
pub mod payload;
pub mod qr_generator;
pub mod share;
pub mod shortcut;

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();

    let link = yew::App::<app::Main>::new().mount_to_body();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        let modifier = event.ctrl_key() || event.meta_key();
        if let Some(action) = shortcut::action_for_key(&event.key(), modifier, event.shift_key()) {
            event.prevent_default();
            link.send_message(app::Msg::Export(action));
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);

    document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();

    console::log_1(&JsValue::from_str(
        "QR code generator loaded. Shortcuts: Ctrl/Cmd+S PNG, Ctrl/Cmd+Shift+S SVG, Ctrl/Cmd+Shift+C share/copy",
    ));

    Ok(())
}
