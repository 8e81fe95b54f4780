//! Browser client for the companion chat.
//!
//! `history` and `session` are plain Rust and tested natively; `chat_ui`
//! and `dom` bind them to the page.

use wasm_bindgen::prelude::*;

mod chat_ui;
mod dom;
pub mod history;
pub mod session;

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    wasm_logger::init(wasm_logger::Config::default());

    log::info!("Companion WASM initialized");
}

/// Wire up the chat page
#[wasm_bindgen]
pub fn init_chat_app() -> Result<(), JsValue> {
    chat_ui::ChatApp::new()?.start()
}
