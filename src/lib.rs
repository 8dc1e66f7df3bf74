/// Tab Divert - Browser extension that opens every navigation in a new tab
/// Built with Rust + WASM + Yew

pub mod content;
pub mod engine;
pub mod intent;
pub mod mutator;
pub mod options;
pub mod page;
pub mod settings;
pub mod suppress;
pub mod urls;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Content-script entry: arm the interception engine for this page load
#[wasm_bindgen]
pub fn start_content() {
    wasm_bindgen_futures::spawn_local(content::boot());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
