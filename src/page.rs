/// Browser-backed host implementation and storage bridge for Tab Divert
use log::warn;
use thiserror::Error;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::engine::Host;
use crate::settings::{Settings, STORAGE_KEY};

// Import JS bridge functions
#[wasm_bindgen(module = "/content.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn createTab(url: &str, focus: bool) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn markReentry() -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn peekAndClearReentry() -> Result<bool, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;
}

/// Failures at the extension-storage boundary. These never reach the host
/// page; callers log and fall back to defaults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage bridge call failed: {0}")]
    Bridge(String),

    #[error("stored settings did not deserialize: {0}")]
    Malformed(String),
}

/// Load persisted settings, falling back to defaults on any failure so the
/// gate fails open.
pub async fn load_settings() -> Settings {
    match fetch_settings().await {
        Ok(settings) => settings,
        Err(err) => {
            warn!("falling back to default settings: {}", err);
            Settings::default()
        }
    }
}

async fn fetch_settings() -> Result<Settings, StoreError> {
    let value = getStorage(STORAGE_KEY)
        .await
        .map_err(|err| StoreError::Bridge(format!("{:?}", err)))?;

    if value.is_null() || value.is_undefined() {
        return Ok(Settings::default());
    }

    serde_wasm_bindgen::from_value(value).map_err(|err| StoreError::Malformed(err.to_string()))
}

/// The engine's [`Host`] backed by the real page and the extension bridge.
pub struct PageHost {
    window: web_sys::Window,
}

impl PageHost {
    pub fn new() -> Option<PageHost> {
        web_sys::window().map(|window| PageHost { window })
    }

    pub fn window(&self) -> &web_sys::Window {
        &self.window
    }
}

impl Host for PageHost {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn current_url(&self) -> Option<Url> {
        let href = self.window.location().href().ok()?;
        Url::parse(&href).ok()
    }

    fn create_tab(&self, url: &Url, focus: bool) {
        let url = url.to_string();
        spawn_local(async move {
            if let Err(err) = createTab(&url, focus).await {
                warn!("tab creation failed: {:?}", err);
            }
        });
    }

    fn schedule_tab(&self, url: &Url, focus: bool, delay_ms: u32) {
        let url = url.to_string();
        let callback = Closure::once_into_js(move || {
            spawn_local(async move {
                if let Err(err) = createTab(&url, focus).await {
                    warn!("deferred tab creation failed: {:?}", err);
                }
            });
        });

        let scheduled = self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            delay_ms as i32,
        );
        if let Err(err) = scheduled {
            warn!("could not schedule deferred tab open: {:?}", err);
        }
    }

    fn mark_reentry(&self) {
        if let Err(err) = markReentry() {
            warn!("re-entry marker set failed: {:?}", err);
        }
    }

    fn peek_and_clear_reentry(&self) -> bool {
        match peekAndClearReentry() {
            Ok(hit) => hit,
            Err(err) => {
                warn!("re-entry marker read failed: {:?}", err);
                false
            }
        }
    }
}
