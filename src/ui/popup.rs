/// Popup UI for the Tab Divert extension

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use patternfly_yew::prelude::*;
use crate::settings::{Settings, STORAGE_KEY};

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveHost() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn reloadActiveTab() -> Result<(), JsValue>;
}

#[derive(Clone, PartialEq)]
enum AppState {
    Loading(String),
    Idle,
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading("Loading settings...".to_string()));
    let settings = use_state(Settings::new);
    let active_host = use_state(|| None::<String>);

    // Load settings and the active tab's host on mount
    {
        let state = state.clone();
        let settings = settings.clone();
        let active_host = active_host.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_popup_data().await {
                    Ok((loaded, host)) => {
                        settings.set(loaded);
                        active_host.set(host);
                        state.set(AppState::Idle);
                    }
                    Err(e) => {
                        state.set(AppState::Error(e));
                    }
                }
            });
            || ()
        });
    }

    // Re-enable a site from the disabled list
    let on_enable_host = {
        let state = state.clone();
        let settings = settings.clone();

        move |host: String| {
            let state = state.clone();
            let settings = settings.clone();

            Callback::from(move |_| {
                let mut updated = (*settings).clone();
                if !updated.set_disabled(&host, false) {
                    return;
                }

                let state = state.clone();
                let settings = settings.clone();

                state.set(AppState::Loading("Saving...".to_string()));

                spawn_local(async move {
                    match save_settings(&updated).await {
                        Ok(()) => {
                            settings.set(updated);
                            state.set(AppState::Idle);
                        }
                        Err(e) => {
                            state.set(AppState::Error(format!("Save failed: {}", e)));
                        }
                    }
                });
            })
        }
    };

    // Focus-new-tab preference
    let on_focus_change = {
        let state = state.clone();
        let settings = settings.clone();

        Callback::from(move |e: Event| {
            let input = match e.target_dyn_into::<HtmlInputElement>() {
                Some(input) => input,
                None => return,
            };

            let mut updated = (*settings).clone();
            updated.focus_new_tab = input.checked();

            let state = state.clone();
            let settings = settings.clone();

            spawn_local(async move {
                match save_settings(&updated).await {
                    Ok(()) => {
                        settings.set(updated);
                    }
                    Err(e) => {
                        state.set(AppState::Error(format!("Save failed: {}", e)));
                    }
                }
            });
        })
    };

    let is_busy = !matches!(*state, AppState::Idle);

    // Toggle button for the site in the active tab
    let site_toggle = if let Some(host) = (*active_host).clone() {
        let disabled_here = settings.is_disabled(&host);
        let label = if disabled_here {
            format!("✓ Enable on {}", host)
        } else {
            format!("✗ Disable on {}", host)
        };

        let onclick = {
            let state = state.clone();
            let settings = settings.clone();
            let host = host.clone();

            Callback::from(move |_| {
                let mut updated = (*settings).clone();
                let disable = !updated.is_disabled(&host);
                updated.set_disabled(&host, disable);

                let state = state.clone();
                let settings = settings.clone();

                state.set(AppState::Loading("Saving...".to_string()));

                spawn_local(async move {
                    match save_settings(&updated).await {
                        Ok(()) => {
                            settings.set(updated);
                            // The content script reads settings once per
                            // load; reload so the change takes effect now.
                            let _ = reloadActiveTab().await;
                            state.set(AppState::Idle);
                        }
                        Err(e) => {
                            state.set(AppState::Error(format!("Save failed: {}", e)));
                        }
                    }
                });
            })
        };

        html! {
            <div class="site-toggle">
                <p class="site-host">{&host}</p>
                <Button {onclick} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                    {label}
                </Button>
            </div>
        }
    } else {
        html! {
            <p class="site-host">{"No site in the active tab"}</p>
        }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Divert"}</h1>

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            {site_toggle}

            <label class="focus-option">
                <input
                    type="checkbox"
                    checked={settings.focus_new_tab}
                    onchange={on_focus_change}
                    disabled={is_busy}
                />
                {" Focus the new tab"}
            </label>

            // Disabled sites
            if !settings.disabled_hosts.is_empty() {
                <div class="disabled-list">
                    <h2 class="list-title">{"Disabled sites"}</h2>
                    {for settings.disabled_hosts.iter().map(|host| html! {
                        <div class="disabled-item">
                            <span class="disabled-host">{host}</span>
                            <Button
                                onclick={on_enable_host(host.clone())}
                                disabled={is_busy}
                                variant={ButtonVariant::Secondary}
                            >
                                {"Enable"}
                            </Button>
                        </div>
                    })}
                </div>
            }

            <p class="footer-popup">
                {"Tab Divert v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

async fn load_popup_data() -> Result<(Settings, Option<String>), String> {
    let settings = load_settings().await?;

    let host_js = getActiveHost()
        .await
        .map_err(|e| format!("Failed to get active tab: {:?}", e))?;
    let host = host_js.as_string().filter(|h| !h.is_empty());

    Ok((settings, host))
}

async fn load_settings() -> Result<Settings, String> {
    let value = getStorage(STORAGE_KEY)
        .await
        .map_err(|e| format!("Failed to get settings: {:?}", e))?;

    if value.is_null() || value.is_undefined() {
        return Ok(Settings::new());
    }

    serde_wasm_bindgen::from_value(value).map_err(|e| format!("Failed to parse settings: {:?}", e))
}

async fn save_settings(settings: &Settings) -> Result<(), String> {
    let value = serde_wasm_bindgen::to_value(settings)
        .map_err(|e| format!("Failed to serialize settings: {:?}", e))?;

    setStorage(STORAGE_KEY, value)
        .await
        .map_err(|e| format!("Failed to save settings: {:?}", e))
}
