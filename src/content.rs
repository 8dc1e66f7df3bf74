/// Content-script wiring: arms the engine and installs the capturers
use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HashChangeEvent, MouseEvent};

use crate::engine::{self, ClickContext, ClickOutcome, Engine, OpenOutcome, RouteOutcome};
use crate::mutator;
use crate::options::EngineOptions;
use crate::page::{self, PageHost};

type SharedEngine = Rc<RefCell<Engine<PageHost>>>;

/// Per-page entry point. Consumes the re-entry marker and checks the
/// policy gate (both inside [`engine::arm`]); only when armed does any
/// listener or patch touch the page.
pub async fn boot() {
    let host = match PageHost::new() {
        Some(host) => host,
        None => return,
    };

    let settings = page::load_settings().await;
    let opts = EngineOptions::default().with_focus_new_tab(settings.focus_new_tab);

    let engine = match engine::arm(host, &settings, opts) {
        Some(engine) => engine,
        None => return,
    };

    let window = engine.host().window().clone();
    let document = match window.document() {
        Some(document) => document,
        None => return,
    };

    let engine: SharedEngine = Rc::new(RefCell::new(engine));

    if let Err(err) = install(&engine, &window, &document) {
        warn!("interception install failed: {:?}", err);
        return;
    }
    if let Err(err) = mutator::install(&document) {
        warn!("link mutator install failed: {:?}", err);
    }

    debug!("tab-divert armed on {}", window.location().host().unwrap_or_default());
}

fn install(engine: &SharedEngine, window: &web_sys::Window, document: &Document) -> Result<(), JsValue> {
    install_click_capture(engine, document)?;
    install_hash_listener(engine, window)?;
    install_traversal_observer(engine, window)?;
    patch_history(engine, window)?;
    patch_window_open(engine, window)?;
    Ok(())
}

/// Capture phase, so the engine decides before the page's own handlers and
/// before any SPA router sees the click.
fn install_click_capture(engine: &SharedEngine, document: &Document) -> Result<(), JsValue> {
    let engine = engine.clone();
    let listener = Closure::wrap(Box::new(move |event: MouseEvent| {
        let context = click_context(&event);
        if engine.borrow_mut().handle_click(&context) == ClickOutcome::Hijacked {
            event.prevent_default();
            event.stop_propagation();
        }
    }) as Box<dyn FnMut(MouseEvent)>);

    document.add_event_listener_with_callback_and_bool(
        "click",
        listener.as_ref().unchecked_ref(),
        true,
    )?;
    listener.forget();
    Ok(())
}

fn click_context(event: &MouseEvent) -> ClickContext {
    let href = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest("a[href]").ok().flatten())
        .and_then(|anchor| anchor.get_attribute("href"));

    ClickContext {
        href,
        modifier_held: event.ctrl_key() || event.meta_key() || event.shift_key() || event.alt_key(),
        primary_button: event.button() == 0,
    }
}

fn install_hash_listener(engine: &SharedEngine, window: &web_sys::Window) -> Result<(), JsValue> {
    let engine = engine.clone();
    let listener = Closure::wrap(Box::new(move |event: HashChangeEvent| {
        engine.borrow_mut().handle_hash_change(&event.new_url());
    }) as Box<dyn FnMut(HashChangeEvent)>);

    window.add_event_listener_with_callback("hashchange", listener.as_ref().unchecked_ref())?;
    listener.forget();
    Ok(())
}

fn install_traversal_observer(engine: &SharedEngine, window: &web_sys::Window) -> Result<(), JsValue> {
    let engine = engine.clone();
    let listener = Closure::wrap(Box::new(move |_event: Event| {
        engine.borrow().observe_traversal();
    }) as Box<dyn FnMut(Event)>);

    window.add_event_listener_with_callback("popstate", listener.as_ref().unchecked_ref())?;
    listener.forget();
    Ok(())
}

fn patch_history(engine: &SharedEngine, window: &web_sys::Window) -> Result<(), JsValue> {
    let history = window.history()?;
    patch_history_method(engine, &history, "pushState", true)?;
    patch_history_method(engine, &history, "replaceState", false)?;
    Ok(())
}

/// Wrap-and-delegate: the wrapper owns the original function and every
/// non-intercepted path calls it with the original arguments.
fn patch_history_method(
    engine: &SharedEngine,
    history: &web_sys::History,
    method: &'static str,
    is_push: bool,
) -> Result<(), JsValue> {
    let original = js_sys::Reflect::get(history.as_ref(), &JsValue::from_str(method))?
        .dyn_into::<js_sys::Function>()?;
    let receiver: JsValue = history.clone().into();
    let engine = engine.clone();

    let wrapper = Closure::wrap(Box::new(move |state: JsValue, title: JsValue, url: JsValue| {
        // A URL object or a state-only call has no string to inspect; the
        // engine treats it as not-a-navigation and it forwards untouched.
        let raw = url.as_string();
        let outcome = if is_push {
            engine.borrow_mut().handle_push_route(raw.as_deref())
        } else {
            engine.borrow_mut().handle_replace_route(raw.as_deref())
        };
        if outcome == RouteOutcome::Forward {
            if let Err(err) = original.call3(&receiver, &state, &title, &url) {
                warn!("delegating {} failed: {:?}", method, err);
            }
        }
    }) as Box<dyn FnMut(JsValue, JsValue, JsValue)>);

    js_sys::Reflect::set(history.as_ref(), &JsValue::from_str(method), wrapper.as_ref())?;
    wrapper.forget();
    Ok(())
}

fn patch_window_open(engine: &SharedEngine, window: &web_sys::Window) -> Result<(), JsValue> {
    let original = js_sys::Reflect::get(window.as_ref(), &JsValue::from_str("open"))?
        .dyn_into::<js_sys::Function>()?;
    let receiver: JsValue = window.clone().into();
    let engine = engine.clone();

    let wrapper = Closure::wrap(Box::new(
        move |url: JsValue, name: JsValue, features: JsValue| -> JsValue {
            let raw = url.as_string();
            match engine.borrow_mut().handle_window_open(raw.as_deref()) {
                // Callers wanting a live handle back are an accepted
                // limitation.
                OpenOutcome::Intercepted => JsValue::NULL,
                OpenOutcome::PassThrough => original
                    .call3(&receiver, &url, &name, &features)
                    .unwrap_or(JsValue::NULL),
            }
        },
    ) as Box<dyn FnMut(JsValue, JsValue, JsValue) -> JsValue>);

    js_sys::Reflect::set(window.as_ref(), &JsValue::from_str("open"), wrapper.as_ref())?;
    wrapper.forget();
    Ok(())
}
