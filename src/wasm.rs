//! WebAssembly bindings for in-page use.
//!
//! Wires the manager to the browser:
//! - `localStorage` as the selection store
//! - `window.location.href` for override and debug parameters
//! - `window.dataLayer` receives every pushed event
//!
//! # Architecture
//!
//! ```text
//! Page JS → wasm-bindgen → AbTest → AbTestManager<LocalStorage> → localStorage
//!                                         ↓
//!                                  window.dataLayer
//! ```

#![cfg(target_arch = "wasm32")]

use std::sync::Arc;

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::clock::Clock;
use crate::kv::KvStore;
use crate::{
    AbTestManager, DataLayerEvent, Error, ExperimentDefinition, PageLocation, Result, Variant,
};

/// Initialize WASM module with panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_error(value: &JsValue) -> Error {
    Error::Storage(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| Error::Storage("no window".to_string()))
}

/// `window.localStorage` as a key-value store.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage> {
        window()?
            .local_storage()
            .map_err(|e| js_error(&e))?
            .ok_or_else(|| Error::Storage("localStorage is disabled".to_string()))
    }
}

impl KvStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?.get_item(key).map_err(|e| js_error(&e))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        Self::storage()?
            .set_item(key, &value)
            .map_err(|e| js_error(&e))
    }

    fn delete(&self, key: &str) -> Result<()> {
        Self::storage()?.remove_item(key).map_err(|e| js_error(&e))
    }
}

/// `Date.now()`; the system clock is unavailable on `wasm32-unknown-unknown`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}

/// Current `window.location.href`.
///
/// # Errors
///
/// Returns error if there is no window or the href cannot be parsed.
pub fn current_location() -> Result<PageLocation> {
    let href = window()?.location().href().map_err(|e| js_error(&e))?;
    PageLocation::parse(&href)
}

/// `window.dataLayer`, installed as an empty array if absent.
fn window_data_layer() -> std::result::Result<Array, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let key = JsValue::from_str("dataLayer");
    let layer = Reflect::get(&window, &key)?;
    if Array::is_array(&layer) {
        return layer.dyn_into::<Array>();
    }
    let layer = Array::new();
    Reflect::set(&window, &key, &layer)?;
    Ok(layer)
}

fn push_to_window_data_layer(event: &DataLayerEvent) -> std::result::Result<(), JsValue> {
    let value = serde_wasm_bindgen::to_value(event)?;
    window_data_layer()?.push(&value);
    Ok(())
}

/// JS function used as a hook or variant action.
struct JsCallback(Function);

impl JsCallback {
    fn call(&self, arg: &JsValue) -> anyhow::Result<()> {
        self.0
            .call1(&JsValue::NULL, arg)
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e.as_string().unwrap_or_else(|| format!("{e:?}"))))
    }
}

fn field(object: &JsValue, name: &str) -> JsValue {
    Reflect::get(object, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

fn string_field(object: &JsValue, name: &str) -> String {
    field(object, name).as_string().unwrap_or_default()
}

fn callback_field(object: &JsValue, name: &str) -> Option<JsCallback> {
    field(object, name).dyn_into::<Function>().ok().map(JsCallback)
}

/// JS truthiness of an option, or `None` when it is `null`/`undefined`.
fn flag_field(object: &JsValue, name: &str) -> Option<bool> {
    let value = field(object, name);
    (!value.is_null() && !value.is_undefined()).then(|| value.is_truthy())
}

fn variant_arg(variant: &Variant) -> JsValue {
    let object = js_sys::Object::new();
    let _ = Reflect::set(&object, &"name".into(), &variant.name().into());
    let _ = Reflect::set(&object, &"slug".into(), &variant.slug().into());
    object.into()
}

/// Convert a `RegisterTestOptions`-shaped JS object.
fn definition_from_js(options: &JsValue) -> ExperimentDefinition {
    let mut builder = ExperimentDefinition::builder(
        string_field(options, "id"),
        string_field(options, "name"),
    );

    let variants = field(options, "variants");
    if Array::is_array(&variants) {
        for entry in Array::from(&variants).iter() {
            let mut variant =
                Variant::new(string_field(&entry, "slug"), string_field(&entry, "name"));
            if let Some(on_run) = callback_field(&entry, "onRun") {
                variant = variant.with_action(move || on_run.call(&JsValue::UNDEFINED));
            }
            builder = builder.variant(variant);
        }
    }

    if let Some(debug) = flag_field(options, "debug") {
        builder = builder.debug(debug);
    }
    if let Some(use_data_layer) = flag_field(options, "useDataLayer") {
        builder = builder.use_data_layer(use_data_layer);
    }
    if let Some(name) = field(options, "dataLayerEventName").as_string() {
        builder = builder.data_layer_event_name(name);
    }
    if let Some(hook) = callback_field(options, "onBeforeRun") {
        builder = builder.on_before_run(move |variant| hook.call(&variant_arg(variant)));
    }
    if let Some(hook) = callback_field(options, "onAfterRun") {
        builder = builder.on_after_run(move |variant| hook.call(&variant_arg(variant)));
    }
    builder.build()
}

fn to_js(err: &Error) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// In-page A/B test manager exposed to JavaScript.
///
/// Events go to `window.dataLayer`; the manager's own queue is drained into
/// it after every run.
#[wasm_bindgen]
pub struct AbTest {
    manager: AbTestManager<LocalStorage>,
}

#[wasm_bindgen]
impl AbTest {
    /// Create a manager bound to `localStorage` and the current URL
    #[wasm_bindgen(constructor)]
    pub fn new() -> std::result::Result<AbTest, JsValue> {
        let location = current_location().map_err(|e| to_js(&e))?;
        let manager = AbTestManager::builder()
            .store(LocalStorage)
            .clock(Arc::new(BrowserClock))
            .location(location)
            .build();
        Ok(Self { manager })
    }

    /// Register a test from an options object
    pub fn register(&mut self, options: JsValue) -> std::result::Result<(), JsValue> {
        self.manager
            .register(definition_from_js(&options))
            .map_err(|e| to_js(&e))
    }

    /// Run a registered test; returns the chosen slug, if any
    pub fn run(&mut self, id: &str) -> std::result::Result<Option<String>, JsValue> {
        if let Ok(location) = current_location() {
            self.manager.set_location(location);
        }
        let outcome = self.manager.run(id).map_err(|e| to_js(&e))?;
        for event in self.manager.data_layer().drain() {
            if let Err(e) = push_to_window_data_layer(&event) {
                console::error_2(&"dataLayer push failed".into(), &e);
            }
        }
        Ok(outcome.map(|outcome| outcome.variant.slug().to_string()))
    }

    /// Forget the saved variant of one test
    #[wasm_bindgen(js_name = deleteSavedVariant)]
    pub fn delete_saved_variant(&self, id: &str) -> std::result::Result<(), JsValue> {
        self.manager.delete_saved_variant(id).map_err(|e| to_js(&e))
    }
}
