use crate::launch::{LaunchState, Launcher, SessionGrant};
use crate::scanner::EntryScanner;
use placement::{PlacementConfig, WasmPlacementController};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

#[wasm_bindgen]
pub struct WasmLauncher {
    inner: RefCell<Launcher>,
}

impl Default for WasmLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmLauncher {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Launcher::new()),
        }
    }

    #[wasm_bindgen(js_name = xrDetected)]
    pub fn xr_detected(&self, present: bool) {
        self.inner.borrow_mut().xr_detected(present);
    }

    /// Report the model download result
    ///
    /// # Arguments
    /// * `error` - Failure reason, or `undefined` on success
    #[wasm_bindgen(js_name = modelLoaded)]
    pub fn model_loaded(&self, error: Option<String>) {
        let result = match error {
            Some(reason) => Err(reason),
            None => Ok(()),
        };
        self.inner.borrow_mut().model_loaded(result);
    }

    #[wasm_bindgen(js_name = arSupport)]
    pub fn ar_support(&self, supported: bool) {
        self.inner.borrow_mut().ar_support(supported);
    }

    /// Report the session request result
    ///
    /// # Arguments
    /// * `hit_test` - Whether the `hit-test` feature was granted
    /// * `error` - Failure reason, or `undefined` on success
    #[wasm_bindgen(js_name = sessionStarted)]
    pub fn session_started(&self, hit_test: bool, error: Option<String>) {
        let result = match error {
            Some(reason) => Err(reason),
            None => Ok(SessionGrant { hit_test }),
        };
        self.inner.borrow_mut().session_started(result);
    }

    #[wasm_bindgen(js_name = sessionEnded)]
    pub fn session_ended(&self) {
        self.inner.borrow_mut().session_ended();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        *self.inner.borrow().state() == LaunchState::Running
    }

    #[wasm_bindgen(js_name = statusText)]
    pub fn status_text(&self) -> String {
        self.inner.borrow().status_text()
    }

    #[wasm_bindgen(js_name = startButtonVisible)]
    pub fn start_button_visible(&self) -> bool {
        self.inner.borrow().start_button_visible()
    }

    #[wasm_bindgen(js_name = loadingVisible)]
    pub fn loading_visible(&self) -> bool {
        self.inner.borrow().loading_visible()
    }

    /// Build the placement controller for the running session
    ///
    /// # Arguments
    /// * `config` - Object with `PlacementConfig` fields, or `undefined` for defaults
    ///
    /// # Returns
    /// Error text if the session lacks a required capability
    #[wasm_bindgen(js_name = createController)]
    pub fn create_controller(&self, config: JsValue) -> Result<WasmPlacementController, JsValue> {
        let config: PlacementConfig = if config.is_undefined() || config.is_null() {
            PlacementConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Config error: {}", e)))?
        };
        let controller = self
            .inner
            .borrow()
            .controller(config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmPlacementController::from_controller(controller))
    }
}

#[wasm_bindgen]
pub struct WasmEntryScanner {
    inner: RefCell<EntryScanner>,
}

impl Default for WasmEntryScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmEntryScanner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(EntryScanner::new()),
        }
    }

    /// # Returns
    /// Error text when the camera was not granted
    #[wasm_bindgen(js_name = start)]
    pub fn start(&self, camera_granted: bool) -> Option<String> {
        match self.inner.borrow_mut().start(camera_granted) {
            crate::ScannerState::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Feed one decoded frame (`jsQR` result data, or `undefined`)
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&self, decoded: Option<String>, now_ms: f64) -> bool {
        self.inner.borrow_mut().on_frame(decoded.as_deref(), now_ms)
    }

    /// # Returns
    /// Page to navigate to, once the redirect delay has passed
    #[wasm_bindgen(js_name = poll)]
    pub fn poll(&self, now_ms: f64) -> Option<String> {
        self.inner.borrow_mut().poll(now_ms)
    }

    #[wasm_bindgen(js_name = stop)]
    pub fn stop(&self) {
        self.inner.borrow_mut().stop();
    }

    #[wasm_bindgen(js_name = wantsFrames)]
    pub fn wants_frames(&self) -> bool {
        self.inner.borrow().wants_frames()
    }

    #[wasm_bindgen(js_name = startEnabled)]
    pub fn start_enabled(&self) -> bool {
        self.inner.borrow().start_enabled()
    }

    #[wasm_bindgen(js_name = stopEnabled)]
    pub fn stop_enabled(&self) -> bool {
        self.inner.borrow().stop_enabled()
    }

    #[wasm_bindgen(js_name = resultVisible)]
    pub fn result_visible(&self) -> bool {
        self.inner.borrow().result_visible()
    }
}
