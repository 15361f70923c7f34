use crate::{
    controller::{InputEvent, PlacementController, StepDirection, Update},
    config::PlacementConfig,
    locator::SceneContext,
    pose::{Pose, Ray},
};
use devices::{ControllerSet, PointerSample, PointerTracker, SelectEvent};
use glam::{Vec2, Vec3};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

struct Session {
    controller: PlacementController,
    pointers: PointerTracker,
    controllers: ControllerSet,
    probe: Option<js_sys::Function>,
    cast_ray: Option<js_sys::Function>,
}

impl Session {
    fn run<R>(&mut self, f: impl FnOnce(&mut PlacementController, &mut SceneContext<'_>) -> R) -> R {
        let Session {
            controller,
            controllers,
            probe,
            cast_ray,
            ..
        } = self;

        let mut locator = |ray: &Ray| call_probe(probe.as_ref()?, ray);
        let mut caster = |screen: Vec2| call_cast_ray(cast_ray.as_ref()?, screen);
        let mut ctx = SceneContext::new(&mut locator, &mut caster, controllers);
        f(controller, &mut ctx)
    }

    fn dispatch(&mut self, event: InputEvent) -> bool {
        let update = self.run(|controller, ctx| controller.handle_event(event, ctx));
        update != Update::None
    }

    fn pointer(&mut self, sample: PointerSample) -> bool {
        match self.pointers.update(sample) {
            Some(gesture) => self.dispatch(InputEvent::Gesture(gesture)),
            None => false,
        }
    }

    fn select(&mut self, event: SelectEvent) -> bool {
        if !self.controllers.apply_select(event) {
            return false;
        }
        self.dispatch(InputEvent::Select(event))
    }
}

/// Call the JS hit-test callback: `(ray) => { position, orientation } | null`
fn call_probe(probe: &js_sys::Function, ray: &Ray) -> Option<Pose> {
    let arg = serde_wasm_bindgen::to_value(ray).ok()?;
    match probe.call1(&JsValue::NULL, &arg) {
        Ok(value) if value.is_null() || value.is_undefined() => None,
        Ok(value) => serde_wasm_bindgen::from_value(value)
            .map_err(|e| tracing::warn!("probe returned an unreadable pose: {}", e))
            .ok(),
        Err(e) => {
            tracing::warn!("probe callback threw: {:?}", e);
            None
        }
    }
}

/// Call the JS raycast callback: `(x, y) => [x, y, z] | null`
fn call_cast_ray(cast_ray: &js_sys::Function, screen: Vec2) -> Option<Vec3> {
    let x = JsValue::from_f64(screen.x as f64);
    let y = JsValue::from_f64(screen.y as f64);
    match cast_ray.call2(&JsValue::NULL, &x, &y) {
        Ok(value) if value.is_null() || value.is_undefined() => None,
        Ok(value) => serde_wasm_bindgen::from_value(value)
            .map_err(|e| tracing::warn!("raycast returned an unreadable point: {}", e))
            .ok(),
        Err(e) => {
            tracing::warn!("raycast callback threw: {:?}", e);
            None
        }
    }
}

/// JS handle to a [`PlacementController`] plus its pointer and controller state
///
/// The probe and raycast callbacks run while the controller is borrowed.
/// They must not call back into this object; compute what they need from
/// their arguments and read state after `tick` or the input call returns.
#[wasm_bindgen]
pub struct WasmPlacementController {
    inner: RefCell<Session>,
}

impl WasmPlacementController {
    /// Wrap a controller built on the Rust side (e.g. after capability checks)
    pub fn from_controller(controller: PlacementController) -> Self {
        Self {
            inner: RefCell::new(Session {
                controller,
                pointers: PointerTracker::new(),
                controllers: ControllerSet::new(),
                probe: None,
                cast_ray: None,
            }),
        }
    }
}

#[wasm_bindgen]
impl WasmPlacementController {
    /// Create a controller from a plain JS config object
    ///
    /// # Arguments
    /// * `config` - Object with `PlacementConfig` fields, or `undefined` for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPlacementController, JsValue> {
        let config: PlacementConfig = if config.is_undefined() || config.is_null() {
            PlacementConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Config error: {}", e)))?
        };
        let controller =
            PlacementController::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self::from_controller(controller))
    }

    /// Install the hit-test callback
    ///
    /// # Arguments
    /// * `probe` - `(ray) => ({ position: [x, y, z], orientation?: [x, y, z, w] }) | null`
    ///
    /// Called from inside `tick`; it must not re-enter this controller.
    #[wasm_bindgen(js_name = setProbe)]
    pub fn set_probe(&self, probe: js_sys::Function) {
        self.inner.borrow_mut().probe = Some(probe);
    }

    /// Install the screen raycast callback
    ///
    /// # Arguments
    /// * `cast_ray` - `(x, y) => [x, y, z] | null`
    ///
    /// Called from inside pointer input; it must not re-enter this controller.
    #[wasm_bindgen(js_name = setRayCaster)]
    pub fn set_ray_caster(&self, cast_ray: js_sys::Function) {
        self.inner.borrow_mut().cast_ray = Some(cast_ray);
    }

    /// Advance one frame
    ///
    /// # Returns
    /// True if the transform or state changed
    #[wasm_bindgen(js_name = tick)]
    pub fn tick(&self) -> bool {
        let update = self
            .inner
            .borrow_mut()
            .run(|controller, ctx| controller.tick(ctx));
        update != Update::None
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, id: f64, x: f32, y: f32) -> bool {
        self.inner.borrow_mut().pointer(PointerSample::down(id as u64, x, y))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, id: f64, x: f32, y: f32) -> bool {
        self.inner.borrow_mut().pointer(PointerSample::moved(id as u64, x, y))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, id: f64, x: f32, y: f32) -> bool {
        self.inner.borrow_mut().pointer(PointerSample::up(id as u64, x, y))
    }

    /// Release every pointer, e.g. on `pointercancel` or blur
    #[wasm_bindgen(js_name = pointerCancelAll)]
    pub fn pointer_cancel_all(&self) -> bool {
        let mut session = self.inner.borrow_mut();
        match session.pointers.clear() {
            Some(gesture) => session.dispatch(InputEvent::Gesture(gesture)),
            None => false,
        }
    }

    #[wasm_bindgen(js_name = controllerConnected)]
    pub fn controller_connected(&self, id: usize, name: &str) {
        self.inner.borrow_mut().controllers.connect(id, name);
    }

    #[wasm_bindgen(js_name = controllerDisconnected)]
    pub fn controller_disconnected(&self, id: usize) {
        self.inner.borrow_mut().controllers.disconnect(id);
    }

    /// Update a controller's world position for this frame
    #[wasm_bindgen(js_name = setControllerPosition)]
    pub fn set_controller_position(&self, id: usize, x: f32, y: f32, z: f32) {
        self.inner
            .borrow_mut()
            .controllers
            .set_position(id, Vec3::new(x, y, z));
    }

    #[wasm_bindgen(js_name = selectStart)]
    pub fn select_start(&self, id: usize) -> bool {
        self.inner.borrow_mut().select(SelectEvent::start(id))
    }

    #[wasm_bindgen(js_name = selectEnd)]
    pub fn select_end(&self, id: usize) -> bool {
        self.inner.borrow_mut().select(SelectEvent::end(id))
    }

    #[wasm_bindgen(js_name = scaleUp)]
    pub fn scale_up(&self) -> bool {
        self.inner
            .borrow_mut()
            .dispatch(InputEvent::ScaleStep(StepDirection::Up))
    }

    #[wasm_bindgen(js_name = scaleDown)]
    pub fn scale_down(&self) -> bool {
        self.inner
            .borrow_mut()
            .dispatch(InputEvent::ScaleStep(StepDirection::Down))
    }

    /// Commit the preview pose (continuous placement mode)
    #[wasm_bindgen(js_name = lock)]
    pub fn lock(&self) -> bool {
        self.inner.borrow_mut().dispatch(InputEvent::Lock)
    }

    #[wasm_bindgen(js_name = reset)]
    pub fn reset(&self) -> bool {
        self.inner.borrow_mut().dispatch(InputEvent::Reset)
    }

    #[wasm_bindgen(js_name = endSession)]
    pub fn end_session(&self) {
        self.inner.borrow_mut().controller.end_session();
    }

    #[wasm_bindgen(js_name = isPlaced)]
    pub fn is_placed(&self) -> bool {
        self.inner.borrow().controller.is_placed()
    }

    #[wasm_bindgen(js_name = isVisible)]
    pub fn is_visible(&self) -> bool {
        self.inner.borrow().controller.transform().visible
    }

    /// Model position as `[x, y, z]`
    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self) -> Vec<f32> {
        self.inner.borrow().controller.transform().position.to_array().to_vec()
    }

    /// Model orientation as `[x, y, z, w]`
    #[wasm_bindgen(js_name = getOrientation)]
    pub fn get_orientation(&self) -> Vec<f32> {
        self.inner.borrow().controller.transform().orientation.to_array().to_vec()
    }

    #[wasm_bindgen(js_name = getScale)]
    pub fn get_scale(&self) -> f32 {
        self.inner.borrow().controller.transform().scale
    }

    /// Column-major model matrix, ready for a renderer
    #[wasm_bindgen(js_name = getMatrix)]
    pub fn get_matrix(&self) -> Vec<f32> {
        self.inner.borrow().controller.transform().matrix().to_cols_array().to_vec()
    }

    /// Preview pose position in continuous mode, empty when none
    #[wasm_bindgen(js_name = getPreviewPosition)]
    pub fn get_preview_position(&self) -> Vec<f32> {
        self.inner
            .borrow()
            .controller
            .preview()
            .map(|pose| pose.position.to_array().to_vec())
            .unwrap_or_default()
    }

    /// "searching" or "placed"
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.inner.borrow().controller.state().to_string()
    }

    /// "none", "move" or "scale"
    #[wasm_bindgen(js_name = getGesture)]
    pub fn get_gesture(&self) -> String {
        self.inner.borrow().controller.gesture_kind().to_string()
    }
}
