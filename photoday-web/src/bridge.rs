//! `wasm-bindgen` surface used by the host page.
use js_sys::Function;
use wasm_bindgen::prelude::*;

use photoday_sim::{SimConfig, SimulationController, TrialStore};

use crate::clock::PerformanceClock;
use crate::error::WebError;
use crate::message::{MessageSink, RenderMessage, phase_label};

type JsEmitter = Box<dyn FnMut(RenderMessage)>;

fn js_emitter(callback: Function) -> JsEmitter {
    Box::new(move |message: RenderMessage| {
        let name = JsValue::from_str(message.name());
        match serde_wasm_bindgen::to_value(&message) {
            Ok(payload) => {
                if let Err(err) = callback.call2(&JsValue::NULL, &name, &payload) {
                    log::warn!("render callback {} threw: {err:?}", message.name());
                }
            }
            Err(err) => log::warn!("could not encode {}: {err}", message.name()),
        }
    })
}

fn read_config(config: JsValue) -> Result<SimConfig, WebError> {
    if config.is_undefined() || config.is_null() {
        return Ok(SimConfig::default());
    }
    let config: SimConfig = serde_wasm_bindgen::from_value(config)?;
    config.validate()?;
    Ok(config)
}

/// One simulation session bound to a host page.
#[wasm_bindgen]
pub struct Simulation {
    controller: SimulationController<MessageSink<JsEmitter>, PerformanceClock>,
    store: TrialStore,
}

#[wasm_bindgen]
impl Simulation {
    /// `config` is a plain object with the start-up options (or `undefined`);
    /// `render(name, payload)` receives every render call.
    ///
    /// # Errors
    ///
    /// Throws when the configuration cannot be read or is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, render: Function) -> Result<Simulation, JsValue> {
        let config = read_config(config)?;
        let store = TrialStore::new();
        let controller = SimulationController::new(
            config,
            store.clone(),
            MessageSink::new(js_emitter(render)),
            PerformanceClock::new(),
        )
        .map_err(WebError::from)?;
        Ok(Self { controller, store })
    }

    pub fn start(&mut self) {
        self.controller.start();
    }

    pub fn pause(&mut self) {
        self.controller.pause();
    }

    pub fn resume(&mut self) {
        self.controller.resume();
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    #[wasm_bindgen(js_name = requestLightChange)]
    pub fn request_light_change(&mut self, percent: u8) {
        self.controller.request_light_change(percent);
    }

    #[wasm_bindgen(js_name = setAnimationSpeedRatio)]
    pub fn set_animation_speed_ratio(&mut self, ratio: f64) -> bool {
        self.controller.set_animation_speed_ratio(ratio)
    }

    /// Call from the page's frame loop.
    pub fn tick(&mut self) {
        self.controller.tick();
    }

    #[wasm_bindgen(js_name = fastForwardDay)]
    pub fn fast_forward_day(&mut self) {
        self.controller.fast_forward_day();
    }

    /// Every retained trial as a JSON array.
    ///
    /// # Errors
    ///
    /// Throws if serialization fails.
    #[wasm_bindgen(js_name = exportTrials)]
    pub fn export_trials(&self) -> Result<String, JsValue> {
        Ok(self.store.to_json().map_err(WebError::from)?)
    }

    #[wasm_bindgen(js_name = trialCount)]
    pub fn trial_count(&self) -> usize {
        self.store.len()
    }

    pub fn phase(&self) -> String {
        phase_label(self.controller.phase()).to_string()
    }

    pub fn day(&self) -> u32 {
        self.controller.day()
    }

    pub fn energy(&self) -> f64 {
        self.controller.energy_level()
    }

    pub fn light(&self) -> u8 {
        self.controller.light().percent()
    }
}
