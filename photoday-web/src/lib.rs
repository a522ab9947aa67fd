#![forbid(unsafe_code)]
//! Browser bridge for the Photoday simulation.
//!
//! The host page owns every widget. It constructs a `Simulation` with a
//! render callback, forwards button presses, and calls `tick` from its frame
//! loop; render calls come back as named [`RenderMessage`] payloads.

pub mod error;
pub mod message;

#[cfg(target_arch = "wasm32")]
pub mod bridge;
#[cfg(target_arch = "wasm32")]
pub mod clock;

#[cfg(target_arch = "wasm32")]
pub use bridge::Simulation;
#[cfg(target_arch = "wasm32")]
pub use clock::PerformanceClock;
pub use error::WebError;
pub use message::{MessageSink, RenderMessage, phase_label};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
