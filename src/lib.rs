//! Visual DB - browser-based database schema designer
//!
//! Tables and relationships are drawn on a canvas and can be saved to a
//! Supabase project under a simple username/password account. Built with
//! Leptos and WebAssembly.

#![recursion_limit = "4096"]

pub mod app;
pub mod core;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
