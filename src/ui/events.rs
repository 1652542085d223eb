//! Window event bus
//!
//! Events are `CustomEvent`s dispatched on `window`, with the JSON detail
//! produced by [`AppEvent::to_detail`].

use crate::core::events::AppEvent;

#[cfg(feature = "hydrate")]
pub fn dispatch<E: AppEvent>(event: &E) {
    use wasm_bindgen::JsValue;

    if let Some(window) = web_sys::window() {
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&JsValue::from_str(&event.to_detail()));
        if let Ok(custom) = web_sys::CustomEvent::new_with_event_init_dict(E::NAME, &init) {
            let _ = window.dispatch_event(&custom);
        }
    }
}

#[cfg(not(feature = "hydrate"))]
pub fn dispatch<E: AppEvent>(_event: &E) {
    // No-op on server
}

/// Subscribes `handler` for the lifetime of the page
#[cfg(feature = "hydrate")]
pub fn listen<E: AppEvent + 'static>(handler: impl Fn(E) + 'static) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::<dyn Fn(web_sys::CustomEvent)>::new(move |e: web_sys::CustomEvent| {
        if let Some(event) = e.detail().as_string().and_then(|d| E::from_detail(&d)) {
            handler(event);
        }
    });
    let _ = window.add_event_listener_with_callback(E::NAME, closure.as_ref().unchecked_ref());
    closure.forget();
}

#[cfg(not(feature = "hydrate"))]
pub fn listen<E: AppEvent + 'static>(_handler: impl Fn(E) + 'static) {}
