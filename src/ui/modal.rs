use leptos::prelude::*;

#[cfg(feature = "hydrate")]
use leptos::wasm_bindgen::JsCast;

/// Base modal: backdrop, titled card, Escape and backdrop click close it
#[component]
pub fn BaseModal(
    /// Modal title
    title: String,
    /// Whether modal is open
    is_open: Signal<bool>,
    /// Callback to close modal
    on_close: Callback<()>,
    /// Modal content
    children: Children,
    /// Whether clicking backdrop closes modal
    #[prop(default = true)]
    close_on_backdrop: bool,
) -> impl IntoView {
    // Close on Escape key
    #[cfg(feature = "hydrate")]
    {
        use leptos::ev::keydown;

        let handle_keydown = window_event_listener(keydown, move |ev| {
            if ev.key() == "Escape" && is_open.with_untracked(|v| *v) {
                on_close.run(());
            }
        });

        on_cleanup(move || drop(handle_keydown));
    }

    view! {
        <div
            class="modal-backdrop"
            class:hidden=move || !is_open.get()
            on:click=move |e| {
                if close_on_backdrop {
                    #[cfg(feature = "hydrate")]
                    {
                        let on_backdrop = e
                            .target()
                            .and_then(|t| t.dyn_ref::<web_sys::Element>().map(|el| el.class_list().contains("modal-backdrop")))
                            .unwrap_or(false);
                        if on_backdrop {
                            on_close.run(());
                        }
                    }
                    #[cfg(not(feature = "hydrate"))]
                    {
                        let _ = e;
                    }
                }
            }
        >
            <div class="modal-card">
                <div class="modal-header">
                    <h3>{title}</h3>
                    <button
                        class="btn-icon"
                        on:click=move |_| on_close.run(())
                        title="Close"
                        aria-label="Close modal"
                    >
                        "×"
                    </button>
                </div>
                <div class="modal-body">
                    {children()}
                </div>
            </div>
        </div>
    }
}
