//! Schema canvas
//!
//! The table nodes are not rendered by Leptos: an effect feeds every state
//! change through [`Reconciler`](crate::core::reconcile::Reconciler), which
//! patches the DOM in place. Connector lines are a regular reactive SVG
//! layer drawn from the reconciler's connection list.

#[cfg(feature = "hydrate")]
mod surface;

use leptos::prelude::*;

use crate::core::connectors::{Connection, connector_path};
use crate::core::{SchemaOps, SchemaState, StoreResult, create_demo_state};

#[cfg(feature = "hydrate")]
pub use surface::DomSurface;

/// Runs a store operation inside `state.update`, logging a rejected edit
pub fn edit_schema<T>(
    state: RwSignal<SchemaState>,
    op: impl FnOnce(&mut SchemaState) -> StoreResult<T>,
) -> Option<T> {
    let mut result = None;
    state.update(|s| match op(s) {
        Ok(value) => result = Some(value),
        Err(e) => leptos::logging::warn!("Schema edit rejected: {}", e),
    });
    result
}

/// Offset between consecutively added tables
const CASCADE_STEP: f64 = 30.0;

fn next_table_position(state: &SchemaState) -> (f64, f64) {
    let step = (state.tables.len() % 10) as f64 * CASCADE_STEP;
    (60.0 + step, 60.0 + step)
}

#[component]
pub fn SchemaCanvas(state: RwSignal<SchemaState>) -> impl IntoView {
    let container_ref = NodeRef::<leptos::html::Div>::new();
    let connections = RwSignal::new(Vec::<Connection>::new());

    #[cfg(feature = "hydrate")]
    {
        use std::cell::RefCell;
        use std::rc::Rc;

        use crate::core::reconcile::Reconciler;

        let reconciler: Rc<RefCell<Option<Reconciler<DomSurface>>>> = Rc::new(RefCell::new(None));

        Effect::new(move |_| {
            // Снимок: обработчики узлов могут писать в state во время рендера
            let snapshot = state.get();
            let Some(container) = container_ref.get() else {
                return;
            };

            let mut slot = reconciler.borrow_mut();
            if slot.is_none() {
                match DomSurface::new(container.into(), state) {
                    Ok(surface) => *slot = Some(Reconciler::new(surface)),
                    Err(e) => {
                        leptos::logging::error!("Canvas initialisation failed: {:?}", e);
                        return;
                    }
                }
            }
            if let Some(rec) = slot.as_mut() {
                rec.render(&snapshot);
                let next = rec.connections();
                if connections.with_untracked(|current| *current != next) {
                    connections.set(next);
                }
            }
        });
    }

    let add_table = move |_: leptos::ev::MouseEvent| {
        let position = state.with_untracked(next_table_position);
        state.update(|s| {
            s.add_table(position);
        });
    };

    let load_demo = move |_: leptos::ev::MouseEvent| state.set(create_demo_state());
    let is_empty = move || state.with(SchemaState::is_empty);

    view! {
        <div class="canvas-wrapper">
            <svg class="connector-layer">
                <defs>
                    <marker id="arrow" viewBox="0 0 10 10" refX="9" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse">
                        <path d="M 0 0 L 10 5 L 0 10 z" class="connector-arrow" />
                    </marker>
                </defs>
                {move || {
                    let current = connections.get();
                    state.with(|s| {
                        current
                            .iter()
                            .filter_map(|c| connector_path(s, c))
                            .map(|p| {
                                let relationship_id = p.relationship_id.clone();
                                view! {
                                    <path
                                        class="connector"
                                        d=p.d
                                        marker-end="url(#arrow)"
                                        on:dblclick=move |_| {
                                            edit_schema(state, |s| s.disconnect(&relationship_id));
                                        }
                                    />
                                }
                            })
                            .collect_view()
                    })
                }}
            </svg>

            <div id="canvas" class="canvas" node_ref=container_ref></div>

            <Show when=is_empty>
                <div class="empty-state">
                    <h2>"No tables yet"</h2>
                    <p>"Start from scratch or explore a small example schema."</p>
                    <div class="empty-state-actions">
                        <button class="btn-primary" on:click=add_table>"Create table"</button>
                        <button class="btn-secondary" on:click=load_demo>"Load demo"</button>
                    </div>
                </div>
            </Show>

            <button class="add-table-btn" title="Add table" on:click=add_table>
                "+ Table"
            </button>
        </div>
    }
}
