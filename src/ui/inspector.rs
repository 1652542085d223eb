//! Property inspector for the selected table or column

use leptos::prelude::*;

use crate::core::events::{ColumnSelected, TableSelected};
use crate::core::{ColumnPatch, SchemaOps, SchemaState, TablePatch};
use crate::ui::canvas::edit_schema;
use crate::ui::events::listen;

/// Suggestions for the type field
const COMMON_TYPES: &[&str] = &[
    "INT",
    "BIGINT",
    "SERIAL",
    "VARCHAR(255)",
    "TEXT",
    "BOOLEAN",
    "DATE",
    "TIMESTAMP",
    "DECIMAL(10,2)",
    "UUID",
    "JSONB",
];

#[derive(Clone, Debug, PartialEq)]
enum Selection {
    Table(String),
    Column { table_id: String, column_id: String },
}

#[component]
pub fn Inspector(state: RwSignal<SchemaState>) -> impl IntoView {
    let selection = RwSignal::new(None::<Selection>);

    listen(move |e: TableSelected| selection.set(Some(Selection::Table(e.table_id))));
    listen(move |e: ColumnSelected| {
        selection.set(Some(Selection::Column {
            table_id: e.table_id,
            column_id: e.column_id,
        }))
    });

    view! {
        <aside class="inspector">
            <h3 class="inspector-title">"Properties"</h3>
            {move || match selection.get() {
                Some(Selection::Table(table_id)) => view! {
                    <TableProperties state=state table_id=table_id selection=selection />
                }.into_any(),
                Some(Selection::Column { table_id, column_id }) => view! {
                    <ColumnProperties state=state table_id=table_id column_id=column_id selection=selection />
                }.into_any(),
                None => view! { <p class="inspector-empty">"Select a table or column"</p> }.into_any(),
            }}
        </aside>
    }
}

#[component]
fn TableProperties(
    state: RwSignal<SchemaState>,
    table_id: String,
    selection: RwSignal<Option<Selection>>,
) -> impl IntoView {
    let table = StoredValue::new(table_id);
    let exists = move || state.with(|s| table.with_value(|id| s.find_table(id).is_some()));
    let name = move || {
        state.with(|s| {
            table.with_value(|id| s.find_table(id).map(|t| t.name.clone()).unwrap_or_default())
        })
    };
    let column_count = move || {
        state.with(|s| table.with_value(|id| s.find_table(id).map_or(0, |t| t.columns.len())))
    };

    let rename = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        let patch = TablePatch {
            name: Some(value.trim().to_string()),
            ..Default::default()
        };
        edit_schema(state, |s| s.update_table(&table.get_value(), patch));
    };

    let add_column = move |_| {
        edit_schema(state, |s| s.add_column(&table.get_value()));
    };

    let delete = move |_| {
        if edit_schema(state, |s| s.remove_table(&table.get_value())).is_some() {
            selection.set(None);
        }
    };

    view! {
        <Show
            when=exists
            fallback=|| view! { <p class="inspector-empty">"Table no longer exists"</p> }
        >
            <label class="field">
                <span>"Table name"</span>
                <input type="text" prop:value=name on:change=rename />
            </label>
            <p class="inspector-meta">{column_count} " columns"</p>
            <div class="inspector-actions">
                <button class="btn-secondary" on:click=add_column>"+ Column"</button>
                <button class="btn-danger" on:click=delete>"Delete table"</button>
            </div>
        </Show>
    }
}

#[component]
fn ColumnProperties(
    state: RwSignal<SchemaState>,
    table_id: String,
    column_id: String,
    selection: RwSignal<Option<Selection>>,
) -> impl IntoView {
    let ids = StoredValue::new((table_id, column_id));

    let field = move |read: fn(&crate::core::Column) -> String| {
        state.with(|s| {
            ids.with_value(|(t, c)| s.find_column(t, c).map(read).unwrap_or_default())
        })
    };
    let flag = move |read: fn(&crate::core::Column) -> bool| {
        state.with(|s| ids.with_value(|(t, c)| s.find_column(t, c).is_some_and(read)))
    };
    let exists = move || state.with(|s| ids.with_value(|(t, c)| s.find_column(t, c).is_some()));

    let apply = move |patch: ColumnPatch| {
        let (table_id, column_id) = ids.get_value();
        edit_schema(state, |s| s.update_column(&table_id, &column_id, patch));
    };

    let delete = move |_| {
        let (table_id, column_id) = ids.get_value();
        if edit_schema(state, |s| s.remove_column(&table_id, &column_id)).is_some() {
            selection.set(Some(Selection::Table(table_id)));
        }
    };

    view! {
        <Show
            when=exists
            fallback=|| view! { <p class="inspector-empty">"Column no longer exists"</p> }
        >
            <label class="field">
                <span>"Name"</span>
                <input
                    type="text"
                    prop:value=move || field(|c| c.name.clone())
                    on:change=move |ev| apply(ColumnPatch::name(event_target_value(&ev)))
                />
            </label>
            <label class="field">
                <span>"Type"</span>
                <input
                    type="text"
                    list="column-types"
                    prop:value=move || field(|c| c.data_type.clone())
                    on:change=move |ev| apply(ColumnPatch::data_type(event_target_value(&ev)))
                />
                <datalist id="column-types">
                    {COMMON_TYPES.iter().map(|t| view! { <option value=*t /> }).collect_view()}
                </datalist>
            </label>
            <label class="field-inline">
                <input
                    type="checkbox"
                    prop:checked=move || flag(|c| c.pk)
                    on:change=move |ev| apply(ColumnPatch {
                        pk: Some(event_target_checked(&ev)),
                        ..Default::default()
                    })
                />
                <span>"Primary key"</span>
            </label>
            <label class="field-inline">
                <input
                    type="checkbox"
                    prop:checked=move || flag(|c| c.fk)
                    on:change=move |ev| apply(ColumnPatch {
                        fk: Some(event_target_checked(&ev)),
                        ..Default::default()
                    })
                />
                <span>"Foreign key"</span>
            </label>
            <div class="inspector-actions">
                <button class="btn-danger" on:click=delete>"Delete column"</button>
            </div>
        </Show>
    }
}
