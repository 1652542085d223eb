//! DOM implementation of [`CanvasSurface`].
//!
//! Table nodes are absolutely positioned `div`s inside the canvas container.
//! Every listener attached to a node is owned by the surface and detached
//! when the node goes away.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use leptos::logging::error;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent};

use super::edit_schema;
use crate::core::events::{ColumnSelected, TableSelected};
use crate::core::reconcile::{CanvasSurface, ColumnContent};
use crate::core::{Column, ColumnPatch, ColumnRef, SchemaOps, SchemaState, Table};
use crate::ui::events::dispatch;

/// Event listener detached on drop
struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

struct TableDrag {
    table_id: String,
    element: HtmlElement,
    pointer: (f64, f64),
    origin: (f64, f64),
}

/// Pointer state shared between node listeners
#[derive(Default)]
struct Interaction {
    drag: Option<TableDrag>,
    dragged_column: Option<HtmlElement>,
    link_source: Option<ColumnRef>,
}

pub struct DomSurface {
    document: Document,
    container: HtmlElement,
    state: RwSignal<SchemaState>,
    interaction: Rc<RefCell<Interaction>>,
    rendered: HashMap<String, ColumnContent>,
    listeners: HashMap<String, Vec<Listener>>,
    _document_listeners: Vec<Listener>,
}

impl DomSurface {
    pub fn new(container: HtmlElement, state: RwSignal<SchemaState>) -> Result<Self, JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("canvas is not attached to a document"))?;
        let interaction = Rc::new(RefCell::new(Interaction::default()));

        let mut surface = Self {
            document: document.clone(),
            container,
            state,
            interaction: interaction.clone(),
            rendered: HashMap::new(),
            listeners: HashMap::new(),
            _document_listeners: Vec::new(),
        };

        let target: EventTarget = document.into();
        let drag_state = interaction.clone();
        let on_move = attach(&target, "mousemove", move |event| {
            let Some(ev) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let moved = {
                let interaction = drag_state.borrow();
                interaction.drag.as_ref().map(|drag| {
                    let x = drag.origin.0 + ev.client_x() as f64 - drag.pointer.0;
                    let y = drag.origin.1 + ev.client_y() as f64 - drag.pointer.1;
                    place(&drag.element, x, y);
                    (drag.table_id.clone(), x, y)
                })
            };
            if let Some((table_id, x, y)) = moved {
                ev.prevent_default();
                edit_schema(state, |s| s.move_table(&table_id, x, y));
            }
        })?;
        let on_up = attach(&target, "mouseup", move |_| {
            let mut interaction = interaction.borrow_mut();
            if let Some(drag) = interaction.drag.take() {
                let _ = drag.element.class_list().remove_1("dragging");
            }
            // Отпустили не над колонкой
            interaction.link_source = None;
        })?;
        surface._document_listeners = vec![on_move, on_up];

        Ok(surface)
    }

    fn create(&self, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
        let element = self.document.create_element(tag)?;
        element.set_class_name(class);
        element.dyn_into::<HtmlElement>().map_err(JsValue::from)
    }

    fn editable(&self, class: &str, text: &str) -> Result<HtmlElement, JsValue> {
        let element = self.create("span", class)?;
        element.set_content_editable("true");
        element.set_attribute("spellcheck", "false")?;
        element.set_text_content(Some(text));
        Ok(element)
    }

    fn on(
        &mut self,
        owner: &str,
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let listener = attach(target, event, handler)?;
        self.listeners
            .entry(owner.to_string())
            .or_default()
            .push(listener);
        Ok(())
    }

    fn node(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn part(&self, id: &str, selector: &str) -> Option<HtmlElement> {
        self.node(id)?
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn build_table(&mut self, table: &Table) -> Result<(), JsValue> {
        let node = self.create("div", "table-node")?;
        node.set_id(&table.id);
        place(&node, table.pos_x, table.pos_y);

        let header = self.create("div", "table-header")?;
        let name = self.editable("table-name", &table.name)?;
        let delete = self.create("button", "delete-table-btn")?;
        delete.set_title("Delete table");
        delete.set_text_content(Some("×"));
        header.append_child(&name)?;
        header.append_child(&delete)?;

        let columns = self.create("div", "table-columns")?;

        let footer = self.create("div", "table-footer")?;
        let add = self.create("button", "add-column-btn")?;
        add.set_text_content(Some("+ Column"));
        footer.append_child(&add)?;

        node.append_child(&header)?;
        node.append_child(&columns)?;
        node.append_child(&footer)?;

        let id = table.id.clone();
        let state = self.state;

        let table_id = id.clone();
        let name_el = name.clone();
        self.on(&id, &name, "blur", move |_| {
            let text = name_el.text_content().unwrap_or_default();
            let changed = state.with_untracked(|s| {
                s.find_table(&table_id).is_some_and(|t| t.name != text.trim())
            });
            if changed {
                edit_schema(state, |s| s.rename_table(&table_id, &text));
            }
        })?;
        let name_el = name.clone();
        self.on(&id, &name, "keydown", move |event| {
            if event.dyn_ref::<KeyboardEvent>().is_some_and(|k| k.key() == "Enter") {
                event.prevent_default();
                let _ = name_el.blur();
            }
        })?;
        self.on(&id, &name, "mousedown", |event| event.stop_propagation())?;

        let table_id = id.clone();
        self.on(&id, &delete, "click", move |event| {
            event.stop_propagation();
            edit_schema(state, |s| s.remove_table(&table_id));
        })?;
        self.on(&id, &delete, "mousedown", |event| event.stop_propagation())?;

        let table_id = id.clone();
        self.on(&id, &add, "click", move |event| {
            event.stop_propagation();
            edit_schema(state, |s| s.add_column(&table_id));
        })?;

        let table_id = id.clone();
        self.on(&id, &node, "click", move |_| {
            dispatch(&TableSelected {
                table_id: table_id.clone(),
            });
        })?;

        let table_id = id.clone();
        let interaction = self.interaction.clone();
        let dragged = node.clone();
        self.on(&id, &header, "mousedown", move |event| {
            let Some(ev) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            if ev.button() != 0 {
                return;
            }
            let Some(origin) = state.with_untracked(|s| s.find_table(&table_id).map(Table::position))
            else {
                return;
            };
            ev.prevent_default();
            let _ = dragged.class_list().add_1("dragging");
            interaction.borrow_mut().drag = Some(TableDrag {
                table_id: table_id.clone(),
                element: dragged.clone(),
                pointer: (ev.client_x() as f64, ev.client_y() as f64),
                origin,
            });
        })?;

        // Sortable list: columns are moved while hovering, the order is
        // committed on dragend
        self.on(&id, &columns, "dragover", |event| event.prevent_default())?;
        self.on(&id, &columns, "drop", |event| event.prevent_default())?;

        self.container.append_child(&node)?;
        Ok(())
    }

    fn build_column(&mut self, table_id: &str, column: &Column) -> Result<(), JsValue> {
        let list = self
            .part(table_id, ".table-columns")
            .ok_or_else(|| JsValue::from_str("table node not rendered"))?;

        let row = self.create("div", "column-item")?;
        row.set_id(&column.id);
        row.set_draggable(true);

        let left = self.create("div", "col-handle-left")?;
        let right = self.create("div", "col-handle-right")?;
        right.set_title("Drag to another column to connect");
        let icons = self.create("span", "col-icons")?;
        let name = self.editable("col-name", &column.name)?;
        let data_type = self.editable("col-type", &column.data_type)?;

        row.append_child(&left)?;
        row.append_child(&icons)?;
        row.append_child(&name)?;
        row.append_child(&data_type)?;
        row.append_child(&right)?;

        let id = column.id.clone();
        let state = self.state;

        for (field, is_name) in [(name.clone(), true), (data_type.clone(), false)] {
            let table = table_id.to_string();
            let col = id.clone();
            let source = field.clone();
            self.on(&id, &field, "blur", move |_| {
                let text = source.text_content().unwrap_or_default();
                let current = state.with_untracked(|s| {
                    s.find_column(&table, &col)
                        .map(|c| if is_name { c.name.clone() } else { c.data_type.clone() })
                });
                if current.is_some_and(|value| value != text.trim()) {
                    let patch = if is_name {
                        ColumnPatch::name(text)
                    } else {
                        ColumnPatch::data_type(text)
                    };
                    edit_schema(state, |s| s.update_column(&table, &col, patch));
                }
            })?;

            let source = field.clone();
            let row_el = row.clone();
            self.on(&id, &field, "keydown", move |event| {
                if event.dyn_ref::<KeyboardEvent>().is_some_and(|k| k.key() == "Enter") {
                    event.prevent_default();
                    let _ = source.blur();
                }
            })?;
            // Text selection does not work inside a draggable row
            let row_focus = row_el.clone();
            self.on(&id, &field, "focus", move |_| row_focus.set_draggable(false))?;
            self.on(&id, &field, "focusout", move |_| row_el.set_draggable(true))?;
            self.on(&id, &field, "mousedown", |event| event.stop_propagation())?;
        }

        let table = table_id.to_string();
        let col = id.clone();
        self.on(&id, &row, "click", move |event| {
            event.stop_propagation();
            dispatch(&ColumnSelected {
                table_id: table.clone(),
                column_id: col.clone(),
            });
        })?;
        self.on(&id, &row, "mousedown", |event| event.stop_propagation())?;

        // Reordering
        let interaction = self.interaction.clone();
        let source = row.clone();
        self.on(&id, &row, "dragstart", move |event| {
            if let Some(transfer) = event
                .dyn_ref::<web_sys::DragEvent>()
                .and_then(|d| d.data_transfer())
            {
                transfer.set_effect_allowed("move");
                let _ = transfer.set_data("text/plain", &source.id());
            }
            let _ = source.class_list().add_1("sortable-chosen");
            interaction.borrow_mut().dragged_column = Some(source.clone());
        })?;

        let interaction = self.interaction.clone();
        let hovered = row.clone();
        self.on(&id, &row, "dragover", move |event| {
            event.prevent_default();
            let interaction = interaction.borrow();
            let Some(dragged) = interaction.dragged_column.as_ref() else {
                return;
            };
            if dragged.is_same_node(Some(hovered.as_ref())) {
                return;
            }
            let Some(parent) = hovered.parent_node() else {
                return;
            };
            if !dragged
                .parent_node()
                .is_some_and(|p| p.is_same_node(Some(&parent)))
            {
                return;
            }
            let reference = if index_in_parent(dragged) < index_in_parent(&hovered) {
                hovered.next_sibling()
            } else {
                Some(hovered.clone().into())
            };
            let _ = parent.insert_before(dragged, reference.as_ref());
        })?;

        let interaction = self.interaction.clone();
        let table = table_id.to_string();
        let list_el = list.clone();
        self.on(&id, &row, "dragend", move |_| {
            let Some(dragged) = interaction.borrow_mut().dragged_column.take() else {
                return;
            };
            let _ = dragged.class_list().remove_1("sortable-chosen");
            let order = child_ids(&list_el);
            let changed = state.with_untracked(|s| {
                s.find_table(&table).is_some_and(|t| t.column_ids() != order)
            });
            if changed {
                edit_schema(state, |s| s.reorder_columns(&table, &order));
            }
        })?;

        // Connecting
        let interaction = self.interaction.clone();
        let link = ColumnRef::new(table_id, &id);
        self.on(&id, &right, "mousedown", move |event| {
            event.prevent_default();
            event.stop_propagation();
            interaction.borrow_mut().link_source = Some(link.clone());
        })?;

        let interaction = self.interaction.clone();
        let target = ColumnRef::new(table_id, &id);
        self.on(&id, &row, "mouseup", move |_| {
            let source = interaction.borrow_mut().link_source.take();
            if let Some(source) = source
                && source.column_id != target.column_id
            {
                edit_schema(state, |s| s.connect_columns(&source, &target));
            }
        })?;

        list.append_child(&row)?;
        Ok(())
    }

    fn write_content(&mut self, column_id: &str, content: &ColumnContent) -> Result<(), JsValue> {
        let row = self
            .node(column_id)
            .ok_or_else(|| JsValue::from_str("column node not rendered"))?;
        let find = |selector: &str| row.query_selector(selector).ok().flatten();

        let mut icons = String::new();
        if content.pk {
            icons.push('🔑');
        }
        if content.fk {
            icons.push('🔗');
        }
        if let Some(el) = find(".col-icons") {
            el.set_text_content(Some(&icons));
        }
        if let Some(el) = find(".col-name") {
            el.set_text_content(Some(&content.name));
        }
        if let Some(el) = find(".col-type") {
            el.set_text_content(Some(&content.data_type));
        }
        row.class_list().toggle_with_force("is-pk", content.pk)?;
        row.class_list().toggle_with_force("is-fk", content.fk)?;
        Ok(())
    }
}

fn attach(
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Listener, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    Ok(Listener {
        target: target.clone(),
        event,
        closure,
    })
}

fn place(element: &HtmlElement, x: f64, y: f64) {
    let style = element.style();
    let _ = style.set_property("left", &format!("{}px", x));
    let _ = style.set_property("top", &format!("{}px", y));
}

fn child_elements(parent: &Element) -> Vec<Element> {
    let children = parent.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .collect()
}

fn child_ids(parent: &Element) -> Vec<String> {
    child_elements(parent).iter().map(Element::id).collect()
}

fn index_in_parent(element: &Element) -> usize {
    element
        .parent_element()
        .map(|parent| {
            child_elements(&parent)
                .iter()
                .position(|child| child.is_same_node(Some(element.as_ref())))
                .unwrap_or(0)
        })
        .unwrap_or(0)
}

impl CanvasSurface for DomSurface {
    fn table_ids(&self) -> Vec<String> {
        child_elements(&self.container)
            .into_iter()
            .filter(|el| el.class_list().contains("table-node"))
            .map(|el| el.id())
            .collect()
    }

    fn create_table(&mut self, table: &Table) {
        if let Err(e) = self.build_table(table) {
            error!("Failed to render table {}: {:?}", table.id, e);
        }
    }

    fn remove_table(&mut self, table_id: &str) {
        let Some(node) = self.node(table_id) else {
            return;
        };
        if let Some(list) = self.part(table_id, ".table-columns") {
            for column_id in child_ids(&list) {
                self.listeners.remove(&column_id);
                self.rendered.remove(&column_id);
            }
        }
        self.listeners.remove(table_id);
        node.remove();
    }

    fn is_name_focused(&self, table_id: &str) -> bool {
        match (self.document.active_element(), self.part(table_id, ".table-name")) {
            (Some(active), Some(name)) => active.is_same_node(Some(name.as_ref())),
            _ => false,
        }
    }

    fn set_table_name(&mut self, table_id: &str, name: &str) {
        if let Some(el) = self.part(table_id, ".table-name")
            && el.text_content().as_deref() != Some(name)
        {
            el.set_text_content(Some(name));
        }
    }

    fn is_dragging(&self, table_id: &str) -> bool {
        self.node(table_id)
            .is_some_and(|el| el.class_list().contains("dragging"))
    }

    fn set_table_position(&mut self, table_id: &str, x: f64, y: f64) {
        if let Some(el) = self.node(table_id) {
            place(&el, x, y);
        }
    }

    fn column_ids(&self, table_id: &str) -> Vec<String> {
        self.part(table_id, ".table-columns")
            .map(|list| child_ids(&list))
            .unwrap_or_default()
    }

    fn create_column(&mut self, table_id: &str, column: &Column) {
        if let Err(e) = self.build_column(table_id, column) {
            error!("Failed to render column {}: {:?}", column.id, e);
        }
    }

    fn remove_column(&mut self, _table_id: &str, column_id: &str) {
        self.listeners.remove(column_id);
        self.rendered.remove(column_id);
        if let Some(el) = self.node(column_id) {
            el.remove();
        }
    }

    fn is_column_focused(&self, column_id: &str) -> bool {
        match (self.document.active_element(), self.node(column_id)) {
            (Some(active), Some(row)) => {
                !active.is_same_node(Some(row.as_ref())) && row.contains(Some(active.as_ref()))
            }
            _ => false,
        }
    }

    fn column_content(&self, column_id: &str) -> Option<ColumnContent> {
        self.rendered.get(column_id).cloned()
    }

    fn set_column_content(&mut self, _table_id: &str, column_id: &str, content: &ColumnContent) {
        match self.write_content(column_id, content) {
            Ok(()) => {
                self.rendered.insert(column_id.to_string(), content.clone());
            }
            Err(e) => error!("Failed to update column {}: {:?}", column_id, e),
        }
    }

    fn place_column(&mut self, table_id: &str, column_id: &str, index: usize) {
        let (Some(list), Some(row)) = (self.part(table_id, ".table-columns"), self.node(column_id))
        else {
            return;
        };
        let children = child_elements(&list);
        match children.get(index) {
            Some(current) if current.is_same_node(Some(row.as_ref())) => {}
            Some(current) => {
                let _ = list.insert_before(&row, Some(current.as_ref()));
            }
            None => {
                let _ = list.append_child(&row);
            }
        }
    }
}
