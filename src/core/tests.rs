#[cfg(test)]
mod tests {
    use crate::core::cloud::CloudProvider;
    use crate::core::cloud::memory::MemoryBackend;
    use crate::core::events::{AppEvent, CloudLoad};
    use crate::core::reconcile::{CanvasSurface, Reconciler};
    use crate::core::reconcile::memory::MemorySurface;
    use crate::core::session::MemorySession;
    use crate::core::{ColumnPatch, ColumnRef, SchemaOps, SchemaState, create_demo_state};
    use futures::executor::block_on;

    fn provider() -> CloudProvider<MemoryBackend, MemorySession> {
        let provider = CloudProvider::new(
            Some(MemoryBackend::new().with_user("alice", "secret")),
            MemorySession::new(),
        );
        block_on(provider.login("alice", "secret")).unwrap();
        provider
    }

    #[test]
    fn test_edit_save_load_render_cycle() {
        let provider = provider();
        let mut state = SchemaState::new();
        let users = state.add_table((40.0, 40.0));
        let orders = state.add_table((400.0, 80.0));
        let customer = state.add_column(&orders).unwrap();
        state
            .update_column(&orders, &customer, ColumnPatch::name("customer_id"))
            .unwrap();
        let users_pk = state.find_table(&users).unwrap().columns[0].id.clone();
        state
            .connect_columns(
                &ColumnRef::new(&orders, &customer),
                &ColumnRef::new(&users, &users_pk),
            )
            .unwrap();

        let mut canvas = Reconciler::new(MemorySurface::default());
        canvas.render(&state);
        let serial = canvas.surface().table(&users).unwrap().serial;

        let rows = block_on(provider.save_project("shop", &state)).unwrap();
        let loaded = block_on(provider.load_schema(&rows[0].id)).unwrap();
        assert_eq!(loaded, state);

        // Загрузка идёт через событие cloud-load
        let detail = CloudLoad { state: loaded }.to_detail();
        let event = CloudLoad::from_detail(&detail).unwrap();
        state.replace(event.state);

        let report = canvas.render(&state);
        assert!(report.is_noop());
        assert_eq!(canvas.surface().table(&users).unwrap().serial, serial);
        assert_eq!(canvas.connections().len(), 1);
    }

    #[test]
    fn test_loading_other_project_replaces_nodes() {
        let mut state = SchemaState::new();
        state.add_table((0.0, 0.0));
        let mut canvas = Reconciler::new(MemorySurface::default());
        canvas.render(&state);

        state.replace(create_demo_state());
        let report = canvas.render(&state);

        assert_eq!(report.tables_removed, 1);
        assert_eq!(report.tables_created, 2);
        assert_eq!(canvas.surface().table_ids(), vec!["tbl_users", "tbl_posts"]);
        assert_eq!(canvas.connections().len(), 1);
    }

    #[test]
    fn test_column_drag_reorder_roundtrip() {
        let mut state = create_demo_state();
        let mut canvas = Reconciler::new(MemorySurface::default());
        canvas.render(&state);

        // Порядок, прочитанный из DOM после перетаскивания
        let mut dom_order = canvas.surface().column_ids("tbl_posts");
        dom_order.rotate_left(1);
        state.reorder_columns("tbl_posts", &dom_order).unwrap();
        canvas.render(&state);

        assert_eq!(canvas.surface().column_ids("tbl_posts"), dom_order);
        assert_eq!(
            state.find_table("tbl_posts").unwrap().column_ids(),
            dom_order
        );
    }
}
