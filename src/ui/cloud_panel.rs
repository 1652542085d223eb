//! Floating cloud panel: account, save, project list

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::core::SchemaState;
use crate::core::cloud::{CloudResult, ProjectSummary};
use crate::core::events::{CloudLoad, CloudLogout};
use crate::ui::cloud::{self, CloudContext, use_cloud};
use crate::ui::dialogs::use_dialogs;
use crate::ui::events::dispatch;
use crate::ui::modal::BaseModal;
use crate::ui::notifications::use_notifications;

const DEFAULT_PROJECT_NAME: &str = "My Database";

/// What the project list area shows
#[derive(Clone, Debug, PartialEq)]
enum ProjectList {
    Refreshing,
    Failed(String),
    Loaded(Vec<ProjectSummary>),
}

impl ProjectList {
    fn from_result(result: &CloudResult<Vec<ProjectSummary>>) -> Self {
        match result {
            Ok(projects) => Self::Loaded(projects.clone()),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    /// Status line shown instead of items; `None` when there are items
    fn status(&self) -> Option<String> {
        match self {
            Self::Refreshing => Some("Refreshing...".to_string()),
            Self::Failed(message) => Some(format!("Error loading: {}", message)),
            Self::Loaded(projects) if projects.is_empty() => {
                Some("No cloud projects found.".to_string())
            }
            Self::Loaded(_) => None,
        }
    }
}

#[component]
pub fn CloudPanel(state: RwSignal<SchemaState>) -> impl IntoView {
    let cloud_ctx = use_cloud();
    let notify = use_notifications();
    let dialogs = use_dialogs();

    let collapsed = RwSignal::new(false);
    let offset = RwSignal::new((0.0_f64, 0.0_f64));
    let drag_start = RwSignal::new(None::<((f64, f64), (f64, f64))>);
    let list = RwSignal::new(ProjectList::Loaded(Vec::new()));

    let refresh = move || {
        list.set(ProjectList::Refreshing);
        spawn_local(async move {
            let result = cloud::list_projects().await;
            if let Err(e) = &result {
                notify.error(format!("Failed to load projects: {}", e));
            }
            list.set(ProjectList::from_result(&result));
        });
    };

    // Restore the stored session once hydrated; the list is fetched even
    // without one so a missing backend is reported right away
    Effect::new(move |_| {
        if let Some(user) = cloud::current_user() {
            cloud_ctx.user.set(Some(user));
        }
        refresh();
    });

    #[cfg(feature = "hydrate")]
    {
        use leptos::ev::{mousemove, mouseup};

        let handle_move = window_event_listener(mousemove, move |ev| {
            if let Some((pointer, origin)) = drag_start.get_untracked() {
                offset.set((
                    origin.0 + ev.client_x() as f64 - pointer.0,
                    origin.1 + ev.client_y() as f64 - pointer.1,
                ));
            }
        });
        let handle_up = window_event_listener(mouseup, move |_| {
            if drag_start.get_untracked().is_some() {
                drag_start.set(None);
            }
        });

        on_cleanup(move || {
            drop(handle_move);
            drop(handle_up);
        });
    }

    let start_drag = move |ev: leptos::ev::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        ev.prevent_default();
        drag_start.set(Some((
            (ev.client_x() as f64, ev.client_y() as f64),
            offset.get_untracked(),
        )));
    };

    let save = move |_| {
        spawn_local(async move {
            if cloud_ctx.user.get_untracked().is_none() {
                notify.warning("Please login to save projects to the cloud");
                cloud_ctx.auth_open.set(true);
                return;
            }
            let Some(name) = dialogs.prompt("Enter project name:", DEFAULT_PROJECT_NAME).await else {
                return;
            };
            match cloud::save_project(name, state.get_untracked()).await {
                Ok(_) => {
                    notify.success("Project saved successfully!");
                    refresh();
                }
                Err(e) => notify.error(format!("Error saving to cloud: {}", e)),
            }
        });
    };

    let load = move |project_id: String| {
        spawn_local(async move {
            if !dialogs
                .confirm("Load this project? Current unsaved changes might be lost.")
                .await
            {
                return;
            }
            match cloud::load_schema(project_id).await {
                Ok(loaded) => {
                    dispatch(&CloudLoad { state: loaded });
                    notify.success("Project loaded");
                }
                Err(e) => notify.error(format!("Error loading project: {}", e)),
            }
        });
    };

    let logout = move |_| {
        cloud::logout();
        cloud_ctx.user.set(None);
        list.set(ProjectList::Loaded(Vec::new()));
        dispatch(&CloudLogout {});
    };

    view! {
        <div
            id="cloud-panel"
            class="cloud-panel"
            class:collapsed=move || collapsed.get()
            style:transform=move || {
                let (x, y) = offset.get();
                format!("translate({}px, {}px)", x, y)
            }
        >
            <div class="panel-header" on:mousedown=start_drag>
                <span class="panel-title">"☁️ Cloud"</span>
                <button
                    id="toggle-panel-btn"
                    class="btn-icon"
                    title="Collapse"
                    on:mousedown=|ev| ev.stop_propagation()
                    on:click=move |_| collapsed.update(|c| *c = !*c)
                >
                    {move || if collapsed.get() { "+" } else { "−" }}
                </button>
            </div>

            <div class="panel-body">
                <div id="user-info-header" class="user-info">
                    {move || match cloud_ctx.user.get() {
                        Some(user) => view! {
                            <span class="username">"👤 " {user.username}</span>
                            <button class="btn-link" on:click=logout>"Logout"</button>
                        }.into_any(),
                        None => view! {
                            <button class="btn-primary" on:click=move |_| cloud_ctx.auth_open.set(true)>
                                "Login / Register"
                            </button>
                        }.into_any(),
                    }}
                </div>

                <div class="panel-actions">
                    <button class="btn-primary" on:click=save>"💾 Save"</button>
                    <button class="btn-secondary" on:click=move |_| refresh()>"⟳ Refresh"</button>
                </div>

                <div id="cloud-projects-list" class="projects-list">
                    {move || {
                        let current = list.get();
                        if let Some(status) = current.status() {
                            let class = if matches!(current, ProjectList::Failed(_)) {
                                "list-status error"
                            } else {
                                "list-status"
                            };
                            return view! { <div class=class>{status}</div> }.into_any();
                        }
                        let ProjectList::Loaded(projects) = current else {
                            return ().into_any();
                        };
                        projects
                            .into_iter()
                            .map(|project| {
                                let id = project.id.clone();
                                view! {
                                    <div class="project-item" on:click=move |_| load(id.clone())>
                                        <span class="project-name">{project.name.clone()}</span>
                                        <span class="project-date">{project.display_date()}</span>
                                    </div>
                                }
                            })
                            .collect_view()
                            .into_any()
                    }}
                </div>
            </div>

            <AuthModal cloud_ctx=cloud_ctx on_success=Callback::new(move |_| refresh()) />
        </div>
    }
}

#[component]
fn AuthModal(cloud_ctx: CloudContext, on_success: Callback<()>) -> impl IntoView {
    let notify = use_notifications();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let is_open = Signal::derive(move || cloud_ctx.auth_open.get());
    let close = Callback::new(move |_| cloud_ctx.auth_open.set(false));

    let submit = move |register: bool| {
        let name = username.get_untracked().trim().to_string();
        let secret = password.get_untracked();
        if name.is_empty() || secret.is_empty() {
            notify.warning("Fill all fields");
            return;
        }
        busy.set(true);
        spawn_local(async move {
            let result = if register {
                cloud::register(name, secret).await
            } else {
                cloud::login(name, secret).await
            };
            busy.set(false);
            match result {
                Ok(user) => {
                    notify.success(format!("Welcome, {}!", user.username));
                    cloud_ctx.user.set(Some(user));
                    password.set(String::new());
                    cloud_ctx.auth_open.set(false);
                    on_success.run(());
                }
                Err(e) if register => notify.error(format!("Registration failed: {}", e)),
                Err(e) => notify.error(format!("Login failed: {}", e)),
            }
        });
    };

    view! {
        <BaseModal title="Cloud account".to_string() is_open=is_open on_close=close>
            <form class="auth-form" on:submit=move |ev| {
                ev.prevent_default();
                submit(false);
            }>
                <input
                    type="text"
                    placeholder="Username"
                    autocomplete="username"
                    prop:value=move || username.get()
                    on:input=move |ev| username.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    autocomplete="current-password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <div class="dialog-actions">
                    <button type="button" class="btn-secondary" disabled=move || busy.get() on:click=move |_| submit(true)>
                        "Register"
                    </button>
                    <button type="submit" class="btn-primary" disabled=move || busy.get()>
                        "Login"
                    </button>
                </div>
            </form>
        </BaseModal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cloud::CloudError;
    use futures::executor::block_on;

    fn summary(id: &str, name: &str) -> ProjectSummary {
        ProjectSummary {
            id: id.to_string(),
            name: name.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_startup_reports_missing_backend() {
        // Without a configured backend the first refresh fails
        let list = ProjectList::from_result(&block_on(cloud::list_projects()));

        assert_eq!(
            list,
            ProjectList::Failed(CloudError::NotInitialized.to_string())
        );
        assert_eq!(
            list.status().as_deref(),
            Some("Error loading: Supabase client not initialized")
        );
    }

    #[test]
    fn test_list_status_lines() {
        assert_eq!(
            ProjectList::Refreshing.status().as_deref(),
            Some("Refreshing...")
        );
        assert_eq!(
            ProjectList::from_result(&Ok(Vec::new())).status().as_deref(),
            Some("No cloud projects found.")
        );
        assert_eq!(
            ProjectList::from_result(&Ok(vec![summary("7", "shop")])).status(),
            None
        );
    }
}
