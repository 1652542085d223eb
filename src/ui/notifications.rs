//! Toast notifications
//!
//! Toasts are stacked in the corner and removed after
//! [`TOAST_DURATION_MS`](crate::core::notification::TOAST_DURATION_MS).

use crate::core::notification::{MAX_TOASTS, Toast};
use leptos::prelude::*;
use std::collections::VecDeque;

/// Toast with unique ID for tracking
#[derive(Clone, Debug)]
pub struct ToastItem {
    pub id: u64,
    pub toast: Toast,
}

/// Notifications container component
#[component]
pub fn NotificationsContainer() -> impl IntoView {
    let manager = use_notifications();
    let notifications = manager.notifications();

    view! {
        <div id="notification-container" class="notification-container">
            {move || {
                notifications.get().into_iter().map(|item| {
                    view! { <ToastView item=item notifications=notifications /> }
                }).collect_view()
            }}
        </div>
    }
}

#[component]
fn ToastView(item: ToastItem, notifications: RwSignal<VecDeque<ToastItem>>) -> impl IntoView {
    let id = item.id;

    if let Some(_ms) = item.toast.auto_dismiss_ms {
        #[cfg(feature = "hydrate")]
        {
            use gloo_timers::future::TimeoutFuture;
            use leptos::task::spawn_local;

            spawn_local(async move {
                TimeoutFuture::new(_ms).await;
                notifications.update(|n| n.retain(|i| i.id != id));
            });
        }
    }

    let class = item.toast.class();
    let icon = item.toast.kind.icon();
    let message = item.toast.message.clone();

    view! {
        <div
            class=class
            on:click=move |_| notifications.update(|n| n.retain(|i| i.id != id))
        >
            <span>{icon}</span>
            <span>{message}</span>
        </div>
    }
}

/// Handle for pushing toasts
#[derive(Clone, Copy)]
pub struct NotificationManager {
    notifications: RwSignal<VecDeque<ToastItem>>,
    next_id: RwSignal<u64>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: RwSignal::new(VecDeque::new()),
            next_id: RwSignal::new(0),
        }
    }

    pub fn notifications(&self) -> RwSignal<VecDeque<ToastItem>> {
        self.notifications
    }

    pub fn notify(&self, toast: Toast) {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);

        self.notifications.update(|n| {
            n.push_back(ToastItem { id, toast });

            // Remove oldest if we exceed max
            while n.len() > MAX_TOASTS {
                n.pop_front();
            }
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Toast::success(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Toast::error(message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(Toast::warning(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Toast::info(message));
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn provide_notifications() -> NotificationManager {
    let manager = NotificationManager::new();
    provide_context(manager);
    manager
}

pub fn use_notifications() -> NotificationManager {
    expect_context::<NotificationManager>()
}
