use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};

use crate::core::config::{CloudConfig, META_SUPABASE_KEY, META_SUPABASE_URL};
use crate::core::events::{CloudLoad, CloudLogout};
use crate::core::{SchemaOps, SchemaState};
use crate::ui::events::listen;
use crate::ui::{
    CloudPanel, DialogHost, Inspector, NotificationsContainer, SchemaCanvas,
    provide_cloud_context, provide_dialogs, provide_notifications,
};

#[cfg(feature = "ssr")]
fn cloud_settings() -> Option<CloudConfig> {
    crate::core::config::Config::from_env().cloud()
}

#[cfg(not(feature = "ssr"))]
fn cloud_settings() -> Option<CloudConfig> {
    None
}

pub fn shell(options: LeptosOptions) -> impl IntoView {
    // Supabase settings travel to the browser as meta tags
    let cloud = cloud_settings().map(|c| {
        view! {
            <meta name=META_SUPABASE_URL content=c.supabase_url/>
            <meta name=META_SUPABASE_KEY content=c.supabase_key/>
        }
    });

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                {cloud}
                <AutoReload options=options.clone() />
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    let notify = provide_notifications();
    provide_dialogs();
    provide_cloud_context();

    // Пустая схема: пользователь увидит Empty State
    let state = RwSignal::new(SchemaState::new());

    listen(move |event: CloudLoad| state.update(|s| s.replace(event.state)));
    listen(move |_: CloudLogout| notify.info("Logged out"));

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/vdb.css"/>

        <Title text="Visual DB - Database Schema Designer"/>

        <div class="app">
            <SchemaCanvas state=state />
            <Inspector state=state />
            <CloudPanel state=state />
            <NotificationsContainer />
            <DialogHost />
        </div>
    }
}
