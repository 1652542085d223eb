pub mod canvas;
pub mod cloud;
pub mod cloud_panel;
pub mod dialogs;
pub mod events;
pub mod inspector;
pub mod modal;
pub mod notifications;

pub use canvas::SchemaCanvas;
pub use cloud::{CloudContext, provide_cloud_context, use_cloud};
pub use cloud_panel::CloudPanel;
pub use dialogs::{DialogHost, Dialogs, provide_dialogs, use_dialogs};
pub use inspector::Inspector;
pub use notifications::{
    NotificationManager, NotificationsContainer, provide_notifications, use_notifications,
};
