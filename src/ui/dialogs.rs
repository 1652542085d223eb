//! Awaitable confirm/prompt dialogs
//!
//! `Dialogs::confirm` and `Dialogs::prompt` open a modal rendered by
//! [`DialogHost`] and resolve once the user answers. Opening a dialog while
//! another one is pending cancels the pending one.

use futures::channel::oneshot;
use leptos::prelude::*;

use crate::ui::modal::BaseModal;

#[derive(Clone, Debug, PartialEq)]
enum DialogRequest {
    Confirm { message: String },
    Prompt { message: String },
}

impl DialogRequest {
    fn message(&self) -> String {
        match self {
            Self::Confirm { message } | Self::Prompt { message } => message.clone(),
        }
    }
}

/// `None` means the dialog was cancelled
type Answer = Option<String>;

#[derive(Clone, Copy)]
pub struct Dialogs {
    current: RwSignal<Option<DialogRequest>>,
    input: RwSignal<String>,
    responder: StoredValue<Option<oneshot::Sender<Answer>>>,
}

impl Dialogs {
    fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            input: RwSignal::new(String::new()),
            responder: StoredValue::new(None),
        }
    }

    /// Resolves to `true` when the user presses OK
    pub async fn confirm(self, message: impl Into<String>) -> bool {
        let rx = self.open(
            DialogRequest::Confirm {
                message: message.into(),
            },
            String::new(),
        );
        matches!(rx.await, Ok(Some(_)))
    }

    /// Resolves to the trimmed input, or `None` when cancelled or left blank
    pub async fn prompt(self, message: impl Into<String>, default: impl Into<String>) -> Option<String> {
        let rx = self.open(
            DialogRequest::Prompt {
                message: message.into(),
            },
            default.into(),
        );
        normalize_input(rx.await.ok().flatten())
    }

    fn open(&self, request: DialogRequest, initial: String) -> oneshot::Receiver<Answer> {
        let (tx, rx) = oneshot::channel();
        let mut previous = None;
        self.responder.update_value(|slot| previous = slot.replace(tx));
        if let Some(previous) = previous {
            let _ = previous.send(None);
        }
        self.input.set(initial);
        self.current.set(Some(request));
        rx
    }

    fn answer(&self, answer: Answer) {
        let mut pending = None;
        self.responder.update_value(|slot| pending = slot.take());
        self.current.set(None);
        if let Some(tx) = pending {
            let _ = tx.send(answer);
        }
    }
}

fn normalize_input(input: Option<String>) -> Option<String> {
    input
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn provide_dialogs() -> Dialogs {
    let dialogs = Dialogs::new();
    provide_context(dialogs);
    dialogs
}

pub fn use_dialogs() -> Dialogs {
    expect_context::<Dialogs>()
}

/// Renders the active dialog, if any
#[component]
pub fn DialogHost() -> impl IntoView {
    let dialogs = use_dialogs();
    let current = dialogs.current;
    let input = dialogs.input;

    let is_open = Signal::derive(move || current.with(Option::is_some));
    let is_prompt = move || matches!(current.get(), Some(DialogRequest::Prompt { .. }));
    let message = move || current.get().map(|r| r.message()).unwrap_or_default();

    let submit = move || dialogs.answer(Some(input.get_untracked()));
    let cancel = Callback::new(move |_| dialogs.answer(None));

    view! {
        <BaseModal title="Visual DB".to_string() is_open=is_open on_close=cancel>
            <div class="dialog">
                <p class="dialog-message">{message}</p>
                <Show when=is_prompt>
                    <input
                        type="text"
                        class="dialog-input"
                        prop:value=move || input.get()
                        on:input=move |ev| input.set(event_target_value(&ev))
                        on:keydown=move |ev| {
                            if ev.key() == "Enter" {
                                ev.prevent_default();
                                submit();
                            }
                        }
                    />
                </Show>
                <div class="dialog-actions">
                    <button class="btn-secondary" on:click=move |_| cancel.run(())>"Cancel"</button>
                    <button class="btn-primary" on:click=move |_| submit()>"OK"</button>
                </div>
            </div>
        </BaseModal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_prompt_input_is_trimmed() {
        assert_eq!(
            normalize_input(Some("  shop  ".to_string())),
            Some("shop".to_string())
        );
    }

    #[test]
    fn test_blank_prompt_counts_as_cancel() {
        assert_eq!(normalize_input(Some("   ".to_string())), None);
        assert_eq!(normalize_input(None), None);
    }

    #[test]
    fn test_new_dialog_cancels_pending_one() {
        let owner = Owner::new();
        owner.set();
        let dialogs = Dialogs::new();

        let first = dialogs.open(
            DialogRequest::Prompt {
                message: "Project name:".to_string(),
            },
            "My Database".to_string(),
        );
        let second = dialogs.open(
            DialogRequest::Confirm {
                message: "Load this project?".to_string(),
            },
            String::new(),
        );

        assert_eq!(block_on(first), Ok(None));
        assert_eq!(dialogs.input.get_untracked(), "");
        assert!(matches!(
            dialogs.current.get_untracked(),
            Some(DialogRequest::Confirm { .. })
        ));

        dialogs.answer(Some(String::new()));
        assert_eq!(block_on(second), Ok(Some(String::new())));
        assert!(dialogs.current.get_untracked().is_none());
    }
}
