//! Short-lived notices plus the sticky toast raised by a failed request.

use std::time::Duration;

use dioxus::prelude::*;
use realm_price_scanner::{domain::Failure, util::generate_id};

use crate::app::Service;

const NOTICE_LIFETIME: Duration = Duration::from_secs(6);
const MAX_TOASTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    fn class(self) -> &'static str {
        match self {
            ToastKind::Info => "toast toast-info",
            ToastKind::Success => "toast toast-success",
            ToastKind::Warning => "toast toast-warning",
            ToastKind::Error => "toast toast-error",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            ToastKind::Info => "ℹ️",
            ToastKind::Success => "✅",
            ToastKind::Warning => "⚠️",
            ToastKind::Error => "⛔",
        }
    }

    /// Errors stay until dismissed or replaced by a newer failure.
    fn expires(self) -> bool {
        self != ToastKind::Error
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToastMessage {
    pub id: String,
    pub kind: ToastKind,
    pub text: String,
    /// Sequence number of the request failure this toast reports.
    pub failure: Option<u64>,
}

pub fn push_toast(
    mut toasts: Signal<Vec<ToastMessage>>,
    kind: ToastKind,
    message: impl Into<String>,
) {
    let message = ToastMessage {
        id: generate_id("toast"),
        kind,
        text: message.into(),
        failure: None,
    };
    toasts.with_mut(|entries| push_capped(entries, message));
}

/// Shows a request failure, replacing the toast of any earlier one.
pub fn push_failure(mut toasts: Signal<Vec<ToastMessage>>, failure: &Failure) {
    let message = ToastMessage {
        id: generate_id("failure"),
        kind: ToastKind::Error,
        text: failure.message.clone(),
        failure: Some(failure.seq),
    };
    toasts.with_mut(|entries| {
        entries.retain(|entry| entry.failure.is_none());
        push_capped(entries, message);
    });
}

fn push_capped(entries: &mut Vec<ToastMessage>, message: ToastMessage) {
    if entries.len() >= MAX_TOASTS {
        entries.remove(0);
    }
    entries.push(message);
}

#[component]
pub fn Toast() -> Element {
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let entries = toasts();
    if entries.is_empty() {
        return rsx! { Fragment {} };
    }

    rsx! {
        div { class: "toast-stack",
            ul {
                for message in entries {
                    ToastCard { key: "{message.id}", message, toasts }
                }
            }
        }
    }
}

#[component]
fn ToastCard(message: ToastMessage, toasts: Signal<Vec<ToastMessage>>) -> Element {
    let service = use_context::<Service>();
    let ToastMessage {
        id,
        kind,
        text,
        failure,
    } = message;

    // Dismissing a failure toast also clears the error it reports, unless a
    // newer failure has replaced it.
    let dismiss = move || {
        let mut toasts = toasts;
        toasts.with_mut(|entries| entries.retain(|entry| entry.id != id));
        if let Some(seq) = failure {
            service.store().update(|state| state.dismiss_failure(seq));
        }
    };

    use_future({
        let dismiss = dismiss.clone();
        move || {
            let dismiss = dismiss.clone();
            async move {
                if kind.expires() {
                    tokio::time::sleep(NOTICE_LIFETIME).await;
                    dismiss();
                }
            }
        }
    });

    rsx! {
        li { class: kind.class(),
            span { "{kind.icon()}" }
            p { "{text}" }
            button { class: "toggle", onclick: move |_| dismiss(), "Dismiss" }
        }
    }
}
