use dioxus::prelude::*;
use realm_price_scanner::domain::{language_flag, AppState};

use crate::app::Service;

/// Removable badges for the selected realms and items.
#[component]
pub fn SelectionBadges() -> Element {
    let state = use_context::<Signal<AppState>>();
    let service = use_context::<Service>();

    let (realms, items) = state.with(|st| {
        let realms = st
            .selected_realms()
            .into_iter()
            .map(|realm| (realm.id, format!("{} {}", language_flag(&realm.language), realm.name)))
            .collect::<Vec<_>>();
        let items = st
            .selection
            .item_ids()
            .iter()
            .map(|id| {
                let name = st
                    .item(*id)
                    .map(|item| item.name.clone())
                    .unwrap_or_else(|| format!("Item {id}"));
                (*id, name)
            })
            .collect::<Vec<_>>();
        (realms, items)
    });

    rsx! {
        div { class: "panel",
            h2 { "Selected realms ({realms.len()})" }
            div {
                for (id, label) in realms {
                    span { class: "badge", key: "realm-{id}",
                        "{label}"
                        button {
                            onclick: {
                                let service = service.clone();
                                move |_| service.remove_realm(id)
                            },
                            "×"
                        }
                    }
                }
            }
            h2 { "Selected items ({items.len()})" }
            div {
                for (id, name) in items {
                    span { class: "badge", key: "item-{id}",
                        "{name}"
                        button {
                            onclick: {
                                let service = service.clone();
                                move |_| service.remove_item(id)
                            },
                            "×"
                        }
                    }
                }
            }
        }
    }
}
