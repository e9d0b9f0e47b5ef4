use dioxus::prelude::*;
use realm_price_scanner::{
    domain::{AppState, RequestKind},
    infra::ItemQuery,
};

use crate::{
    app::Service,
    ui::{
        components::{push_toast, MoneyDisplay, ToastKind, ToastMessage},
        theme,
    },
};

#[component]
pub fn ItemsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let service = use_context::<Service>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let mut class_filter = use_signal(|| None::<String>);

    let (page, classes, groups, selected_count, loading) = state.with(|st| {
        let rows = st
            .item_page
            .items
            .iter()
            .map(|item| (item.clone(), st.selection.is_item_selected(item.id)))
            .collect::<Vec<_>>();
        (
            (rows, st.item_page.page, st.item_page.total_pages, st.item_page.has_previous(), st.item_page.has_next()),
            st.item_classes.clone(),
            st.groups.clone(),
            st.selection.item_count(),
            st.is_pending(RequestKind::Items),
        )
    });
    let (rows, current_page, total_pages, has_previous, has_next) = page;

    let load_page = {
        let service = service.clone();
        move |page: u32| {
            let service = service.clone();
            let mut query = ItemQuery::page(page);
            if let Some(class_name) = class_filter() {
                query = query.with_class(class_name);
            }
            spawn(async move {
                let _ = service.load_items(query).await;
            });
        }
    };

    rsx! {
        section { class: "panel",
            h2 { "Groups" }
            div { class: "toggle-list",
                for group in groups {
                    button {
                        key: "{group.id}",
                        class: "toggle",
                        onclick: {
                            let service = service.clone();
                            let group = group.clone();
                            move |_| {
                                let service = service.clone();
                                let group = group.clone();
                                spawn(async move {
                                    if service.select_group(group.id).await.is_ok() {
                                        push_toast(toasts, ToastKind::Success, format!("Added items from {}", group.name));
                                    }
                                });
                            }
                        },
                        "{group.name}"
                    }
                }
            }
        }
        section { class: "panel",
            h2 { "Item classes" }
            div { class: "toggle-list",
                button {
                    class: theme::toggle(class_filter().is_none()),
                    onclick: {
                        let load_page = load_page.clone();
                        move |_| {
                            class_filter.set(None);
                            load_page(1);
                        }
                    },
                    "All"
                }
                for class in classes {
                    button {
                        key: "{class.id}",
                        class: theme::toggle(class_filter().as_deref() == Some(class.name.as_str())),
                        onclick: {
                            let load_page = load_page.clone();
                            let name = class.name.clone();
                            move |_| {
                                class_filter.set(Some(name.clone()));
                                load_page(1);
                            }
                        },
                        "{class.name}"
                    }
                }
            }
        }
        section { class: "panel",
            h2 { "Items ({selected_count} selected)" }
            button {
                class: "toggle",
                disabled: selected_count == 0,
                onclick: {
                    let service = service.clone();
                    move |_| {
                        service.clear_items();
                        push_toast(toasts, ToastKind::Info, "Cleared item selection");
                    }
                },
                "Clear selection"
            }
            if loading {
                p { class: "loading", "Loading items…" }
            }
            table { class: "ranking",
                thead {
                    tr {
                        th { "" }
                        th { "Item" }
                        th { "Class" }
                        th { "Craft cost" }
                    }
                }
                tbody {
                    for (item, selected) in rows {
                        tr { key: "{item.id}",
                            td {
                                input {
                                    r#type: "checkbox",
                                    checked: selected,
                                    onchange: {
                                        let service = service.clone();
                                        let id = item.id;
                                        move |_| service.toggle_item(id)
                                    },
                                }
                            }
                            td { "{item.name}" }
                            td { class: "muted", "{item.class_name} / {item.subclass_name}" }
                            td {
                                if let Some(cost) = item.raw_craft_cost {
                                    MoneyDisplay { price: cost }
                                } else {
                                    span { class: "muted", "-" }
                                }
                            }
                        }
                    }
                }
            }
            div { class: "pager",
                button {
                    class: "toggle",
                    disabled: !has_previous,
                    onclick: {
                        let load_page = load_page.clone();
                        move |_| load_page(current_page.saturating_sub(1))
                    },
                    "Previous"
                }
                span { class: "muted", "Page {current_page} of {total_pages}" }
                button {
                    class: "toggle",
                    disabled: !has_next,
                    onclick: {
                        let load_page = load_page.clone();
                        move |_| load_page(current_page + 1)
                    },
                    "Next"
                }
            }
        }
    }
}
