use dioxus::prelude::*;
use realm_price_scanner::{
    domain::AppState,
    util::version::{version_label, APP_NAME},
};

use crate::app::Route;
use crate::ui::theme;

#[component]
pub fn Shell(children: Element) -> Element {
    let state = use_context::<Signal<AppState>>();
    let loading = state.with(|st| st.is_loading());
    let current_route = use_route::<Route>();
    let nav = use_navigator();

    rsx! {
        div {
            header { class: "shell-header",
                div {
                    h1 { class: "shell-title", "{APP_NAME}" }
                    span { class: "shell-version", "{version_label()}" }
                }
                nav { class: "shell-nav",
                    NavButton { active: matches!(current_route, Route::Comparison {}), onclick: move |_| { nav.push(Route::Comparison {}); }, label: "Comparison" }
                    NavButton { active: matches!(current_route, Route::Realms {}), onclick: move |_| { nav.push(Route::Realms {}); }, label: "Realms" }
                    NavButton { active: matches!(current_route, Route::Items {}), onclick: move |_| { nav.push(Route::Items {}); }, label: "Items" }
                }
                if loading {
                    span { class: "loading", "Loading…" }
                }
            }
            main { class: "shell-main",
                {children}
            }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: theme::nav_button(active),
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
