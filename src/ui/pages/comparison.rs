use dioxus::prelude::*;
use realm_price_scanner::domain::{AppState, RequestKind, TimeRange};

use crate::{
    app::Service,
    ui::{
        components::{
            push_toast, PriceRankingCard, RealmRankingTable, SelectionBadges, ToastKind,
            ToastMessage,
        },
        theme,
    },
};

#[component]
pub fn ComparisonPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let service = use_context::<Service>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let (leaderboard, cards, ranking, time_range, comparing, ready) = state.with(|st| {
        (
            st.realm_leaderboard(),
            st.item_cards(),
            st.ranking,
            st.selection.time_range(),
            st.is_pending(RequestKind::Comparison),
            st.selection.comparison_request().is_some(),
        )
    });

    let on_refresh = {
        let service = service.clone();
        move |_| {
            if !ready {
                push_toast(toasts, ToastKind::Warning, "Pick at least one realm and one item.");
                return;
            }
            let service = service.clone();
            spawn(async move {
                let _ = service.compare_selected().await;
            });
        }
    };

    rsx! {
        section { class: "panel",
            h2 { "Realm ranking" }
            p { class: "muted", "Ordered by {ranking.label()}" }
            div { class: "toggle-list",
                for range in TimeRange::ALL {
                    button {
                        class: theme::toggle(range == time_range),
                        onclick: {
                            let service = service.clone();
                            move |_| service.set_time_range(range)
                        },
                        "{range.label()}"
                    }
                }
                button { class: "toggle", disabled: comparing, onclick: on_refresh, "Refresh" }
            }
            if comparing {
                p { class: "loading", "Comparing realms…" }
            }
            RealmRankingTable { rows: leaderboard }
        }
        SelectionBadges {}
        section { class: "card-grid",
            for card in cards {
                PriceRankingCard { key: "{card.item_id}", card }
            }
        }
    }
}
