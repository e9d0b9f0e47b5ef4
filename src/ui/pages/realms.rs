use dioxus::prelude::*;
use realm_price_scanner::domain::{
    language_flag, price_trend, realms_by_language, AppState, RealmId, RequestKind,
    DEFAULT_LANGUAGES,
};

use crate::{
    app::Service,
    ui::{
        components::{MoneyDisplay, PopulationBadge},
        theme,
    },
};

const ALL_LANGUAGES: [&str; 7] = [
    "English",
    "French",
    "German",
    "Spanish",
    "Portuguese",
    "Italian",
    "Russian",
];

#[component]
pub fn RealmsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let service = use_context::<Service>();
    let mut inspected = use_signal(|| None::<RealmId>);

    let (languages, grouped, loading) = state.with(|st| {
        let languages = st.selection.languages().to_vec();
        let grouped = realms_by_language(&st.realms, &languages)
            .into_iter()
            .map(|(language, realms)| {
                let realms = realms
                    .into_iter()
                    .map(|realm| (realm.clone(), st.selection.is_realm_selected(realm.id)))
                    .collect::<Vec<_>>();
                (language, realms)
            })
            .collect::<Vec<_>>();
        (languages, grouped, st.is_pending(RequestKind::Realms))
    });

    rsx! {
        section { class: "panel",
            h2 { "Languages" }
            div { class: "toggle-list",
                for language in ALL_LANGUAGES {
                    button {
                        class: theme::toggle(languages.iter().any(|l| l == language)),
                        onclick: {
                            let service = service.clone();
                            move |_| service.toggle_language(language)
                        },
                        "{language_flag(language)} {language}"
                    }
                }
                button {
                    class: "toggle",
                    onclick: {
                        let service = service.clone();
                        move |_| service.set_languages(DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect())
                    },
                    "Reset"
                }
            }
        }
        if loading {
            p { class: "loading", "Loading realms…" }
        }
        for (language, realms) in grouped {
            section { class: "panel", key: "{language}",
                h2 { "{language_flag(&language)} {language}" }
                div { class: "toggle-list",
                    for (realm, selected) in realms {
                        span { key: "{realm.id}",
                            button {
                                class: theme::toggle(selected),
                                onclick: {
                                    let service = service.clone();
                                    let id = realm.id;
                                    move |_| service.toggle_realm(id)
                                },
                                "{realm.name} "
                                PopulationBadge { population: realm.population_type, figure: realm.population }
                            }
                            button {
                                class: "toggle",
                                title: "Price history",
                                onclick: {
                                    let service = service.clone();
                                    let id = realm.id;
                                    move |_| {
                                        inspected.set(Some(id));
                                        let service = service.clone();
                                        spawn(async move {
                                            let _ = service.load_price_metrics(id).await;
                                        });
                                    }
                                },
                                "📈"
                            }
                        }
                    }
                }
            }
        }
        if let Some(realm_id) = inspected() {
            RealmMetrics { realm_id }
        }
    }
}

#[component]
fn RealmMetrics(realm_id: RealmId) -> Element {
    let state = use_context::<Signal<AppState>>();
    let (name, metrics, items, loading) = state.with(|st| {
        let name = st
            .realm(realm_id)
            .map(|realm| realm.name.clone())
            .unwrap_or_else(|| format!("Realm {realm_id}"));
        let items = st
            .price_metrics
            .get(&realm_id)
            .map(|metrics| {
                metrics
                    .item_details
                    .iter()
                    .map(|metric| {
                        let label = st
                            .item(metric.item_id)
                            .map(|item| item.name.clone())
                            .unwrap_or_else(|| format!("Item {}", metric.item_id));
                        (label, metric.clone())
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        (
            name,
            st.price_metrics.get(&realm_id).cloned(),
            items,
            st.is_pending(RequestKind::Prices),
        )
    });

    let Some(metrics) = metrics else {
        return rsx! {
            section { class: "panel",
                h2 { "{name}" }
                if loading {
                    p { class: "loading", "Loading price history…" }
                } else {
                    p { class: "muted", "No price history loaded." }
                }
            }
        };
    };

    rsx! {
        section { class: "panel",
            h2 { "{name}" }
            p {
                "Average price: "
                MoneyDisplay { price: metrics.average_price }
                " · trend {metrics.price_trend:.1}%"
            }
            table { class: "ranking",
                thead {
                    tr {
                        th { "Item" }
                        th { "Current" }
                        th { "Low" }
                        th { "High" }
                        th { "Trend" }
                    }
                }
                tbody {
                    for (label, metric) in items {
                        {
                            let trend = price_trend(metric.current_price, metric.historical_low);
                            let (class, arrow) = theme::trend(trend.direction);
                            rsx! {
                                tr { key: "{metric.item_id}",
                                    td { "{label}" }
                                    td { MoneyDisplay { price: metric.current_price } }
                                    td { MoneyDisplay { price: metric.historical_low } }
                                    td { MoneyDisplay { price: metric.historical_high } }
                                    td { class: class, "{arrow} {trend.percentage:.1}%" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
