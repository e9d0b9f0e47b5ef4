use dioxus::prelude::*;
use realm_price_scanner::domain::{language_flag, Ranked, RealmRow};

use crate::ui::{
    components::{MoneyDisplay, PopulationBadge},
    theme,
};

/// Realm leaderboard, best first.
#[component]
pub fn RealmRankingTable(rows: Vec<Ranked<RealmRow>>) -> Element {
    if rows.is_empty() {
        return rsx! {
            p { class: "muted", "No comparison yet. Pick at least one realm and one item." }
        };
    }

    rsx! {
        table { class: "ranking",
            thead {
                tr {
                    th { "#" }
                    th { "Realm" }
                    th { "Population" }
                    th { "Total value" }
                    th { "Per item" }
                    th { "Rating" }
                }
            }
            tbody {
                for row in rows {
                    RealmRankingRow { key: "{row.entry.realm.id}", row }
                }
            }
        }
    }
}

#[component]
fn RealmRankingRow(row: Ranked<RealmRow>) -> Element {
    let realm = &row.entry.realm;
    let summary = &row.entry.summary;
    let markers = theme::rank_markers(row.is_highest, row.is_lowest);
    let rating = summary
        .rating
        .map(|rating| format!("{rating:.1}"))
        .unwrap_or_else(|| "-".to_string());

    rsx! {
        tr { class: theme::rank_row(row.is_highest, row.is_lowest),
            td { "{row.position + 1}" }
            td {
                "{language_flag(&realm.language)} {realm.name}"
                for marker in markers {
                    span { class: "rank-marker", "{marker}" }
                }
            }
            td { PopulationBadge { population: realm.population_type, figure: realm.population } }
            td { MoneyDisplay { price: summary.total_value } }
            td {
                if let Some(per_item) = summary.value_per_item {
                    MoneyDisplay { price: per_item }
                } else {
                    span { class: "muted", "-" }
                }
            }
            td { "{rating}" }
        }
    }
}
