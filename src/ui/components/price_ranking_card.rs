use dioxus::prelude::*;
use realm_price_scanner::domain::{language_flag, ItemCard, ItemCardBody, Ranked, ItemRealmRow};

use crate::ui::{
    components::{MoneyDisplay, PopulationBadge},
    theme,
};

pub const NO_PRICE_DATA: &str = "No price data available for this item";

/// Top realms for one selected item.
#[component]
pub fn PriceRankingCard(card: ItemCard) -> Element {
    let ItemCard {
        title,
        craft_cost,
        body,
        ..
    } = card;
    let rows: Option<Vec<Ranked<ItemRealmRow>>> = match body {
        ItemCardBody::Ranked(rows) => Some(rows),
        ItemCardBody::NoPriceData => None,
    };

    rsx! {
        div { class: "panel price-card",
            h3 { "{title}" }
            if let Some(cost) = craft_cost {
                div { class: "craft-cost",
                    "Craft cost: "
                    MoneyDisplay { price: cost }
                }
            }
            if let Some(rows) = rows {
                ol {
                    for row in rows {
                        PriceRankingRow { key: "{row.entry.realm.id}", row }
                    }
                }
            } else {
                p { class: "no-data", "{NO_PRICE_DATA}" }
            }
        }
    }
}

#[component]
fn PriceRankingRow(row: Ranked<ItemRealmRow>) -> Element {
    let realm = &row.entry.realm;
    let markers = theme::rank_markers(row.is_highest, row.is_lowest);
    rsx! {
        li { class: theme::rank_row(row.is_highest, row.is_lowest),
            span {
                "{row.position + 1}. {language_flag(&realm.language)} {realm.name} "
                PopulationBadge { population: realm.population_type, figure: realm.population }
            }
            MoneyDisplay { price: row.entry.detail.average_lowest_five }
            for marker in markers {
                span { class: "rank-marker", "{marker}" }
            }
        }
    }
}
