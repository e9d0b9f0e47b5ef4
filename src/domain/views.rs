//! Display-ready rows joining ranked comparison data with realm and item
//! metadata. Rows whose realm is unknown or unselected are omitted.

use std::collections::HashMap;

use super::entities::{Item, ItemId, ItemPriceDetail, Realm, RealmComparison, RealmId};
use super::ranking::{
    classify_extremes, rank_realms_by_value, rank_realms_for_item, CraftCostFilter, ItemRanking,
    Ranked, RankingStrategy, RealmSummary,
};

#[derive(Clone, Debug, PartialEq)]
pub struct RealmRow {
    pub realm: Realm,
    pub summary: RealmSummary,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemRealmRow {
    pub realm: Realm,
    pub detail: ItemPriceDetail,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemCardBody {
    Ranked(Vec<Ranked<ItemRealmRow>>),
    NoPriceData,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemCard {
    pub item_id: ItemId,
    pub title: String,
    pub craft_cost: Option<f64>,
    pub body: ItemCardBody,
}

fn realm_index(realms: &[Realm]) -> HashMap<RealmId, &Realm> {
    realms.iter().map(|realm| (realm.id, realm)).collect()
}

pub fn realm_leaderboard(
    comparisons: &[RealmComparison],
    realms: &[Realm],
    strategy: RankingStrategy,
) -> Vec<Ranked<RealmRow>> {
    let index = realm_index(realms);
    let rows = rank_realms_by_value(comparisons, strategy)
        .into_iter()
        .filter_map(|summary| {
            index.get(&summary.realm_id).map(|realm| RealmRow {
                realm: (*realm).clone(),
                summary,
            })
        })
        .collect();
    classify_extremes(rows)
}

pub fn item_card(
    comparisons: &[RealmComparison],
    realms: &[Realm],
    item_id: ItemId,
    item: Option<&Item>,
    filter: CraftCostFilter,
) -> ItemCard {
    let craft_cost = item.and_then(|item| item.raw_craft_cost);
    let index = realm_index(realms);

    // Restrict to known realms before ranking so the top ten are all displayable.
    let visible: Vec<RealmComparison> = comparisons
        .iter()
        .filter(|comparison| index.contains_key(&comparison.realm_id))
        .cloned()
        .collect();

    let body = match rank_realms_for_item(&visible, item_id, craft_cost, filter) {
        ItemRanking::NoPriceData => ItemCardBody::NoPriceData,
        ItemRanking::Ranked(entries) => {
            let rows = entries
                .into_iter()
                .filter_map(|entry| {
                    index.get(&entry.realm_id).map(|realm| ItemRealmRow {
                        realm: (*realm).clone(),
                        detail: entry.detail,
                    })
                })
                .collect();
            ItemCardBody::Ranked(classify_extremes(rows))
        }
    };

    ItemCard {
        item_id,
        title: item
            .map(|item| item.name.clone())
            .unwrap_or_else(|| format!("Item {item_id}")),
        craft_cost,
        body,
    }
}

/// Flag shown next to a realm's name.
pub fn language_flag(language: &str) -> &'static str {
    match language {
        "English" => "🇬🇧",
        "German" => "🇩🇪",
        "French" => "🇫🇷",
        "Spanish" => "🇪🇸",
        "Russian" => "🇷🇺",
        "Portuguese" => "🇵🇹",
        "Italian" => "🇮🇹",
        _ => "🌍",
    }
}
