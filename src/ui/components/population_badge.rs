use dioxus::prelude::*;
use realm_price_scanner::domain::PopulationType;

use crate::ui::theme;

#[component]
pub fn PopulationBadge(population: PopulationType, figure: Option<u64>) -> Element {
    let title = figure
        .map(|count| format!("{count} characters"))
        .unwrap_or_default();
    rsx! {
        span { class: theme::population(population), title: "{title}", "{population.label()}" }
    }
}
