use dioxus::prelude::*;
use realm_price_scanner::domain::{currency::group_thousands, Money};

/// Gold/silver/copper rendering of a copper price. Invalid prices show a dash.
#[component]
pub fn MoneyDisplay(price: f64) -> Element {
    let Ok(money) = Money::try_from_price(price) else {
        return rsx! { span { class: "money muted", "-" } };
    };

    rsx! {
        span { class: "money",
            if money.shows_gold() {
                span { class: "gold", "{group_thousands(money.gold)}g " }
            }
            if money.shows_silver() {
                span { class: "silver", "{money.silver}s " }
            }
            span { class: "copper", "{money.copper}c" }
        }
    }
}
