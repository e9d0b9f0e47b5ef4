use std::sync::Arc;

use dioxus::prelude::*;
use realm_price_scanner::{
    config::AppConfig,
    infra::{ApiClient, GatewayError, ItemQuery},
    service::MarketService,
    util::{assets, persistence::SelectionFile},
};
use tracing::{error, info};

use crate::ui::{
    components::{push_failure, Toast, ToastMessage},
    pages::{ComparisonPage, ItemsPage, RealmsPage},
    shell::Shell,
};

pub type Service = MarketService<ApiClient>;

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    #[route("/comparison")]
    Comparison {},
    #[route("/realms")]
    Realms {},
    #[route("/items")]
    Items {},
}

fn bootstrap() -> Result<Service, GatewayError> {
    let config = AppConfig::from_env();
    info!(api = %config.api_url, ranking = ?config.ranking, "starting");
    let client = ApiClient::new(&config)?;
    Ok(MarketService::new(
        Arc::new(client),
        &config,
        SelectionFile::default_location(),
    ))
}

#[component]
pub fn App() -> Element {
    let service = use_hook(|| {
        bootstrap().map_err(|err| {
            error!(%err, "failed to start the API client");
            err.to_string()
        })
    });

    rsx! {
        document::Style { "{assets::main_css()}" }
        match service {
            Ok(service) => rsx! { Dashboard { service } },
            Err(message) => rsx! {
                main { class: "shell-main",
                    section { class: "panel",
                        h2 { "Unable to start" }
                        p { "{message}" }
                    }
                }
            },
        }
    }
}

#[component]
fn Dashboard(service: Service) -> Element {
    let state = use_signal(|| service.store().snapshot());
    use_context_provider(|| state);
    use_context_provider(|| service.clone());

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts);

    // Mirror every store write into the signal the components read.
    let store = service.store().clone();
    use_future(move || {
        let store = store.clone();
        let mut state = state;
        async move {
            let mut updates = store.subscribe();
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                state.set(snapshot);
            }
        }
    });

    // Keyed on the failure number: the store may clear and re-set the same
    // message between two snapshots.
    let mut shown_failure = use_signal(|| None::<u64>);
    use_effect(move || {
        let Some(failure) = state.read().last_failure.clone() else {
            return;
        };
        if *shown_failure.peek() != Some(failure.seq) {
            shown_failure.set(Some(failure.seq));
            push_failure(toasts, &failure);
        }
    });

    use_hook({
        let service = service.clone();
        move || {
            spawn(async move {
                let _ = tokio::join!(
                    service.refresh_catalog_if_stale(),
                    service.load_items(ItemQuery::default()),
                );
            });
        }
    });

    // Re-compare whenever the realm or item picks change. An empty pick
    // still runs so the old ranking is cleared.
    let request = use_memo(move || state.read().selection.comparison_request());
    let compare_service = service.clone();
    use_effect(move || {
        let _ = request.read();
        let service = compare_service.clone();
        spawn(async move {
            let _ = service.compare_selected().await;
        });
    });

    rsx! {
        Router::<Route> {}
        Toast {}
    }
}

#[component]
fn Comparison() -> Element {
    rsx! { Shell { ComparisonPage {} } }
}

#[component]
fn Realms() -> Element {
    rsx! { Shell { RealmsPage {} } }
}

#[component]
fn Items() -> Element {
    rsx! { Shell { ItemsPage {} } }
}
