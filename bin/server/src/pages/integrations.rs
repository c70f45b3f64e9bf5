//! Organization integrations page.
//!
//! The page owns no behavior of its own: it wires an [`IntegrationsView`]
//! controller to Leptos signals and renders the controller's render model.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::{
    hooks::{use_params, use_query_map},
    params::Params,
};
use std::rc::Rc;
use std::time::Duration;
use switchyard_core::{IntegrationId, OrganizationSlug};
use switchyard_integration::{
    Confirm, HttpIntegrationsApi, IndicatorId, IndicatorKind, IndicatorStore, Integration,
    IntegrationList, IntegrationRow, IntegrationsView, ListBody, Notifier, Provider,
    ProviderConfig, ViewState,
    api::{API_PREFIX, SETUP_ERROR_PARAM, setup_path},
    render::{BLANK_SLATE_HEADING, BLANK_SLATE_TEXT, DOCS_URL},
    view::TITLE,
};

/// URL params for the integrations page.
#[derive(Params, PartialEq, Clone, Debug)]
struct OrganizationParams {
    org: Option<String>,
}

/// [`ViewState`] backed by Leptos signals.
#[derive(Clone, Copy)]
pub struct SignalViewState {
    pub items: RwSignal<IntegrationList>,
    pub config: RwSignal<Option<ProviderConfig>>,
}

impl SignalViewState {
    fn new() -> Self {
        Self {
            items: RwSignal::new(IntegrationList::default()),
            config: RwSignal::new(None),
        }
    }

    fn find(&self, id: &IntegrationId) -> Option<Integration> {
        self.items
            .with_untracked(|list| list.items().iter().find(|i| i.id == *id).cloned())
    }
}

impl ViewState for SignalViewState {
    fn update_items(&self, f: impl FnOnce(&mut IntegrationList)) {
        self.items.update(f);
    }

    fn set_config(&self, config: ProviderConfig) {
        self.config.set(Some(config));
    }
}

/// [`Notifier`] that renders into a signal and expires timed indicators.
#[derive(Clone, Copy)]
pub struct SignalIndicators(RwSignal<IndicatorStore>);

impl Notifier for SignalIndicators {
    fn add(&self, message: &str, kind: IndicatorKind, duration: Option<Duration>) -> IndicatorId {
        let id = self.0.write().push(message, kind, duration).id;
        if let Some(duration) = duration {
            let store = self.0;
            set_timeout(
                move || {
                    store.update(|s| {
                        s.dismiss(id);
                    });
                },
                duration,
            );
        }
        id
    }

    fn remove(&self, id: IndicatorId) {
        self.0.update(|s| {
            s.dismiss(id);
        });
    }
}

/// Asks through `window.confirm`.
struct BrowserConfirm;

impl Confirm for BrowserConfirm {
    fn confirm(&self, message: &str) -> bool {
        #[cfg(feature = "hydrate")]
        {
            web_sys::window()
                .and_then(|w| w.confirm_with_message(message).ok())
                .unwrap_or(false)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = message;
            false
        }
    }
}

fn api_base_url() -> String {
    #[cfg(feature = "hydrate")]
    {
        if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
            return format!("{}{}", origin, API_PREFIX);
        }
    }
    API_PREFIX.to_string()
}

fn navigate(href: &str) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(href);
            return;
        }
    }
    tracing::debug!(href, "navigation requested outside the browser");
}

type PageView = IntegrationsView<HttpIntegrationsApi, SignalViewState>;

/// Integrations page.
#[component]
pub fn IntegrationsPage() -> impl IntoView {
    let params = use_params::<OrganizationParams>();
    let org = Memo::new(move |_| {
        params
            .get()
            .ok()
            .and_then(|p| p.org)
            .and_then(|slug| slug.parse::<OrganizationSlug>().ok())
    });

    // Content is rebuilt whenever the organization in the URL changes
    view! {
        <div class="integrations-page">
            <h1>{TITLE}</h1>
            {move || match org.get() {
                Some(org) => view! { <IntegrationsContent org=org/> }.into_any(),
                None => view! { <p>"Organization not found."</p> }.into_any(),
            }}
        </div>
    }
}

/// Integrations content for one organization.
#[component]
fn IntegrationsContent(org: OrganizationSlug) -> impl IntoView {
    let state = SignalViewState::new();
    let indicators = RwSignal::new(IndicatorStore::new());
    let (loaded, set_loaded) = signal(false);
    let (load_error, set_load_error) = signal(Option::<String>::None);

    let launch_org = org.clone();
    let controller: PageView = IntegrationsView::new(
        org,
        HttpIntegrationsApi::new(api_base_url()),
        state,
        Rc::new(SignalIndicators(indicators)),
        Rc::new(BrowserConfirm),
    )
    .with_launcher(Rc::new(move |provider: &Provider| {
        navigate(&setup_path(&launch_org, &provider.id));
    }));
    let controller = StoredValue::new_local(Rc::new(controller));
    let setup_error = use_query_map().with_untracked(|query| query.get(SETUP_ERROR_PARAM));

    // Load on the client once mounted
    Effect::new(move || {
        let view = controller.get_value();
        if let Some(message) = &setup_error {
            view.show_error(message);
        }
        spawn_local(async move {
            match view.mount().await {
                Ok(()) => set_loaded.set(true),
                Err(e) => set_load_error.set(Some(e.to_string())),
            }
        });
    });

    let on_delete = move |id: IntegrationId| {
        let Some(integration) = state.find(&id) else {
            return;
        };
        let view = controller.get_value();
        spawn_local(async move {
            view.delete_integration(&integration).await;
        });
    };

    let on_cancel = move |id: IntegrationId| {
        let Some(integration) = state.find(&id) else {
            return;
        };
        let view = controller.get_value();
        spawn_local(async move {
            view.cancel_delete(&integration).await;
        });
    };

    let on_launch = move |provider: Provider| {
        controller.get_value().launch_add_integration(&provider);
    };

    view! {
        <div class="integrations-content">
            <div class="actions-bar">
                <AddIntegrationMenu config=state.config on_launch=on_launch/>
            </div>

            <div class="indicators">
                {move || {
                    indicators.with(|store| store.active().to_vec())
                        .into_iter()
                        .map(|indicator| {
                            let class = format!("indicator indicator-{}", indicator.kind.as_str());
                            view! { <div class=class>{indicator.message}</div> }
                        })
                        .collect_view()
                }}
            </div>

            {move || {
                if let Some(message) = load_error.get() {
                    return view! {
                        <div class="load-error">
                            <p>"There was an error loading data."</p>
                            <p class="error-detail">{message}</p>
                        </div>
                    }.into_any();
                }
                if !loaded.get() {
                    return view! { <p>"Loading..."</p> }.into_any();
                }
                match state.items.with(IntegrationList::body) {
                    ListBody::BlankSlate => view! { <BlankSlate/> }.into_any(),
                    ListBody::Table(rows) => view! {
                        <table class="integrations-table">
                            <tbody>
                                {rows.into_iter().map(|row| {
                                    integration_row(row, on_delete, on_cancel)
                                }).collect_view()}
                            </tbody>
                        </table>
                    }.into_any(),
                }
            }}
        </div>
    }
}

fn integration_row(
    row: IntegrationRow,
    on_delete: impl Fn(IntegrationId) + Copy + Send + Sync + 'static,
    on_cancel: impl Fn(IntegrationId) + Copy + Send + Sync + 'static,
) -> impl IntoView {
    let delete_id = row.id.clone();
    let cancel_id = row.id.clone();

    view! {
        <tr>
            <td>
                <strong>{row.name}</strong>
                {row.status_label.map(|label| view! {
                    <small class="status-label">" (" {label} ")"</small>
                })}
                {row.show_cancel.then(|| view! {
                    <a
                        href="#"
                        class="cancel-link"
                        on:click=move |ev| {
                            ev.prevent_default();
                            on_cancel(cancel_id.clone());
                        }
                    >"Cancel"</a>
                })}
                {row.caption.map(|caption| view! {
                    <div class="caption">{caption}</div>
                })}
            </td>
            <td class="align-right">
                <button
                    class="btn btn-default btn-sm"
                    disabled=row.delete_disabled
                    on:click=move |_| on_delete(delete_id.clone())
                >"Remove"</button>
            </td>
        </tr>
    }
}

/// Dropdown listing every configured provider.
#[component]
fn AddIntegrationMenu(
    config: RwSignal<Option<ProviderConfig>>,
    on_launch: impl Fn(Provider) + Copy + Send + Sync + 'static,
) -> impl IntoView {
    view! {
        <details class="dropdown">
            <summary class="primary-btn">"Add Integration"</summary>
            <ul class="dropdown-menu">
                {move || {
                    config.with(|c| c.as_ref().map(|c| c.providers.clone()).unwrap_or_default())
                        .into_iter()
                        .map(|provider| {
                            let name = provider.name.clone();
                            view! {
                                <li>
                                    <a href="#" on:click=move |ev| {
                                        ev.prevent_default();
                                        on_launch(provider.clone());
                                    }>{name}</a>
                                </li>
                            }
                        })
                        .collect_view()
                }}
            </ul>
        </details>
    }
}

/// Shown when the organization has no integrations.
#[component]
fn BlankSlate() -> impl IntoView {
    view! {
        <div class="blank-slate">
            <h3>{BLANK_SLATE_HEADING}</h3>
            <p>{BLANK_SLATE_TEXT}</p>
            <p>
                <a href=DOCS_URL class="btn">"Learn more"</a>
            </p>
        </div>
    }
}
