//! Main Leptos application component and routing.

use crate::pages::IntegrationsPage;
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

/// The main application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="switchyard"/>
        <Router>
            <header class="header">
                <div class="header-left">
                    <span class="logo">"switchyard"</span>
                </div>
            </header>
            <main class="container">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route
                        path=path!("/organizations/:org/integrations")
                        view=IntegrationsPage
                    />
                </Routes>
            </main>
        </Router>
    }
}
