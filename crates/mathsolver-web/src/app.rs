//! Main App Component

use leptos::prelude::*;

use crate::pages::SolverPage;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="app">
            <SolverPage />
        </main>
    }
}
