use leptos::prelude::*;

#[component]
pub fn LoadingOverlay(#[prop(into)] visible: Signal<bool>) -> impl IntoView {
    view! {
        <Show when=move || visible.get()>
            <div
                class="fixed inset-0 z-50 flex items-center justify-center bg-gray-900/40"
                aria-busy="true"
            >
                <div class="flex items-center gap-3 bg-white dark:bg-teal-800 px-5 py-3 rounded shadow-lg">
                    <div class="h-5 w-5 rounded-full border-2 border-seafoam-500 border-t-transparent animate-spin"></div>
                    <span class="text-gray-700 dark:text-mint-300">"Working..."</span>
                </div>
            </div>
        </Show>
    }
}
