use leptos::prelude::*;

use crate::session::{Banner, BannerId, BannerKind};

fn kind_classes(kind: BannerKind) -> &'static str {
    match kind {
        BannerKind::Error => {
            "bg-salmon-100 dark:bg-salmon-900 text-salmon-800 dark:text-salmon-200 border-salmon-400"
        }
        BannerKind::Success => {
            "bg-seafoam-100 dark:bg-seafoam-900 text-seafoam-800 dark:text-seafoam-200 border-seafoam-400"
        }
    }
}

/// One dismissible message. Hidden while `banner` is `None`.
#[component]
pub fn BannerView(
    #[prop(into)] banner: Signal<Option<Banner>>,
    #[prop(into)] on_close: Callback<BannerId>,
) -> impl IntoView {
    move || {
        banner.get().map(|banner| {
            let id = banner.id;
            let role = match banner.kind {
                BannerKind::Error => "alert",
                BannerKind::Success => "status",
            };
            view! {
                <div
                    role=role
                    class=format!(
                        "{} flex items-start justify-between gap-3 border px-4 py-2 rounded shadow transition-opacity duration-300",
                        kind_classes(banner.kind),
                    )
                >
                    // Server details arrive newline separated.
                    <span class="whitespace-pre-line">{banner.message}</span>
                    <button
                        class="ml-2 text-salmon-600 hover:text-salmon-700 dark:text-salmon-300 dark:hover:text-salmon-200"
                        aria-label="Dismiss"
                        on:click=move |_| on_close.run(id)
                    >
                        "×"
                    </button>
                </div>
            }
        })
    }
}
