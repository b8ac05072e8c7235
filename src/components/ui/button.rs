use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Ghost,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ButtonSize {
    Small,
    #[default]
    Medium,
}

impl ButtonVariant {
    fn get_classes(&self) -> &'static str {
        match self {
            ButtonVariant::Primary => {
                "bg-gray-700 dark:bg-teal-600 text-white \
                 hover:bg-gray-600 dark:hover:bg-teal-500 \
                 active:bg-teal-800 dark:active:bg-teal-500 \
                 border border-gray-300 dark:border-teal-700"
            }
            ButtonVariant::Secondary => {
                "bg-gray-400 dark:bg-gray-600 text-gray-900 dark:text-gray-100 \
                 hover:bg-gray-500 dark:hover:bg-gray-500 \
                 focus:ring-2 focus:ring-gray-400 dark:focus:ring-gray-500 \
                 border border-gray-400 dark:border-gray-600"
            }
            ButtonVariant::Ghost => {
                "bg-transparent text-gray-600 dark:text-gray-400 \
                 hover:bg-gray-100 dark:hover:bg-gray-800 \
                 hover:text-gray-800 dark:hover:text-gray-200"
            }
        }
    }
}

impl ButtonSize {
    fn get_classes(&self) -> &'static str {
        match self {
            ButtonSize::Small => "px-2 py-1 text-xs",
            ButtonSize::Medium => "px-3 py-2 text-sm",
        }
    }

    fn icon_padding(&self) -> &'static str {
        match self {
            ButtonSize::Small => "p-1",
            ButtonSize::Medium => "p-2",
        }
    }
}

fn button_classes(variant: ButtonVariant, size: ButtonSize, disabled: bool, extra: &str) -> String {
    let (variant, state) = if disabled {
        (
            ButtonVariant::Secondary,
            "opacity-50 cursor-not-allowed pointer-events-none",
        )
    } else {
        (variant, "cursor-pointer")
    };
    format!(
        "inline-flex items-center justify-center font-medium rounded transition-all duration-0 focus:outline-none {} {} {} {}",
        variant.get_classes(),
        size.get_classes(),
        state,
        extra
    )
}

#[component]
pub fn Button(
    #[prop(optional)] variant: ButtonVariant,
    #[prop(optional)] size: ButtonSize,
    #[prop(optional, into)] disabled: Signal<bool>,
    #[prop(optional, into)] class: String,
    #[prop(optional, into)] title: String,
    #[prop(optional)] on_click: Option<Callback<web_sys::MouseEvent>>,
    children: Children,
) -> impl IntoView {
    view! {
        <button
            type="button"
            class=move || button_classes(variant, size, disabled.get(), &class)
            title=title
            disabled=move || disabled.get()
            on:click=move |ev| {
                if !disabled.get_untracked() {
                    if let Some(handler) = on_click {
                        handler.run(ev);
                    }
                }
            }
        >

            {children()}
        </button>
    }
}

#[component]
pub fn IconButton(
    #[prop(optional)] variant: ButtonVariant,
    #[prop(optional)] size: ButtonSize,
    #[prop(optional, into)] title: String,
    #[prop(into)] on_click: Callback<web_sys::MouseEvent>,
    children: Children,
) -> impl IntoView {
    view! {
        <Button
            variant=variant
            size=size
            title=title
            class=format!("{} aspect-square", size.icon_padding())
            on_click=on_click
        >
            {children()}
        </Button>
    }
}
