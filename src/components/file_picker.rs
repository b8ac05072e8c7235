use leptos::html::Input;
use leptos::prelude::*;
use leptos_icons::Icon;
use web_sys::{DragEvent, HtmlInputElement};

use crate::browser::{files_from_list, SessionSignal};
use crate::components::ui::{ButtonSize, ButtonVariant, IconButton};
use crate::validation::MAX_FILE_SIZE;

fn human_size(bytes: f64) -> String {
    if bytes >= 1024.0 * 1024.0 {
        format!("{:.1} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.0} KB", (bytes / 1024.0).ceil())
    }
}

/// Native file input plus a drop zone. Every change to the selection is
/// reported through `on_changed` so the caller can schedule an upload.
#[component]
pub fn FilePicker(
    session: SessionSignal,
    input_ref: NodeRef<Input>,
    #[prop(into)] on_changed: Callback<()>,
) -> impl IntoView {
    let (dragging, set_dragging) = signal(false);

    let add_from_list = move |list: Option<web_sys::FileList>| {
        let Some(list) = list else {
            return;
        };
        let files = files_from_list(&list);
        if files.is_empty() {
            return;
        }
        session.update(|s| {
            s.add_files(files);
        });
        on_changed.run(());
    };

    let on_input_change = move |ev: web_sys::Event| {
        let input: HtmlInputElement = event_target(&ev);
        add_from_list(input.files());
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
        add_from_list(ev.data_transfer().and_then(|dt| dt.files()));
    };

    let remove = move |index: usize| {
        session.update(|s| {
            s.remove_file(index);
        });
        on_changed.run(());
    };

    let rows = move || {
        session.with(|s| {
            s.selection()
                .entries()
                .iter()
                .map(|entry| (entry.file.name(), entry.file.size()))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <div class="space-y-2">
            <div
                class=move || {
                    format!(
                        "border-2 border-dashed rounded p-4 text-center cursor-pointer transition-colors {}",
                        if dragging.get() {
                            "border-seafoam-500 bg-seafoam-50 dark:bg-teal-800"
                        } else {
                            "border-gray-300 dark:border-teal-700"
                        },
                    )
                }
                on:click=move |_| {
                    if let Some(input) = input_ref.get() {
                        input.click();
                    }
                }
                on:dragover=move |ev: DragEvent| {
                    ev.prevent_default();
                    set_dragging.set(true);
                }
                on:dragleave=move |ev: DragEvent| {
                    ev.prevent_default();
                    set_dragging.set(false);
                }
                on:drop=on_drop
            >
                <Icon icon=icondata_bs::BsFileEarmarkPdf width="24" height="24"/>
                <p class="text-sm text-gray-600 dark:text-gray-300">
                    "Drop a PDF here or click to browse"
                </p>
                <p class="text-xs text-gray-500 dark:text-gray-400">
                    {format!("PDF only, up to {}", human_size(MAX_FILE_SIZE as f64))}
                </p>
            </div>
            <input
                node_ref=input_ref
                type="file"
                accept=".pdf"
                multiple
                class="hidden"
                on:change=on_input_change
            />
            <p class="text-sm text-gray-700 dark:text-gray-300">
                {move || session.with(|s| s.selection().summary_label())}
            </p>
            <ul class="space-y-1">
                {move || {
                    rows()
                        .into_iter()
                        .enumerate()
                        .map(|(index, (name, size))| {
                            view! {
                                <li class="flex items-center justify-between text-sm bg-gray-100 dark:bg-teal-800 px-2 py-1 rounded">
                                    <span class="truncate">{name}</span>
                                    <span class="flex items-center gap-2">
                                        <span class="text-xs text-gray-500">{human_size(size)}</span>
                                        <IconButton
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Small
                                            title="Remove"
                                            on_click=move |_: web_sys::MouseEvent| remove(index)
                                        >
                                            <Icon icon=icondata_bs::BsX width="14" height="14"/>
                                        </IconButton>
                                    </span>
                                </li>
                            }
                        })
                        .collect_view()
                }}
            </ul>
        </div>
    }
}
