use leptos::html::Input;
use leptos::prelude::*;
use leptos_router::hooks::use_query;
use leptos_router::params::{Params, ParamsError, ParamsMap};
use log::debug;
use web_sys::{KeyboardEvent, MouseEvent};

use crate::api::FetchApi;
use crate::browser::{BrowserScheduler, InputMirror, SessionSignal};
use crate::components::banner::BannerView;
use crate::components::file_picker::FilePicker;
use crate::components::overlay::LoadingOverlay;
use crate::components::transcript::Transcript;
use crate::components::ui::{Button, ButtonVariant};
use crate::coordinator::{ask_assistant, clear_chat, on_selection_changed};
use crate::session::{BannerId, DocQaSession, InitialSession};
use crate::validation::{MAX_HINTS_LENGTH, MAX_QUESTION_LENGTH};

/// `?conversation_id=..&file_id=..` for resuming an earlier session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionQuery {
    conversation_id: Option<String>,
    file_id: Option<String>,
}

impl Params for SessionQuery {
    fn from_map(map: &ParamsMap) -> Result<Self, ParamsError> {
        Ok(Self {
            conversation_id: map.get("conversation_id"),
            file_id: map.get("file_id"),
        })
    }
}

impl From<SessionQuery> for InitialSession {
    fn from(query: SessionQuery) -> Self {
        InitialSession::new(query.conversation_id, query.file_id)
    }
}

#[component]
pub fn Dashboard() -> impl IntoView {
    let query = use_query::<SessionQuery>();
    let initial: InitialSession = query
        .get_untracked()
        .map(InitialSession::from)
        .unwrap_or_default();
    debug!("starting session with {initial:?}");

    let session: SessionSignal = RwSignal::new_local(DocQaSession::from_initial(initial));
    let input_ref = NodeRef::<Input>::new();
    session.update_untracked(|s| s.attach_mirror(Box::new(InputMirror::new(input_ref))));

    let api = FetchApi::default();
    let scheduler = BrowserScheduler;

    let selection_changed = Callback::new(move |_: ()| on_selection_changed(api, session, scheduler));
    let ask = move || leptos::task::spawn_local(ask_assistant(api, session, scheduler));
    let clear = move || clear_chat(&session);

    let turns = Memo::new(move |_| session.with(|s| s.transcript().turns().to_vec()));
    let pending = Memo::new(move |_| session.with(|s| s.transcript().pending().to_vec()));
    let error = Memo::new(move |_| session.with(|s| s.feedback().error().cloned()));
    let success = Memo::new(move |_| session.with(|s| s.feedback().success().cloned()));
    let loading = Memo::new(move |_| session.with(|s| s.is_loading()));
    let document_ready = Memo::new(move |_| session.with(|s| s.file_id().is_some()));
    let uploading = Memo::new(move |_| session.with(|s| s.is_uploading()));

    let dismiss = Callback::new(move |id: BannerId| {
        session.update(|s| {
            s.feedback_mut().dismiss(id);
        });
    });

    let on_keydown = move |ev: KeyboardEvent| {
        if ev.key() == "Enter" && (ev.ctrl_key() || ev.meta_key()) {
            ev.prevent_default();
            if !uploading.get_untracked() {
                ask();
            }
        } else if ev.key() == "Escape" {
            ev.prevent_default();
            clear();
        }
    };

    view! {
        <div class="max-w-4xl mx-auto p-4 flex flex-col gap-4 min-h-screen">
            <header class="flex items-center justify-between">
                <h1 class="text-2xl font-bold text-gray-800 dark:text-mint-300">"Document Q&A"</h1>
                <span class="text-sm text-gray-500 dark:text-gray-400">
                    {move || {
                        if uploading.get() {
                            "Uploading..."
                        } else if document_ready.get() {
                            "Document ready"
                        } else {
                            "No document uploaded"
                        }
                    }}
                </span>
            </header>

            <div class="flex flex-col gap-2">
                <BannerView banner=error on_close=dismiss/>
                <BannerView banner=success on_close=dismiss/>
            </div>

            <FilePicker session=session input_ref=input_ref on_changed=selection_changed/>

            <Transcript turns=turns pending=pending/>

            <div class="flex flex-col gap-2" on:keydown=on_keydown>
                <textarea
                    class="w-full p-2 rounded border border-gray-300 dark:border-teal-700 bg-white dark:bg-teal-900 text-gray-900 dark:text-gray-100"
                    rows="3"
                    placeholder="Ask a question about your document"
                    maxlength=MAX_QUESTION_LENGTH.to_string()
                    prop:value=move || session.with(|s| s.question().to_string())
                    on:input=move |ev| session.update(|s| s.set_question(event_target_value(&ev)))
                ></textarea>
                <textarea
                    class="w-full p-2 rounded border border-gray-300 dark:border-teal-700 bg-white dark:bg-teal-900 text-gray-900 dark:text-gray-100 text-sm"
                    rows="2"
                    placeholder="Optional hints (sections, terms, page numbers)"
                    maxlength=MAX_HINTS_LENGTH.to_string()
                    prop:value=move || session.with(|s| s.hints().to_string())
                    on:input=move |ev| session.update(|s| s.set_hints(event_target_value(&ev)))
                ></textarea>
                <div class="flex gap-2 justify-end">
                    <Button variant=ButtonVariant::Ghost on_click=Callback::new(move |_: MouseEvent| clear())>
                        "Clear"
                    </Button>
                    <Button
                        variant=ButtonVariant::Primary
                        title="Ctrl+Enter"
                        disabled=uploading
                        on_click=Callback::new(move |_: MouseEvent| ask())
                    >
                        "Ask"
                    </Button>
                </div>
            </div>

            <LoadingOverlay visible=loading/>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_ids_seed_the_session() {
        let mut map = ParamsMap::new();
        map.insert("conversation_id", " C7 ".to_string());
        map.insert("file_id", "".to_string());

        let initial = InitialSession::from(SessionQuery::from_map(&map).unwrap());
        assert_eq!(initial.conversation_id.as_deref(), Some("C7"));
        assert_eq!(initial.file_id, None);
    }

    #[test]
    fn missing_query_starts_blank() {
        let initial = InitialSession::from(SessionQuery::from_map(&ParamsMap::new()).unwrap());
        assert_eq!(initial, InitialSession::default());
    }
}
