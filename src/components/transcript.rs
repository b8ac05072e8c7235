use chrono::Local;
use leptos::prelude::*;

use crate::components::markdown::{answer_to_html, html_escape};
use crate::session::{ChatTurn, PendingQuestion};

/// A chat turn ready for `inner_html`. Both sides are escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTurn {
    pub question_html: String,
    pub answer_html: String,
    pub time: String,
}

pub fn render_turn(turn: &ChatTurn) -> RenderedTurn {
    RenderedTurn {
        question_html: html_escape(&turn.question),
        answer_html: answer_to_html(&turn.answer),
        time: turn
            .answered_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string(),
    }
}

#[component]
fn TurnView(turn: RenderedTurn) -> impl IntoView {
    view! {
        <div class="mb-4">
            <div class="flex justify-end mb-1">
                <div
                    class="max-w-[80%] bg-gray-200 dark:bg-teal-700 text-gray-900 dark:text-gray-100 px-3 py-2 rounded whitespace-pre-wrap"
                    inner_html=turn.question_html
                ></div>
            </div>
            <div class="flex justify-start">
                <div class="max-w-[80%] bg-white dark:bg-teal-900 text-gray-800 dark:text-mint-200 px-3 py-2 rounded shadow">
                    <div class="prose dark:prose-invert" inner_html=turn.answer_html></div>
                    <div class="text-xs text-gray-500 dark:text-gray-400 mt-1">{turn.time}</div>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn Transcript(
    #[prop(into)] turns: Signal<Vec<ChatTurn>>,
    #[prop(into)] pending: Signal<Vec<PendingQuestion>>,
) -> impl IntoView {
    let is_empty = move || turns.with(Vec::is_empty) && pending.with(Vec::is_empty);

    view! {
        <div class="flex-1 overflow-y-auto p-4 bg-gray-50 dark:bg-teal-950 rounded">
            <Show
                when=move || !is_empty()
                fallback=|| {
                    view! {
                        <p class="text-gray-500 dark:text-gray-400 italic">
                            "Upload a PDF and ask a question to get started."
                        </p>
                    }
                }
            >
                {move || {
                    turns
                        .with(|turns| turns.iter().map(render_turn).collect::<Vec<_>>())
                        .into_iter()
                        .map(|turn| view! { <TurnView turn=turn/> })
                        .collect_view()
                }}
                {move || {
                    pending
                        .get()
                        .into_iter()
                        .map(|p| {
                            view! {
                                <div class="mb-4">
                                    <div class="flex justify-end mb-1">
                                        <div class="max-w-[80%] bg-gray-200 dark:bg-teal-700 px-3 py-2 rounded whitespace-pre-wrap">
                                            {p.question}
                                        </div>
                                    </div>
                                    <div class="text-sm text-gray-500 dark:text-gray-400 italic">
                                        "Processing..."
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn question_and_answer_markup_is_neutralised() {
        let turn = ChatTurn {
            question: "<script>alert('q')</script>".to_string(),
            answer: "<script>alert('a')</script>".to_string(),
            answered_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        };
        let rendered = render_turn(&turn);

        assert_eq!(
            rendered.question_html,
            "&lt;script&gt;alert(&#x27;q&#x27;)&lt;/script&gt;"
        );
        assert!(!rendered.answer_html.contains("<script>"));
        assert!(rendered.answer_html.contains("&lt;script&gt;"));
        assert_eq!(rendered.time.len(), 5);
    }

    #[test]
    fn answers_keep_markdown_formatting() {
        let turn = ChatTurn {
            question: "What is it?".to_string(),
            answer: "It is **important**.".to_string(),
            answered_at: Utc::now(),
        };
        let rendered = render_turn(&turn);
        assert_eq!(rendered.question_html, "What is it?");
        assert!(rendered.answer_html.contains("<strong"));
    }
}
