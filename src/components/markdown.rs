use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::fmt::Write;

/// Escapes text for insertion into HTML, attribute values included.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn heading_class(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "text-xl font-bold mb-3 mt-4",
        HeadingLevel::H2 => "text-lg font-semibold mb-2 mt-3",
        _ => "text-base font-medium mb-2 mt-2",
    }
}

/// Renders an assistant answer. Raw HTML in the answer is shown as text,
/// never as markup.
pub fn answer_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let mut html = String::new();
    let mut in_code_block = false;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Paragraph) => html.push_str(r#"<p class="mb-3 leading-relaxed">"#),
            Event::End(TagEnd::Paragraph) => html.push_str("</p>"),
            Event::Start(Tag::Heading { level, .. }) => {
                let _ = write!(html, r#"<h{} class="{}">"#, level as u8, heading_class(level));
            }
            Event::End(TagEnd::Heading(level)) => {
                let _ = write!(html, "</h{}>", level as u8);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => html_escape(&lang),
                    _ => "text".to_string(),
                };
                let _ = write!(
                    html,
                    r#"<pre class="bg-gray-100 dark:bg-teal-900 rounded p-3 my-3 overflow-x-auto"><code class="language-{lang} text-sm font-mono whitespace-pre">"#
                );
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                html.push_str("</code></pre>");
            }
            Event::Start(Tag::Strong) => html.push_str(r#"<strong class="font-semibold">"#),
            Event::End(TagEnd::Strong) => html.push_str("</strong>"),
            Event::Start(Tag::Emphasis) => html.push_str(r#"<em class="italic">"#),
            Event::End(TagEnd::Emphasis) => html.push_str("</em>"),
            Event::Start(Tag::Strikethrough) => html.push_str(r#"<del class="line-through">"#),
            Event::End(TagEnd::Strikethrough) => html.push_str("</del>"),
            Event::Start(Tag::Link { dest_url, title, .. }) => {
                let _ = write!(
                    html,
                    r#"<a href="{}" title="{}" class="underline text-seafoam-600 dark:text-mint-400" target="_blank" rel="noopener noreferrer">"#,
                    html_escape(&dest_url),
                    html_escape(&title)
                );
            }
            Event::End(TagEnd::Link) => html.push_str("</a>"),
            Event::Start(Tag::List(None)) => html.push_str(r#"<ul class="list-disc list-inside mb-3 ml-4">"#),
            Event::Start(Tag::List(Some(_))) => html.push_str(r#"<ol class="list-decimal list-inside mb-3 ml-4">"#),
            Event::End(TagEnd::List(false)) => html.push_str("</ul>"),
            Event::End(TagEnd::List(true)) => html.push_str("</ol>"),
            Event::Start(Tag::Item) => html.push_str("<li>"),
            Event::End(TagEnd::Item) => html.push_str("</li>"),
            Event::Start(Tag::BlockQuote(_)) => {
                html.push_str(r#"<blockquote class="border-l-4 pl-3 my-3 italic">"#)
            }
            Event::End(TagEnd::BlockQuote(_)) => html.push_str("</blockquote>"),
            Event::Start(Tag::Table(_)) => {
                html.push_str(r#"<div class="overflow-x-auto my-3"><table class="min-w-full border">"#)
            }
            Event::End(TagEnd::Table) => html.push_str("</table></div>"),
            Event::Start(Tag::TableHead) => html.push_str("<thead>"),
            Event::End(TagEnd::TableHead) => html.push_str("</thead>"),
            Event::Start(Tag::TableRow) => html.push_str("<tr>"),
            Event::End(TagEnd::TableRow) => html.push_str("</tr>"),
            Event::Start(Tag::TableCell) => html.push_str(r#"<td class="border px-2 py-1">"#),
            Event::End(TagEnd::TableCell) => html.push_str("</td>"),
            Event::Code(text) => {
                let _ = write!(
                    html,
                    r#"<code class="bg-gray-200 dark:bg-teal-700 px-1 rounded text-sm font-mono">{}</code>"#,
                    html_escape(&text)
                );
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                html.push_str(&html_escape(&text));
            }
            Event::SoftBreak if in_code_block => html.push('\n'),
            Event::SoftBreak => html.push(' '),
            Event::HardBreak if in_code_block => html.push('\n'),
            Event::HardBreak => html.push_str("<br>"),
            _ => {}
        }
    }

    html
}
