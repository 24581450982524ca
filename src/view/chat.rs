use crate::chat::{ChatEntry, ChatSession};
use crate::markdown::{render_or_escape, MarkdownRenderer};
use crate::model::{ChatRole, Company};

use super::html::escape_html;

pub const WELCOME_MESSAGE: &str =
    "Ask me anything about the terms, cookie and privacy policies in the database.";

const TYPING_HTML: &str = r#"<div class="chat-message assistant typing"><span></span><span></span><span></span></div>"#;

pub fn render_transcript(session: &ChatSession, markdown: Option<&dyn MarkdownRenderer>) -> String {
    if session.entries().is_empty() && !session.is_typing() {
        return format!(
            r#"<div class="chat-message assistant welcome"><div class="chat-content">{}</div></div>"#,
            escape_html(WELCOME_MESSAGE)
        );
    }
    let mut out: Vec<String> = session
        .entries()
        .iter()
        .map(|entry| render_entry(entry, markdown))
        .collect();
    if session.is_typing() {
        out.push(TYPING_HTML.to_string());
    }
    out.join("\n")
}

pub fn render_entry(entry: &ChatEntry, markdown: Option<&dyn MarkdownRenderer>) -> String {
    match entry.message.role {
        ChatRole::User => format!(
            r#"<div class="chat-message user"><div class="chat-content">{}</div></div>"#,
            escape_html(&entry.message.content)
        ),
        ChatRole::Assistant => {
            let class = if entry.failed {
                "chat-message assistant error"
            } else {
                "chat-message assistant"
            };
            let content = if entry.failed {
                escape_html(&entry.message.content)
            } else {
                render_or_escape(markdown, &entry.message.content)
            };
            let sources = if entry.sources.is_empty() {
                String::new()
            } else {
                let chips: String = entry
                    .sources
                    .iter()
                    .map(|s| {
                        format!(
                            r#"<button class="source-chip" data-company-id="{}">{}</button>"#,
                            escape_html(&s.company_id),
                            escape_html(&s.chip_label())
                        )
                    })
                    .collect();
                format!(r#"<div class="chat-sources">{chips}</div>"#)
            };
            format!(r#"<div class="{class}"><div class="chat-content">{content}</div>{sources}</div>"#)
        }
    }
}

pub fn render_filter(company: Option<&Company>) -> String {
    match company {
        Some(company) => format!(
            r#"<span class="chat-filter">Asking about: {}</span>"#,
            escape_html(&company.name)
        ),
        None => r#"<span class="chat-filter">Asking about: all companies</span>"#.to_string(),
    }
}
