use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::view::html::escape_html;

pub trait MarkdownRenderer {
    fn render(&self, source: &str) -> String;
}

#[derive(Clone, Debug)]
pub struct CommonMark {
    options: Options,
}

impl Default for CommonMark {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options }
    }
}

impl MarkdownRenderer for CommonMark {
    fn render(&self, source: &str) -> String {
        let parser = Parser::new_ext(source, self.options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_destination(dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: safe_destination(dest_url),
                title,
                id,
            }),
            other => other,
        });
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let scheme = match cleaned.find(|c| matches!(c, ':' | '/' | '?' | '#')) {
        Some(i) if cleaned[i..].starts_with(':') => cleaned[..i].to_ascii_lowercase(),
        _ => return dest,
    };
    match scheme.as_str() {
        "http" | "https" | "mailto" => dest,
        _ => CowStr::Borrowed("#"),
    }
}

pub fn render_or_escape(renderer: Option<&dyn MarkdownRenderer>, source: &str) -> String {
    match renderer {
        Some(renderer) => renderer.render(source),
        None => escape_html(source).replace('\n', "<br>"),
    }
}
