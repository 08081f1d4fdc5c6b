//! Markdown dialect of forum messages.
//!
//! CommonMark with tables, strikethrough, task lists, typographic quotes and
//! bare-URL auto-linking. Raw HTML is shown as text, link targets are limited
//! to safe schemes, and images become deferred placeholders that only the
//! post-render stage may resolve.

use std::sync::{Arc, LazyLock};

use pulldown_cmark::{CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;

use super::highlight::CodeHighlighter;
use crate::dom::{Element, escape_text};
use crate::error::Result;

/// Class of the deferred image placeholder.
pub const DEFERRED_IMAGE_CLASS: &str = "deferred-image";

/// Languages rendered by the math typesetter instead of the highlighter.
pub const MATH_LANGUAGES: &[&str] = &["math", "latex", "tex"];

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("valid URL pattern"));

/// Converts message markup to HTML.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, source: &str) -> Result<String>;
}

/// [`MarkdownRenderer`] backed by `pulldown-cmark`.
pub struct CommonMarkRenderer {
    highlighter: Arc<dyn CodeHighlighter>,
}

impl CommonMarkRenderer {
    pub fn new(highlighter: Arc<dyn CodeHighlighter>) -> Self {
        Self { highlighter }
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options
    }

    fn transform<'a>(&self, events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::new();
        let mut link_depth = 0usize;
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut image: Option<(String, String, String)> = None;

        for event in events {
            if let Some((_, code)) = code_block.as_mut() {
                match event {
                    Event::Text(text) => code.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((language, code)) = code_block.take() {
                            out.push(Event::Html(self.code_block(language, &code).into()));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if let Some((_, _, alt)) = image.as_mut() {
                match event {
                    Event::Text(text) | Event::Code(text) => alt.push_str(&text),
                    Event::End(TagEnd::Image) => {
                        if let Some((url, title, alt)) = image.take() {
                            out.push(Event::Html(deferred_image(&url, &title, &alt).into()));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((language, String::new()));
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some((dest_url.to_string(), title.to_string(), String::new()));
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    link_depth += 1;
                    let dest_url = if is_safe_link(&dest_url) {
                        dest_url
                    } else {
                        log::debug!("Dropping unsafe link target: {dest_url}");
                        CowStr::Borrowed("")
                    };
                    out.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    }));
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    out.push(Event::End(TagEnd::Link));
                }
                Event::Html(html) | Event::InlineHtml(html) => out.push(Event::Text(html)),
                Event::Text(text) if link_depth == 0 => linkify(text, &mut out),
                other => out.push(other),
            }
        }

        out
    }

    fn code_block(&self, language: Option<String>, code: &str) -> String {
        let language_class = language
            .as_deref()
            .map(|l| format!("language-{l}"))
            .unwrap_or_default();

        let is_math = language
            .as_deref()
            .is_some_and(|l| MATH_LANGUAGES.contains(&l.to_lowercase().as_str()));

        let body = if is_math {
            escape_text(code)
        } else {
            match self.highlighter.highlight(code, language.as_deref()) {
                Ok(html) => html,
                Err(e) => {
                    log::debug!("Highlighting failed, showing plain code: {e}");
                    escape_text(code)
                }
            }
        };

        let code_el = if is_math {
            Element::new("code").class("language-math")
        } else {
            Element::new("code").class("hljs").class(&language_class)
        };

        let mut html = Element::new("pre").child(code_el.raw(body)).to_html();
        html.push('\n');
        html
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, source: &str) -> Result<String> {
        let parser = pulldown_cmark::TextMergeStream::new(Parser::new_ext(source, Self::options()));
        let events = self.transform(parser);

        let mut html = String::with_capacity(source.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        Ok(html)
    }
}

/// Whether a link target uses a scheme that cannot run script.
pub fn is_safe_link(url: &str) -> bool {
    let url = url.trim();
    let scheme_end = url.find(':');
    let path_start = url.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (None, _) => true,
        (Some(colon), Some(slash)) if slash < colon => true,
        (Some(colon), _) => {
            let scheme = url[..colon].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
    }
}

/// Language named by a fence info string, e.g. `rust` in `rust,ignore`.
fn fence_language(info: &str) -> Option<String> {
    let word = info.split_whitespace().next()?;
    let language: String = word
        .chars()
        .filter(|c| c.is_alphanumeric() || "+-_#".contains(*c))
        .collect();
    (!language.is_empty()).then_some(language)
}

fn deferred_image(url: &str, title: &str, alt: &str) -> String {
    let mut img = Element::new("img")
        .class(DEFERRED_IMAGE_CLASS)
        .attr("data-src", url)
        .attr("alt", alt);
    if !title.is_empty() {
        img.set_attr("title", title);
    }
    img.to_html()
}

/// Split bare URLs out of `text` into auto-links.
fn linkify<'a>(text: CowStr<'a>, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for found in BARE_URL.find_iter(&text) {
        let url = found
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']']);
        let (start, end) = (found.start(), found.start() + url.len());

        if start > last {
            out.push(Event::Text(text[last..start].to_string().into()));
        }
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.to_string().into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(url.to_string().into()));
        out.push(Event::End(TagEnd::Link));
        last = end;
    }

    if last == 0 {
        out.push(Event::Text(text));
    } else if last < text.len() {
        out.push(Event::Text(text[last..].to_string().into()));
    }
}
