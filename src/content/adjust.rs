//! Post-render adjustment of attached message content.
//!
//! Runs on the element tree once expanded HTML is part of the page. This is
//! the only stage allowed to turn a deferred image into something that loads:
//! third-party images and video embeds are loaded only with the persisted
//! external content consent, everything else becomes a plain link.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::MESSAGE_CONTENT_CLASS;
use super::markdown::is_safe_link;
use super::math::{MathTypesetter, inline_tex};
use crate::dom::{Element, Node};
use crate::models::{ContentConfig, LocaleConfig, Message};
use crate::utils::format_time;
use crate::utils::url::{get_domain, is_same_origin};

static QUOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^quote\|(\d+)\|").expect("valid quote marker pattern"));

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid video id pattern"));

/// Height as a percentage of width when the alt text declares no size.
pub const DEFAULT_ASPECT_PERCENT: f64 = 56.25;

const SAFE_REL: &str = "noopener noreferrer";

/// Everything the adjustment pass depends on.
pub struct AdjustContext<'a> {
    /// Origin the page is served from
    pub origin: &'a Url,
    /// Persisted consent to load third-party content
    pub external_content_allowed: bool,
    pub content: &'a ContentConfig,
    pub locale: &'a LocaleConfig,
    pub math: &'a dyn MathTypesetter,
}

/// Adjust a subtree holding expanded message content.
pub fn adjust_message_content(root: &mut Element, ctx: &AdjustContext<'_>) {
    root.visit_mut(&mut |el| {
        if el.tag() == "table" {
            el.add_class(&ctx.content.table_classes);
        }
    });

    root.visit_mut(&mut |el| {
        if el.tag() == "blockquote" {
            format_quote_header(el, ctx.locale);
        }
    });

    root.rewrite(&mut |el| {
        (el.tag() == "img" && el.get_attr("data-src").is_some())
            .then(|| resolve_image(el, ctx))
    });

    root.visit_mut(&mut |el| {
        if el.tag() == "a" && el.get_attr("href").is_some_and(|h| is_outbound(h, ctx.origin)) {
            el.set_attr("rel", SAFE_REL);
            el.set_attr("target", "_blank");
        }
    });

    patch_math(root, ctx.math);
}

/// Adjust every expanded content block inside `root`.
pub fn adjust_attached_content(root: &mut Element, ctx: &AdjustContext<'_>) {
    if root.has_class(MESSAGE_CONTENT_CLASS) {
        adjust_message_content(root, ctx);
        return;
    }
    root.visit_mut(&mut |el| {
        if el.has_class(MESSAGE_CONTENT_CLASS) {
            adjust_message_content(el, ctx);
        }
    });
}

fn is_outbound(href: &str, origin: &Url) -> bool {
    let href = href.trim();
    !href.is_empty() && !href.starts_with('#') && !is_same_origin(href, origin)
}

// --- Quotes ---

/// Markdown quoting `message`, led by the marker line turned into a header.
pub fn quote_markdown(message: &Message) -> String {
    let author = message
        .created_by
        .as_ref()
        .map(|user| format!("@{}@", user.id))
        .unwrap_or_default();

    let mut quoted = format!("> quote|{}|{}\n>\n", message.created.timestamp(), author);
    for line in message.content.lines() {
        quoted.push_str("> ");
        quoted.push_str(line);
        quoted.push('\n');
    }
    quoted.push('\n');
    quoted
}

fn format_quote_header(blockquote: &mut Element, locale: &LocaleConfig) {
    let Some(first) = blockquote
        .child_nodes_mut()
        .iter_mut()
        .find_map(Node::as_element_mut)
    else {
        return;
    };
    if first.tag() != "p" {
        return;
    }

    let Some((header, rest)) = build_quote_header(first, locale) else {
        return;
    };

    let index = blockquote
        .child_nodes()
        .iter()
        .position(|n| n.as_element().is_some())
        .unwrap_or_default();
    let nodes = blockquote.child_nodes_mut();
    nodes[index] = header.into();
    if let Some(rest) = rest {
        nodes.insert(index + 1, rest.into());
    }
}

/// Header for a paragraph starting with the quote marker, plus a paragraph
/// with whatever followed the marker line.
fn build_quote_header(p: &Element, locale: &LocaleConfig) -> Option<(Element, Option<Element>)> {
    let Some(Node::Text(lead)) = p.child_nodes().first() else {
        return None;
    };
    let caps = QUOTE_MARKER.captures(lead)?;
    let seconds: i64 = caps[1].parse().ok()?;
    let time = format_time(&DateTime::from_timestamp(seconds, 0)?);
    let marker_len = caps[0].len();

    let mut author = Vec::new();
    let mut rest = Vec::new();
    let mut in_rest = false;
    let leading = Node::Text(lead[marker_len..].to_string());
    for node in std::iter::once(&leading).chain(p.child_nodes().iter().skip(1)) {
        if in_rest {
            rest.push(node.clone());
            continue;
        }
        match node {
            Node::Text(text) => match text.split_once('\n') {
                Some((line, tail)) => {
                    author.push(Node::text(line));
                    rest.push(Node::text(tail));
                    in_rest = true;
                }
                None => author.push(node.clone()),
            },
            other => author.push(other.clone()),
        }
    }

    let template = locale.messages.quote_header.as_str();
    let (before, after) = template.split_once("{author}").unwrap_or((template, ""));
    let header = Element::new("p")
        .class("quote-header")
        .text(before.replace("{time}", &time))
        .children(author.into_iter().filter(|n| !matches!(n, Node::Text(t) if t.is_empty())))
        .text(after.replace("{time}", &time));

    let has_rest = rest.iter().any(|n| match n {
        Node::Text(text) => !text.trim().is_empty(),
        _ => true,
    });
    let rest = has_rest.then(|| Element::new("p").children(rest));
    Some((header, rest))
}

// --- Images and videos ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VideoProvider {
    YouTube,
    Vimeo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Video {
    provider: VideoProvider,
    id: String,
}

impl Video {
    fn parse(source: &str, hosts: &[String]) -> Option<Self> {
        let url = Url::parse(source).ok()?;
        let host = url.host_str()?.to_lowercase();
        if !hosts.iter().any(|h| h.eq_ignore_ascii_case(&host)) {
            return None;
        }

        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let (provider, id) = if host == "youtu.be" {
            (VideoProvider::YouTube, segments.next()?.to_string())
        } else if host.ends_with("youtube.com") {
            let id = match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned())?,
                "embed" | "shorts" | "v" => segments.next()?.to_string(),
                _ => return None,
            };
            (VideoProvider::YouTube, id)
        } else if host.ends_with("vimeo.com") {
            let id = segments.find(|s| s.chars().all(|c| c.is_ascii_digit()))?;
            (VideoProvider::Vimeo, id.to_string())
        } else {
            return None;
        };

        VIDEO_ID.is_match(&id).then_some(Self { provider, id })
    }

    fn embed_url(&self) -> String {
        match self.provider {
            VideoProvider::YouTube => format!("https://www.youtube-nocookie.com/embed/{}", self.id),
            VideoProvider::Vimeo => format!("https://player.vimeo.com/video/{}", self.id),
        }
    }

    fn watch_url(&self) -> String {
        match self.provider {
            VideoProvider::YouTube => format!("https://www.youtube.com/watch?v={}", self.id),
            VideoProvider::Vimeo => format!("https://vimeo.com/{}", self.id),
        }
    }
}

/// Declared video size, carried as JSON in the image alt text.
#[derive(Deserialize)]
struct VideoSize {
    width: f64,
    height: f64,
}

fn aspect_percent(alt: &str) -> f64 {
    match serde_json::from_str::<VideoSize>(alt.trim()) {
        Ok(size) if size.width > 0.0 && size.height > 0.0 => size.height / size.width * 100.0,
        _ => DEFAULT_ASPECT_PERCENT,
    }
}

fn resolve_image(img: &Element, ctx: &AdjustContext<'_>) -> Node {
    let source = img.get_attr("data-src").unwrap_or_default().trim();
    let alt = img.get_attr("alt").unwrap_or_default();

    if source.is_empty() || !is_safe_link(source) {
        log::debug!("Dropping image with unusable source {source:?}");
        return Node::text(alt);
    }

    if let Some(video) = Video::parse(source, &ctx.content.video_hosts) {
        return if ctx.external_content_allowed {
            video_embed(&video, alt).into()
        } else {
            let url = video.watch_url();
            Element::new("a")
                .class("video-link")
                .attr("href", url.as_str())
                .text(ctx.locale.messages.watch_video.replace("{url}", &url))
                .into()
        };
    }

    if ctx.external_content_allowed || is_same_origin(source, ctx.origin) {
        let mut loaded = img.clone();
        loaded.set_attr("src", source);
        loaded.remove_attr("data-src");
        return loaded.into();
    }

    let domain = get_domain(source).unwrap_or_else(|| source.to_string());
    let label = ctx
        .content
        .external_image_warning
        .replace("{domain}", &domain)
        .replace("{url}", source);
    Element::new("a")
        .class("external-image")
        .attr("href", source)
        .attr("title", alt)
        .text(label)
        .into()
}

fn video_embed(video: &Video, alt: &str) -> Element {
    let padding = format!(
        "position: relative; padding-bottom: {:.2}%; height: 0; overflow: hidden;",
        aspect_percent(alt)
    );
    Element::new("div")
        .class("video-embed")
        .attr("style", padding)
        .child(
            Element::new("iframe")
                .attr("src", video.embed_url())
                .attr(
                    "style",
                    "position: absolute; top: 0; left: 0; width: 100%; height: 100%;",
                )
                .attr("frameborder", "0")
                .attr("allowfullscreen", ""),
        )
}

// --- Math ---

fn patch_math(root: &mut Element, math: &dyn MathTypesetter) {
    for node in root.child_nodes_mut().iter_mut() {
        let Node::Element(el) = node else {
            continue;
        };

        let typeset = match el.tag() {
            "pre" => match el.child_nodes().iter().find_map(Node::as_element) {
                Some(code) if code.has_class("language-math") => {
                    Some(math.typeset(&code.text_content(), true))
                }
                _ => continue,
            },
            "code" => inline_tex(&el.text_content()).map(|tex| math.typeset(tex, false)),
            _ => None,
        };

        match typeset {
            Some(Ok(replacement)) => *node = replacement.into(),
            Some(Err(e)) => log::debug!("Math left as code: {e}"),
            None => patch_math(el, math),
        }
    }
}
