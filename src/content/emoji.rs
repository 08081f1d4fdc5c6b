//! Emoji wrapping.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::map_text_segments;

pub const EMOJI_CLASS: &str = "emoji";

static EMOJI_PRESENTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Emoji_Presentation}\p{Regional_Indicator}]").expect("valid emoji pattern")
});

static PICTOGRAPHIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Extended_Pictographic}").expect("valid pictograph pattern"));

const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const KEYCAP: char = '\u{20E3}';

/// Whether a grapheme cluster renders as an emoji.
pub fn is_emoji(grapheme: &str) -> bool {
    if grapheme.is_ascii() {
        return false;
    }
    EMOJI_PRESENTATION.is_match(grapheme)
        || grapheme.contains(KEYCAP)
        || (grapheme.contains(VARIATION_SELECTOR_16) && PICTOGRAPHIC.is_match(grapheme))
}

/// Wrap every emoji grapheme in the text of `html` in a styling span.
pub fn wrap_emoji(html: &str) -> String {
    map_text_segments(html, |text| {
        if text.is_ascii() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        for grapheme in text.graphemes(true) {
            if is_emoji(grapheme) {
                out.push_str("<span class=\"");
                out.push_str(EMOJI_CLASS);
                out.push_str("\">");
                out.push_str(grapheme);
                out.push_str("</span>");
            } else {
                out.push_str(grapheme);
            }
        }
        out
    })
}
