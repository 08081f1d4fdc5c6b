//! Syntax highlighting backends for fenced code blocks.

use crate::dom::escape_text;
use crate::error::Result;

/// Turns source code into HTML.
///
/// Implementations must escape every piece of `code` they emit.
pub trait CodeHighlighter: Send + Sync {
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<String>;
}

/// Escapes code without highlighting it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: Option<&str>) -> Result<String> {
        Ok(escape_text(code))
    }
}

#[cfg(feature = "syntect")]
pub use self::syntect_backend::SyntectHighlighter;

#[cfg(feature = "syntect")]
mod syntect_backend {
    use syntect::html::{ClassStyle, ClassedHTMLGenerator};
    use syntect::parsing::{SyntaxReference, SyntaxSet};
    use syntect::util::LinesWithEndings;

    use super::CodeHighlighter;
    use crate::error::{AppError, Result};

    /// Class-based highlighting; colors come from the site stylesheet.
    pub struct SyntectHighlighter {
        syntax_set: SyntaxSet,
    }

    impl SyntectHighlighter {
        pub fn new() -> Self {
            Self {
                syntax_set: SyntaxSet::load_defaults_newlines(),
            }
        }

        /// Named language first, then detection from the first line.
        fn syntax_for(&self, language: Option<&str>, code: &str) -> &SyntaxReference {
            if let Some(syntax) = language.and_then(|l| self.syntax_set.find_syntax_by_token(l)) {
                return syntax;
            }
            if let Some(language) = language {
                log::debug!("Unknown code language '{language}', detecting instead");
            }
            let first_line = code.lines().next().unwrap_or_default();
            self.syntax_set
                .find_syntax_by_first_line(first_line)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        }
    }

    impl Default for SyntectHighlighter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CodeHighlighter for SyntectHighlighter {
        fn highlight(&self, code: &str, language: Option<&str>) -> Result<String> {
            let syntax = self.syntax_for(language, code);
            let mut generator = ClassedHTMLGenerator::new_with_class_style(
                syntax,
                &self.syntax_set,
                ClassStyle::SpacedPrefixed { prefix: "hl-" },
            );
            for line in LinesWithEndings::from(code) {
                generator
                    .parse_html_for_line_which_includes_newline(line)
                    .map_err(AppError::render)?;
            }
            Ok(generator.finalize())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_highlights_known_language() {
            let h = SyntectHighlighter::new();
            let html = h.highlight("fn main() {}\n", Some("rust")).unwrap();
            assert!(html.contains("hl-"));
            assert!(html.contains("main"));
        }

        #[test]
        fn test_unknown_language_still_escapes() {
            let h = SyntectHighlighter::new();
            let html = h.highlight("<b>&</b>\n", Some("no-such-lang")).unwrap();
            assert!(!html.contains("<b>"));
            assert!(html.contains("&lt;b&gt;"));
        }
    }
}

/// Default highlighter for the enabled features.
pub fn default_highlighter() -> std::sync::Arc<dyn CodeHighlighter> {
    #[cfg(feature = "syntect")]
    {
        std::sync::Arc::new(SyntectHighlighter::new())
    }
    #[cfg(not(feature = "syntect"))]
    {
        std::sync::Arc::new(PlainHighlighter)
    }
}
