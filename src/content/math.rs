//! Math typesetting.

use crate::dom::Element;
use crate::error::Result;

/// Turns TeX source into an element.
pub trait MathTypesetter: Send + Sync {
    fn typeset(&self, tex: &str, display: bool) -> Result<Element>;
}

/// Emits delimited TeX for a client-side typesetter to pick up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedMath;

impl MathTypesetter for DelimitedMath {
    fn typeset(&self, tex: &str, display: bool) -> Result<Element> {
        let tex = tex.trim();
        Ok(if display {
            Element::new("div")
                .class("math math-display")
                .text(format!("\\[{tex}\\]"))
        } else {
            Element::new("span")
                .class("math math-inline")
                .text(format!("\\({tex}\\)"))
        })
    }
}

/// TeX of inline code written as `$...$`.
pub fn inline_tex(code: &str) -> Option<&str> {
    code.strip_prefix('$')
        .and_then(|rest| rest.strip_suffix('$'))
        .filter(|tex| !tex.trim().is_empty())
}
