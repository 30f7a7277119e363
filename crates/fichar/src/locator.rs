//! Locator abstraction for heuristic element selection.
//!
//! The portal's markup differs between tenants and shifts between releases,
//! so nothing here assumes a stable selector. A [`Selector`] describes one
//! heuristic way of resolving a UI element (by placeholder, label, role and
//! text, plain text, or CSS), and every strategy compiles down to a
//! JavaScript expression that resolves to a single live element or `null`.
//! Callers hold lists of [`Locator`] candidates in priority order and let the
//! prober decide which one is actually on screen.

use std::fmt;

use serde::Serialize;

/// Selector strategy for locating one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Selector {
    /// CSS selector, first match
    Css(String),
    /// Input or textarea whose placeholder contains the needle (case-insensitive)
    Placeholder(String),
    /// Form control associated with a `<label>` containing the needle
    Label(String),
    /// Element with the given role whose accessible text contains the needle
    Role {
        /// ARIA role ("button", "menuitem", ...)
        role: String,
        /// Text needle, matched case-insensitively
        text: String,
    },
    /// Any element whose text contains the needle (case-insensitive)
    Text(String),
    /// Any element whose trimmed text equals the needle exactly
    TextExact(String),
    /// Elements matching a CSS selector, filtered by text contains
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text needle, matched case-insensitively
        text: String,
    },
}

/// Quote a needle for embedding in a script, lowercased for ci matching.
fn lower(needle: &str) -> String {
    format!("{:?}", needle.to_lowercase())
}

/// Elements that can carry a given role, including intrinsic HTML forms of it.
fn role_css(role: &str) -> String {
    match role {
        "button" => {
            "button, [role=\"button\"], input[type=\"submit\"], input[type=\"button\"]".to_string()
        }
        other => format!("[role=\"{other}\"]"),
    }
}

impl Selector {
    /// JavaScript expression resolving this selector to an element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(css) => format!("document.querySelector({css:?})"),
            Self::Placeholder(needle) => {
                let needle = lower(needle);
                format!(
                    "Array.from(document.querySelectorAll('input[placeholder], textarea[placeholder]'))\
                     .find(el => el.placeholder.toLowerCase().includes({needle})) || null"
                )
            }
            Self::Label(needle) => {
                let needle = lower(needle);
                format!(
                    "(() => {{ \
                     const lab = Array.from(document.querySelectorAll('label'))\
                     .find(l => (l.innerText || '').toLowerCase().includes({needle})); \
                     if (!lab) return null; \
                     if (lab.htmlFor) return document.getElementById(lab.htmlFor); \
                     return lab.querySelector('input, textarea, select'); }})()"
                )
            }
            Self::Role { role, text } => {
                let css = role_css(role);
                let needle = lower(text);
                format!(
                    "Array.from(document.querySelectorAll({css:?}))\
                     .find(el => ((el.innerText || '') + ' ' + (el.value || '') + ' ' + \
                     (el.getAttribute('aria-label') || '')).toLowerCase().includes({needle})) || null"
                )
            }
            Self::Text(needle) => {
                let needle = lower(needle);
                format!(
                    "Array.from(document.querySelectorAll('body *'))\
                     .find(el => (el.innerText || '').toLowerCase().includes({needle})) || null"
                )
            }
            Self::TextExact(text) => {
                format!(
                    "Array.from(document.querySelectorAll('body *'))\
                     .find(el => (el.innerText || '').trim() === {text:?}) || null"
                )
            }
            Self::CssWithText { css, text } => {
                let needle = lower(text);
                format!(
                    "Array.from(document.querySelectorAll({css:?}))\
                     .find(el => (el.innerText || '').toLowerCase().includes({needle})) || null"
                )
            }
        }
    }

    /// Script that reports whether the element is present and actually rendered
    #[must_use]
    pub fn to_visibility_script(&self) -> String {
        let query = self.to_query();
        format!(
            "(() => {{ const el = {query}; if (!el) return false; \
             const style = window.getComputedStyle(el); \
             if (style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0') return false; \
             const rect = el.getBoundingClientRect(); \
             return rect.width > 0 && rect.height > 0; }})()"
        )
    }

    /// Script that clicks the element; reports whether a click happened
    #[must_use]
    pub fn to_click_script(&self) -> String {
        let query = self.to_query();
        format!("(() => {{ const el = {query}; if (!el) return false; el.click(); return true; }})()")
    }

    /// Script that fills the element through its native value setter so the
    /// page's framework sees the input events
    #[must_use]
    pub fn to_fill_script(&self, value: &str) -> String {
        let query = self.to_query();
        format!(
            "(() => {{ const el = {query}; if (!el) return false; el.focus(); \
             const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
             const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
             setter.call(el, {value:?}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()"
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css={css}"),
            Self::Placeholder(needle) => write!(f, "placeholder~={needle}"),
            Self::Label(needle) => write!(f, "label~={needle}"),
            Self::Role { role, text } => write!(f, "role={role}[text~={text}]"),
            Self::Text(needle) => write!(f, "text~={needle}"),
            Self::TextExact(text) => write!(f, "text={text}"),
            Self::CssWithText { css, text } => write!(f, "css={css}[text~={text}]"),
        }
    }
}

/// Script that scans all elements matching `css` and clicks the first one
/// whose text contains any of `needles`; reports whether a click happened.
///
/// This is the last-resort path when every targeted strategy came up empty.
#[must_use]
pub fn scan_click_script(css: &str, needles: &[&str]) -> String {
    let needles: Vec<String> = needles.iter().map(|n| n.to_lowercase()).collect();
    format!(
        "(() => {{ const needles = {needles:?}; \
         for (const el of Array.from(document.querySelectorAll({css:?}))) {{ \
         const text = (el.textContent || '').toLowerCase(); \
         if (needles.some(n => text.includes(n))) {{ el.click(); return true; }} }} \
         return false; }})()"
    )
}

/// A single heuristic way of finding one UI element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    selector: Selector,
}

impl Locator {
    /// Locate by CSS selector
    #[must_use]
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            selector: Selector::Css(css.into()),
        }
    }

    /// Locate an input by placeholder text
    #[must_use]
    pub fn placeholder(needle: impl Into<String>) -> Self {
        Self {
            selector: Selector::Placeholder(needle.into()),
        }
    }

    /// Locate a control by its label text
    #[must_use]
    pub fn label(needle: impl Into<String>) -> Self {
        Self {
            selector: Selector::Label(needle.into()),
        }
    }

    /// Locate by role and accessible text
    #[must_use]
    pub fn role(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            selector: Selector::Role {
                role: role.into(),
                text: text.into(),
            },
        }
    }

    /// Locate any element containing the text
    #[must_use]
    pub fn text(needle: impl Into<String>) -> Self {
        Self {
            selector: Selector::Text(needle.into()),
        }
    }

    /// Locate any element whose text equals the needle exactly
    #[must_use]
    pub fn text_exact(text: impl Into<String>) -> Self {
        Self {
            selector: Selector::TextExact(text.into()),
        }
    }

    /// Locate elements matching a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            selector: Selector::CssWithText {
                css: css.into(),
                text: text.into(),
            },
        }
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}
