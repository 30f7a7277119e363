//! Page driver abstraction.
//!
//! The automation flows only ever talk to a [`PageDriver`]. The real
//! implementation is the CDP-backed [`crate::browser::Page`]; unit tests run
//! the same flows against a scripted mock, so none of the flow logic needs a
//! browser to be exercised.

use async_trait::async_trait;

use crate::locator::Locator;
use crate::result::FicharResult;

/// Operations the automation flows need from a live page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the document to finish loading
    async fn goto(&self, url: &str) -> FicharResult<()>;

    /// Current URL
    async fn url(&self) -> FicharResult<String>;

    /// Current document title
    async fn title(&self) -> FicharResult<String>;

    /// Whether the element is present and rendered. Errors bubble up; the
    /// prober decides whether to swallow them.
    async fn is_visible(&self, locator: &Locator) -> FicharResult<bool>;

    /// Click the element; `false` means it was gone at click time
    async fn click(&self, locator: &Locator) -> FicharResult<bool>;

    /// Fill the element with text; `false` means it was gone at fill time
    async fn fill(&self, locator: &Locator, text: &str) -> FicharResult<bool>;

    /// Scan elements matching `css` and click the first whose text contains
    /// any of `needles`; reports whether a click happened
    async fn click_first_text_match(&self, css: &str, needles: &[&str]) -> FicharResult<bool>;

    /// Full text of the document body (diagnostics only)
    async fn body_text(&self) -> FicharResult<String>;

    /// Wait for an in-flight navigation to finish, if one is happening
    async fn wait_for_navigation(&self) -> FicharResult<()>;

    /// Wait for the network to go quiet
    async fn wait_for_idle(&self) -> FicharResult<()>;

    /// Capture a PNG screenshot of the current viewport
    async fn screenshot(&self) -> FicharResult<Vec<u8>>;
}
