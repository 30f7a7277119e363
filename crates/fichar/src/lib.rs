//! Fichar: browser-automation agent for Adrenalin HR attendance.
//!
//! Fichar (Spanish: "to clock in at work") logs into the Adrenalin portal in
//! a real Chromium session driven over the `DevTools` protocol, then clicks
//! through the portal's clock-in or clock-out flow. The portal's markup
//! shifts between tenants and releases, so every element is found through a
//! prioritized list of heuristic locators polled for visibility rather than
//! any single stable selector.
//!
//! # Architecture
//!
//! ```text
//! retry / scheduler ──► agent (one session per cycle)
//!                         │
//!                         ├─► login ────┐
//!                         └─► attendance┤──► probe ──► PageDriver ──► CDP
//!                                       │    (find first visible)
//!                                       └──► locator (heuristic JS queries)
//! ```
//!
//! Flows never talk to the browser directly; they go through the
//! [`PageDriver`] seam, which is how the whole flow layer stays testable
//! without a Chromium install.

pub mod artifacts;
pub mod attendance;
pub mod browser;
pub mod config;
pub mod driver;
pub mod locator;
pub mod login;
pub mod probe;
pub mod result;
pub mod retry;
pub mod scheduler;

#[cfg(feature = "browser")]
pub mod agent;

#[cfg(test)]
pub(crate) mod mock;

pub use artifacts::ArtifactWriter;
pub use attendance::{clock_in, clock_out, exit_application, ActionOutcome, ExitMode};
pub use browser::BrowserConfig;
pub use config::{AgentConfig, Credentials, Mode};
pub use driver::PageDriver;
pub use locator::{Locator, Selector};
pub use login::login;
pub use probe::{click_if_visible, find_visible};
pub use result::{FicharError, FicharResult};
pub use retry::{run_with_retries, RetryPolicy};
pub use scheduler::{delay_until, DailyScheduler, Schedule};

#[cfg(feature = "browser")]
pub use agent::run_once;
#[cfg(feature = "browser")]
pub use browser::{Browser, Page};
