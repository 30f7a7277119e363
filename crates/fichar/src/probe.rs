//! First-visible element polling.
//!
//! The prober is the crate's workhorse: every flow step hands it a priority
//! list of [`Locator`] candidates and a budget, and it reports the first
//! candidate that is actually on screen. It is strictly best-effort: a
//! candidate whose visibility check errors or stalls simply counts as "not
//! visible" this pass.

use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};
use tracing::trace;

use crate::driver::PageDriver;
use crate::locator::Locator;

/// Per-candidate visibility check budget
pub const VISIBILITY_CHECK_TIMEOUT: Duration = Duration::from_millis(250);

/// Pause between full candidate passes
pub const PASS_INTERVAL: Duration = Duration::from_millis(200);

/// Poll `candidates` in order until one is visible or `budget` elapses.
///
/// Earlier candidates always win ties: each pass walks the list from the
/// front, so a later candidate is only returned when everything before it
/// stayed invisible for the whole pass. Returns `None` on timeout; never
/// errors.
pub async fn find_visible<'a, P: PageDriver + ?Sized>(
    page: &P,
    candidates: &'a [Locator],
    budget: Duration,
) -> Option<&'a Locator> {
    let deadline = Instant::now() + budget;
    loop {
        for candidate in candidates {
            match timeout(VISIBILITY_CHECK_TIMEOUT, page.is_visible(candidate)).await {
                Ok(Ok(true)) => return Some(candidate),
                Ok(Ok(false)) => {}
                Ok(Err(err)) => trace!(%candidate, %err, "visibility check failed"),
                Err(_) => trace!(%candidate, "visibility check timed out"),
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(PASS_INTERVAL).await;
    }
}

/// Click `locator` if it becomes visible within `budget`.
///
/// Errors are swallowed; the return value says whether a click actually
/// happened.
pub async fn click_if_visible<P: PageDriver + ?Sized>(
    page: &P,
    locator: &Locator,
    budget: Duration,
) -> bool {
    if find_visible(page, std::slice::from_ref(locator), budget)
        .await
        .is_none()
    {
        return false;
    }
    matches!(page.click(locator).await, Ok(true))
}
