//! One full login+action cycle against a fresh browser session.
//!
//! Each invocation launches its own browser, logs in, runs the requested (or
//! hour-inferred) action, and tears the session down again; retries and the
//! daily scheduler both build on this so a broken session never leaks into
//! the next attempt.

use chrono::Timelike;
use tracing::{debug, error, info, warn};

use crate::artifacts::ArtifactWriter;
use crate::attendance::{clock_in, clock_out, ActionOutcome};
use crate::browser::{Browser, Page};
use crate::config::{AgentConfig, Mode};
use crate::driver::PageDriver;
use crate::login::login;
use crate::result::FicharResult;

/// Run one login+action cycle.
///
/// Returns `Ok(None)` when no explicit mode was given and the current hour is
/// outside both attendance windows: the agent logs in, finds nothing to do,
/// and leaves.
pub async fn run_once(config: &AgentConfig, mode: Option<Mode>) -> FicharResult<Option<ActionOutcome>> {
    let browser = Browser::launch(config.browser.clone()).await?;

    let result = match browser.new_page().await {
        Ok(page) => {
            let result = drive(&page, config, mode).await;
            if result.is_err() {
                capture_failure(&page, config).await;
            }
            result
        }
        Err(err) => Err(err),
    };

    if let Err(err) = browser.close().await {
        debug!(%err, "browser close failed");
    }
    result
}

async fn drive(
    page: &Page,
    config: &AgentConfig,
    mode: Option<Mode>,
) -> FicharResult<Option<ActionOutcome>> {
    login(page, &config.credentials).await?;

    let Some(mode) = mode.or_else(current_mode) else {
        info!("outside working hours, no action taken");
        return Ok(None);
    };

    let outcome = match mode {
        Mode::ClockIn => clock_in(page, &config.credentials).await?,
        Mode::ClockOut => clock_out(page).await?,
    };
    info!(?mode, ?outcome, "action finished");
    Ok(Some(outcome))
}

fn current_mode() -> Option<Mode> {
    Mode::infer(chrono::Local::now().hour())
}

async fn capture_failure(page: &Page, config: &AgentConfig) {
    error!("run failed, capturing failure artifact");
    match page.screenshot().await {
        Ok(bytes) => {
            let writer = ArtifactWriter::new(&config.artifact_dir);
            match writer.write_screenshot("failure", &bytes) {
                Ok(path) => info!(path = %path.display(), "failure screenshot saved"),
                Err(err) => warn!(%err, "could not write failure screenshot"),
            }
        }
        Err(err) => warn!(%err, "could not capture failure screenshot"),
    }
}
