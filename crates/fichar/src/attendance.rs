//! Clock-in / clock-out UI flows.
//!
//! Both flows are multi-stage heuristic walks, not single operations. The
//! portal shows a clock-in popup after the first login of the day (usually),
//! hides the real clock-out behind the exit-application confirmation prompt,
//! and sometimes presents the morning popup in the evening by mistake. Every
//! stage probes candidate locators and degrades instead of failing: a missing
//! confirmation downgrades the outcome, it does not abort the run.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::login::login;
use crate::probe::find_visible;
use crate::result::FicharResult;

/// What a flow can report about the action it drove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionOutcome {
    /// A positive confirmation was observed
    Succeeded,
    /// A click happened but no confirmation was observed
    Ambiguous,
    /// The flow found no affordance to drive at all
    Failed,
}

/// Which variant of the exit-application flow to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitMode {
    /// After clock-in; probe-and-log only
    Morning,
    /// After clock-out; confirms the clock-out prompt
    Evening,
}

const CLOCK_BUTTON_BUDGET: Duration = Duration::from_secs(5);
const EVENING_DIALOG_BUDGET: Duration = Duration::from_secs(3);
const CONFIRMATION_BUDGET: Duration = Duration::from_secs(5);
const POST_CLICK_SETTLE: Duration = Duration::from_secs(3);
const SECOND_CLICK_SETTLE: Duration = Duration::from_secs(2);
const RELOGIN_PAUSE: Duration = Duration::from_secs(2);
const USER_MENU_BUDGET: Duration = Duration::from_secs(5);
const MENU_OPEN_SETTLE: Duration = Duration::from_secs(1);
const EXIT_OPTION_BUDGET: Duration = Duration::from_secs(3);
const PROMPT_BUDGET: Duration = Duration::from_secs(3);
const DISMISS_BUDGET: Duration = Duration::from_secs(2);

/// How much page text to put in the post-click debug excerpt
const BODY_EXCERPT_LEN: usize = 500;

pub(crate) fn clock_in_candidates() -> Vec<Locator> {
    vec![
        Locator::role("button", "clock in"),
        Locator::role("button", "clockin"),
        Locator::role("button", "clock-in"),
        Locator::role("button", "mark in"),
        Locator::role("button", "punch in"),
    ]
}

pub(crate) fn confirmation_markers() -> Vec<Locator> {
    vec![
        Locator::text("success"),
        Locator::text("marked"),
        Locator::text("punched"),
        Locator::text("clocked"),
        Locator::text("completed"),
        Locator::text("done"),
        Locator::text("confirmed"),
        Locator::css("[class*=\"success\"], [class*=\"confirmation\"], [class*=\"alert\"]"),
    ]
}

pub(crate) fn user_menu_candidates() -> Vec<Locator> {
    vec![
        Locator::css("[data-testid*=\"user\"], [aria-label*=\"user\"], [title*=\"user\"]"),
        Locator::css("img[alt*=\"user\"], img[alt*=\"profile\"]"),
        Locator::role("button", "user"),
        Locator::role("button", "profile"),
        Locator::role("button", "account"),
        Locator::css("[class*=\"user\"], [class*=\"profile\"]"),
    ]
}

pub(crate) fn exit_option_candidates() -> Vec<Locator> {
    vec![
        Locator::text_exact("Exit application"),
        Locator::role("menuitem", "exit application"),
        Locator::css_with_text("a, button, div, span", "exit application"),
    ]
}

pub(crate) fn clockout_prompt_candidates() -> Vec<Locator> {
    vec![Locator::text("do you want to clockout")]
}

pub(crate) fn yes_candidates() -> Vec<Locator> {
    vec![
        Locator::role("button", "yes"),
        Locator::text_exact("Yes"),
        Locator::css_with_text("button", "yes"),
    ]
}

pub(crate) fn later_candidates() -> Vec<Locator> {
    vec![
        Locator::role("button", "later"),
        Locator::role("button", "skip"),
        Locator::text("do this later"),
        Locator::css_with_text("button", "later"),
    ]
}

pub(crate) fn close_candidates() -> Vec<Locator> {
    vec![
        Locator::role("button", "close"),
        Locator::role("button", "cancel"),
        Locator::css("[aria-label*=\"close\"], [title*=\"close\"]"),
    ]
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Morning clock-in flow.
///
/// The popup does not always appear on the first login of the day. When it is
/// missing, the flow exits the portal, logs in again to coax the popup out,
/// and retries the click once, with or without a confirmation afterwards.
pub async fn clock_in<P: PageDriver + ?Sized>(
    page: &P,
    credentials: &Credentials,
) -> FicharResult<ActionOutcome> {
    info!("attempting morning clock-in");
    let buttons = clock_in_candidates();

    if let Some(button) = find_visible(page, &buttons, CLOCK_BUTTON_BUDGET).await {
        let button = button.clone();
        let outcome = click_and_confirm(page, &button).await?;
        info!("clock-in flow finished, exiting application");
        let _ = exit_application(page, ExitMode::Morning).await?;
        return Ok(outcome);
    }

    info!("no clock-in popup found, re-logging in to trigger it");
    let _ = exit_application(page, ExitMode::Morning).await?;
    tokio::time::sleep(RELOGIN_PAUSE).await;
    login(page, credentials).await?;

    let outcome = if let Some(button) = find_visible(page, &buttons, CLOCK_BUTTON_BUDGET).await {
        let button = button.clone();
        info!(%button, "clock-in popup present after second login, clicking");
        page.click(&button).await?;
        tokio::time::sleep(SECOND_CLICK_SETTLE).await;

        let markers = confirmation_markers();
        if find_visible(page, &markers, CONFIRMATION_BUDGET).await.is_some() {
            info!("clock-in confirmed on second attempt");
            ActionOutcome::Succeeded
        } else {
            warn!("no confirmation on second attempt, proceeding anyway");
            tokio::time::sleep(POST_CLICK_SETTLE).await;
            ActionOutcome::Ambiguous
        }
    } else {
        warn!("still no clock-in popup after second login, may already be clocked in");
        ActionOutcome::Ambiguous
    };

    info!("morning clock-in finished, exiting application");
    let _ = exit_application(page, ExitMode::Morning).await?;
    Ok(outcome)
}

async fn click_and_confirm<P: PageDriver + ?Sized>(
    page: &P,
    button: &Locator,
) -> FicharResult<ActionOutcome> {
    info!(%button, "clock-in popup found, clicking");
    page.click(button).await?;
    tokio::time::sleep(POST_CLICK_SETTLE).await;

    match page.body_text().await {
        Ok(text) => debug!(
            excerpt = %truncate(&text, BODY_EXCERPT_LEN),
            "page text after clock-in click"
        ),
        Err(err) => debug!(%err, "could not read page text"),
    }

    let markers = confirmation_markers();
    if let Some(marker) = find_visible(page, &markers, CONFIRMATION_BUDGET).await {
        info!(%marker, "clock-in confirmation found");
        return Ok(ActionOutcome::Succeeded);
    }

    // Some tenants hide the popup after a successful punch, which is as good
    // a signal as a confirmation banner.
    if !page.is_visible(button).await.unwrap_or(false) {
        info!("clock-in popup disappeared, treating as success");
        return Ok(ActionOutcome::Succeeded);
    }

    warn!("clock-in popup still visible, clicking once more");
    let _ = page.click(button).await;
    tokio::time::sleep(SECOND_CLICK_SETTLE).await;
    Ok(ActionOutcome::Ambiguous)
}

/// Evening clock-out flow.
///
/// The punch itself happens inside the exit flow's confirmation prompt; this
/// entry point only clears a stray clock-in dialog out of the way first.
pub async fn clock_out<P: PageDriver + ?Sized>(page: &P) -> FicharResult<ActionOutcome> {
    info!("attempting evening clock-out");

    let dialog = clock_in_candidates();
    if find_visible(page, &dialog, EVENING_DIALOG_BUDGET).await.is_some() {
        info!("clock-in dialog appeared in the evening, dismissing");
        let later = later_candidates();
        if let Some(later_button) = find_visible(page, &later, DISMISS_BUDGET).await {
            let later_button = later_button.clone();
            page.click(&later_button).await?;
            tokio::time::sleep(MENU_OPEN_SETTLE).await;
        } else {
            warn!("no postpone control on the dialog, trying a close control");
            let close = close_candidates();
            if let Some(close_button) = find_visible(page, &close, DISMISS_BUDGET).await {
                let close_button = close_button.clone();
                page.click(&close_button).await?;
                tokio::time::sleep(MENU_OPEN_SETTLE).await;
            }
        }
    }

    info!("proceeding to exit application, clock-out happens at its prompt");
    exit_application(page, ExitMode::Evening).await
}

/// Leave the portal via the user menu, confirming the clock-out prompt in the
/// evening.
///
/// The morning variant only probes and logs: its confirmation clicks are
/// deliberately disabled, so morning sessions are left open. Keep the two
/// variants separate; unifying them would change what mornings do.
pub async fn exit_application<P: PageDriver + ?Sized>(
    page: &P,
    mode: ExitMode,
) -> FicharResult<ActionOutcome> {
    info!(?mode, "attempting to exit application");

    if mode == ExitMode::Morning {
        let title = page.title().await.unwrap_or_default();
        let url = page.url().await.unwrap_or_default();
        debug!(%title, %url, "page state before exit");
    }

    let menu = user_menu_candidates();
    let user_icon = find_visible(page, &menu, USER_MENU_BUDGET).await.cloned();

    if mode == ExitMode::Morning {
        // Inert on purpose: the morning confirmation clicks are disabled, so
        // this variant stops after the probe.
        // TODO: decide whether mornings should actually exit the session.
        warn!(
            found_user_menu = user_icon.is_some(),
            "could not find exit application option"
        );
        return Ok(ActionOutcome::Ambiguous);
    }

    if let Some(user_icon) = user_icon {
        info!(%user_icon, "user menu found, opening");
        page.click(&user_icon).await?;
        tokio::time::sleep(MENU_OPEN_SETTLE).await;

        let exit_options = exit_option_candidates();
        if let Some(exit_option) = find_visible(page, &exit_options, EXIT_OPTION_BUDGET).await {
            let exit_option = exit_option.clone();
            info!(%exit_option, "exit option found, clicking");
            page.click(&exit_option).await?;
            tokio::time::sleep(MENU_OPEN_SETTLE).await;

            let prompts = clockout_prompt_candidates();
            if find_visible(page, &prompts, PROMPT_BUDGET).await.is_some() {
                info!("clock-out prompt found, confirming");
                let yes = yes_candidates();
                if let Some(yes_button) = find_visible(page, &yes, PROMPT_BUDGET).await {
                    let yes_button = yes_button.clone();
                    page.click(&yes_button).await?;
                    info!("confirmed clock-out prompt");
                    return Ok(ActionOutcome::Succeeded);
                }
                warn!("no yes control on the prompt, scanning buttons for a confirmation");
                if page
                    .click_first_text_match("button", &["yes", "ok", "confirm"])
                    .await?
                {
                    info!("confirmed clock-out via button scan");
                    return Ok(ActionOutcome::Succeeded);
                }
                warn!("could not confirm the clock-out prompt");
                return Ok(ActionOutcome::Ambiguous);
            }

            info!("exit application finished without a clock-out prompt");
            return Ok(ActionOutcome::Ambiguous);
        }
    }

    // The menu path came up empty; scan the whole page for anything
    // exit-shaped.
    warn!("user menu path failed, scanning all elements for an exit option");
    if page
        .click_first_text_match("a, button, div, span", &["exit application", "sign out"])
        .await?
    {
        info!("clicked exit option found by element scan");
        return Ok(ActionOutcome::Ambiguous);
    }

    warn!("could not find exit application option");
    Ok(ActionOutcome::Failed)
}
