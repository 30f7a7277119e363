//! Scripted page driver for exercising flows without a browser.
//!
//! Visibility, clicks, and fills are keyed by the locator's display form, so
//! a test scripts exactly the candidates the flow under test will probe.
//! Click effects let a test model the portal reacting to a click: a URL
//! change after submit, a confirmation banner appearing, the clock-in button
//! disappearing.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{FicharError, FicharResult};

/// Side effects applied when a scripted element is clicked
#[derive(Debug, Default, Clone)]
pub struct ClickEffect {
    /// New URL after the click
    pub set_url: Option<String>,
    /// Locators that become visible
    pub show: Vec<Locator>,
    /// Locators that stop being visible
    pub hide: Vec<Locator>,
}

#[derive(Debug, Default)]
struct State {
    url: String,
    title: String,
    body: String,
    visible: HashSet<String>,
    erroring: HashSet<String>,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    scans: Vec<(String, Vec<String>)>,
    click_effects: HashMap<String, ClickEffect>,
    scan_effects: HashMap<String, ClickEffect>,
}

/// Scripted [`PageDriver`]
#[derive(Debug, Default)]
pub struct MockPage {
    state: Mutex<State>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(self, url: &str) -> Self {
        self.state.lock().unwrap().url = url.to_string();
        self
    }

    pub fn with_title(self, title: &str) -> Self {
        self.state.lock().unwrap().title = title.to_string();
        self
    }

    pub fn with_body(self, body: &str) -> Self {
        self.state.lock().unwrap().body = body.to_string();
        self
    }

    /// Make a locator visible from the start
    pub fn show(self, locator: &Locator) -> Self {
        self.state.lock().unwrap().visible.insert(locator.to_string());
        self
    }

    /// Make visibility checks for a locator fail with an error
    pub fn error_on(self, locator: &Locator) -> Self {
        self.state
            .lock()
            .unwrap()
            .erroring
            .insert(locator.to_string());
        self
    }

    /// Script what happens when a locator is clicked
    pub fn on_click(self, locator: &Locator, effect: ClickEffect) -> Self {
        self.state
            .lock()
            .unwrap()
            .click_effects
            .insert(locator.to_string(), effect);
        self
    }

    /// Script a hit for the element-scan fallback, keyed by needle
    pub fn on_scan_hit(self, needle: &str, effect: ClickEffect) -> Self {
        self.state
            .lock()
            .unwrap()
            .scan_effects
            .insert(needle.to_lowercase(), effect);
        self
    }

    /// Locators clicked so far, in order
    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    /// Fills performed so far, in order
    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().fills.clone()
    }

    /// Element scans performed so far
    pub fn scans(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().scans.clone()
    }

    fn apply(state: &mut State, effect: &ClickEffect) {
        if let Some(ref url) = effect.set_url {
            state.url = url.clone();
        }
        for locator in &effect.show {
            state.visible.insert(locator.to_string());
        }
        for locator in &effect.hide {
            state.visible.remove(&locator.to_string());
        }
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> FicharResult<()> {
        self.state.lock().unwrap().url = url.to_string();
        Ok(())
    }

    async fn url(&self) -> FicharResult<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn title(&self) -> FicharResult<String> {
        Ok(self.state.lock().unwrap().title.clone())
    }

    async fn is_visible(&self, locator: &Locator) -> FicharResult<bool> {
        let state = self.state.lock().unwrap();
        let key = locator.to_string();
        if state.erroring.contains(&key) {
            return Err(FicharError::evaluation(format!("scripted error for {key}")));
        }
        Ok(state.visible.contains(&key))
    }

    async fn click(&self, locator: &Locator) -> FicharResult<bool> {
        let mut state = self.state.lock().unwrap();
        let key = locator.to_string();
        state.clicks.push(key.clone());
        if let Some(effect) = state.click_effects.get(&key).cloned() {
            Self::apply(&mut state, &effect);
        }
        Ok(true)
    }

    async fn fill(&self, locator: &Locator, text: &str) -> FicharResult<bool> {
        self.state
            .lock()
            .unwrap()
            .fills
            .push((locator.to_string(), text.to_string()));
        Ok(true)
    }

    async fn click_first_text_match(&self, css: &str, needles: &[&str]) -> FicharResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.scans.push((
            css.to_string(),
            needles.iter().map(|n| (*n).to_string()).collect(),
        ));
        for needle in needles {
            if let Some(effect) = state.scan_effects.get(&needle.to_lowercase()).cloned() {
                Self::apply(&mut state, &effect);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn body_text(&self) -> FicharResult<String> {
        Ok(self.state.lock().unwrap().body.clone())
    }

    async fn wait_for_navigation(&self) -> FicharResult<()> {
        Ok(())
    }

    async fn wait_for_idle(&self) -> FicharResult<()> {
        Ok(())
    }

    async fn screenshot(&self) -> FicharResult<Vec<u8>> {
        // PNG magic, enough for artifact tests
        Ok(vec![0x89, 0x50, 0x4E, 0x47])
    }
}
