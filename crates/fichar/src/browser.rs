//! Browser session control over the Chrome `DevTools` Protocol.
//!
//! One [`Browser`] is launched per attendance attempt and torn down with it.
//! The session is pinned to the portal's expectations: `en-IN` locale,
//! `Asia/Kolkata` timezone, a fixed desktop viewport, and a fixed Chrome
//! user-agent, all applied through CDP overrides before the first navigation.

use crate::result::FicharResult;

/// Browser configuration for one attendance session
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Browser UI locale
    pub locale: String,
    /// Timezone identifier for the session
    pub timezone: String,
    /// User agent string
    pub user_agent: String,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1366,
            viewport_height: 900,
            locale: "en-IN".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome Safari"
                .to_string(),
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

#[cfg(feature = "browser")]
mod cdp {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::{
        SetDeviceMetricsOverrideParams, SetTimezoneOverrideParams, SetUserAgentOverrideParams,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use tokio::sync::Mutex;

    use super::BrowserConfig;
    use crate::driver::PageDriver;
    use crate::locator::{scan_click_script, Locator};
    use crate::result::{FicharError, FicharResult};

    /// Quiet period treated as network idle
    const NETWORK_IDLE_THRESHOLD: Duration = Duration::from_millis(500);
    /// Bound on any single navigation wait
    const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

    fn launch_err(e: impl ToString) -> FicharError {
        FicharError::BrowserLaunch {
            message: e.to_string(),
        }
    }

    fn page_err(e: impl ToString) -> FicharError {
        FicharError::Page {
            message: e.to_string(),
        }
    }

    fn eval_err(e: impl ToString) -> FicharError {
        FicharError::Evaluation {
            message: e.to_string(),
        }
    }

    /// Browser instance with a live CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        #[allow(dead_code)]
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance
        pub async fn launch(config: BrowserConfig) -> FicharResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .arg(format!("--lang={}", config.locale));

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(launch_err)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(launch_err)?;

            // Drive the CDP event stream for the lifetime of the session
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Create a new page with the session overrides applied
        pub async fn new_page(&self) -> FicharResult<Page> {
            let cdp_page = {
                let browser = self.inner.lock().await;
                browser.new_page("about:blank").await.map_err(page_err)?
            };
            let page = Page {
                inner: Arc::new(Mutex::new(cdp_page)),
            };
            page.apply_overrides(&self.config).await?;
            Ok(page)
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> FicharResult<()> {
            let mut browser = self.inner.lock().await;
            browser.close().await.map_err(launch_err)?;
            Ok(())
        }
    }

    /// A live portal page
    #[derive(Debug, Clone)]
    pub struct Page {
        inner: Arc<Mutex<CdpPage>>,
    }

    impl Page {
        async fn apply_overrides(&self, config: &BrowserConfig) -> FicharResult<()> {
            let page = self.inner.lock().await;

            let user_agent = SetUserAgentOverrideParams::builder()
                .user_agent(&config.user_agent)
                .build()
                .map_err(page_err)?;
            page.execute(user_agent).await.map_err(page_err)?;

            let timezone = SetTimezoneOverrideParams::builder()
                .timezone_id(&config.timezone)
                .build()
                .map_err(page_err)?;
            page.execute(timezone).await.map_err(page_err)?;

            let metrics = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(config.viewport_width))
                .height(i64::from(config.viewport_height))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(page_err)?;
            page.execute(metrics).await.map_err(page_err)?;

            Ok(())
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> FicharResult<T> {
            let page = self.inner.lock().await;
            let result = page.evaluate(script).await.map_err(eval_err)?;
            result.into_value().map_err(eval_err)
        }
    }

    #[async_trait]
    impl PageDriver for Page {
        async fn goto(&self, url: &str) -> FicharResult<()> {
            let page = self.inner.lock().await;
            page.goto(url)
                .await
                .map_err(|e| FicharError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            match tokio::time::timeout(NAVIGATION_TIMEOUT, page.wait_for_navigation()).await {
                Ok(result) => {
                    result.map_err(|e| FicharError::Navigation {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
                    Ok(())
                }
                Err(_) => Err(FicharError::Timeout {
                    ms: NAVIGATION_TIMEOUT.as_millis() as u64,
                }),
            }
        }

        async fn url(&self) -> FicharResult<String> {
            let page = self.inner.lock().await;
            Ok(page.url().await.map_err(page_err)?.unwrap_or_default())
        }

        async fn title(&self) -> FicharResult<String> {
            let page = self.inner.lock().await;
            Ok(page.get_title().await.map_err(page_err)?.unwrap_or_default())
        }

        async fn is_visible(&self, locator: &Locator) -> FicharResult<bool> {
            self.eval(&locator.selector().to_visibility_script()).await
        }

        async fn click(&self, locator: &Locator) -> FicharResult<bool> {
            self.eval(&locator.selector().to_click_script()).await
        }

        async fn fill(&self, locator: &Locator, text: &str) -> FicharResult<bool> {
            self.eval(&locator.selector().to_fill_script(text)).await
        }

        async fn click_first_text_match(&self, css: &str, needles: &[&str]) -> FicharResult<bool> {
            self.eval(&scan_click_script(css, needles)).await
        }

        async fn body_text(&self) -> FicharResult<String> {
            self.eval("document.body ? document.body.innerText : ''")
                .await
        }

        async fn wait_for_navigation(&self) -> FicharResult<()> {
            let page = self.inner.lock().await;
            match tokio::time::timeout(NAVIGATION_TIMEOUT, page.wait_for_navigation()).await {
                Ok(result) => {
                    result.map_err(page_err)?;
                    Ok(())
                }
                Err(_) => Err(FicharError::Timeout {
                    ms: NAVIGATION_TIMEOUT.as_millis() as u64,
                }),
            }
        }

        async fn wait_for_idle(&self) -> FicharResult<()> {
            // The CDP session does not surface a network-idle event here, so a
            // short quiet period after the last navigation stands in for one.
            {
                let page = self.inner.lock().await;
                let _ = tokio::time::timeout(NETWORK_IDLE_THRESHOLD, page.wait_for_navigation())
                    .await;
            }
            tokio::time::sleep(NETWORK_IDLE_THRESHOLD).await;
            Ok(())
        }

        async fn screenshot(&self) -> FicharResult<Vec<u8>> {
            let page = self.inner.lock().await;
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let shot = page
                .execute(params)
                .await
                .map_err(|e| FicharError::Screenshot {
                    message: e.to_string(),
                })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(|e| FicharError::Screenshot {
                    message: e.to_string(),
                })
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, Page};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_matches_the_portal() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.viewport_width, 1366);
        assert_eq!(config.viewport_height, 900);
        assert_eq!(config.locale, "en-IN");
        assert_eq!(config.timezone, "Asia/Kolkata");
        assert!(config.user_agent.contains("Chrome"));
    }

    #[test]
    fn builder_methods_override_defaults() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_viewport(800, 600)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium");
        assert!(!config.headless);
        assert_eq!(config.viewport_width, 800);
        assert!(!config.sandbox);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }
}
