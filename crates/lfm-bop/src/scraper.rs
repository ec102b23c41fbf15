use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::types::CarClass;

/// Wait after initial navigation; the BoP tables render client-side well
/// after the network goes idle.
const PAGE_SETTLE: Duration = Duration::from_secs(10);
/// Wait after switching tabs before capturing the DOM.
const TAB_SETTLE: Duration = Duration::from_secs(5);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Browser configuration error: {0}")]
    Config(String),
    #[error("Browser error: {0}")]
    Cdp(#[from] CdpError),
    #[error("Failed to decode page result: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Headless-browser fetch layer for the BoP page. The page is a
/// client-rendered tab widget, so captures go through a real browser
/// rather than a plain HTTP client.
pub struct WebScraper {
    browser: Browser,
    handler: JoinHandle<()>,
    bop_url: String,
}

impl WebScraper {
    pub async fn launch() -> Result<Self, ScraperError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1280, 720)
            .args(vec![
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--no-first-run",
            ])
            .build()
            .map_err(ScraperError::Config)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            bop_url: crate::BOP_URL.to_string(),
        })
    }

    /// Captures the rendered page body once per car class, in class
    /// order. GT3 is the default tab; GT4 needs a tab switch and its own
    /// settle delay before the tables exist in the DOM.
    pub async fn fetch_bop_pages(&self) -> Result<Vec<(CarClass, String)>, ScraperError> {
        let page = self.browser.new_page("about:blank").await?;
        page.set_user_agent(USER_AGENT).await?;
        page.goto(self.bop_url.as_str()).await?;
        page.wait_for_navigation().await?;
        tokio::time::sleep(PAGE_SETTLE).await;

        let mut captures = Vec::with_capacity(CarClass::ALL.len());
        for class in CarClass::ALL {
            if let Some(label) = class.tab_label() {
                switch_tab(&page, label).await?;
            }
            let html = page
                .evaluate("document.body.innerHTML")
                .await?
                .into_value::<String>()?;
            captures.push((class, html));
        }

        page.close().await?;
        Ok(captures)
    }

    pub async fn close(mut self) -> Result<(), ScraperError> {
        self.browser.close().await?;
        let _ = self.handler.await;
        Ok(())
    }
}

/// Clicks the tab whose label contains `label`, matching the page's tab
/// widgets by ARIA role. A missing tab is logged, not fatal: the capture
/// then simply re-reads the current tab.
async fn switch_tab(page: &Page, label: &str) -> Result<(), ScraperError> {
    let script = format!(
        r#"(() => {{
            const needle = '{}';
            for (const tab of document.querySelectorAll('[role="tab"]')) {{
                if (tab.textContent && tab.textContent.toLowerCase().includes(needle)) {{
                    tab.click();
                    return true;
                }}
            }}
            return false;
        }})()"#,
        label.to_lowercase()
    );

    let clicked = page.evaluate(script).await?.into_value::<bool>()?;
    if !clicked {
        log::warn!("No tab matching '{label}' found on page");
    }
    tokio::time::sleep(TAB_SETTLE).await;
    Ok(())
}
