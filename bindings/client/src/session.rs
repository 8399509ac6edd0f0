use crate::error::{ClientError, ClientResult};
use crate::intercept::{self, RequestInterceptor};
use crate::wait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::network;
use chromiumoxide::cdp::browser_protocol::target::DisposeBrowserContextParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use page_tunnel_instruments::prelude::Reporter;
use page_tunnel_instruments_derive::page_tunnel_instrument;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// The completion signal for a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationWait {
    /// Resolve when the load event has fired.
    Load,
    /// Resolve once no network request has been in flight for `quiet`.
    NetworkIdle { quiet: Duration },
}

/// One isolated browsing context with exactly one page in it.
///
/// A session belongs to a single run. Closing it closes the page and disposes the context;
/// callers do that even when the run body failed, before the error propagates. Clones refer
/// to the same page, so closing any clone closes them all.
#[derive(Clone)]
pub struct Session {
    page: Page,
    context_id: BrowserContextId,
    browser: Arc<Mutex<Browser>>,
    reporter: Arc<Reporter>,
}

impl Session {
    pub(crate) fn new(
        page: Page,
        context_id: BrowserContextId,
        browser: Arc<Mutex<Browser>>,
        reporter: Arc<Reporter>,
    ) -> Self {
        Self {
            page,
            context_id,
            browser,
            reporter,
        }
    }

    /// Navigates the page and waits for the configured completion signal, bounded by
    /// `timeout`.
    #[page_tunnel_instrument(prefix = "session_")]
    pub async fn goto(
        &self,
        url: &str,
        wait: NavigationWait,
        timeout: Duration,
    ) -> ClientResult<()> {
        self.goto_inner(url, wait, timeout).await
    }

    async fn goto_inner(
        &self,
        url: &str,
        wait: NavigationWait,
        timeout: Duration,
    ) -> ClientResult<()> {
        let navigation = async {
            match wait {
                NavigationWait::Load => {
                    self.page.goto(url).await?;
                    self.page.wait_for_navigation().await?;
                    Ok(())
                }
                NavigationWait::NetworkIdle { quiet } => {
                    self.goto_until_network_idle(url, quiet).await
                }
            }
        };
        match tokio::time::timeout(timeout, navigation).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            }),
        }
    }

    /// Navigates, then resolves once no request has been in flight for the quiet window.
    ///
    /// The document request itself counts, so a page that loads nothing else resolves one
    /// quiet window after its own load finishes. A page that never goes quiet is cut off by
    /// the caller's navigation timeout.
    async fn goto_until_network_idle(&self, url: &str, quiet: Duration) -> ClientResult<()> {
        self.page
            .execute(network::EnableParams::default())
            .await?;
        let mut started = self
            .page
            .event_listener::<network::EventRequestWillBeSent>()
            .await?;
        let mut finished = self
            .page
            .event_listener::<network::EventLoadingFinished>()
            .await?;
        let mut failed = self
            .page
            .event_listener::<network::EventLoadingFailed>()
            .await?;

        self.page.goto(url).await?;

        let mut inflight: usize = 0;
        loop {
            let idle = tokio::time::sleep(quiet);
            tokio::select! {
                Some(_) = started.next() => inflight += 1,
                Some(_) = finished.next() => inflight = inflight.saturating_sub(1),
                Some(_) = failed.next() => inflight = inflight.saturating_sub(1),
                () = idle, if inflight == 0 => return Ok(()),
                else => return Ok(()),
            }
        }
    }

    /// Waits for `selector` to have non-empty text content.
    #[page_tunnel_instrument(prefix = "session_")]
    pub async fn wait_for_text(&self, selector: &str, timeout: Duration) -> ClientResult<()> {
        self.wait_for_text_inner(selector, timeout).await
    }

    async fn wait_for_text_inner(&self, selector: &str, timeout: Duration) -> ClientResult<()> {
        let js = format!(
            "(() => {{ const el = document.querySelector('{selector}'); return el != null && el.textContent.length > 0; }})()"
        );
        let condition = format!("text in '{selector}'");
        let page = &self.page;
        let js = js.as_str();
        wait::wait_for(&condition, timeout, || async move {
            probe_bool(page, js).await
        })
        .await
    }

    /// Waits for `selector` to match at least `min_count` elements.
    #[page_tunnel_instrument(prefix = "session_")]
    pub async fn wait_for_min_count(
        &self,
        selector: &str,
        min_count: usize,
        timeout: Duration,
    ) -> ClientResult<()> {
        self.wait_for_min_count_inner(selector, min_count, timeout)
            .await
    }

    async fn wait_for_min_count_inner(
        &self,
        selector: &str,
        min_count: usize,
        timeout: Duration,
    ) -> ClientResult<()> {
        let js = format!("document.querySelectorAll('{selector}').length >= {min_count}");
        let condition = format!("at least {min_count} of '{selector}'");
        let page = &self.page;
        let js = js.as_str();
        wait::wait_for(&condition, timeout, || async move {
            probe_bool(page, js).await
        })
        .await
    }

    /// Runs one extraction expression in the page and deserializes its result.
    ///
    /// `field` names what is being extracted and ends up in the error when the expression
    /// fails or the result does not fit `T`.
    #[page_tunnel_instrument(prefix = "session_")]
    pub async fn evaluate<T: DeserializeOwned>(&self, field: &str, js: &str) -> ClientResult<T> {
        self.evaluate_inner(field, js).await
    }

    async fn evaluate_inner<T: DeserializeOwned>(&self, field: &str, js: &str) -> ClientResult<T> {
        let evaluation = self
            .page
            .evaluate(js)
            .await
            .map_err(|e| ClientError::Extraction {
                field: field.to_string(),
                reason: e.to_string(),
            })?;
        evaluation.into_value().map_err(|e| ClientError::Extraction {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }

    /// The page's current HTML content.
    #[page_tunnel_instrument(prefix = "session_")]
    pub async fn content(&self) -> ClientResult<String> {
        self.page.content().await.map_err(ClientError::from)
    }

    /// Installs `interceptor` over this session's requests.
    ///
    /// Every request the page makes from now on is paused, passed to the hook, and resolved
    /// according to its decision.
    #[page_tunnel_instrument(prefix = "session_")]
    pub async fn intercept_requests(&self, interceptor: RequestInterceptor) -> ClientResult<()> {
        intercept::install(&self.page, interceptor).await
    }

    /// Closes the page then disposes the browsing context.
    #[page_tunnel_instrument(prefix = "session_")]
    pub async fn close(self) -> ClientResult<()> {
        self.close_inner().await
    }

    async fn close_inner(self) -> ClientResult<()> {
        let Session {
            page,
            context_id,
            browser,
            ..
        } = self;
        page.close().await?;
        let browser = browser.lock().await;
        browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("context_id", &self.context_id)
            .finish()
    }
}

/// One readiness probe. Evaluation failures propagate; a non-boolean result counts as not
/// ready yet.
async fn probe_bool(page: &Page, js: &str) -> ClientResult<bool> {
    Ok(page
        .evaluate(js)
        .await?
        .into_value::<bool>()
        .unwrap_or(false))
}
