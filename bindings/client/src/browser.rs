use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::handler::Handler;
use futures::StreamExt;
use page_tunnel_instruments::prelude::Reporter;
use page_tunnel_instruments_derive::page_tunnel_instrument;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Where a browser endpoint descriptor points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A local browser binary to launch.
    Executable(PathBuf),
    /// A CDP WebSocket to attach to directly.
    WebSocket(String),
    /// A DevTools HTTP endpoint; the WebSocket URL is discovered via `/json/version`.
    Http(String),
}

impl Endpoint {
    /// Classifies an endpoint descriptor.
    ///
    /// An existing filesystem path wins, then an explicit `ws://`/`wss://` URL; anything else
    /// is treated as an HTTP debugging endpoint, with `http://` prepended when the scheme is
    /// missing.
    pub fn resolve(descriptor: &str) -> Self {
        let path = Path::new(descriptor);
        if path.exists() {
            return Self::Executable(path.to_path_buf());
        }
        if descriptor.starts_with("ws://") || descriptor.starts_with("wss://") {
            return Self::WebSocket(descriptor.to_string());
        }
        if descriptor.starts_with("http://") || descriptor.starts_with("https://") {
            return Self::Http(descriptor.to_string());
        }
        Self::Http(format!("http://{descriptor}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provenance {
    /// We started the browser process and are responsible for stopping it.
    Launched,
    /// We attached to a browser someone else runs; closing only detaches.
    Connected,
}

/// One shared connection to a browser.
///
/// Created once per scenario and shared read-only by every agent; each run opens its own
/// [`Session`] through it. Clones share the same underlying connection.
#[derive(Clone)]
pub struct BrowserHandle {
    browser: Arc<Mutex<Browser>>,
    provenance: Provenance,
    reporter: Arc<Reporter>,
}

impl BrowserHandle {
    /// Opens the browser connection an endpoint describes.
    ///
    /// `headless` only applies when launching a local executable; an attached browser keeps
    /// whatever mode it was started in. Connection failure is fatal, there is no retry.
    #[page_tunnel_instrument(prefix = "browser_")]
    pub async fn connect(
        endpoint: Endpoint,
        headless: bool,
        reporter: Arc<Reporter>,
    ) -> ClientResult<Self> {
        Self::connect_inner(endpoint, headless, reporter).await
    }

    async fn connect_inner(
        endpoint: Endpoint,
        headless: bool,
        reporter: Arc<Reporter>,
    ) -> ClientResult<Self> {
        let (browser, provenance) = match endpoint {
            Endpoint::Executable(path) => {
                let mut config = BrowserConfig::builder().chrome_executable(path);
                if !headless {
                    config = config.with_head();
                }
                let config = config.build().map_err(ClientError::Connection)?;
                let (browser, handler) = Browser::launch(config)
                    .await
                    .map_err(|e| ClientError::Connection(format!("launch: {e}")))?;
                spawn_event_loop(handler);
                (browser, Provenance::Launched)
            }
            Endpoint::WebSocket(url) => {
                let (browser, handler) = Browser::connect(&url)
                    .await
                    .map_err(|e| ClientError::Connection(format!("connect to {url}: {e}")))?;
                spawn_event_loop(handler);
                (browser, Provenance::Connected)
            }
            Endpoint::Http(url) => {
                let ws_url = discover_websocket_url(&url).await?;
                log::debug!("discovered WebSocket endpoint {ws_url} via {url}");
                let (browser, handler) = Browser::connect(&ws_url)
                    .await
                    .map_err(|e| ClientError::Connection(format!("connect to {ws_url}: {e}")))?;
                spawn_event_loop(handler);
                (browser, Provenance::Connected)
            }
        };

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            provenance,
            reporter,
        })
    }

    /// Opens an isolated session: a fresh browsing context holding exactly one page.
    #[page_tunnel_instrument(prefix = "browser_")]
    pub async fn new_session(&self) -> ClientResult<Session> {
        self.new_session_inner().await
    }

    async fn new_session_inner(&self) -> ClientResult<Session> {
        let browser = self.browser.lock().await;
        let context = browser
            .execute(CreateBrowserContextParams::default())
            .await?;
        let context_id = context.browser_context_id.clone();

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(ClientError::Connection)?;
        match browser.new_page(params).await {
            Ok(page) => Ok(Session::new(
                page,
                context_id,
                self.browser.clone(),
                self.reporter.clone(),
            )),
            Err(e) => {
                // Don't leak the context when the page cannot be created.
                let _ = browser
                    .execute(DisposeBrowserContextParams::new(context_id))
                    .await;
                Err(e.into())
            }
        }
    }

    /// Closes the connection.
    ///
    /// A launched browser is stopped and reaped; an attached one is left running and only
    /// this connection goes away.
    #[page_tunnel_instrument(prefix = "browser_")]
    pub async fn close(&self) -> ClientResult<()> {
        self.close_inner().await
    }

    async fn close_inner(&self) -> ClientResult<()> {
        match self.provenance {
            Provenance::Launched => {
                let mut browser = self.browser.lock().await;
                browser.close().await?;
                if let Err(e) = browser.wait().await {
                    log::debug!("browser process did not exit cleanly: {e}");
                }
            }
            Provenance::Connected => {
                // Dropping the handle closes the WebSocket; the remote browser keeps running.
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for BrowserHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserHandle")
            .field("provenance", &self.provenance)
            .finish()
    }
}

/// The handler stream must be polled for the life of the connection or no CDP message makes
/// progress.
fn spawn_event_loop(mut handler: Handler) {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                log::debug!("browser event loop: {e}");
            }
        }
    });
}

/// Subset of the DevTools `/json/version` payload.
#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
}

/// Asks a DevTools HTTP endpoint for its WebSocket debugger URL.
async fn discover_websocket_url(http_endpoint: &str) -> ClientResult<String> {
    let version_url = format!("{}/json/version", http_endpoint.trim_end_matches('/'));
    let response = reqwest::get(&version_url)
        .await
        .map_err(|e| ClientError::Connection(format!("GET {version_url}: {e}")))?;
    let info: VersionInfo = response.json().await.map_err(|e| {
        ClientError::Connection(format!("invalid version payload from {version_url}: {e}"))
    })?;
    Ok(info.web_socket_debugger_url)
}
