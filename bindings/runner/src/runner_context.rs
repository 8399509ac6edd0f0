use anyhow::Context;
use cdp_client_instrumented::prelude::BrowserHandle;
use page_tunnel_runner::prelude::UserValuesConstraint;

/// Scenario-wide values: the browser connection that every agent shares.
#[derive(Default, Debug)]
pub struct BrowserRunnerContext {
    pub browser: Option<BrowserHandle>,
}

impl BrowserRunnerContext {
    /// The shared browser connection. Clones are cheap and refer to the same connection.
    pub fn browser(&self) -> anyhow::Result<BrowserHandle> {
        self.browser
            .clone()
            .context("No browser connection, call `connect_browser` in your scenario setup")
    }
}

impl UserValuesConstraint for BrowserRunnerContext {}
