use anyhow::Context;
use cdp_client_instrumented::prelude::Session;
use page_tunnel_runner::prelude::UserValuesConstraint;

/// Per-agent values: the session the agent currently has open, if any.
#[derive(Default, Debug)]
pub struct BrowserAgentContext {
    pub session: Option<Session>,
}

impl BrowserAgentContext {
    /// The agent's open session. Clones are cheap and refer to the same page.
    pub fn session(&self) -> anyhow::Result<Session> {
        self.session
            .clone()
            .context("No open session, call `open_session` first")
    }
}

impl UserValuesConstraint for BrowserAgentContext {}
