use crate::context::BrowserAgentContext;
use crate::runner_context::BrowserRunnerContext;
use anyhow::Context;
use cdp_client_instrumented::prelude::{BrowserHandle, Endpoint};
use page_tunnel_runner::prelude::{AgentContext, HookResult, RunnerContext};
use std::sync::Arc;

/// Connects to the browser named by the scenario's CLI options and stores the connection in
/// [BrowserRunnerContext].
///
/// After calling this function in your setup, every agent can reach the shared connection
/// through the runner context:
/// ```rust
/// use cdp_page_tunnel_runner::prelude::*;
///
/// fn setup(ctx: &mut RunnerContext<BrowserRunnerContext>) -> HookResult {
///     connect_browser(ctx)
/// }
///
/// fn agent_setup(ctx: &mut AgentContext<BrowserRunnerContext, BrowserAgentContext>) -> HookResult {
///     let browser = ctx.runner_context().get().browser()?;
///     Ok(())
/// }
/// ```
///
/// Method:
/// - Resolves the configured descriptor to a browser executable path, a CDP WebSocket URL,
///   or an HTTP debugging address.
/// - Opens the connection, launching a local browser when the descriptor is a path.
/// - Stores the connection in [BrowserRunnerContext].
pub fn connect_browser(ctx: &mut RunnerContext<BrowserRunnerContext>) -> HookResult {
    let descriptor = ctx.cli().browser_descriptor();
    let headless = ctx.cli().headless;
    let reporter = ctx.reporter().clone();

    let endpoint = Endpoint::resolve(&descriptor);
    log::debug!("Connecting to browser: {descriptor}");

    let browser = ctx
        .executor()
        .execute_in_place(async move {
            Ok(BrowserHandle::connect(endpoint, headless, reporter).await?)
        })
        .context("Unable to connect to the browser, is one listening on the configured address?")?;

    ctx.get_mut().browser = Some(browser);

    Ok(())
}

/// Closes the shared browser connection.
///
/// A browser launched by [connect_browser] is stopped; a browser that was attached to is
/// left running and only the connection goes away. Does nothing when the setup never
/// connected, so it can always be registered as the scenario teardown.
pub fn disconnect_browser(ctx: Arc<RunnerContext<BrowserRunnerContext>>) -> HookResult {
    match ctx.get().browser.clone() {
        Some(browser) => {
            ctx.executor()
                .execute_in_place(async move { Ok(browser.close().await?) })
                .context("Failed to close the browser connection")?;
        }
        None => log::debug!("No browser connection to close"),
    }

    Ok(())
}

/// Opens a fresh isolated session for this agent and stores it in [BrowserAgentContext].
///
/// Requires:
/// - The [BrowserRunnerContext] to have a browser connection. Consider calling
///   [connect_browser] in your scenario setup.
///
/// Method:
/// - Creates a new browsing context on the shared browser, with its own cookies and cache.
/// - Opens a blank page inside that context.
/// - Stores the session in [BrowserAgentContext].
pub fn open_session(
    ctx: &mut AgentContext<BrowserRunnerContext, BrowserAgentContext>,
) -> HookResult {
    let browser = ctx.runner_context().get().browser()?;

    let session = ctx
        .runner_context()
        .executor()
        .execute_in_place(async move { Ok(browser.new_session().await?) })
        .context("Unable to open a new session")?;
    log::debug!("Agent {} opened {:?}", ctx.agent_id(), session);

    ctx.get_mut().session = Some(session);

    Ok(())
}

/// Closes the agent's open session, if it has one.
///
/// Closing destroys the page and its browsing context on the browser side. Nothing happens
/// when no session is open, so this is also safe as an agent teardown to mop up after a
/// failed behaviour.
pub fn close_session(
    ctx: &mut AgentContext<BrowserRunnerContext, BrowserAgentContext>,
) -> HookResult {
    match ctx.get_mut().session.take() {
        Some(session) => ctx
            .runner_context()
            .executor()
            .execute_in_place(async move { Ok(session.close().await?) })
            .context("Failed to close the session"),
        None => {
            log::debug!("No open session to close");
            Ok(())
        }
    }
}

/// Runs `drive` with a fresh session and always closes the session afterwards.
///
/// The session is opened on the shared browser and stored in the agent context for `drive`
/// to pick up, then closed once `drive` returns, whether it succeeded or not. When both the
/// drive and the close fail, the drive error wins and the close error is logged.
///
/// Call this function as follows:
/// ```rust
/// use cdp_page_tunnel_runner::prelude::*;
/// use std::time::Duration;
///
/// fn agent_behaviour(ctx: &mut AgentContext<BrowserRunnerContext, BrowserAgentContext>) -> HookResult {
///     let url = ctx.runner_context().cli().target_url("/campfire-commerce/");
///     with_session(ctx, |ctx| {
///         let session = ctx.get().session()?;
///         ctx.runner_context().executor().execute_in_place(async move {
///             session
///                 .goto(&url, NavigationWait::Load, Duration::from_secs(10))
///                 .await?;
///             Ok(())
///         })
///     })
/// }
/// ```
pub fn with_session(
    ctx: &mut AgentContext<BrowserRunnerContext, BrowserAgentContext>,
    drive: impl FnOnce(&mut AgentContext<BrowserRunnerContext, BrowserAgentContext>) -> HookResult,
) -> HookResult {
    open_session(ctx)?;
    let outcome = drive(ctx);
    let closed = close_session(ctx);
    match outcome {
        Ok(()) => closed,
        Err(e) => {
            if let Err(close_err) = closed {
                log::debug!("Session close failed after a run error: {close_err:#}");
            }
            Err(e)
        }
    }
}
