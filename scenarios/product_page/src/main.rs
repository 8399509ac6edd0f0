use cdp_page_tunnel_runner::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const READY_TIMEOUT: Duration = Duration::from_millis(100);

fn setup(ctx: &mut RunnerContext<BrowserRunnerContext>) -> HookResult {
    connect_browser(ctx)
}

fn agent_behaviour(
    ctx: &mut AgentContext<BrowserRunnerContext, BrowserAgentContext>,
) -> HookResult {
    let url = ctx.runner_context().cli().target_url("/campfire-commerce/");

    with_session(ctx, |ctx| {
        let session = ctx.get().session()?;
        let record = ctx
            .runner_context()
            .executor()
            .execute_in_place(async move {
                session
                    .goto(&url, NavigationWait::Load, PAGE_LOAD_TIMEOUT)
                    .await?;

                // The price and the reviews arrive over XHR after the document itself.
                session.wait_for_text("#product-price", READY_TIMEOUT).await?;
                session
                    .wait_for_min_count("#product-reviews > div", 1, READY_TIMEOUT)
                    .await?;

                Ok(extract_product(&session).await?)
            })?;

        validate_product(&record, &campfire_expectations())?;
        Ok(())
    })
}

fn teardown(ctx: Arc<RunnerContext<BrowserRunnerContext>>) -> HookResult {
    disconnect_browser(ctx)
}

fn main() -> PageTunnelResult<()> {
    let cli = init();
    let builder = ScenarioDefinitionBuilder::<BrowserRunnerContext, BrowserAgentContext>::new(
        env!("CARGO_PKG_NAME"),
        cli,
    )
    .with_default_runs(100)
    .use_setup(setup)
    .use_agent_behaviour(agent_behaviour)
    .use_teardown(teardown);

    run(builder)?;

    Ok(())
}
