use anyhow::bail;
use cdp_page_tunnel_runner::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(4);
const NETWORK_QUIET: Duration = Duration::from_millis(500);

fn setup(ctx: &mut RunnerContext<BrowserRunnerContext>) -> HookResult {
    connect_browser(ctx)
}

fn agent_behaviour(
    ctx: &mut AgentContext<BrowserRunnerContext, BrowserAgentContext>,
) -> HookResult {
    let url = ctx.runner_context().cli().target_url("/form/get.html");
    let agent_index = ctx.agent_index();

    with_session(ctx, |ctx| {
        let session = ctx.get().session()?;
        let html = ctx
            .runner_context()
            .executor()
            .execute_in_place(async move {
                session
                    .goto(
                        &url,
                        NavigationWait::NetworkIdle {
                            quiet: NETWORK_QUIET,
                        },
                        NAVIGATION_TIMEOUT,
                    )
                    .await?;
                Ok(session.content().await?)
            })?;

        if html.contains("favorite drink") {
            println!("Page {agent_index} loaded!");
            Ok(())
        } else {
            log::error!("{html}");
            bail!("invalid HTML content");
        }
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
    .with_default_agents(10)
    .with_default_runs(1)
    .use_setup(setup)
    .use_agent_behaviour(agent_behaviour)
    .use_teardown(teardown);

    run(builder)?;

    Ok(())
}
