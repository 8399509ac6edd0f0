use page_tunnel_runner::prelude::{
    run, AgentContext, HookResult, PageTunnelScenarioCli, ReporterOpt, RunnerContext,
    ScenarioDefinitionBuilder, UserValuesConstraint,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default, Debug)]
struct RunnerContextValue {}

impl UserValuesConstraint for RunnerContextValue {}

#[derive(Default, Debug)]
struct AgentContextValue {}

impl UserValuesConstraint for AgentContextValue {}

fn sample_cli_cfg() -> PageTunnelScenarioCli {
    PageTunnelScenarioCli {
        browser_address: "ws://127.0.0.1:9222".to_string(),
        base_url: "http://127.0.0.1:1234".to_string(),
        url: None,
        runs: Some(1),
        agents: None,
        headless: false,
        browser_path: None,
        no_progress: true,
        reporter: ReporterOpt::Noop,
        run_id: None,
    }
}

#[test]
fn propagate_error_in_setup_hook() {
    fn setup(_tx: &mut RunnerContext<RunnerContextValue>) -> HookResult {
        Err(anyhow::anyhow!("Error in setup hook"))
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "propagate_error_in_setup_hook",
        sample_cli_cfg(),
    )
    .use_setup(setup);

    let result = run(scenario);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "Error in setup hook");
}

#[test]
fn propagate_error_in_agent_setup() {
    fn agent_setup(_ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>) -> HookResult {
        Err(anyhow::anyhow!("Error in agent setup hook"))
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "propagate_error_in_agent_setup",
        sample_cli_cfg(),
    )
    .use_agent_setup(agent_setup);

    let result = run(scenario);

    assert!(result.is_err());
    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "Setup failed for agent-0");
    assert_eq!(error.root_cause().to_string(), "Error in agent setup hook");
}

#[test]
fn behaviour_error_aborts_the_scenario() {
    fn agent_behaviour(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        Err(anyhow::anyhow!("Error in agent behaviour hook"))
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "behaviour_error_aborts_the_scenario",
        sample_cli_cfg(),
    )
    .use_agent_behaviour(agent_behaviour);

    let result = run(scenario);

    assert!(result.is_err());
    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "Run 1 failed for agent-0");
    assert_eq!(
        error.root_cause().to_string(),
        "Error in agent behaviour hook"
    );
}

#[test]
fn agent_teardown_runs_after_a_behaviour_failure() {
    static TEARDOWN_RAN: AtomicBool = AtomicBool::new(false);

    fn agent_behaviour(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        Err(anyhow::anyhow!("Error in agent behaviour hook"))
    }

    fn agent_teardown(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        TEARDOWN_RAN.store(true, Ordering::SeqCst);
        Ok(())
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "agent_teardown_runs_after_a_behaviour_failure",
        sample_cli_cfg(),
    )
    .use_agent_behaviour(agent_behaviour)
    .use_agent_teardown(agent_teardown);

    let result = run(scenario);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "Run 1 failed for agent-0");
    assert!(TEARDOWN_RAN.load(Ordering::SeqCst));
}

#[test]
fn propagate_error_in_agent_teardown() {
    fn agent_teardown(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        Err(anyhow::anyhow!("Error in agent teardown hook"))
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "propagate_error_in_agent_teardown",
        sample_cli_cfg(),
    )
    .use_agent_teardown(agent_teardown);

    let result = run(scenario);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "Teardown failed for agent-0");
}

#[test]
fn capture_error_in_teardown() {
    fn teardown(_ctx: Arc<RunnerContext<RunnerContextValue>>) -> HookResult {
        Err(anyhow::anyhow!("Error in teardown hook"))
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "capture_error_in_teardown",
        sample_cli_cfg(),
    )
    .use_teardown(teardown);

    let result = run(scenario);

    assert!(result.is_ok());
}
