use page_tunnel_runner::prelude::{
    run, AgentContext, HookResult, PageTunnelScenarioCli, ReporterOpt, ScenarioDefinitionBuilder,
    UserValuesConstraint,
};
use std::sync::atomic::{AtomicUsize, Ordering};

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
fn behaviour_runs_exactly_the_configured_number_of_times() {
    static RUNS: AtomicUsize = AtomicUsize::new(0);

    fn agent_behaviour(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        RUNS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    let mut cfg = sample_cli_cfg();
    cfg.runs = Some(7);
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "behaviour_runs_exactly_the_configured_number_of_times",
        cfg,
    )
    .use_agent_behaviour(agent_behaviour);

    let result = run(scenario);

    assert!(result.is_ok());
    assert_eq!(RUNS.load(Ordering::SeqCst), 7);
}

#[test]
fn every_agent_performs_its_own_runs() {
    static RUNS: AtomicUsize = AtomicUsize::new(0);

    fn agent_behaviour(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        RUNS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    let mut cfg = sample_cli_cfg();
    cfg.runs = Some(2);
    cfg.agents = Some(3);
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "every_agent_performs_its_own_runs",
        cfg,
    )
    .use_agent_behaviour(agent_behaviour);

    let result = run(scenario);

    assert!(result.is_ok());
    assert_eq!(RUNS.load(Ordering::SeqCst), 6);
}

#[test]
fn sibling_agents_complete_when_one_fails() {
    static COMPLETED: AtomicUsize = AtomicUsize::new(0);

    fn agent_behaviour(ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>) -> HookResult {
        if ctx.agent_index() == 1 {
            return Err(anyhow::anyhow!("one agent broke"));
        }
        COMPLETED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    let mut cfg = sample_cli_cfg();
    cfg.agents = Some(3);
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "sibling_agents_complete_when_one_fails",
        cfg,
    )
    .use_agent_behaviour(agent_behaviour);

    let result = run(scenario);

    // The scenario fails, but the other agents were not cancelled.
    assert!(result.is_err());
    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "Run 1 failed for agent-1");
    assert_eq!(error.root_cause().to_string(), "one agent broke");
    assert_eq!(COMPLETED.load(Ordering::SeqCst), 2);
}

#[test]
fn zero_runs_is_rejected() {
    fn agent_behaviour(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        Ok(())
    }

    let mut cfg = sample_cli_cfg();
    cfg.runs = Some(0);
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "zero_runs_is_rejected",
        cfg,
    )
    .use_agent_behaviour(agent_behaviour);

    let result = run(scenario);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "At least one run is required");
}

#[test]
fn zero_based_run_labels_respect_the_configured_base() {
    fn agent_behaviour(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        Err(anyhow::anyhow!("always failing"))
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "zero_based_run_labels_respect_the_configured_base",
        sample_cli_cfg(),
    )
    .with_first_run_index(0)
    .use_agent_behaviour(agent_behaviour);

    let result = run(scenario);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "Run 0 failed for agent-0");
}
