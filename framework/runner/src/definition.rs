use std::sync::Arc;

use crate::cli::PageTunnelScenarioCli;
use crate::context::{AgentContext, RunnerContext, UserValuesConstraint};

pub type HookResult = anyhow::Result<()>;

pub type GlobalHookMut<RV> = fn(&mut RunnerContext<RV>) -> HookResult;
pub type GlobalHook<RV> = fn(Arc<RunnerContext<RV>>) -> HookResult;
pub type AgentHookMut<RV, V> = fn(&mut AgentContext<RV, V>) -> HookResult;

/// The builder for a scenario definition.
///
/// This must be used at the start of a scenario to define what the runner should execute.
pub struct ScenarioDefinitionBuilder<RV: UserValuesConstraint, V: UserValuesConstraint> {
    name: String,
    cli: PageTunnelScenarioCli,
    default_runs: usize,
    default_agents: usize,
    first_run_index: usize,
    setup_fn: Option<GlobalHookMut<RV>>,
    setup_agent_fn: Option<AgentHookMut<RV, V>>,
    agent_behaviour_fn: Option<AgentHookMut<RV, V>>,
    teardown_agent_fn: Option<AgentHookMut<RV, V>>,
    teardown_fn: Option<GlobalHook<RV>>,
}

pub(crate) struct ScenarioDefinition<RV: UserValuesConstraint, V: UserValuesConstraint> {
    pub name: String,
    pub cli: PageTunnelScenarioCli,
    pub runs_per_agent: usize,
    pub agents: usize,
    pub first_run_index: usize,
    pub setup_fn: Option<GlobalHookMut<RV>>,
    pub setup_agent_fn: Option<AgentHookMut<RV, V>>,
    pub agent_behaviour_fn: Option<AgentHookMut<RV, V>>,
    pub teardown_agent_fn: Option<AgentHookMut<RV, V>>,
    pub teardown_fn: Option<GlobalHook<RV>>,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> ScenarioDefinitionBuilder<RV, V> {
    /// Initialise a new scenario definition from the scenario name and parsed command line
    /// arguments.
    ///
    /// Recommended name value is `env!("CARGO_PKG_NAME")`.
    pub fn new(name: &str, cli: PageTunnelScenarioCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            default_runs: 100,
            default_agents: 1,
            first_run_index: 1,
            setup_fn: None,
            setup_agent_fn: None,
            agent_behaviour_fn: None,
            teardown_agent_fn: None,
            teardown_fn: None,
        }
    }

    /// The number of runs each agent performs when `--runs` is not given. Defaults to 100.
    pub fn with_default_runs(mut self, runs: usize) -> Self {
        self.default_runs = runs;
        self
    }

    /// The number of agents to start when `--agents` is not given. Defaults to 1.
    pub fn with_default_agents(mut self, agents: usize) -> Self {
        self.default_agents = agents;
        self
    }

    /// The run number reported for the first run in logs and error messages. Defaults to 1.
    pub fn with_first_run_index(mut self, first_run_index: usize) -> Self {
        self.first_run_index = first_run_index;
        self
    }

    /// Set the global setup hook for this scenario. It runs once, before any agents are started.
    pub fn use_setup(mut self, setup_fn: GlobalHookMut<RV>) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// Set the setup hook that runs once for each agent as it starts.
    pub fn use_agent_setup(mut self, setup_agent_fn: AgentHookMut<RV, V>) -> Self {
        self.setup_agent_fn = Some(setup_agent_fn);
        self
    }

    /// Set the behaviour that each agent repeats for every run.
    pub fn use_agent_behaviour(mut self, behaviour: AgentHookMut<RV, V>) -> Self {
        self.agent_behaviour_fn = Some(behaviour);
        self
    }

    /// Set the teardown hook that runs once for each agent after its last run. It runs even when
    /// the agent's behaviour failed, so resources can always be released.
    pub fn use_agent_teardown(mut self, teardown_agent_fn: AgentHookMut<RV, V>) -> Self {
        self.teardown_agent_fn = Some(teardown_agent_fn);
        self
    }

    /// Set the global teardown hook. Best effort: a teardown failure is logged, not propagated.
    pub fn use_teardown(mut self, teardown_fn: GlobalHook<RV>) -> Self {
        self.teardown_fn = Some(teardown_fn);
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<ScenarioDefinition<RV, V>> {
        let runs_per_agent = self.cli.runs.unwrap_or(self.default_runs);
        let agents = self.cli.agents.unwrap_or(self.default_agents);

        if runs_per_agent == 0 {
            anyhow::bail!("At least one run is required");
        }
        if agents == 0 {
            anyhow::bail!("At least one agent is required");
        }

        Ok(ScenarioDefinition {
            name: self.name,
            cli: self.cli,
            runs_per_agent,
            agents,
            first_run_index: self.first_run_index,
            setup_fn: self.setup_fn,
            setup_agent_fn: self.setup_agent_fn,
            agent_behaviour_fn: self.agent_behaviour_fn,
            teardown_agent_fn: self.teardown_agent_fn,
            teardown_fn: self.teardown_fn,
        })
    }
}
