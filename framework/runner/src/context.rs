use std::{fmt::Debug, sync::Arc};

use page_tunnel_instruments::prelude::Reporter;

use crate::cli::PageTunnelScenarioCli;
use crate::executor::Executor;
use crate::shutdown::DelegatedShutdownListener;

/// Implemented by the user-defined values attached to the runner and agent contexts.
pub trait UserValuesConstraint: Default + Debug + Send + Sync + 'static {}

/// Stateless scenarios can attach nothing.
impl UserValuesConstraint for () {}

/// Shared, read-only from the agents' point of view, state for the whole scenario.
#[derive(Debug)]
pub struct RunnerContext<RV: UserValuesConstraint> {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    cli: PageTunnelScenarioCli,
    value: RV,
}

impl<RV: UserValuesConstraint> RunnerContext<RV> {
    pub(crate) fn new(
        executor: Executor,
        reporter: Arc<Reporter>,
        cli: PageTunnelScenarioCli,
    ) -> Self {
        Self {
            executor: Arc::new(executor),
            reporter,
            cli,
            value: Default::default(),
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    pub fn cli(&self) -> &PageTunnelScenarioCli {
        &self.cli
    }

    pub fn get_mut(&mut self) -> &mut RV {
        &mut self.value
    }

    pub fn get(&self) -> &RV {
        &self.value
    }
}

/// Per-agent state, owned by the agent's thread for the lifetime of the scenario.
pub struct AgentContext<RV: UserValuesConstraint, V: UserValuesConstraint> {
    agent_id: String,
    agent_index: usize,
    runner_context: Arc<RunnerContext<RV>>,
    shutdown_listener: DelegatedShutdownListener,
    value: V,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> AgentContext<RV, V> {
    pub(crate) fn new(
        agent_id: String,
        agent_index: usize,
        runner_context: Arc<RunnerContext<RV>>,
        shutdown_listener: DelegatedShutdownListener,
    ) -> Self {
        Self {
            agent_id,
            agent_index,
            runner_context,
            shutdown_listener,
            value: Default::default(),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// The zero-based index of this agent within the scenario.
    pub fn agent_index(&self) -> usize {
        self.agent_index
    }

    pub fn runner_context(&self) -> &Arc<RunnerContext<RV>> {
        &self.runner_context
    }

    pub fn shutdown_listener(&mut self) -> &mut DelegatedShutdownListener {
        &mut self.shutdown_listener
    }

    pub fn get_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn get(&self) -> &V {
        &self.value
    }
}
