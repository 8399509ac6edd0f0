use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use page_tunnel_instruments::prelude::{ReportConfig, RunMetrics};

use crate::cli::ReporterOpt;
use crate::monitor::start_monitor;
use crate::progress::ProgressMarks;
use crate::{
    context::{AgentContext, RunnerContext, UserValuesConstraint},
    definition::ScenarioDefinitionBuilder,
    executor::Executor,
    shutdown::{start_shutdown_listener, ShutdownSignalError},
};

/// Execute a scenario to completion.
///
/// Each agent runs its behaviour for the configured number of runs, timing every run. The first
/// failure aborts the scenario: remaining runs are skipped and no statistics are printed, but
/// agents that are already working run to completion and the teardown hooks still fire so that
/// sessions and the browser connection are released.
pub fn run<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: ScenarioDefinitionBuilder<RV, V>,
) -> anyhow::Result<()> {
    let definition = definition.build()?;

    let run_id = definition
        .cli
        .run_id
        .clone()
        .unwrap_or_else(|| nanoid::nanoid!());
    log::info!(
        "Running scenario {} (run id {run_id}), started at {}",
        definition.name,
        chrono::Utc::now().to_rfc3339()
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime);
    let executor = Executor::new(runtime, shutdown_handle.clone());

    let reporter = Arc::new(
        match definition.cli.reporter {
            ReporterOpt::Summary => ReportConfig::new().enable_summary(),
            ReporterOpt::Noop => ReportConfig::new(),
        }
        .init_reporter(),
    );

    let mut runner_context = RunnerContext::new(executor, reporter, definition.cli.clone());

    if let Some(setup_fn) = definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    let runner_context = Arc::new(runner_context);
    let runner_context_for_teardown = runner_context.clone();

    // Agents are about to start, watch for resource pressure that could skew the timings.
    start_monitor(shutdown_handle.new_listener());

    let agents = definition.agents;
    let runs_per_agent = definition.runs_per_agent;
    let run_metrics = Arc::new(RunMetrics::with_slots(agents * runs_per_agent));
    let progress = (!definition.cli.no_progress)
        .then(|| Arc::new(parking_lot::Mutex::new(ProgressMarks::stderr())));

    let mut handles = Vec::new();
    for agent_index in 0..agents {
        let runner_context = runner_context.clone();
        let run_metrics = run_metrics.clone();
        let progress = progress.clone();

        let setup_agent_fn = definition.setup_agent_fn;
        let agent_behaviour_fn = definition.agent_behaviour_fn;
        let teardown_agent_fn = definition.teardown_agent_fn;
        let first_run_index = definition.first_run_index;

        // For the runner to check if the agent should stop between runs
        let mut cycle_shutdown_receiver = shutdown_handle.new_listener();
        // For the behaviour implementation to listen for shutdown and respond appropriately
        let delegated_shutdown_listener = shutdown_handle.new_listener();

        let agent_id = format!("agent-{agent_index}");

        let handle = std::thread::Builder::new()
            .name(agent_id.clone())
            .spawn({
                let agent_id = agent_id.clone();
                move || -> anyhow::Result<()> {
                    let mut context = AgentContext::new(
                        agent_id.clone(),
                        agent_index,
                        runner_context,
                        delegated_shutdown_listener,
                    );

                    if let Some(setup_agent_fn) = setup_agent_fn {
                        setup_agent_fn(&mut context)
                            .with_context(|| format!("Setup failed for {agent_id}"))?;
                    }

                    let mut outcome = Ok(());
                    if let Some(behaviour) = agent_behaviour_fn {
                        for run in 0..runs_per_agent {
                            if cycle_shutdown_receiver.should_shutdown() {
                                log::debug!("Stopping {agent_id}");
                                break;
                            }

                            let started = Instant::now();
                            match behaviour(&mut context) {
                                Ok(()) => {
                                    run_metrics.record(
                                        agent_index * runs_per_agent + run,
                                        started.elapsed(),
                                    );
                                    if let Some(progress) = &progress {
                                        progress.lock().mark();
                                    }
                                }
                                Err(e) if e.is::<ShutdownSignalError>() => {
                                    // Expected when the scenario is being stopped. The check at the
                                    // top of the loop will catch the signal and break out.
                                }
                                Err(e) => {
                                    outcome = Err(e.context(format!(
                                        "Run {} failed for {agent_id}",
                                        first_run_index + run
                                    )));
                                    break;
                                }
                            }
                        }
                    }

                    // Agent teardown also runs when a run failed, so the agent's sessions are
                    // released before the error propagates.
                    if let Some(teardown_agent_fn) = teardown_agent_fn {
                        if let Err(e) = teardown_agent_fn(&mut context) {
                            match outcome {
                                Ok(()) => {
                                    outcome =
                                        Err(e.context(format!("Teardown failed for {agent_id}")));
                                }
                                Err(_) => log::error!("Teardown failed for {agent_id}: {e:?}"),
                            }
                        }
                    }

                    outcome
                }
            })
            .with_context(|| format!("Failed to spawn thread for {agent_id}"))?;

        handles.push(handle);
    }

    // Join every agent before inspecting the results. A failed agent never cancels its siblings,
    // they run to completion or their own timeout.
    let mut first_failure = None;
    for handle in handles {
        let outcome = match handle.join() {
            Ok(outcome) => outcome,
            Err(e) => Err(anyhow::anyhow!("Agent thread panicked: {e:?}")),
        };
        if let Err(e) = outcome {
            if first_failure.is_none() {
                first_failure = Some(e);
            } else {
                log::error!("Additional agent failure: {e:?}");
            }
        }
    }

    if let Some(progress) = &progress {
        progress.lock().finish();
    }

    if let Some(teardown_fn) = definition.teardown_fn {
        // Don't crash the runner if the teardown fails. We still want the reporting and runner
        // shutdown to happen cleanly. The hook is documented as 'best effort'
        if let Err(e) = teardown_fn(runner_context_for_teardown.clone()) {
            log::error!("Teardown failed: {e:?}");
        }
    }

    // Stop the monitor and the Ctrl-C listener.
    shutdown_handle.shutdown();

    if let Some(e) = first_failure {
        // Aborted scenarios report the failure, not statistics.
        return Err(e);
    }

    if let Some(summary) = run_metrics.summarize() {
        println!("{summary}");
    }

    runner_context_for_teardown.reporter().finalize();

    Ok(())
}
