use crate::shutdown::DelegatedShutdownListener;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Monitor the resource usage of the runner process and report high usage.
///
/// This won't stop the scenario, it just warns the user that the measured page load timings may
/// be affected by contention on the machine running the benchmark.
///
/// The CPU usage of the process is sampled every [sysinfo::MINIMUM_CPU_UPDATE_INTERVAL]. A warning
/// is logged when it exceeds 10% of the available cores.
pub(crate) fn start_monitor(mut shutdown_listener: DelegatedShutdownListener) {
    let spawned = std::thread::Builder::new()
        .name("monitor".to_string())
        .spawn(move || {
            let this_process_pid = Pid::from_u32(std::process::id());
            let mut sys = System::new();

            let cpu_count = std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1);

            loop {
                if shutdown_listener.should_shutdown() {
                    break;
                }

                sys.refresh_processes_specifics(
                    ProcessesToUpdate::Some(&[this_process_pid]),
                    true,
                    ProcessRefreshKind::nothing().with_cpu(),
                );

                if let Some(process) = sys.process(this_process_pid) {
                    // cpu_usage is relative to a single core.
                    let usage = process.cpu_usage() / cpu_count as f32;
                    if usage > 10.0 {
                        log::warn!(
                            "High CPU usage detected. The runner is using {usage:.2}% of the CPU, with {cpu_count} available cores"
                        );
                    }
                }

                std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            }
        });

    if let Err(e) = spawned {
        log::warn!("Failed to start the resource monitor: {e}");
    }
}
