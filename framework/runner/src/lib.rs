mod cli;
mod context;
mod definition;
mod executor;
mod init;
mod monitor;
mod progress;
mod run;
mod shutdown;
mod types;

pub mod prelude {
    pub use crate::cli::{PageTunnelScenarioCli, ReporterOpt};
    pub use crate::context::{AgentContext, RunnerContext, UserValuesConstraint};
    pub use crate::definition::{HookResult, ScenarioDefinitionBuilder};
    pub use crate::init::init;
    pub use crate::run::run;
    pub use crate::types::PageTunnelResult;
    pub use page_tunnel_core::prelude::*;
    pub use page_tunnel_instruments::prelude::Reporter;
}
