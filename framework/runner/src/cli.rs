use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct PageTunnelScenarioCli {
    /// The browser control endpoint to drive.
    ///
    /// Accepts a WebSocket debugger URL (`ws://...`), an HTTP debugging address whose
    /// `/json/version` endpoint will be queried for the WebSocket URL, or the path of a browser
    /// executable to launch locally.
    #[clap(long, env = "BROWSER_ADDRESS", default_value = "ws://127.0.0.1:9222")]
    pub browser_address: String,

    /// Root URL of the site under test. Scenarios derive their page URLs from this.
    #[clap(long, env = "BASE_URL", default_value = "http://127.0.0.1:1234")]
    pub base_url: String,

    /// Full page URL to load, overriding the scenario's default page under the base URL.
    #[clap(long, env = "URL")]
    pub url: Option<String>,

    /// The number of benchmark runs to perform per agent.
    #[clap(long, env = "RUNS")]
    pub runs: Option<usize>,

    /// The number of agents to run concurrently.
    #[clap(long, env = "AGENTS")]
    pub agents: Option<usize>,

    /// Run a locally launched browser headless. Has no effect when attaching to a remote browser.
    #[clap(long, env = "HEADLESS", default_value = "false")]
    pub headless: bool,

    /// Path of a browser executable to launch instead of attaching to the browser address.
    ///
    /// `CHROME_PATH` is honoured as a fallback environment variable for the same setting.
    #[clap(long, env = "BROWSER_PATH")]
    pub browser_path: Option<String>,

    /// Do not print a progress mark as each run completes.
    ///
    /// This is recommended for CI/CD environments where the marks are just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// How to report the timings of individual client operations.
    #[clap(long, value_enum, default_value_t = ReporterOpt::Summary)]
    pub reporter: ReporterOpt,

    /// An identifier for this run. Generated when not provided.
    #[clap(long)]
    pub run_id: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReporterOpt {
    /// Keep operation records in memory and print a summary table at the end of the run.
    #[default]
    Summary,
    /// Discard operation records.
    Noop,
}

impl PageTunnelScenarioCli {
    /// The endpoint descriptor the connection provider should resolve.
    ///
    /// An explicitly configured executable path wins over the browser address, as in the original
    /// driver scripts.
    pub fn browser_descriptor(&self) -> String {
        self.browser_path
            .clone()
            .or_else(|| std::env::var("CHROME_PATH").ok().filter(|p| !p.is_empty()))
            .unwrap_or_else(|| self.browser_address.clone())
    }

    /// The page URL a scenario should load: the `--url` override when given, otherwise
    /// `default_path` under the base URL.
    pub fn target_url(&self, default_path: &str) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                default_path.trim_start_matches('/')
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_cli() -> PageTunnelScenarioCli {
        PageTunnelScenarioCli {
            browser_address: "ws://127.0.0.1:9222".to_string(),
            base_url: "http://127.0.0.1:1234".to_string(),
            url: None,
            runs: None,
            agents: None,
            headless: false,
            browser_path: None,
            no_progress: true,
            reporter: ReporterOpt::Noop,
            run_id: None,
        }
    }

    #[test]
    fn descriptor_defaults_to_the_browser_address() {
        assert_eq!(sample_cli().browser_descriptor(), "ws://127.0.0.1:9222");
    }

    #[test]
    fn an_explicit_browser_path_wins() {
        let cli = PageTunnelScenarioCli {
            browser_path: Some("/usr/bin/chromium".to_string()),
            ..sample_cli()
        };
        assert_eq!(cli.browser_descriptor(), "/usr/bin/chromium");
    }

    #[test]
    fn target_url_joins_the_default_path_onto_the_base() {
        let cli = PageTunnelScenarioCli {
            base_url: "http://127.0.0.1:1234/".to_string(),
            ..sample_cli()
        };
        assert_eq!(
            cli.target_url("/campfire-commerce/"),
            "http://127.0.0.1:1234/campfire-commerce/"
        );
    }

    #[test]
    fn target_url_prefers_the_override() {
        let cli = PageTunnelScenarioCli {
            url: Some("http://10.0.0.5:8080/somewhere.html".to_string()),
            ..sample_cli()
        };
        assert_eq!(
            cli.target_url("/campfire-commerce/"),
            "http://10.0.0.5:8080/somewhere.html"
        );
    }
}
