use crate::api::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use clap::{Arg, ArgMatches, Command};

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_TIMEOUT_MS: &str = "timeout-ms";
pub const ARG_STATE_DIR: &str = "state-dir";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub base_url: String,
    pub timeout_ms: u64,
    pub state_dir: Option<String>,
}

impl Options {
    /// Parse API and local state options from CLI matches.
    ///
    /// # Errors
    /// Returns an error if the base URL is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let base_url = matches
            .get_one::<String>(ARG_BASE_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_BASE_URL}"))?;

        Ok(Self {
            base_url,
            timeout_ms: matches
                .get_one::<u64>(ARG_TIMEOUT_MS)
                .copied()
                .unwrap_or(DEFAULT_TIMEOUT_MS),
            state_dir: matches
                .get_one::<String>(ARG_STATE_DIR)
                .cloned()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BASE_URL)
                .long("base-url")
                .help("Storefront API base URL")
                .env("STOREFRONT_BASE_URL")
                .global(true)
                .default_value(DEFAULT_BASE_URL),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_MS)
                .long("timeout-ms")
                .help("Request timeout in milliseconds")
                .env("STOREFRONT_TIMEOUT_MS")
                .global(true)
                .default_value("10000")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long("state-dir")
                .help("Directory holding the session mirror and cookies (default: $HOME/.storefront)")
                .env("STOREFRONT_STATE_DIR")
                .global(true),
        )
}
