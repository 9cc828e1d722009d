use crate::api::ApiConfig;
use crate::cli::commands::api::Options;
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

const STATE_DIR_NAME: &str = ".storefront";
const SESSION_FILE: &str = "session.json";
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    pub base_url: String,
    pub timeout: Duration,
    pub state_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(options: Options) -> Self {
        let state_dir = options
            .state_dir
            .map_or_else(default_state_dir, PathBuf::from);

        Self {
            base_url: options.base_url,
            timeout: Duration::from_millis(options.timeout_ms),
            state_dir,
        }
    }

    /// # Errors
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn api_config(&self) -> anyhow::Result<ApiConfig> {
        Ok(ApiConfig::new(&self.base_url)?.with_timeout(self.timeout))
    }

    /// Storage area holding the session mirror.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }

    /// Storage area holding the API cookies between runs.
    #[must_use]
    pub fn credentials_file(&self) -> PathBuf {
        self.state_dir.join(CREDENTIALS_FILE)
    }

    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}

fn default_state_dir() -> PathBuf {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map_or_else(|| PathBuf::from(STATE_DIR_NAME), |home| {
            PathBuf::from(home).join(STATE_DIR_NAME)
        })
}
