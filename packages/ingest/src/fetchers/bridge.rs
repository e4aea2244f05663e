//! Fetcher that shells out to an external scraping toolchain.
//!
//! Each fetch runs the configured command in a freshly created temporary
//! working directory, with the query written to a `params.json` file and
//! exported via `HIRELY_PARAMS`. The last JSON object printed to stdout is
//! the result; any other exit condition is a failure.
//!
//! The working directory is removed on every exit path. Removal failures
//! are logged but never escalated.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::SourceFetcher;
use crate::types::job::{JobSource, RawJob, SearchParams};

/// Result envelope the scraping toolchain prints as its final line.
#[derive(Debug, Deserialize)]
struct BridgeOutput {
    #[serde(default)]
    jobs: Vec<RawJob>,
}

/// Subprocess-backed fetcher for the scraping bridge.
pub struct BridgeFetcher {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    /// Scratch space root; temp dirs are created under it (system default
    /// when unset). Tests point this at their own directory to observe
    /// cleanup.
    workdir_root: Option<std::path::PathBuf>,
    /// Short-circuit: return a canned record without spawning. Used by
    /// smoke tests of the surrounding plumbing.
    test_mode: bool,
}

impl BridgeFetcher {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(120),
            workdir_root: None,
            test_mode: false,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_workdir_root(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.workdir_root = Some(root.into());
        self
    }

    pub fn test_mode(mut self) -> Self {
        self.test_mode = true;
        self
    }

    fn make_workdir(&self) -> FetchResult<TempDir> {
        let dir = match &self.workdir_root {
            Some(root) => TempDir::new_in(root),
            None => TempDir::new(),
        };
        dir.map_err(|e| FetchError::Bridge {
            reason: format!("failed to create workdir: {e}"),
        })
    }

    async fn run_in(&self, workdir: &Path, query: &SearchParams) -> FetchResult<Vec<RawJob>> {
        let params_path = workdir.join("params.json");
        let params = serde_json::to_vec(query).map_err(|e| FetchError::Bridge {
            reason: format!("failed to encode params: {e}"),
        })?;
        tokio::fs::write(&params_path, params)
            .await
            .map_err(|e| FetchError::Bridge {
                reason: format!("failed to write params: {e}"),
            })?;

        debug!(command = %self.command, workdir = %workdir.display(), "bridge starting");

        let child = Command::new(&self.command)
            .args(&self.args)
            .current_dir(workdir)
            .env("HIRELY_PARAMS", &params_path)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| FetchError::Bridge {
                reason: format!("timed out after {:?}", self.timeout),
            })?
            .map_err(|e| FetchError::Bridge {
                reason: format!("failed to spawn {}: {e}", self.command),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Bridge {
                reason: format!(
                    "exit code {:?}: {}",
                    output.status.code(),
                    stderr.trim().chars().take(200).collect::<String>()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_last_json(&stdout).map(|out| out.jobs)
    }
}

/// Parse the last JSON object printed to stdout. The toolchain logs freely
/// to earlier lines, so only the final parsable line counts.
fn parse_last_json(stdout: &str) -> FetchResult<BridgeOutput> {
    for line in stdout.lines().rev() {
        let line = line.trim();
        if !line.starts_with('{') {
            continue;
        }
        if let Ok(parsed) = serde_json::from_str::<BridgeOutput>(line) {
            return Ok(parsed);
        }
    }
    Err(FetchError::Bridge {
        reason: "no JSON result on stdout".to_string(),
    })
}

#[async_trait]
impl SourceFetcher for BridgeFetcher {
    async fn fetch(&self, query: &SearchParams) -> FetchResult<Vec<RawJob>> {
        if self.test_mode {
            return Ok(vec![RawJob::new(
                "Bridge test job",
                "Canned record from bridge test mode",
            )
            .with_id("bridge-test-1")]);
        }

        let workdir = self.make_workdir()?;
        let result = self.run_in(workdir.path(), query).await;

        // Cleanup is best-effort on every exit path
        if let Err(e) = workdir.close() {
            warn!(error = %e, "failed to remove bridge workdir");
        }

        result
    }

    fn source(&self) -> JobSource {
        JobSource::Scraped
    }

    fn name(&self) -> &str {
        "bridge"
    }
}
