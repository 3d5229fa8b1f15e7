use std::str::FromStr;
use serde::Deserialize;

/// What the runner does once a step has failed.
///
/// - `FailImmediately`: stop dispatching; every step not yet run is skipped
///   (default behaviour).
/// - `FailAfterExecutableNodesComplete`: keep dispatching every step whose
///   upstream steps all succeeded; only dependents of the failed step are
///   skipped. The run is still reported as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    FailImmediately,
    FailAfterExecutableNodesComplete,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::FailImmediately
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fail_immediately" => Ok(FailurePolicy::FailImmediately),
            "fail_after_executable_nodes_complete" => {
                Ok(FailurePolicy::FailAfterExecutableNodesComplete)
            }
            other => Err(format!(
                "invalid failure_policy: {other} (expected \"fail_immediately\" or \"fail_after_executable_nodes_complete\")"
            )),
        }
    }
}
