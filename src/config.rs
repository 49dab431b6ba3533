// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{wait, DEFAULT_PROJECT};
use crate::error::{Result, TideError};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Project (namespace) that resources are created in
    pub project: String,
    /// Organization namespace that owns the projects
    pub organization: Option<String>,
    /// Kubeconfig file to use instead of the inferred one
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Config {
            project: non_empty("TIDE_PROJECT").unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
            organization: non_empty("TIDE_ORGANIZATION"),
            kubeconfig: non_empty("TIDE_KUBECONFIG").map(PathBuf::from),
            context: non_empty("TIDE_CONTEXT"),
        }
    }

    /// The namespace projects live in. Falls back to the project itself.
    pub fn organization_namespace(&self) -> &str {
        self.organization.as_deref().unwrap_or(&self.project)
    }
}

/// How (and whether) a mutation waits for the submitted resource to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub wait: bool,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(wait: bool, timeout: Duration) -> Self {
        Self {
            wait,
            timeout,
            poll_interval: Duration::from_millis(wait::POLL_INTERVAL_MILLIS),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, Duration::from_secs(wait::DEFAULT_RESOURCE_TIMEOUT_SECS))
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Parse a human-friendly duration such as `90s`, `15m`, `1h` or bare seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let invalid = || {
        TideError::InvalidArgument(format!(
            "invalid duration '{}', expected e.g. 1h, 30m, 90s",
            s
        ))
    };

    let (digits, multiplier) = if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600)
    } else if let Some(minutes) = s.strip_suffix('m') {
        (minutes, 60)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else {
        (s, 1)
    };

    let n: u64 = digits.trim().parse().map_err(|_| invalid())?;
    let secs = n.checked_mul(multiplier).ok_or_else(invalid)?;
    Ok(Duration::from_secs(secs))
}
