// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Label keys set by the control plane
pub mod labels {
    /// Correlates builds and releases with the application they were created for
    pub const APPLICATION_NAME: &str = "apps.tide.dev/application";
}

/// Condition types and reasons reported by the control plane
pub mod conditions {
    pub const TYPE_SYNCED: &str = "Synced";
    pub const TYPE_READY: &str = "Ready";

    pub const REASON_RECONCILE_SUCCESS: &str = "ReconcileSuccess";
    pub const REASON_RECONCILE_ERROR: &str = "ReconcileError";
    pub const REASON_AVAILABLE: &str = "Available";
    pub const REASON_UNAVAILABLE: &str = "Unavailable";
    pub const REASON_CREATING: &str = "Creating";
}

/// Wait defaults
pub mod wait {
    /// Default time to wait for an application to build and release
    pub const DEFAULT_APPLICATION_TIMEOUT_SECS: u64 = 15 * 60;
    /// Default time to wait for projects and databases
    pub const DEFAULT_RESOURCE_TIMEOUT_SECS: u64 = 10 * 60;
    /// Interval between convergence checks
    pub const POLL_INTERVAL_MILLIS: u64 = 1000;
}

/// Keys of the git authentication secret
pub mod git_auth {
    pub const USERNAME_KEY: &str = "username";
    pub const PASSWORD_KEY: &str = "password";
    pub const SSH_PRIVATE_KEY_KEY: &str = "privatekey";
    pub const SECRET_SUFFIX: &str = "git-auth";
}

/// Database defaults
pub mod postgres {
    /// User created on every Postgres instance
    pub const USER: &str = "dbadmin";
    pub const CONNECTION_SECRET_SUFFIX: &str = "connection";
}

/// Default project when neither flag nor environment name one
pub const DEFAULT_PROJECT: &str = "default";
