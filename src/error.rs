// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TideError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("{kind} {name:?} not found")]
    NotFound { kind: String, name: String },

    #[error("{kind} {name:?} already exists")]
    AlreadyExists { kind: String, name: String },

    #[error("{kind} {name:?} has failed: {message}")]
    DependentFailed {
        kind: String,
        name: String,
        message: String,
    },

    #[error("timed out after {elapsed:?} waiting for {kind} {name:?} to become ready")]
    Timeout {
        kind: String,
        name: String,
        elapsed: Duration,
    },

    #[error("{kind} {name:?} was modified concurrently, fetch it again and retry")]
    Conflict { kind: String, name: String },

    #[error("waiting for {kind} {name:?} was cancelled")]
    Cancelled { kind: String, name: String },

    #[error("Secret error: {0}")]
    SecretError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TideError {
    /// Map an API error for a single named object onto the domain taxonomy.
    pub fn from_api(err: kube::Error, kind: &str, name: &str) -> Self {
        match err {
            kube::Error::Api(ref resp) if resp.code == 404 => TideError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            kube::Error::Api(ref resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
                TideError::AlreadyExists {
                    kind: kind.to_string(),
                    name: name.to_string(),
                }
            }
            kube::Error::Api(ref resp) if resp.code == 409 => TideError::Conflict {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            other => TideError::KubeError(other),
        }
    }

    /// Terminal errors end a wait session; everything else is retried on the next tick.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TideError::KubeError(_))
    }
}

pub type Result<T> = std::result::Result<T, TideError>;
