// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::condition::{Condition, HasConditions};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// A rollout of a build, created by the control plane
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "apps.tide.dev", version = "v1alpha1", kind = "Release")]
#[kube(namespaced)]
#[kube(status = "ReleaseStatus")]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_status: Option<ReleaseState>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseState {
    Pending,
    Available,
    Failed,
    #[serde(other)]
    Unknown,
}

impl Release {
    pub fn state(&self) -> Option<ReleaseState> {
        self.status.as_ref().and_then(|s| s.release_status)
    }
}

impl HasConditions for Release {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}
