// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::condition::{Condition, HasConditions};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// A build of an application's source, created by the control plane
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "apps.tide.dev", version = "v1alpha1", kind = "Build")]
#[kube(namespaced)]
#[kube(status = "BuildStatus")]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_status: Option<BuildState>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Running,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

impl Build {
    pub fn state(&self) -> Option<BuildState> {
        self.status.as_ref().and_then(|s| s.build_status)
    }
}

impl HasConditions for Build {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}
