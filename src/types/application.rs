// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::TideError;
use crate::types::condition::{Condition, HasConditions};
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "apps.tide.dev", version = "v1alpha1", kind = "Application")]
#[kube(namespaced)]
#[kube(status = "ApplicationStatus")]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    pub git: GitTarget,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub config: ApplicationConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitTarget {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<GitAuth>,
}

/// Credentials for private repositories, stored in a secret next to the application
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitAuth {
    pub from_secret: LocalReference,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct LocalReference {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ApplicationSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum ApplicationSize {
    #[serde(rename = "micro")]
    Micro,
    #[serde(rename = "mini")]
    Mini,
    #[serde(rename = "standard-1")]
    Standard1,
    #[serde(rename = "standard-2")]
    Standard2,
}

impl ApplicationSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationSize::Micro => "micro",
            ApplicationSize::Mini => "mini",
            ApplicationSize::Standard1 => "standard-1",
            ApplicationSize::Standard2 => "standard-2",
        }
    }
}

impl fmt::Display for ApplicationSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationSize {
    type Err = TideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "micro" => Ok(ApplicationSize::Micro),
            "mini" => Ok(ApplicationSize::Mini),
            "standard-1" => Ok(ApplicationSize::Standard1),
            "standard-2" => Ok(ApplicationSize::Standard2),
            other => Err(TideError::InvalidArgument(format!(
                "unknown application size {:?}, expected one of micro, mini, standard-1, standard-2",
                other
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Convert a name/value map into the ordered env var list the API expects
pub fn env_vars(env: &BTreeMap<String, String>) -> Vec<EnvVar> {
    env.iter()
        .map(|(name, value)| EnvVar {
            name: name.clone(),
            value: value.clone(),
        })
        .collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<VerificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct VerificationStatus {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Application {
    /// Hosts the control plane has assigned or verified for this application
    pub fn hosts(&self) -> Vec<&str> {
        self.status
            .as_ref()
            .map(|s| s.hosts.iter().map(|h| h.name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn cname_target(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.cname_target.as_deref())
    }

    /// Name of the build the control plane last produced
    pub fn latest_build(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.latest_build.as_deref())
    }

    pub fn latest_release(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.latest_release.as_deref())
    }

    /// The control plane has accepted the application and routed at least one host to it
    pub fn is_ready(&self) -> bool {
        self.is_synced() && !self.hosts().is_empty()
    }
}

impl HasConditions for Application {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}
