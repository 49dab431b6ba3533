// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! API client creation and kubeconfig utilities

use crate::config::Config;
use crate::error::{Result, TideError};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Api, Client, Config as KConfig, Resource,
};
use kube::core::NamespaceResourceScope;
use std::path::Path;
use tracing::{debug, instrument};

/// A kube client bound to the caller's project and organization
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    /// Namespace of the current project
    pub project: String,
    /// Namespace that holds the organization's projects
    pub organization: String,
}

impl ApiClient {
    pub fn new(client: Client, project: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            client,
            project: project.into(),
            organization: organization.into(),
        }
    }

    /// Connect using the configured kubeconfig, or the inferred one
    #[instrument(skip(config), fields(project = %config.project))]
    pub async fn from_config(config: &Config) -> Result<Self> {
        let client = match &config.kubeconfig {
            Some(path) => create_client_from_kubeconfig(path, config.context.as_deref()).await?,
            None => create_inferred_client(config.context.as_deref()).await?,
        };

        Ok(Self::new(
            client,
            config.project.clone(),
            config.organization_namespace().to_string(),
        ))
    }

    /// Typed API for a kind in the current project
    pub fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.project)
    }

    /// Typed API for a kind in an arbitrary namespace
    pub fn api_in<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

async fn create_inferred_client(context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match context {
        Some(_) => KConfig::from_kubeconfig(&options).await.map_err(|e| {
            TideError::KubeconfigError(format!("Failed to load kubeconfig: {}", e))
        })?,
        None => KConfig::infer()
            .await
            .map_err(|e| TideError::KubeconfigError(format!("Failed to infer config: {}", e)))?,
    };

    Client::try_from(config)
        .map_err(|e| TideError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Create a client from a kubeconfig file
async fn create_client_from_kubeconfig(path: &Path, context: Option<&str>) -> Result<Client> {
    debug!("Reading kubeconfig from {}", path.display());

    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        TideError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let kubeconfig = parse_kubeconfig(&contents)?;
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let client_config = KConfig::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .map_err(|e| TideError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| TideError::KubeconfigError(format!("Failed to create client: {}", e)))
}

fn parse_kubeconfig(contents: &str) -> Result<Kubeconfig> {
    serde_yaml::from_str(contents)
        .map_err(|e| TideError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))
}
