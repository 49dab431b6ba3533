// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::config::WaitConfig;
use crate::error::Result;
use crate::kubernetes::ApiClient;
use crate::types::application::{ApplicationSize, EnvVar};
use crate::types::Application;
use crate::update::{last_write_time, Updater};
use crate::wait::ConvergenceWaiter;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::{SubsecRound, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Changes to an existing application. Unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateApplication {
    pub name: String,
    pub git_url: Option<String>,
    pub git_sub_path: Option<String>,
    pub git_revision: Option<String>,
    pub hosts: Option<Vec<String>>,
    pub size: Option<ApplicationSize>,
    pub port: Option<i32>,
    pub replicas: Option<i32>,
    /// Added or overwritten
    pub env: BTreeMap<String, String>,
    pub delete_env: Vec<String>,
    pub wait: Option<WaitConfig>,
}

impl UpdateApplication {
    pub fn apply(&self, app: &mut Application) -> Result<()> {
        let spec = &mut app.spec;

        if let Some(url) = &self.git_url {
            spec.git.url = url.clone();
        }
        if let Some(sub_path) = &self.git_sub_path {
            spec.git.sub_path = Some(sub_path.clone());
        }
        if let Some(revision) = &self.git_revision {
            spec.git.revision = revision.clone();
        }
        if let Some(hosts) = &self.hosts {
            spec.hosts = hosts.clone();
        }
        if self.size.is_some() {
            spec.config.size = self.size;
        }
        if self.port.is_some() {
            spec.config.port = self.port;
        }
        if self.replicas.is_some() {
            spec.config.replicas = self.replicas;
        }

        let env = &mut spec.config.env;
        env.retain(|var| !self.delete_env.contains(&var.name));
        for (name, value) in &self.env {
            match env.iter_mut().find(|var| var.name == *name) {
                Some(var) => var.value = value.clone(),
                None => env.push(EnvVar {
                    name: name.clone(),
                    value: value.clone(),
                }),
            }
        }

        Ok(())
    }

    /// Update the application. When waiting, builds and releases created
    /// before the update only count if no newer one of their kind exists.
    #[instrument(skip(self, client), fields(name = %self.name, project = %client.project))]
    pub async fn run(&self, client: &ApiClient) -> Result<Application> {
        // creation timestamps only carry whole seconds
        let requested_at = Time(Utc::now().trunc_subsecs(0));

        let updated = Updater::<Application>::new(client.clone(), &self.name)
            .update(|app| self.apply(app))
            .await?;

        let Some(wait) = self.wait.filter(|w| w.wait) else {
            return Ok(updated);
        };

        // compare server timestamps with server timestamps where possible
        let submitted_at = last_write_time(&updated).unwrap_or(requested_at);
        debug!("Ignoring dependents created before {:?}", submitted_at.0);

        info!("Waiting for Application {:?} to roll out the update...", self.name);
        let app = ConvergenceWaiter::<Application>::new(client.clone(), &self.name, wait)
            .created_after(submitted_at)
            .wait_interruptible()
            .await?;

        info!(
            "Application {:?} rolled out build {} as release {}",
            self.name,
            app.latest_build().unwrap_or("<unknown>"),
            app.latest_release().unwrap_or("<unknown>"),
        );
        Ok(app)
    }
}
