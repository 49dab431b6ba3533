// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::config::WaitConfig;
use crate::error::{Result, TideError};
use crate::kubernetes::ApiClient;
use crate::types::{Project, ProjectSpec};
use crate::wait::ConvergenceWaiter;
use kube::api::PostParams;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub display_name: Option<String>,
    pub wait: WaitConfig,
}

impl CreateProject {
    /// Projects are created in the organization's namespace
    #[instrument(skip(self, client), fields(name = %self.name, organization = %client.organization))]
    pub async fn run(&self, client: &ApiClient) -> Result<Project> {
        let project = Project::new(
            &self.name,
            ProjectSpec {
                display_name: self.display_name.clone(),
            },
        );

        let created = client
            .api_in::<Project>(&client.organization)
            .create(&PostParams::default(), &project)
            .await
            .map_err(|e| TideError::from_api(e, "Project", &self.name))?;
        info!("Created Project {:?}", self.name);

        if !self.wait.wait {
            return Ok(created);
        }

        ConvergenceWaiter::<Project>::new(client.clone(), &self.name, self.wait)
            .in_namespace(client.organization.clone())
            .wait_interruptible()
            .await
    }
}
