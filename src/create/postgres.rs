// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::config::WaitConfig;
use crate::constants::postgres::CONNECTION_SECRET_SUFFIX;
use crate::error::{Result, TideError};
use crate::kubernetes::ApiClient;
use crate::types::postgres::SecretReference;
use crate::types::{Postgres, PostgresSpec};
use crate::wait::ConvergenceWaiter;
use kube::api::PostParams;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct CreatePostgres {
    pub name: String,
    pub location: Option<String>,
    pub machine_type: Option<String>,
    pub version: Option<String>,
    pub wait: WaitConfig,
}

impl CreatePostgres {
    pub fn new_postgres(&self) -> Postgres {
        Postgres::new(
            &self.name,
            PostgresSpec {
                location: self.location.clone(),
                machine_type: self.machine_type.clone(),
                version: self.version.clone(),
                write_connection_secret_to_ref: Some(SecretReference {
                    name: format!("{}-{}", self.name, CONNECTION_SECRET_SUFFIX),
                }),
            },
        )
    }

    #[instrument(skip(self, client), fields(name = %self.name, project = %client.project))]
    pub async fn run(&self, client: &ApiClient) -> Result<Postgres> {
        let created = client
            .api::<Postgres>()
            .create(&PostParams::default(), &self.new_postgres())
            .await
            .map_err(|e| TideError::from_api(e, "Postgres", &self.name))?;
        info!("Created Postgres {:?}", self.name);

        if !self.wait.wait {
            return Ok(created);
        }

        info!("Waiting for Postgres {:?} to be provisioned...", self.name);
        let postgres = ConvergenceWaiter::<Postgres>::new(client.clone(), &self.name, self.wait)
            .wait_interruptible()
            .await?;
        if let Some(fqdn) = postgres.fqdn() {
            info!("Postgres {:?} is reachable at {}", self.name, fqdn);
        }

        Ok(postgres)
    }
}
