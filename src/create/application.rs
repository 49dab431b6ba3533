// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::config::WaitConfig;
use crate::constants::git_auth;
use crate::error::{Result, TideError};
use crate::kubernetes::ApiClient;
use crate::types::application::{
    env_vars, ApplicationConfig, ApplicationSize, GitAuth, GitTarget, LocalReference,
};
use crate::types::{Application, ApplicationSpec};
use crate::wait::ConvergenceWaiter;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::{ObjectMeta, PostParams};
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Where the application's source lives and how to authenticate against it
#[derive(Debug, Clone, Default)]
pub struct GitConfig {
    pub url: String,
    pub sub_path: Option<String>,
    pub revision: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssh_private_key: Option<String>,
}

impl GitConfig {
    fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(TideError::InvalidArgument("git url is required".to_string()));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(TideError::InvalidArgument(
                "git username and password must be given together".to_string(),
            ));
        }
        if self.username.is_some() && self.ssh_private_key.is_some() {
            return Err(TideError::InvalidArgument(
                "use either username/password or an SSH key for git, not both".to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.ssh_private_key.is_some()
    }

    fn secret_data(&self) -> BTreeMap<String, ByteString> {
        let mut data = BTreeMap::new();
        let mut put = |key: &str, value: &Option<String>| {
            if let Some(value) = value {
                data.insert(key.to_string(), ByteString(value.clone().into_bytes()));
            }
        };
        put(git_auth::USERNAME_KEY, &self.username);
        put(git_auth::PASSWORD_KEY, &self.password);
        put(git_auth::SSH_PRIVATE_KEY_KEY, &self.ssh_private_key);
        data
    }
}

pub fn git_auth_secret_name(app_name: &str) -> String {
    format!("{}-{}", app_name, git_auth::SECRET_SUFFIX)
}

#[derive(Debug, Clone)]
pub struct CreateApplication {
    pub name: String,
    pub git: GitConfig,
    pub hosts: Vec<String>,
    pub size: Option<ApplicationSize>,
    pub port: Option<i32>,
    pub replicas: Option<i32>,
    pub env: BTreeMap<String, String>,
    pub wait: WaitConfig,
}

impl CreateApplication {
    pub fn new_application(&self, namespace: &str) -> Application {
        let auth = self.git.has_auth().then(|| GitAuth {
            from_secret: LocalReference {
                name: git_auth_secret_name(&self.name),
            },
        });

        Application {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: ApplicationSpec {
                git: GitTarget {
                    url: self.git.url.clone(),
                    sub_path: self.git.sub_path.clone(),
                    revision: self.git.revision.clone(),
                    auth,
                },
                hosts: self.hosts.clone(),
                config: ApplicationConfig {
                    size: self.size,
                    port: self.port,
                    replicas: self.replicas,
                    env: env_vars(&self.env),
                },
            },
            status: None,
        }
    }

    /// Secret with the git credentials, owned by the created application so
    /// it is removed together with it
    pub fn git_auth_secret(&self, app: &Application) -> Option<Secret> {
        if !self.git.has_auth() {
            return None;
        }

        Some(Secret {
            metadata: ObjectMeta {
                name: Some(git_auth_secret_name(&app.name_any())),
                namespace: app.namespace(),
                owner_references: app.controller_owner_ref(&()).map(|r| vec![r]),
                ..Default::default()
            },
            data: Some(self.git.secret_data()),
            ..Default::default()
        })
    }

    /// Submit the application and, if requested, wait for it to be built and released
    #[instrument(skip(self, client), fields(name = %self.name, project = %client.project))]
    pub async fn run(&self, client: &ApiClient) -> Result<Application> {
        self.git.validate()?;

        let app = self.new_application(&client.project);
        let created = client
            .api::<Application>()
            .create(&PostParams::default(), &app)
            .await
            .map_err(|e| TideError::from_api(e, "Application", &self.name))?;
        info!("Created Application {:?}", self.name);

        if let Some(secret) = self.git_auth_secret(&created) {
            let secret_name = secret.name_any();
            client
                .api::<Secret>()
                .create(&PostParams::default(), &secret)
                .await
                .map_err(|e| TideError::from_api(e, "Secret", &secret_name))?;
            info!("Created git credentials secret {:?}", secret_name);
        }

        if !self.wait.wait {
            return Ok(created);
        }

        info!("Waiting for Application {:?} to be built and released...", self.name);
        let app = ConvergenceWaiter::<Application>::new(client.clone(), &self.name, self.wait)
            .wait_interruptible()
            .await?;

        info!(
            "Application {:?} is available at {}",
            self.name,
            app.hosts().join(", ")
        );
        if let (Some(build), Some(release)) = (app.latest_build(), app.latest_release()) {
            info!("Serving build {} through release {}", build, release);
        }
        if let Some(target) = app.cname_target() {
            info!("Point custom hosts at {} with a CNAME record", target);
        }

        Ok(app)
    }
}
