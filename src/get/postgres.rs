// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::postgres::USER;
use crate::error::{Result, TideError};
use crate::kubernetes::ApiClient;
use crate::types::Postgres;
use k8s_openapi::api::core::v1::Secret;
use kube::api::ListParams;
use kube::ResourceExt;
use std::io::Write;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default)]
pub struct GetPostgres {
    /// Lists every instance in the project when unset
    pub name: Option<String>,
    pub print_password: bool,
    pub print_user: bool,
}

impl GetPostgres {
    fn validate(&self) -> Result<()> {
        if (self.print_password || self.print_user) && self.name.is_none() {
            return Err(TideError::InvalidArgument(
                "printing credentials requires the name of a Postgres instance".to_string(),
            ));
        }
        if self.print_password && self.print_user {
            return Err(TideError::InvalidArgument(
                "print either the user or the password, not both".to_string(),
            ));
        }
        Ok(())
    }

    #[instrument(skip(self, client, out), fields(project = %client.project))]
    pub async fn run(&self, client: &ApiClient, out: &mut impl Write) -> Result<()> {
        self.validate()?;

        if self.print_user {
            writeln!(out, "{}", USER)?;
            return Ok(());
        }

        let instances = self.list(client).await?;
        if instances.is_empty() {
            writeln!(out, "no Postgres found in project {}", client.project)?;
            return Ok(());
        }

        if self.print_password {
            let password = connection_password(client, &instances[0]).await?;
            writeln!(out, "{}", password)?;
            return Ok(());
        }

        writeln!(out, "{:<24}{:<40}{:<12}{}", "NAME", "FQDN", "LOCATION", "MACHINE TYPE")?;
        for pg in &instances {
            writeln!(
                out,
                "{:<24}{:<40}{:<12}{}",
                pg.name_any(),
                pg.fqdn().unwrap_or("<none>"),
                pg.spec.location.as_deref().unwrap_or("<none>"),
                pg.spec.machine_type.as_deref().unwrap_or("<none>"),
            )?;
        }
        Ok(())
    }

    async fn list(&self, client: &ApiClient) -> Result<Vec<Postgres>> {
        let api = client.api::<Postgres>();
        match &self.name {
            Some(name) => Ok(api.get_opt(name).await?.into_iter().collect()),
            None => Ok(api.list(&ListParams::default()).await?.items),
        }
    }
}

/// Password of the database user, read from the instance's connection secret
pub async fn connection_password(client: &ApiClient, postgres: &Postgres) -> Result<String> {
    let secret_name = postgres.connection_secret_name();
    debug!("Reading connection secret {:?}", secret_name);

    let secret = client
        .api::<Secret>()
        .get(&secret_name)
        .await
        .map_err(|e| TideError::from_api(e, "Secret", &secret_name))?;

    let Some(value) = secret.data.as_ref().and_then(|d| d.get(USER)) else {
        return Err(TideError::SecretError(format!(
            "connection secret {} does not contain key {:?}",
            secret_name, USER
        )));
    };

    String::from_utf8(value.0.clone()).map_err(|e| {
        TideError::SecretError(format!("failed to decode password in {}: {}", secret_name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::CreatePostgres;
    use crate::config::WaitConfig;
    use crate::test_utils::FakeApiServer;
    use k8s_openapi::ByteString;
    use kube::api::{ObjectMeta, PostParams};
    use std::collections::BTreeMap;

    async fn create(client: &ApiClient, name: &str) {
        CreatePostgres {
            name: name.to_string(),
            location: Some("zone-a".to_string()),
            machine_type: Some("small".to_string()),
            version: None,
            wait: WaitConfig::disabled(),
        }
        .run(client)
        .await
        .unwrap();
    }

    async fn output(cmd: GetPostgres, client: &ApiClient) -> Result<String> {
        let mut out = Vec::new();
        cmd.run(client, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_empty_project() {
        let client = FakeApiServer::new().api_client();
        let out = output(GetPostgres::default(), &client).await.unwrap();
        assert_eq!(out, "no Postgres found in project default\n");
    }

    #[tokio::test]
    async fn test_lists_all_instances() {
        let client = FakeApiServer::new().api_client();
        create(&client, "orders").await;
        create(&client, "billing").await;

        let out = output(GetPostgres::default(), &client).await.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME"));
        assert!(out.contains("orders"));
        assert!(out.contains("billing"));
        assert!(out.contains("zone-a"));
    }

    #[tokio::test]
    async fn test_print_user() {
        let client = FakeApiServer::new().api_client();
        let cmd = GetPostgres {
            name: Some("orders".to_string()),
            print_user: true,
            ..Default::default()
        };
        assert_eq!(output(cmd, &client).await.unwrap(), "dbadmin\n");
    }

    #[tokio::test]
    async fn test_print_password() {
        let client = FakeApiServer::new().api_client();
        create(&client, "orders").await;
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("orders-connection".to_string()),
                ..Default::default()
            },
            data: Some(BTreeMap::from([(
                USER.to_string(),
                ByteString(b"s3cret".to_vec()),
            )])),
            ..Default::default()
        };
        client
            .api::<Secret>()
            .create(&PostParams::default(), &secret)
            .await
            .unwrap();

        let cmd = GetPostgres {
            name: Some("orders".to_string()),
            print_password: true,
            ..Default::default()
        };
        assert_eq!(output(cmd, &client).await.unwrap(), "s3cret\n");
    }

    #[tokio::test]
    async fn test_print_password_without_secret() {
        let client = FakeApiServer::new().api_client();
        create(&client, "orders").await;

        let cmd = GetPostgres {
            name: Some("orders".to_string()),
            print_password: true,
            ..Default::default()
        };
        let err = output(cmd, &client).await.unwrap_err();
        assert!(matches!(err, TideError::NotFound { ref kind, .. } if kind == "Secret"));
    }

    #[tokio::test]
    async fn test_credentials_require_name() {
        let client = FakeApiServer::new().api_client();
        let cmd = GetPostgres {
            print_password: true,
            ..Default::default()
        };
        assert!(matches!(
            output(cmd, &client).await.unwrap_err(),
            TideError::InvalidArgument(_)
        ));
    }
}
